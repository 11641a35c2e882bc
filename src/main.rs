//! Fahoot backend binary entrypoint wiring REST, WebSocket, MongoDB, AMQP,
//! SMTP and S3 layers.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{HeaderValue, Method, header};
use tokio::{net::TcpListener, time::sleep};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fahoot_back::{
    config::AppConfig,
    dao::{self, store::FahootStore},
    mail::Mailer,
    queue,
    routes,
    services::{storage_supervisor, upload_service::ObjectStorage},
    state::{AppState, SharedState},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = AppConfig::from_env().context("loading configuration")?;
    let port = config.port;
    let state = AppState::new(config);

    let object_storage = ObjectStorage::new(&state.config().s3).await;
    state.install_object_storage(object_storage).await;

    let mailer = Mailer::new(&state.config().smtp, &state.config().frontend_url)
        .context("building SMTP transport")?;
    tokio::spawn(run_queue_supervisor(state.clone(), mailer));

    let mongo_settings = state.config().mongo.clone();
    tokio::spawn(storage_supervisor::run(state.clone(), move || {
        let settings = mongo_settings.clone();
        async move {
            dao::mongodb::connect(&settings)
                .await
                .map(|store| Arc::new(store) as Arc<dyn FahootStore>)
        }
    }));

    let cors = cors_layer(&state.config().frontend_url);
    let app = routes::router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "starting server");

    let listener = TcpListener::bind(addr).await.context("binding server")?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving axum")?;

    Ok(())
}

/// Keep the AMQP side alive: connect, install the publisher, spawn both
/// consumers, then watch the connection and rebuild everything if it drops.
async fn run_queue_supervisor(state: SharedState, mailer: Mailer) {
    let settings = state.config().amqp.clone();
    let initial_delay = Duration::from_secs(1);
    let max_delay = Duration::from_secs(10);
    let mut delay = initial_delay;

    loop {
        let client = match queue::connect(&settings).await {
            Ok(client) => client,
            Err(err) => {
                warn!(error = %err, "AMQP connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(max_delay);
                continue;
            }
        };

        let installed = async {
            client.spawn_log_consumer(state.clone()).await?;
            client.spawn_notification_consumer(mailer.clone()).await?;
            client.publisher().await
        }
        .await;

        match installed {
            Ok(publisher) => {
                state.install_queue(Arc::new(publisher)).await;
                info!("message queue connected");
                delay = initial_delay;

                while client.is_connected() {
                    sleep(Duration::from_secs(5)).await;
                }
                warn!("AMQP connection lost; reconnecting");
            }
            Err(err) => {
                warn!(error = %err, "failed to set up AMQP channels");
                sleep(delay).await;
                delay = (delay * 2).min(max_delay);
            }
        }
    }
}

/// Restrict cross-origin calls to the configured frontend; cookies require a
/// concrete origin rather than a wildcard.
fn cors_layer(frontend_url: &str) -> CorsLayer {
    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true),
        Err(_) => CorsLayer::permissive(),
    }
}

/// Configure tracing subscribers so logs include spans by default.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Wait for Ctrl+C or SIGTERM and shut the server down gracefully.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
