use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{dao::store::FahootStore, state::SharedState};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_HEALTH_FAILURES: u32 = 3;

/// Keep the shared state supplied with a healthy store.
///
/// Connection failures put the application in degraded mode rather than
/// aborting it; requests answer 503 until the backend comes back.
pub async fn run<F, Fut, E>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn FahootStore>, E>> + Send,
    E: std::fmt::Display,
{
    let mut delay = INITIAL_DELAY;

    loop {
        match connect().await {
            Ok(store) => {
                state.install_store(store.clone()).await;
                info!("storage connection established; leaving degraded mode");
                delay = INITIAL_DELAY;

                let mut failures = 0;
                loop {
                    match store.health_check().await {
                        Ok(()) => {
                            failures = 0;
                            sleep(HEALTH_POLL_INTERVAL).await;
                        }
                        Err(err) => {
                            failures += 1;
                            warn!(failures, error = %err, "storage health check failed");
                            if failures >= MAX_HEALTH_FAILURES {
                                warn!("storage considered lost; entering degraded mode");
                                state.clear_store().await;
                                break;
                            }
                            sleep(INITIAL_DELAY).await;
                        }
                    }
                }
            }
            Err(err) => {
                warn!(error = %err, "storage connection attempt failed");
                sleep(delay).await;
                delay = (delay * 2).min(MAX_DELAY);
            }
        }
    }
}
