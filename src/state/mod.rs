//! Central application state shared by every request and socket connection.

/// Socket room registry.
pub mod rooms;
/// Socket session lifecycle.
pub mod session;

use std::sync::Arc;

use axum_extra::extract::cookie::Key;
use tokio::sync::{RwLock, watch};

use crate::{
    auth::token::JwtKeys,
    config::AppConfig,
    dao::store::FahootStore,
    error::ServiceError,
    queue::QueuePublisher,
    services::upload_service::ObjectStorage,
    throttle::Throttle,
};

pub use self::rooms::{RoomMember, RoomRegistry};

/// Cheaply clonable handle to the process-wide state.
pub type SharedState = Arc<AppState>;

/// Process-wide singletons: configuration, keys, the storage handle and the
/// room registry. Everything request-scoped lives elsewhere (the identity
/// context travels in request extensions, transaction scopes are created per
/// unit of work).
pub struct AppState {
    config: AppConfig,
    jwt: JwtKeys,
    cookie_key: Key,
    store: RwLock<Option<Arc<dyn FahootStore>>>,
    degraded: watch::Sender<bool>,
    queue: RwLock<Option<Arc<QueuePublisher>>>,
    storage: RwLock<Option<ObjectStorage>>,
    rooms: RoomRegistry,
    throttle: Throttle,
}

impl AppState {
    /// Construct the shared state from validated configuration.
    ///
    /// The application starts in degraded mode until a store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let jwt = JwtKeys::new(&config.jwt);
        let cookie_key = Key::derive_from(config.cookie_secret.as_bytes());
        let throttle = Throttle::new(config.throttle.clone());
        Arc::new(Self {
            config,
            jwt,
            cookie_key,
            store: RwLock::new(None),
            degraded: degraded_tx,
            queue: RwLock::new(None),
            storage: RwLock::new(None),
            rooms: RoomRegistry::new(),
            throttle,
        })
    }

    /// Fixed-window throttle table.
    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Token signing keys.
    pub fn jwt(&self) -> &JwtKeys {
        &self.jwt
    }

    /// Cookie signing key.
    pub fn cookie_key(&self) -> &Key {
        &self.cookie_key
    }

    /// Registry of active socket rooms.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn FahootStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Store handle or a degraded-mode failure.
    pub async fn require_store(&self) -> Result<Arc<dyn FahootStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn FahootStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        let _ = self.degraded.send(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        let _ = self.degraded.send(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.store.read().await;
        guard.is_none()
    }

    /// Queue publisher, if the AMQP connection is up.
    pub async fn queue(&self) -> Option<Arc<QueuePublisher>> {
        let guard = self.queue.read().await;
        guard.as_ref().cloned()
    }

    /// Install the queue publisher once the AMQP channel is open.
    pub async fn install_queue(&self, publisher: Arc<QueuePublisher>) {
        let mut guard = self.queue.write().await;
        *guard = Some(publisher);
    }

    /// Object storage client, if configured at startup.
    pub async fn object_storage(&self) -> Option<ObjectStorage> {
        let guard = self.storage.read().await;
        guard.as_ref().cloned()
    }

    /// Install the object storage client.
    pub async fn install_object_storage(&self, storage: ObjectStorage) {
        let mut guard = self.storage.write().await;
        *guard = Some(storage);
    }
}

/// Marker type letting `SignedCookieJar` pull the cookie key out of the
/// `Arc`-wrapped state (coherence forbids `impl FromRef<SharedState> for Key`).
#[derive(Clone)]
pub struct CookieKey(Key);

impl From<CookieKey> for Key {
    fn from(key: CookieKey) -> Self {
        key.0
    }
}

impl axum::extract::FromRef<SharedState> for CookieKey {
    fn from_ref(state: &SharedState) -> Self {
        CookieKey(state.cookie_key.clone())
    }
}
