/// Account creation, sign-in and email verification.
pub mod auth_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Fire-and-forget publication to the logs queue.
pub mod logger_service;
/// Fire-and-forget publication to the notifications queue.
pub mod notification_service;
/// Play session lifecycle.
pub mod play_service;
/// Participant join and lobby management.
pub mod player_service;
/// Quiz CRUD for authenticated owners.
pub mod quiz_service;
/// Room WebSocket connection handling.
pub mod socket_service;
/// Storage reconnection supervisor with degraded mode.
pub mod storage_supervisor;
/// Object storage uploads.
pub mod upload_service;
/// Profile management for authenticated users.
pub mod user_service;
