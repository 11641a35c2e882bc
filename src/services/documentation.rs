use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the Fahoot backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::authentication::signup,
        crate::routes::authentication::signin,
        crate::routes::authentication::google_signup,
        crate::routes::authentication::google_signin,
        crate::routes::authentication::auto_login,
        crate::routes::authentication::verify_email,
        crate::routes::authentication::forgot_password,
        crate::routes::authentication::reset_password,
        crate::routes::authentication::logout,
        crate::routes::authentication::delete_remember_me,
        crate::routes::user::get_user,
        crate::routes::user::update_user,
        crate::routes::user::change_password,
        crate::routes::user::change_email,
        crate::routes::user::delete_user,
        crate::routes::quiz::create_quiz,
        crate::routes::quiz::list_quizzes,
        crate::routes::quiz::get_quiz,
        crate::routes::quiz::update_quiz,
        crate::routes::quiz::delete_quiz,
        crate::routes::play::create_play,
        crate::routes::play::get_play_by_id,
        crate::routes::play::list_plays_by_quiz,
        crate::routes::play::get_own_play,
        crate::routes::play::get_play_by_pin,
        crate::routes::play::update_play,
        crate::routes::play::get_podium,
        crate::routes::play::delete_play,
        crate::routes::player::create_player,
        crate::routes::player::get_player,
        crate::routes::player::list_players,
        crate::routes::player::update_player,
        crate::routes::player::delete_player,
        crate::routes::upload::upload_file,
        crate::routes::upload::delete_upload,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::auth::SignUpRequest,
            crate::dto::auth::SignInRequest,
            crate::dto::auth::GoogleAuthRequest,
            crate::dto::auth::VerifyEmailRequest,
            crate::dto::auth::ForgotPasswordRequest,
            crate::dto::auth::ResetPasswordRequest,
            crate::dto::user::UserResponse,
            crate::dto::user::UpdateUserRequest,
            crate::dto::user::ChangePasswordRequest,
            crate::dto::user::ChangeEmailRequest,
            crate::dto::quiz::SaveQuizRequest,
            crate::dto::quiz::QuizResponse,
            crate::dto::quiz::QuizListItem,
            crate::dto::play::CreatePlayRequest,
            crate::dto::play::UpdatePlayRequest,
            crate::dto::play::PlayResponse,
            crate::dto::play::PlayPreviewResponse,
            crate::dto::play::PodiumResponse,
            crate::dao::models::PodiumRow,
            crate::dto::player::JoinPlayRequest,
            crate::dto::player::UpdatePlayerRequest,
            crate::dto::player::PlayerResponse,
            crate::dto::upload::UploadResponse,
            crate::dto::upload::DeleteUploadRequest,
            crate::dto::ws::RoomInboundMessage,
            crate::dto::ws::RoomOutboundMessage,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "authentication", description = "Account creation and session cookies"),
        (name = "user", description = "Profile management"),
        (name = "quiz", description = "Quiz CRUD"),
        (name = "play", description = "Play session lifecycle"),
        (name = "player", description = "Participants"),
        (name = "upload", description = "Media uploads"),
        (name = "ws", description = "Room WebSocket gateway"),
    )
)]
pub struct ApiDoc;
