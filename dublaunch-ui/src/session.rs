use tower_sessions::Session;
use uuid::Uuid;

/// Session key holding the signed-in student's profile id.
pub const USER_ID_KEY: &str = "user_id";

/// The student behind the current request, if signed in.
pub async fn current_user_id() -> Option<Uuid> {
    let session = match leptos_axum::extract::<Session>().await {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!("No session on request: {}", e);
            return None;
        }
    };
    session.get::<Uuid>(USER_ID_KEY).await.ok().flatten()
}
