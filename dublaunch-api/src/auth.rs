use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Json, Router};
use dublaunch_app::domain::Profile;
use dublaunch_app::AppContext;
use dublaunch_errors::AppError;
use dublaunch_ui::session::USER_ID_KEY;
use oauth2::PkceCodeVerifier;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

const CSRF_KEY: &str = "oauth_csrf";
const PKCE_KEY: &str = "oauth_pkce";

#[derive(Deserialize)]
pub struct CallbackParams {
    code: String,
    state: String,
}

#[derive(Serialize)]
pub struct MeResponse {
    authenticated: bool,
    user: Option<Profile>,
}

/// `/login`, `/callback`, `/logout` and `/me`, meant to be nested under `/auth`.
pub fn routes<S>(ctx: AppContext) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/login", get(login))
        .route("/callback", get(callback))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .with_state(ctx)
}

fn session_err(e: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("session: {}", e))
}

pub async fn login(State(ctx): State<AppContext>, session: Session) -> Result<Redirect, AppError> {
    let oauth = ctx
        .oauth
        .as_ref()
        .ok_or_else(|| AppError::Internal("sign-in is not configured".into()))?;

    let (auth_url, csrf, pkce) = oauth.get_auth_url();
    session
        .insert(CSRF_KEY, csrf.secret())
        .await
        .map_err(session_err)?;
    session
        .insert(PKCE_KEY, pkce.secret())
        .await
        .map_err(session_err)?;

    Ok(Redirect::to(&auth_url))
}

pub async fn callback(
    State(ctx): State<AppContext>,
    session: Session,
    Query(params): Query<CallbackParams>,
) -> Result<Redirect, AppError> {
    let oauth = ctx
        .oauth
        .as_ref()
        .ok_or_else(|| AppError::Internal("sign-in is not configured".into()))?;

    let expected: Option<String> = session.remove(CSRF_KEY).await.map_err(session_err)?;
    if expected.as_deref() != Some(params.state.as_str()) {
        tracing::warn!("OAuth callback with mismatched state");
        return Err(AppError::Unauthenticated);
    }
    let verifier: String = session
        .remove(PKCE_KEY)
        .await
        .map_err(session_err)?
        .ok_or(AppError::Unauthenticated)?;

    let info = oauth
        .exchange_code(&params.code, PkceCodeVerifier::new(verifier))
        .await?;
    let profile = ctx.sign_in(info).await?;

    session.cycle_id().await.map_err(session_err)?;
    session
        .insert(USER_ID_KEY, profile.id)
        .await
        .map_err(session_err)?;

    Ok(Redirect::to("/"))
}

pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    session.flush().await.map_err(session_err)?;
    Ok(Redirect::to("/"))
}

pub async fn me(State(ctx): State<AppContext>, session: Session) -> impl IntoResponse {
    let user_id: Option<Uuid> = session.get(USER_ID_KEY).await.ok().flatten();
    let user = match ctx.profile(user_id).await {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    Json(MeResponse {
        authenticated: user.is_some(),
        user,
    })
    .into_response()
}
