use dublaunch_app::domain::Profile;
use leptos::prelude::*;
use server_fn::ServerFnError;

#[server(CurrentUserFn, "/api", endpoint = "current_user")]
pub async fn current_user() -> Result<Option<Profile>, ServerFnError> {
    use dublaunch_app::AppContext;

    let Some(ctx) = use_context::<AppContext>() else {
        tracing::debug!("current_user: no AppContext");
        return Ok(None);
    };
    let user_id = crate::session::current_user_id().await;

    Ok(ctx.profile(user_id).await?)
}

/// Google sign-in button, or the signed-in student with a logout button.
#[component]
pub fn AuthSection() -> impl IntoView {
    let user = Resource::new(|| (), |_| current_user());

    view! {
        <div class="auth-section">
            <Suspense fallback=|| ()>
                {move || user.get().map(|result| match result {
                    Ok(Some(profile)) => view! {
                        <div class="user-info">
                            {profile.avatar_url.clone().map(|src| view! {
                                <img src=src alt="" class="user-info__avatar"/>
                            })}
                            <span class="user-info__name">{profile.display_name.clone()}</span>
                            <form action="/auth/logout" method="post" class="logout-form">
                                <button type="submit" class="logout-btn">"Log out"</button>
                            </form>
                        </div>
                    }.into_any(),
                    _ => view! {
                        <a href="/auth/login" rel="external" class="google-login-btn">
                            "Sign in with your university Google account"
                        </a>
                    }.into_any(),
                })}
            </Suspense>
        </div>
    }
}
