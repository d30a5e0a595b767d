use super::error_message;
use dublaunch_app::domain::{VoteResult, VoteState, VoteTarget};
use leptos::prelude::*;
use server_fn::ServerFnError;
use uuid::Uuid;

#[server(ToggleVoteFn, "/api", endpoint = "toggle_vote")]
pub async fn toggle_vote(launch_id: Uuid) -> Result<VoteResult, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let voter = crate::session::current_user_id().await;

    Ok(ctx.votes.toggle_vote_with_retry(voter, launch_id).await?)
}

#[server(ToggleLikeFn, "/api", endpoint = "toggle_like")]
pub async fn toggle_like(post_id: Uuid) -> Result<VoteResult, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let voter = crate::session::current_user_id().await;

    Ok(ctx.votes.toggle_like_with_retry(voter, post_id).await?)
}

/// Heart button that flips on click and settles once the server answers.
///
/// Clicks while a toggle is in flight are ignored. On failure the button goes
/// back to exactly what it showed before the click.
#[component]
pub fn VoteButton(target: VoteTarget, initial: VoteState) -> impl IntoView {
    let state = RwSignal::new(initial);
    let in_flight = RwSignal::new(false);
    let error = RwSignal::new(None::<String>);

    let on_click = move |_| {
        if in_flight.get_untracked() {
            return;
        }
        let before = state.get_untracked();
        state.set(before.optimistic_toggle());
        in_flight.set(true);
        error.set(None);

        leptos::task::spawn_local(async move {
            let settled = match target {
                VoteTarget::Launch(id) => toggle_vote(id).await,
                VoteTarget::ForumPost(id) => toggle_like(id).await,
            };
            match settled {
                Ok(result) => state.set(before.reconcile(&result)),
                Err(e) => {
                    state.set(before);
                    error.set(Some(error_message(&e)));
                }
            }
            in_flight.set(false);
        });
    };

    view! {
        <div class="vote">
            <button
                class="vote__button"
                class:vote__button--voted=move || state.get().voted
                aria-pressed=move || state.get().voted.to_string()
                aria-busy=move || in_flight.get().to_string()
                on:click=on_click
            >
                <span class="vote__heart">{move || if state.get().voted { "♥" } else { "♡" }}</span>
                <span class="vote__count">{move || state.get().count}</span>
            </button>
            {move || error.get().map(|message| view! {
                <p class="vote__error">{message}</p>
            })}
        </div>
    }
}
