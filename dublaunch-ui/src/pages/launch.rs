use crate::components::{
    author_link, error_message, CommentThread, ErrorDisplay, LoadingSpinner, VoteButton,
};
use dublaunch_app::domain::{LaunchDetails, VoteState, VoteTarget};
use leptos::prelude::*;
use leptos_router::hooks::{use_navigate, use_params_map};
use server_fn::ServerFnError;
use uuid::Uuid;

#[server(LaunchDetailFn, "/api", endpoint = "launch_detail")]
pub async fn launch_detail(slug: String) -> Result<LaunchDetails, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let viewer = crate::session::current_user_id().await;

    Ok(ctx.catalog.launch_by_slug(&slug, viewer).await?)
}

#[server(DeleteLaunchFn, "/api", endpoint = "delete_launch")]
pub async fn delete_launch(launch_id: Uuid) -> Result<(), ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let requester = crate::session::current_user_id().await;

    Ok(ctx.catalog.delete_launch(requester, launch_id).await?)
}

#[component]
pub fn LaunchPage() -> impl IntoView {
    let params = use_params_map();
    let slug = move || params.read().get("slug").unwrap_or_default();
    let details = Resource::new(slug, launch_detail);

    view! {
        <Suspense fallback=|| view! { <LoadingSpinner/> }>
            {move || details.get().map(|result| match result {
                Ok(details) => launch_view(details),
                Err(e) => view! { <ErrorDisplay message=error_message(&e)/> }.into_any(),
            })}
        </Suspense>
    }
}

fn launch_view(details: LaunchDetails) -> AnyView {
    let LaunchDetails {
        launch,
        author,
        viewer_has_voted,
        viewer_is_creator,
    } = details;
    let initial = VoteState::new(viewer_has_voted, launch.votes_count);

    view! {
        <article class="launch">
            <header class="launch__header">
                <div>
                    <h1 class="launch__name">{launch.name}</h1>
                    <p class="launch__tagline">{launch.tagline}</p>
                </div>
                <VoteButton target=VoteTarget::Launch(launch.id) initial=initial/>
            </header>

            <div class="launch__meta">
                <span class="launch__category">{launch.primary_category}</span>
                <span class="launch__pricing">{launch.pricing_type.label()}</span>
                {launch
                    .tags
                    .into_iter()
                    .map(|t| view! { <span class="launch__tag">"#" {t}</span> })
                    .collect::<Vec<_>>()}
            </div>

            <p class="launch__description">{launch.description}</p>

            <footer class="launch__footer">
                <a href=launch.website_url.clone() target="_blank" rel="noopener noreferrer" class="launch__visit">
                    "Visit website"
                </a>
                <span class="launch__author">
                    "Launched by " {author_link(&author, "launch__author-link")}
                    {author.handle().map(|h| format!(" (@{})", h))}
                </span>
                <span class="launch__views">{launch.views_count} " views"</span>
                {viewer_is_creator.then(|| view! { <DeleteLaunchButton launch_id=launch.id/> })}
            </footer>
        </article>

        <CommentThread launch_id=launch.id/>
    }
    .into_any()
}

/// Asks once, then deletes and goes back home.
#[component]
fn DeleteLaunchButton(launch_id: Uuid) -> impl IntoView {
    let delete = ServerAction::<DeleteLaunchFn>::new();
    let confirming = RwSignal::new(false);
    let navigate = use_navigate();

    Effect::new(move |_| {
        if let Some(Ok(())) = delete.value().get() {
            navigate("/", Default::default());
        }
    });

    view! {
        <div class="launch__delete">
            <Show
                when=move || confirming.get()
                fallback=move || view! {
                    <button class="launch__delete-button" on:click=move |_| confirming.set(true)>
                        "Delete launch"
                    </button>
                }
            >
                <span class="launch__delete-prompt">"Votes and comments go too. Sure?"</span>
                <button
                    class="launch__delete-confirm"
                    prop:disabled=move || delete.pending().get()
                    on:click=move |_| {
                        delete.dispatch(DeleteLaunchFn { launch_id });
                    }
                >
                    "Yes, delete"
                </button>
                <button class="launch__delete-cancel" on:click=move |_| confirming.set(false)>
                    "Cancel"
                </button>
            </Show>
            {move || delete.value().get().and_then(|r| r.err()).map(|e| view! {
                <p class="launch__delete-error">{error_message(&e)}</p>
            })}
        </div>
    }
}
