use crate::components::{
    author_link, error_message, ErrorDisplay, ForumThread, LoadingSpinner, VoteButton,
};
use dublaunch_app::domain::{ForumPostDetails, VoteState, VoteTarget};
use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use server_fn::ServerFnError;

#[server(ForumPostFn, "/api", endpoint = "forum_post")]
pub async fn forum_post(id: String) -> Result<ForumPostDetails, ServerFnError> {
    use dublaunch_app::AppContext;
    use dublaunch_errors::AppError;

    let ctx = expect_context::<AppContext>();
    let viewer = crate::session::current_user_id().await;
    let id = uuid::Uuid::parse_str(&id).map_err(|_| AppError::not_found("forum post"))?;

    Ok(ctx.forum.post_details(id, viewer).await?)
}

#[component]
pub fn ForumPostPage() -> impl IntoView {
    let params = use_params_map();
    let id = move || params.read().get("id").unwrap_or_default();
    let details = Resource::new(id, forum_post);

    view! {
        <Suspense fallback=|| view! { <LoadingSpinner/> }>
            {move || details.get().map(|result| match result {
                Ok(details) => post_view(details),
                Err(e) => view! { <ErrorDisplay message=error_message(&e)/> }.into_any(),
            })}
        </Suspense>
    }
}

fn post_view(details: ForumPostDetails) -> AnyView {
    let ForumPostDetails {
        post,
        author,
        viewer_has_liked,
    } = details;
    let initial = VoteState::new(viewer_has_liked, post.likes_count);
    let category = post.category_name();

    view! {
        <article class="forum-post">
            <a href="/forums" class="forum-post__back">"← Forums"</a>
            <header class="forum-post__header">
                <div>
                    <span class="forum-post__category">{category}</span>
                    <h1 class="forum-post__title">{post.title.clone()}</h1>
                    <span class="forum-post__meta">
                        "by " {author_link(&author, "forum-post__author")} " · "
                        {post.created_at.format("%b %-d, %Y").to_string()} " · "
                        {post.views_count} " views"
                    </span>
                </div>
                <VoteButton target=VoteTarget::ForumPost(post.id) initial=initial/>
            </header>
            <p class="forum-post__body">{post.content.clone()}</p>
        </article>

        <ForumThread post_id=post.id locked=post.is_locked/>
    }
    .into_any()
}
