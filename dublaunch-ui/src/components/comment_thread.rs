use super::{author_link, error_message, LoadingSpinner};
use dublaunch_app::domain::{Comment, CommentNode, MAX_COMMENT_LEN};
use leptos::prelude::*;
use server_fn::ServerFnError;
use uuid::Uuid;

#[server(CommentThreadFn, "/api", endpoint = "comment_thread")]
pub async fn comment_thread(launch_id: Uuid) -> Result<Vec<CommentNode>, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    Ok(ctx.comments.thread(launch_id).await?)
}

#[server(PostCommentFn, "/api", endpoint = "post_comment")]
pub async fn post_comment(
    launch_id: Uuid,
    parent_id: Option<Uuid>,
    content: String,
) -> Result<Comment, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let author = crate::session::current_user_id().await;

    Ok(ctx
        .comments
        .post_comment(author, launch_id, parent_id, &content)
        .await?)
}

/// Discussion under a launch. Replies nest under their parent.
#[component]
pub fn CommentThread(launch_id: Uuid) -> impl IntoView {
    let post = ServerAction::<PostCommentFn>::new();
    let replying_to = RwSignal::new(None::<Uuid>);

    let thread = Resource::new(
        move || post.version().get(),
        move |_| comment_thread(launch_id),
    );

    Effect::new(move |_| {
        if let Some(Ok(_)) = post.value().get() {
            replying_to.set(None);
        }
    });

    view! {
        <section class="comments">
            <h2 class="comments__title">"Discussion"</h2>
            <CommentForm launch_id=launch_id parent_id=None post=post/>
            {move || post.value().get().and_then(|r| r.err()).map(|e| view! {
                <p class="comments__error">{error_message(&e)}</p>
            })}
            <Transition fallback=|| view! { <LoadingSpinner label="Loading comments..."/> }>
                {move || thread.get().map(|result| match result {
                    Ok(nodes) if nodes.is_empty() => view! {
                        <p class="comments__empty">"No comments yet. Say something nice!"</p>
                    }.into_any(),
                    Ok(nodes) => view! {
                        <ul class="comments__list">
                            {nodes
                                .into_iter()
                                .map(|node| comment_view(node, launch_id, post, replying_to))
                                .collect::<Vec<_>>()}
                        </ul>
                    }.into_any(),
                    Err(e) => view! {
                        <p class="comments__error">{error_message(&e)}</p>
                    }.into_any(),
                })}
            </Transition>
        </section>
    }
}

fn comment_view(
    node: CommentNode,
    launch_id: Uuid,
    post: ServerAction<PostCommentFn>,
    replying_to: RwSignal<Option<Uuid>>,
) -> AnyView {
    let CommentNode {
        comment,
        author,
        replies,
    } = node;
    let id = comment.id;

    view! {
        <li class="comment">
            <div class="comment__header">
                {author_link(&author, "comment__author")}
                <time class="comment__time" datetime=comment.created_at.to_rfc3339()>
                    {comment.created_at.format("%b %-d, %Y").to_string()}
                </time>
            </div>
            <p class="comment__body">{comment.content}</p>
            <button class="comment__reply" on:click=move |_| replying_to.set(Some(id))>
                "Reply"
            </button>
            <Show when=move || replying_to.get() == Some(id)>
                <CommentForm launch_id=launch_id parent_id=Some(id) post=post/>
            </Show>
            <ul class="comment__replies">
                {replies
                    .into_iter()
                    .map(|reply| comment_view(reply, launch_id, post, replying_to))
                    .collect::<Vec<_>>()}
            </ul>
        </li>
    }
    .into_any()
}

#[component]
fn CommentForm(
    launch_id: Uuid,
    parent_id: Option<Uuid>,
    post: ServerAction<PostCommentFn>,
) -> impl IntoView {
    let content = RwSignal::new(String::new());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let text = content.get_untracked();
        if text.trim().is_empty() {
            return;
        }
        post.dispatch(PostCommentFn {
            launch_id,
            parent_id,
            content: text,
        });
        content.set(String::new());
    };

    view! {
        <form class="comment-form" on:submit=on_submit>
            <textarea
                class="comment-form__input"
                maxlength=MAX_COMMENT_LEN.to_string()
                placeholder=if parent_id.is_some() { "Write a reply" } else { "Share your thoughts" }
                prop:value=move || content.get()
                on:input=move |ev| content.set(event_target_value(&ev))
            ></textarea>
            <button
                type="submit"
                class="comment-form__button"
                prop:disabled=move || post.pending().get()
            >
                {if parent_id.is_some() { "Reply" } else { "Comment" }}
            </button>
        </form>
    }
}
