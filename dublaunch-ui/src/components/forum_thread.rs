use super::{author_link, error_message, LoadingSpinner};
use dublaunch_app::domain::{CommentNode, ForumComment, MAX_COMMENT_LEN};
use leptos::prelude::*;
use server_fn::ServerFnError;
use uuid::Uuid;

#[server(ForumThreadFn, "/api", endpoint = "forum_thread")]
pub async fn forum_thread(
    post_id: Uuid,
) -> Result<Vec<CommentNode<ForumComment>>, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    Ok(ctx.forum.thread(post_id).await?)
}

#[server(PostForumCommentFn, "/api", endpoint = "post_forum_comment")]
pub async fn post_forum_comment(
    post_id: Uuid,
    parent_id: Option<Uuid>,
    content: String,
) -> Result<ForumComment, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let author = crate::session::current_user_id().await;

    Ok(ctx
        .forum
        .post_comment(author, post_id, parent_id, &content)
        .await?)
}

/// Replies under a forum post. A locked post shows its thread without forms.
#[component]
pub fn ForumThread(post_id: Uuid, locked: bool) -> impl IntoView {
    let post = ServerAction::<PostForumCommentFn>::new();
    let replying_to = RwSignal::new(None::<Uuid>);

    let thread = Resource::new(
        move || post.version().get(),
        move |_| forum_thread(post_id),
    );

    Effect::new(move |_| {
        if let Some(Ok(_)) = post.value().get() {
            replying_to.set(None);
        }
    });

    view! {
        <section class="comments">
            <h2 class="comments__title">"Replies"</h2>
            {if locked {
                view! { <p class="comments__locked">"This thread is locked."</p> }.into_any()
            } else {
                view! { <ReplyForm post_id=post_id parent_id=None post=post/> }.into_any()
            }}
            {move || post.value().get().and_then(|r| r.err()).map(|e| view! {
                <p class="comments__error">{error_message(&e)}</p>
            })}
            <Transition fallback=|| view! { <LoadingSpinner label="Loading replies..."/> }>
                {move || thread.get().map(|result| match result {
                    Ok(nodes) if nodes.is_empty() => view! {
                        <p class="comments__empty">"No replies yet."</p>
                    }.into_any(),
                    Ok(nodes) => view! {
                        <ul class="comments__list">
                            {nodes
                                .into_iter()
                                .map(|node| reply_view(node, post_id, locked, post, replying_to))
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

fn reply_view(
    node: CommentNode<ForumComment>,
    post_id: Uuid,
    locked: bool,
    post: ServerAction<PostForumCommentFn>,
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
            {(!locked).then(|| view! {
                <button class="comment__reply" on:click=move |_| replying_to.set(Some(id))>
                    "Reply"
                </button>
                <Show when=move || replying_to.get() == Some(id)>
                    <ReplyForm post_id=post_id parent_id=Some(id) post=post/>
                </Show>
            })}
            <ul class="comment__replies">
                {replies
                    .into_iter()
                    .map(|reply| reply_view(reply, post_id, locked, post, replying_to))
                    .collect::<Vec<_>>()}
            </ul>
        </li>
    }
    .into_any()
}

#[component]
fn ReplyForm(
    post_id: Uuid,
    parent_id: Option<Uuid>,
    post: ServerAction<PostForumCommentFn>,
) -> impl IntoView {
    let content = RwSignal::new(String::new());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let text = content.get_untracked();
        if text.trim().is_empty() {
            return;
        }
        post.dispatch(PostForumCommentFn {
            post_id,
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
                placeholder=if parent_id.is_some() { "Write a reply" } else { "Join the discussion" }
                prop:value=move || content.get()
                on:input=move |ev| content.set(event_target_value(&ev))
            ></textarea>
            <button
                type="submit"
                class="comment-form__button"
                prop:disabled=move || post.pending().get()
            >
                "Reply"
            </button>
        </form>
    }
}
