use super::search::forum_row;
use crate::components::{error_message, LoadingSpinner};
use dublaunch_app::domain::{
    ForumPost, ForumPostSummary, ForumQuery, ForumSort, FORUM_CATEGORIES, MAX_FORUM_TITLE_LEN,
};
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use server_fn::ServerFnError;

#[server(ForumPostsFn, "/api", endpoint = "forum_posts")]
pub async fn forum_posts(
    category: Option<String>,
    sort: ForumSort,
) -> Result<Vec<ForumPostSummary>, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let query = ForumQuery {
        category: category.filter(|c| !c.is_empty()),
        sort,
        ..Default::default()
    };
    Ok(ctx.forum.posts(query).await?)
}

#[server(CreateForumPostFn, "/api", endpoint = "create_forum_post")]
pub async fn create_forum_post(
    category: String,
    title: String,
    content: String,
) -> Result<ForumPost, ServerFnError> {
    use dublaunch_app::domain::ForumPostInput;
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let author = crate::session::current_user_id().await;
    let input = ForumPostInput {
        category,
        title,
        content,
    };

    Ok(ctx.forum.create_post(author, input).await?)
}

#[component]
pub fn ForumsPage() -> impl IntoView {
    let category = RwSignal::new(String::new());
    let sort = RwSignal::new(ForumSort::Newest);
    let posts = Resource::new(
        move || (category.get(), sort.get()),
        |(category, sort)| forum_posts(Some(category), sort),
    );

    view! {
        <div class="hero">
            <h1 class="hero__title">"Forums"</h1>
            <p class="hero__subtitle">"Ask for feedback, find teammates, share what you're building"</p>
        </div>

        <div class="forum-layout">
            <section class="forum-layout__main">
                <div class="discover__filters">
                    <select
                        class="discover__category"
                        on:change=move |ev| category.set(event_target_value(&ev))
                    >
                        <option value="">"All categories"</option>
                        {FORUM_CATEGORIES
                            .iter()
                            .map(|c| view! { <option value=c.id>{c.name}</option> })
                            .collect::<Vec<_>>()}
                    </select>
                    <select
                        class="discover__sort"
                        on:change=move |ev| {
                            sort.set(match event_target_value(&ev).as_str() {
                                "most_liked" => ForumSort::MostLiked,
                                "most_commented" => ForumSort::MostCommented,
                                _ => ForumSort::Newest,
                            })
                        }
                    >
                        <option value="newest">"Newest"</option>
                        <option value="most_liked">"Most liked"</option>
                        <option value="most_commented">"Most discussed"</option>
                    </select>
                </div>
                <Transition fallback=|| view! { <LoadingSpinner/> }>
                    {move || posts.get().map(|result| match result {
                        Ok(posts) if posts.is_empty() => view! {
                            <p class="forum-list__empty">"No posts here yet. Start the conversation!"</p>
                        }.into_any(),
                        Ok(posts) => view! {
                            <ul class="forum-list">
                                {posts.into_iter().map(forum_row).collect::<Vec<_>>()}
                            </ul>
                        }.into_any(),
                        Err(e) => view! {
                            <p class="forum-list__error">{error_message(&e)}</p>
                        }.into_any(),
                    })}
                </Transition>
            </section>

            <aside class="forum-layout__side">
                <NewPostForm/>
            </aside>
        </div>
    }
}

#[component]
fn NewPostForm() -> impl IntoView {
    let create = ServerAction::<CreateForumPostFn>::new();
    let navigate = use_navigate();

    Effect::new(move |_| {
        if let Some(Ok(post)) = create.value().get() {
            navigate(&format!("/forums/post/{}", post.id), Default::default());
        }
    });

    view! {
        <div class="new-post">
            <h2 class="new-post__title">"Start a discussion"</h2>
            <ActionForm action=create attr:class="new-post__form">
                <label>"Category"
                    <select name="category">
                        {FORUM_CATEGORIES
                            .iter()
                            .map(|c| view! { <option value=c.id title=c.description>{c.name}</option> })
                            .collect::<Vec<_>>()}
                    </select>
                </label>
                <label>"Title"
                    <input type="text" name="title" maxlength=MAX_FORUM_TITLE_LEN.to_string() required/>
                </label>
                <label>"Post" <textarea name="content" required></textarea></label>
                <button type="submit" class="new-post__button" prop:disabled=move || create.pending().get()>
                    "Post"
                </button>
            </ActionForm>
            {move || create.value().get().and_then(|r| r.err()).map(|e| view! {
                <p class="new-post__error">{error_message(&e)}</p>
            })}
        </div>
    }
}
