use crate::components::{author_link, error_message, LaunchCard, LoadingSpinner};
use dublaunch_app::domain::{ForumPostSummary, Profile, SearchResults};
use leptos::prelude::*;
use leptos_router::hooks::use_query_map;
use server_fn::ServerFnError;

#[server(SearchFn, "/api", endpoint = "search")]
pub async fn search(q: String) -> Result<SearchResults, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    Ok(ctx.search.search(&q).await?)
}

#[component]
pub fn SearchPage() -> impl IntoView {
    let query = use_query_map();
    let q = move || query.read().get("q").unwrap_or_default();
    let results = Resource::new(q, search);

    view! {
        <section class="search">
            <form class="search__form" method="get" action="/search">
                <input
                    type="search"
                    name="q"
                    class="search__input"
                    placeholder="Launches, students, forum posts"
                    prop:value=q
                />
                <button type="submit" class="search__button">"Search"</button>
            </form>
            <Transition fallback=|| view! { <LoadingSpinner label="Searching..."/> }>
                {move || results.get().map(|result| match result {
                    Ok(found) => results_view(found),
                    Err(e) => view! { <p class="search__error">{error_message(&e)}</p> }.into_any(),
                })}
            </Transition>
        </section>
    }
}

fn results_view(found: SearchResults) -> AnyView {
    if found.query.is_empty() {
        return view! { <p class="search__hint">"Type something to search."</p> }.into_any();
    }
    if found.is_empty() {
        return view! {
            <p class="search__empty">"Nothing matches “" {found.query} "”."</p>
        }
        .into_any();
    }

    let SearchResults {
        launches,
        students,
        posts,
        ..
    } = found;

    view! {
        {(!launches.is_empty()).then(|| view! {
            <h2 class="search__heading">"Launches"</h2>
            <ol class="launch-list">
                {launches
                    .into_iter()
                    .map(|summary| view! { <LaunchCard summary=summary/> })
                    .collect::<Vec<_>>()}
            </ol>
        })}
        {(!students.is_empty()).then(|| view! {
            <h2 class="search__heading">"Students"</h2>
            <ul class="student-list">
                {students.into_iter().map(student_row).collect::<Vec<_>>()}
            </ul>
        })}
        {(!posts.is_empty()).then(|| view! {
            <h2 class="search__heading">"Forum posts"</h2>
            <ul class="forum-list">
                {posts.into_iter().map(forum_row).collect::<Vec<_>>()}
            </ul>
        })}
    }
    .into_any()
}

fn student_row(profile: Profile) -> impl IntoView {
    let href = format!("/profile/{}", profile.username);
    view! {
        <li class="student-list__item">
            <span class="student-list__avatar">{profile.initial().to_string()}</span>
            <a href=href class="student-list__name">{profile.display_name}</a>
            <span class="student-list__handle">"@" {profile.username}</span>
        </li>
    }
}

/// One row of a forum listing.
pub(crate) fn forum_row(summary: ForumPostSummary) -> impl IntoView {
    let ForumPostSummary { post, author } = summary;
    let href = format!("/forums/post/{}", post.id);
    view! {
        <li class="forum-row" class:forum-row--pinned=post.is_pinned>
            <div class="forum-row__info">
                <a href=href class="forum-row__title">
                    {post.is_pinned.then_some("📌 ")}
                    {post.is_locked.then_some("🔒 ")}
                    {post.title.clone()}
                </a>
                <span class="forum-row__meta">
                    {post.category_name()} " · by " {author_link(&author, "forum-row__author")}
                </span>
            </div>
            <div class="forum-row__stats">
                <span>{post.likes_count} " ♥"</span>
                <span>{post.comments_count} " 💬"</span>
                <span>{post.views_count} " 👁"</span>
            </div>
        </li>
    }
}
