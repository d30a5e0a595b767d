use crate::components::{error_message, ErrorDisplay, LoadingSpinner};
use dublaunch_app::domain::StudentPage;
use leptos::prelude::*;
use leptos_router::hooks::use_params_map;
use server_fn::ServerFnError;

#[server(StudentPageFn, "/api", endpoint = "student_page")]
pub async fn student_page(username: String) -> Result<StudentPage, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    Ok(ctx.catalog.student_page(&username).await?)
}

#[component]
pub fn ProfilePage() -> impl IntoView {
    let params = use_params_map();
    let username = move || params.read().get("username").unwrap_or_default();
    let page = Resource::new(username, student_page);

    view! {
        <Suspense fallback=|| view! { <LoadingSpinner/> }>
            {move || page.get().map(|result| match result {
                Ok(page) => profile_view(page),
                Err(e) => view! { <ErrorDisplay message=error_message(&e)/> }.into_any(),
            })}
        </Suspense>
    }
}

fn profile_view(page: StudentPage) -> AnyView {
    let StudentPage {
        profile,
        launches,
        total_votes,
    } = page;
    let joined = profile
        .created_at
        .map(|at| format!("Joined {}", at.format("%B %Y")));

    view! {
        <section class="profile">
            <header class="profile__header">
                {match profile.avatar_url.clone() {
                    Some(url) => view! { <img class="profile__avatar" src=url alt=""/> }.into_any(),
                    None => view! {
                        <span class="profile__avatar profile__avatar--initial">
                            {profile.initial().to_string()}
                        </span>
                    }.into_any(),
                }}
                <div>
                    <h1 class="profile__name">{profile.display_name.clone()}</h1>
                    <p class="profile__handle">"@" {profile.username.clone()}</p>
                    {joined.map(|j| view! { <p class="profile__joined">{j}</p> })}
                </div>
            </header>

            <div class="profile__stats">
                <span>{launches.len()} " launches"</span>
                <span>{total_votes} " votes received"</span>
            </div>

            <h2 class="profile__section">"Launches"</h2>
            {if launches.is_empty() {
                view! { <p class="profile__empty">"No launches yet."</p> }.into_any()
            } else {
                view! {
                    <ul class="profile__launches">
                        {launches
                            .into_iter()
                            .map(|l| {
                                let href = format!("/launch/{}", l.slug);
                                view! {
                                    <li class="profile__launch">
                                        <a href=href class="profile__launch-name">{l.name}</a>
                                        <span class="profile__launch-tagline">{l.tagline}</span>
                                        <span class="profile__launch-votes">{l.votes_count} " ♥"</span>
                                    </li>
                                }
                            })
                            .collect::<Vec<_>>()}
                    </ul>
                }
                .into_any()
            }}
        </section>
    }
    .into_any()
}
