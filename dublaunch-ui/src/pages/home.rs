use crate::components::{error_message, LaunchCard, LoadingSpinner};
use dublaunch_app::domain::{LaunchQuery, LaunchSort, LaunchSummary, CATEGORIES};
use leptos::prelude::*;
use server_fn::ServerFnError;

const LEADERBOARD_SIZE: u64 = 10;

#[server(LeaderboardFn, "/api", endpoint = "leaderboard")]
pub async fn leaderboard(limit: u64) -> Result<Vec<LaunchSummary>, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    Ok(ctx.catalog.leaderboard(limit).await?)
}

#[server(DiscoverFn, "/api", endpoint = "discover")]
pub async fn discover(
    category: Option<String>,
    sort: LaunchSort,
) -> Result<Vec<LaunchSummary>, ServerFnError> {
    use dublaunch_app::AppContext;

    let ctx = expect_context::<AppContext>();
    let query = LaunchQuery {
        category: category.filter(|c| !c.is_empty()),
        sort,
        limit: LaunchQuery::DEFAULT_LIMIT,
        ..Default::default()
    };
    Ok(ctx.catalog.discover(query).await?)
}

pub(crate) fn launch_list(
    result: Result<Vec<LaunchSummary>, ServerFnError>,
    ranked: bool,
    empty: &'static str,
) -> AnyView {
    match result {
        Ok(launches) if launches.is_empty() => {
            view! { <p class="launch-list__empty">{empty}</p> }.into_any()
        }
        Ok(launches) => view! {
            <ol class="launch-list">
                {launches
                    .into_iter()
                    .enumerate()
                    .map(|(i, summary)| {
                        let rank = ranked.then_some(i + 1);
                        view! { <LaunchCard summary=summary rank=rank/> }
                    })
                    .collect::<Vec<_>>()}
            </ol>
        }
        .into_any(),
        Err(e) => view! { <p class="launch-list__error">{error_message(&e)}</p> }.into_any(),
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let top = Resource::new(|| (), |_| leaderboard(LEADERBOARD_SIZE));

    let category = RwSignal::new(String::new());
    let sort = RwSignal::new(LaunchSort::Newest);
    let browse = Resource::new(
        move || (category.get(), sort.get()),
        |(category, sort)| discover(Some(category), sort),
    );

    view! {
        <div class="hero">
            <h1 class="hero__title">"What students are launching"</h1>
            <p class="hero__subtitle">
                "Projects, startups and side hustles from your campus, ranked by classmates"
            </p>
        </div>

        <div class="home-layout">
            <section class="home-layout__left">
                <div class="discover__filters">
                    <select
                        class="discover__category"
                        on:change=move |ev| category.set(event_target_value(&ev))
                    >
                        <option value="">"All categories"</option>
                        {CATEGORIES
                            .iter()
                            .map(|c| view! { <option value=*c>{*c}</option> })
                            .collect::<Vec<_>>()}
                    </select>
                    <select
                        class="discover__sort"
                        on:change=move |ev| {
                            sort.set(match event_target_value(&ev).as_str() {
                                "oldest" => LaunchSort::Oldest,
                                "most_voted" => LaunchSort::MostVoted,
                                "most_viewed" => LaunchSort::MostViewed,
                                _ => LaunchSort::Newest,
                            })
                        }
                    >
                        <option value="newest">"Newest"</option>
                        <option value="oldest">"Oldest"</option>
                        <option value="most_voted">"Most voted"</option>
                        <option value="most_viewed">"Most viewed"</option>
                    </select>
                </div>
                <Transition fallback=|| view! { <LoadingSpinner/> }>
                    {move || browse.get().map(|r| launch_list(r, false, "Nothing here yet. Be the first to launch!"))}
                </Transition>
            </section>

            <aside class="home-layout__right">
                <div class="leaderboard">
                    <h2 class="leaderboard__title">"Top launches"</h2>
                    <Suspense fallback=|| view! { <LoadingSpinner/> }>
                        {move || top.get().map(|r| launch_list(r, true, "No votes yet."))}
                    </Suspense>
                </div>
            </aside>
        </div>
    }
}
