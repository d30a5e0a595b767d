use super::author_link;
use dublaunch_app::domain::LaunchSummary;
use leptos::prelude::*;

#[component]
pub fn LaunchCard(summary: LaunchSummary, #[prop(default = None)] rank: Option<usize>) -> impl IntoView {
    let LaunchSummary { launch, author } = summary;
    let href = format!("/launch/{}", launch.slug);

    view! {
        <li class="launch-card">
            {rank.map(|r| view! { <span class="launch-card__rank">{r}</span> })}
            <div class="launch-card__info">
                <a href=href class="launch-card__name">{launch.name}</a>
                <p class="launch-card__tagline">{launch.tagline}</p>
                <span class="launch-card__meta">
                    {launch.primary_category} " · by " {author_link(&author, "launch-card__author")}
                </span>
            </div>
            <div class="launch-card__stats">
                <span class="launch-card__votes">{launch.votes_count} " ♥"</span>
                <span class="launch-card__comments">{launch.comments_count} " 💬"</span>
            </div>
        </li>
    }
}
