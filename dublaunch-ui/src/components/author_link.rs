use dublaunch_app::domain::Author;
use leptos::prelude::*;

/// Name linking to the student's page, or plain text when the profile is gone.
pub fn author_link(author: &Author, class: &'static str) -> AnyView {
    let name = author.display_name().to_string();
    match author.handle() {
        Some(handle) => {
            let href = format!("/profile/{}", handle);
            view! { <a href=href class=class>{name}</a> }.into_any()
        }
        None => view! { <span class=class>{name}</span> }.into_any(),
    }
}
