use crate::components::error_message;
use dublaunch_app::domain::{Launch, PricingType, CATEGORIES, MAX_TAGS};
use leptos::prelude::*;
use leptos_router::hooks::use_navigate;
use server_fn::ServerFnError;

#[server(CreateLaunchFn, "/api", endpoint = "create_launch")]
#[allow(clippy::too_many_arguments)]
pub async fn create_launch(
    name: String,
    tagline: String,
    description: String,
    website_url: String,
    primary_category: String,
    tags: String,
    pricing_type: String,
    first_comment: String,
) -> Result<Launch, ServerFnError> {
    use dublaunch_app::domain::LaunchInput;
    use dublaunch_app::AppContext;
    use dublaunch_errors::AppError;

    let ctx = expect_context::<AppContext>();
    let creator = crate::session::current_user_id().await;

    let pricing_type = pricing_type
        .parse::<PricingType>()
        .map_err(AppError::InvalidInput)?;
    let input = LaunchInput {
        name,
        tagline,
        description,
        website_url,
        primary_category,
        tags: split_tags(&tags),
        pricing_type,
        first_comment: Some(first_comment).filter(|c| !c.trim().is_empty()),
    };

    Ok(ctx.catalog.create_launch(creator, input).await?)
}

/// Comma or whitespace separated, `#` optional.
pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .map(|t| t.trim_start_matches('#').trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[component]
pub fn SubmitPage() -> impl IntoView {
    let create = ServerAction::<CreateLaunchFn>::new();
    let navigate = use_navigate();

    Effect::new(move |_| {
        if let Some(Ok(launch)) = create.value().get() {
            navigate(&format!("/launch/{}", launch.slug), Default::default());
        }
    });

    view! {
        <section class="submit">
            <h1 class="submit__title">"Launch your project"</h1>
            <ActionForm action=create attr:class="submit__form">
                <label>"Name" <input type="text" name="name" maxlength="100" required/></label>
                <label>"Tagline" <input type="text" name="tagline" maxlength="140" required/></label>
                <label>"Website" <input type="url" name="website_url" placeholder="https://" required/></label>
                <label>"Description" <textarea name="description" maxlength="5000"></textarea></label>
                <label>"Category"
                    <select name="primary_category">
                        {CATEGORIES
                            .iter()
                            .map(|c| view! { <option value=*c>{*c}</option> })
                            .collect::<Vec<_>>()}
                    </select>
                </label>
                <label>"Pricing"
                    <select name="pricing_type">
                        {PricingType::ALL
                            .iter()
                            .map(|p| view! { <option value=p.as_str()>{p.label()}</option> })
                            .collect::<Vec<_>>()}
                    </select>
                </label>
                <label>{format!("Tags (up to {})", MAX_TAGS)}
                    <input type="text" name="tags" placeholder="food, delivery"/>
                </label>
                <label>"First comment"
                    <textarea name="first_comment" placeholder="Tell classmates why you built it"></textarea>
                </label>
                <button type="submit" class="submit__button" prop:disabled=move || create.pending().get()>
                    {move || if create.pending().get() { "Launching..." } else { "Launch" }}
                </button>
            </ActionForm>
            {move || create.value().get().and_then(|r| r.err()).map(|e| view! {
                <p class="submit__error">{error_message(&e)}</p>
            })}
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_tags() {
        assert_eq!(split_tags("#Food, delivery  late-night"), vec!["food", "delivery", "late-night"]);
        assert!(split_tags(" , ").is_empty());
    }
}
