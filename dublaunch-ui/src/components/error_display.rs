use dublaunch_errors::AppError;
use leptos::prelude::*;
use server_fn::ServerFnError;
use std::str::FromStr;

/// Turns a server function failure back into the friendly message for its variant.
pub fn error_message(err: &ServerFnError) -> String {
    match AppError::from_str(&err.to_string()) {
        Ok(app_error) => app_error.user_message(),
        Err(never) => match never {},
    }
}

#[component]
pub fn ErrorDisplay(
    #[prop(into)] message: String,
    #[prop(optional)] on_retry: Option<Callback<()>>,
) -> impl IntoView {
    view! {
        <div class="error" role="alert">
            <p class="error__title">"Something went wrong"</p>
            <p class="error__message">{message}</p>
            {move || on_retry.map(|retry| view! {
                <button
                    class="error__retry"
                    on:click=move |_| retry.run(())
                >
                    "Try again"
                </button>
            })}
        </div>
    }
}
