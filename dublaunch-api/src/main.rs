mod auth;

use axum::routing::post;
use axum::Router;
use dublaunch_app::config::AppConfig;
use dublaunch_app::AppContext;
use dublaunch_ui::components::{
    CommentThreadFn, CurrentUserFn, ForumThreadFn, PostCommentFn, PostForumCommentFn,
    ToggleLikeFn, ToggleVoteFn,
};
use dublaunch_ui::pages::{
    CreateForumPostFn, CreateLaunchFn, DeleteLaunchFn, DiscoverFn, ForumPostFn, ForumPostsFn,
    LaunchDetailFn, LeaderboardFn, SearchFn, StudentPageFn,
};
use dublaunch_ui::App;
use leptos::prelude::*;
use leptos_axum::{generate_route_list, handle_server_fns_with_context, LeptosRoutes};
use tower_http::compression::CompressionLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let conf = get_configuration(Some("Cargo.toml")).expect("Failed to load Leptos config");
    let leptos_options = conf.leptos_options;
    let addr = leptos_options.site_addr;

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };
    let app_context = match AppContext::from_config(&config).await {
        Ok(ctx) => ctx,
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(false)
        .with_expiry(Expiry::OnInactivity(time::Duration::days(7)));

    let routes = generate_route_list(App);

    server_fn::axum::register_explicit::<ToggleVoteFn>();
    server_fn::axum::register_explicit::<CreateLaunchFn>();
    server_fn::axum::register_explicit::<LaunchDetailFn>();
    server_fn::axum::register_explicit::<LeaderboardFn>();
    server_fn::axum::register_explicit::<DiscoverFn>();
    server_fn::axum::register_explicit::<PostCommentFn>();
    server_fn::axum::register_explicit::<CommentThreadFn>();
    server_fn::axum::register_explicit::<CurrentUserFn>();
    server_fn::axum::register_explicit::<DeleteLaunchFn>();
    server_fn::axum::register_explicit::<SearchFn>();
    server_fn::axum::register_explicit::<StudentPageFn>();
    server_fn::axum::register_explicit::<ForumPostsFn>();
    server_fn::axum::register_explicit::<ForumPostFn>();
    server_fn::axum::register_explicit::<CreateForumPostFn>();
    server_fn::axum::register_explicit::<ForumThreadFn>();
    server_fn::axum::register_explicit::<PostForumCommentFn>();
    server_fn::axum::register_explicit::<ToggleLikeFn>();
    tracing::info!("Registered server functions");

    let app = Router::new()
        .route("/api/{*fn_name}", post({
            let ctx = app_context.clone();
            move |req| {
                let ctx = ctx.clone();
                async move {
                    handle_server_fns_with_context(
                        move || provide_context(ctx.clone()),
                        req
                    ).await
                }
            }
        }))
        .nest("/auth", auth::routes(app_context.clone()))
        .leptos_routes_with_context(
            &leptos_options,
            routes,
            {
                let ctx = app_context.clone();
                move || provide_context(ctx.clone())
            },
            {
                let leptos_options = leptos_options.clone();
                move || shell(leptos_options.clone())
            },
        )
        .fallback(leptos_axum::file_and_error_handler(shell))
        .layer(session_layer)
        .layer(CompressionLayer::new())
        .with_state(leptos_options);

    tracing::info!("Listening on http://{}", addr);
    tracing::info!(
        "Leaderboard revalidates every {}s, sign-in {}",
        config.leaderboard_ttl.as_secs(),
        if app_context.oauth.is_some() { "enabled" } else { "disabled" }
    );

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");

    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}

fn shell(options: LeptosOptions) -> impl IntoView {
    use leptos_meta::*;

    view! {
        <!DOCTYPE html>
        <html lang="en">
            <head>
                <meta charset="utf-8"/>
                <meta name="viewport" content="width=device-width, initial-scale=1"/>
                <link rel="icon" href="data:image/svg+xml,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 100 100'><text y='.9em' font-size='90'>🚀</text></svg>"/>
                <AutoReload options=options.clone()/>
                <HydrationScripts options/>
                <MetaTags/>
            </head>
            <body>
                <App/>
            </body>
        </html>
    }
}
