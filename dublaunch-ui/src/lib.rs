pub mod components;
pub mod pages;

#[cfg(feature = "ssr")]
pub mod session;

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::{Route, Router, Routes, A};
use leptos_router::path;

use components::AuthSection;
use pages::{
    ForumPostPage, ForumsPage, HomePage, LaunchPage, ProfilePage, SearchPage, SubmitPage,
};

#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    view! {
        <Title text="DubLaunch | Student launches, ranked by students"/>
        <Meta name="description" content="Launch what you built at school and get upvotes from classmates"/>
        <Stylesheet id="leptos" href="/pkg/dublaunch.css"/>

        <Router>
            <header class="topbar">
                <A href="/" attr:class="topbar__brand">"DubLaunch"</A>
                <form class="topbar__search" method="get" action="/search">
                    <input type="search" name="q" placeholder="Search DubLaunch" aria-label="Search"/>
                </form>
                <nav class="topbar__nav">
                    <A href="/forums" attr:class="topbar__link">"Forums"</A>
                    <A href="/submit" attr:class="topbar__submit">"Submit a launch"</A>
                    <AuthSection/>
                </nav>
            </header>
            <main class="container">
                <Routes fallback=|| view! { <p class="not-found">"Page not found"</p> }>
                    <Route path=path!("/") view=HomePage/>
                    <Route path=path!("/launch/:slug") view=LaunchPage/>
                    <Route path=path!("/submit") view=SubmitPage/>
                    <Route path=path!("/search") view=SearchPage/>
                    <Route path=path!("/profile/:username") view=ProfilePage/>
                    <Route path=path!("/forums") view=ForumsPage/>
                    <Route path=path!("/forums/post/:id") view=ForumPostPage/>
                </Routes>
            </main>
        </Router>
    }
}

#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    leptos::mount::hydrate_body(App);
}
