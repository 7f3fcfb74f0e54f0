//! Placeholder page shells. Rendering is someone else's job; these exist so
//! the edge interceptor has real page routes to guard and redirect from.

use axum::response::Html;

fn shell(title: &str) -> Html<String> {
    Html(format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title}</title></head>\
         <body><main id=\"app\" data-page=\"{title}\"></main></body></html>"
    ))
}

pub async fn login() -> Html<String> {
    shell("login")
}

pub async fn signup() -> Html<String> {
    shell("signup")
}

pub async fn forbidden() -> Html<String> {
    shell("forbidden")
}

pub async fn admin() -> Html<String> {
    shell("admin")
}

pub async fn dashboard() -> Html<String> {
    shell("dashboard")
}

pub async fn profile() -> Html<String> {
    shell("profile")
}
