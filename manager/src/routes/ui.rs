use axum::response::Html;

/// Single-page console served at `/`
const CONSOLE_PAGE: &str = include_str!("../../assets/index.html");

#[allow(clippy::unused_async)]
pub async fn index() -> Html<&'static str> {
    Html(CONSOLE_PAGE)
}
