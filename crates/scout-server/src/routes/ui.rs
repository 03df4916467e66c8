use axum::{response::Html, routing::get, Router};

const INDEX: &str = include_str!("../../static/index.html");

async fn index() -> Html<&'static str> {
    Html(INDEX)
}

pub fn routes() -> Router {
    Router::new().route("/", get(index))
}
