use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::error;

use crate::contact::contact_href;
use crate::error::{LayoutError, PostError};
use crate::hot_reload::ws_handler;
use crate::layout::{self, post_header, LayoutContext, LayoutPage};
use crate::models::PageData;
use crate::state::{AppState, RouterState};

pub fn build_router(state: RouterState) -> Result<Router, LayoutError> {
    let ctx = LayoutContext {
        static_dir: state.app_state.config.static_dir(),
        is_development: state.app_state.config.is_development,
    };

    let router = Router::new()
        .route("/", get(homepage))
        .route("/blog/{slug}", get(render_post))
        .route("/api/posts/{slug}", get(post_json))
        .route("/contact/{kind}", get(contact_redirect))
        .route("/ws", get(ws_handler));

    Ok(layout::register(router, &ctx)?.with_state(state))
}

async fn render_page(state: &AppState, title: Option<&str>, content: &str) -> String {
    let layout = state.layout.read().await;
    let posts = state.registry.read().await.posts();
    layout.render(&LayoutPage { title, content }, &posts, state.config.is_development)
}

async fn homepage(State(state): State<Arc<AppState>>) -> Html<String> {
    let home = state.home_html.read().await.clone();
    Html(render_page(&state, None, &home).await)
}

async fn render_post(Path(slug): Path<String>, State(state): State<Arc<AppState>>) -> Response {
    let result = state.registry.read().await.load(&slug).await;

    match result {
        Ok(page) => {
            let body = format!("{}{}", post_header(&page.title, &page.date), page.content);
            Html(render_page(&state, Some(&page.title), &body).await).into_response()
        }
        Err(e) if e.is_not_found() => {
            let body = state
                .not_found_html
                .read()
                .await
                .replace("{{slug}}", &htmlescape::encode_minimal(&slug));
            let page = render_page(&state, Some("Not found"), &body).await;
            (StatusCode::NOT_FOUND, Html(page)).into_response()
        }
        Err(e) => {
            error!("Failed to load post: {}", e);
            let page = render_page(&state, Some("Error"), "<h1>Something went wrong</h1>").await;
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
        }
    }
}

async fn post_json(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<PageData>, (StatusCode, Json<serde_json::Value>)> {
    let result = state.registry.read().await.load(&slug).await;

    result.map(Json).map_err(|e: PostError| {
        let status = if e.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            error!("Failed to load post: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "error": e.to_string() })))
    })
}

async fn contact_redirect(Path(kind): Path<String>) -> Redirect {
    Redirect::temporary(contact_href(&kind, "/"))
}
