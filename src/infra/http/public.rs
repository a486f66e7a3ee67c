use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use url::Url;

use crate::{
    application::{
        error::HttpError,
        home::{HomePageError, HomePageService},
        source::SourceError,
    },
    domain::images::ImagePolicy,
    presentation::{
        blocks::page_blocks,
        views::{
            HomeContext, HomeTemplate, LayoutChrome, LayoutContext, render_not_found_response,
            render_template_response,
        },
    },
};

use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub home: Arc<HomePageService>,
    pub chrome: LayoutChrome,
    pub images: ImagePolicy,
    pub content_base: Url,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/_health", get(health))
        .route("/static/{*path}", get(crate::infra::assets::serve_static))
        .fallback(fallback)
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn home(State(state): State<HttpState>) -> Response {
    match state.home.load().await {
        Ok(blocks) => {
            let content = HomeContext {
                blocks: page_blocks(&blocks, &state.content_base, &state.images),
            };
            let view = LayoutContext::new(state.chrome.clone(), content);
            render_template_response(HomeTemplate { view }, StatusCode::OK)
        }
        Err(HomePageError::NotFound) => render_not_found_response(state.chrome.clone()),
        Err(HomePageError::Source(err)) => source_error_response(err),
    }
}

fn source_error_response(err: SourceError) -> Response {
    HttpError::from_error(
        "infra::http::public::home",
        StatusCode::BAD_GATEWAY,
        "Content backend unavailable",
        &err,
    )
    .into_response()
}

async fn health() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn fallback(State(state): State<HttpState>) -> Response {
    render_not_found_response(state.chrome.clone())
}
