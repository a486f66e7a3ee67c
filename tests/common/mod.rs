use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http_body_util::BodyExt;
use url::Url;

use vetrina::application::home::HomePageService;
use vetrina::application::source::{ContentSource, Envelope, HomePageDocument, SourceError};
use vetrina::config::SiteSettings;
use vetrina::domain::blocks::{Block, HeadingBlock, HeroBlock, ImageRef, Link, SectionBlock};
use vetrina::domain::images::ImagePolicy;
use vetrina::infra::http::{HttpState, build_router};
use vetrina::presentation::views::LayoutChrome;

/// Canned backend behavior for one request.
pub enum StubResponse {
    Document(Vec<Block>),
    Missing,
    Fail,
}

pub struct StubContentSource {
    response: StubResponse,
}

#[async_trait]
impl ContentSource for StubContentSource {
    async fn home_page(&self) -> Result<Envelope<HomePageDocument>, SourceError> {
        match &self.response {
            StubResponse::Document(blocks) => Ok(Envelope {
                data: Some(HomePageDocument {
                    blocks: blocks.clone(),
                }),
            }),
            StubResponse::Missing => Ok(Envelope { data: None }),
            StubResponse::Fail => Err(SourceError::Transport("connection refused".to_string())),
        }
    }
}

pub fn router_with(response: StubResponse) -> Router {
    let site = SiteSettings {
        title: "Vetrina".to_string(),
        description: "Marketing pages assembled from content blocks.".to_string(),
        footer_copy: "Built with Vetrina.".to_string(),
    };

    let state = HttpState {
        home: Arc::new(HomePageService::new(Arc::new(StubContentSource {
            response,
        }))),
        chrome: LayoutChrome::from_site(&site),
        images: ImagePolicy::from_patterns(["http://127.0.0.1:1337/uploads", "images.pexels.com"])
            .expect("valid policy"),
        content_base: Url::parse("http://127.0.0.1:1337/").expect("valid base url"),
    };

    build_router(state)
}

pub async fn body_text(body: Body) -> String {
    let bytes = body.collect().await.expect("collect body").to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

pub fn heading(text: &str) -> Block {
    Block::Heading(HeadingBlock {
        heading: text.to_string(),
        sub_heading: None,
        text: None,
        links: Vec::new(),
    })
}

pub fn section(heading: &str, sub_heading: &str, links: Vec<Link>) -> Block {
    Block::Section(SectionBlock {
        heading: heading.to_string(),
        sub_heading: sub_heading.to_string(),
        links,
    })
}

pub fn hero_with_image(url: &str) -> Block {
    Block::Hero(HeroBlock {
        heading: "Ship faster".to_string(),
        sub_heading: None,
        text: None,
        image: Some(ImageRef {
            url: url.to_string(),
            alternative_text: Some("Product screenshot".to_string()),
        }),
        links: Vec::new(),
    })
}

pub fn link(label: &str, href: &str, is_external: bool) -> Link {
    Link {
        label: label.to_string(),
        href: href.to_string(),
        is_external,
    }
}
