//! Home-page loader.

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::source::{ContentSource, SourceError};
use crate::domain::blocks::Block;

#[derive(Debug, Error)]
pub enum HomePageError {
    /// The backend answered but carried no document for the page. This is the
    /// only place in the crate that classifies a missing document; callers
    /// translate it into a 404-class response.
    #[error("home page document is not available")]
    NotFound,
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Orchestrates the content fetch for the home page and extracts its ordered
/// block list.
#[derive(Clone)]
pub struct HomePageService {
    source: Arc<dyn ContentSource>,
}

impl HomePageService {
    pub fn new(source: Arc<dyn ContentSource>) -> Self {
        Self { source }
    }

    /// Load the home page's blocks in source order. An envelope with no data
    /// payload becomes [`HomePageError::NotFound`]; an existing document with
    /// no block list yields an empty sequence.
    pub async fn load(&self) -> Result<Vec<Block>, HomePageError> {
        let envelope = self.source.home_page().await?;

        let Some(document) = envelope.data else {
            return Err(HomePageError::NotFound);
        };

        debug!(
            target: "vetrina::home",
            blocks = document.blocks.len(),
            "loaded home page document"
        );

        Ok(document.blocks)
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::application::source::{Envelope, HomePageDocument};
    use crate::domain::blocks::HeadingBlock;

    struct FixedSource {
        data: Option<HomePageDocument>,
    }

    #[async_trait]
    impl ContentSource for FixedSource {
        async fn home_page(&self) -> Result<Envelope<HomePageDocument>, SourceError> {
            Ok(Envelope {
                data: self.data.clone(),
            })
        }
    }

    struct FailingSource;

    #[async_trait]
    impl ContentSource for FailingSource {
        async fn home_page(&self) -> Result<Envelope<HomePageDocument>, SourceError> {
            Err(SourceError::Transport("connection refused".to_string()))
        }
    }

    fn heading(text: &str) -> Block {
        Block::Heading(HeadingBlock {
            heading: text.to_string(),
            sub_heading: None,
            text: None,
            links: Vec::new(),
        })
    }

    #[tokio::test]
    async fn missing_data_payload_is_not_found() {
        let service = HomePageService::new(Arc::new(FixedSource { data: None }));
        let result = service.load().await;
        assert!(matches!(result, Err(HomePageError::NotFound)));
    }

    #[tokio::test]
    async fn blocks_are_returned_in_source_order() {
        let document = HomePageDocument {
            blocks: vec![heading("One"), Block::Unknown, heading("Two")],
        };
        let service = HomePageService::new(Arc::new(FixedSource {
            data: Some(document.clone()),
        }));

        let blocks = service.load().await.expect("load succeeds");
        assert_eq!(blocks, document.blocks);
    }

    #[tokio::test]
    async fn source_failures_propagate_unmodified() {
        let service = HomePageService::new(Arc::new(FailingSource));
        let result = service.load().await;
        assert!(matches!(
            result,
            Err(HomePageError::Source(SourceError::Transport(_)))
        ));
    }
}
