//! Seam between the page loader and the content backend.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::blocks::Block;

/// Failure while reading from the content backend: transport problems or an
/// undecodable response. Neither is recovered here; callers decide
/// page-level handling.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid content url: {0}")]
    Url(String),
    #[error("content request failed: {0}")]
    Transport(String),
    #[error("content backend returned status {status}")]
    Status { status: u16 },
    #[error("failed to decode content response: {0}")]
    Decode(String),
}

/// Response envelope returned by the content backend. `data` is `null` when
/// the requested document does not exist.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

/// The home-page document payload: an ordered, heterogeneous block list.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct HomePageDocument {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Read access to the content backend. One implementation speaks HTTP; tests
/// substitute in-memory stubs.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Fetch the home-page document envelope. Exactly one backend read per
    /// call; no retries, no caching.
    async fn home_page(&self) -> Result<Envelope<HomePageDocument>, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_with_null_data_decodes_to_none() {
        let envelope: Envelope<HomePageDocument> =
            serde_json::from_str(r#"{"data": null}"#).expect("valid envelope");
        assert_eq!(envelope.data, None);
    }

    #[test]
    fn document_without_blocks_defaults_to_empty_list() {
        let envelope: Envelope<HomePageDocument> =
            serde_json::from_str(r#"{"data": {"id": 1}}"#).expect("valid envelope");
        let document = envelope.data.expect("document present");
        assert!(document.blocks.is_empty());
    }

    #[test]
    fn document_blocks_preserve_wire_order() {
        let raw = r#"{"data": {"blocks": [
            {"__component": "blocks.heading", "heading": "One"},
            {"__component": "blocks.mystery"},
            {"__component": "blocks.heading", "heading": "Two"}
        ]}}"#;

        let envelope: Envelope<HomePageDocument> =
            serde_json::from_str(raw).expect("valid envelope");
        let blocks = envelope.data.expect("document present").blocks;
        assert_eq!(blocks.len(), 3);
        assert!(matches!(&blocks[0], Block::Heading(h) if h.heading == "One"));
        assert_eq!(blocks[1], Block::Unknown);
        assert!(matches!(&blocks[2], Block::Heading(h) if h.heading == "Two"));
    }
}
