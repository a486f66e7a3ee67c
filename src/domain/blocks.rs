//! Page content blocks as delivered by the content backend.
//!
//! A page document carries an ordered list of loosely-typed block records,
//! each tagged with a `__component` discriminant. The wire tags form a closed
//! set; anything outside it deserializes to [`Block::Unknown`], which carries
//! no payload and is skipped at render time so one unrecognized record never
//! fails the surrounding page.

use serde::Deserialize;

/// One content unit within a page's ordered block list.
///
/// The discriminant is matched exactly against the wire tag. There is no
/// prefix or fuzzy matching; a tag outside the closed set lands in `Unknown`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "__component")]
pub enum Block {
    #[serde(rename = "blocks.hero")]
    Hero(HeroBlock),
    #[serde(rename = "blocks.heading")]
    Heading(HeadingBlock),
    #[serde(rename = "blocks.section")]
    Section(SectionBlock),
    #[serde(rename = "blocks.card-carousel")]
    CardCarousel(CardCarouselBlock),
    /// Any tag outside the known set. No payload shape is assumed.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroBlock {
    pub heading: String,
    pub sub_heading: Option<String>,
    pub text: Option<String>,
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingBlock {
    pub heading: String,
    pub sub_heading: Option<String>,
    pub text: Option<String>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionBlock {
    pub heading: String,
    pub sub_heading: String,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CardCarouselBlock {
    #[serde(default)]
    pub cards: Vec<Card>,
}

/// Carousel card. Opaque to dispatch; passed through to the renderer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Card {
    pub heading: Option<String>,
    pub text: Option<String>,
    pub image: Option<ImageRef>,
}

/// Navigation link inside a block. `is_external` governs the browsing
/// context the link opens in; it is the only field with runtime behavior.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub label: String,
    pub href: String,
    #[serde(default)]
    pub is_external: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub url: String,
    pub alternative_text: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_known_variants_from_wire_names() {
        let raw = r#"[
            {"__component": "blocks.heading", "heading": "Welcome"},
            {"__component": "blocks.section", "heading": "About", "subHeading": "Info",
             "links": [{"label": "Go", "href": "/go", "isExternal": false}]}
        ]"#;

        let blocks: Vec<Block> = serde_json::from_str(raw).expect("valid block list");
        assert_eq!(blocks.len(), 2);
        match &blocks[0] {
            Block::Heading(heading) => {
                assert_eq!(heading.heading, "Welcome");
                assert_eq!(heading.sub_heading, None);
                assert!(heading.links.is_empty());
            }
            other => panic!("expected heading block, got {other:?}"),
        }
        match &blocks[1] {
            Block::Section(section) => {
                assert_eq!(section.sub_heading, "Info");
                assert_eq!(section.links.len(), 1);
                assert!(!section.links[0].is_external);
            }
            other => panic!("expected section block, got {other:?}"),
        }
    }

    #[test]
    fn unrecognized_tag_becomes_unknown_without_payload_assumptions() {
        let raw = r#"{"__component": "blocks.unknown-x", "anything": {"nested": true}}"#;
        let block: Block = serde_json::from_str(raw).expect("tolerated");
        assert_eq!(block, Block::Unknown);
    }

    #[test]
    fn hero_camel_case_fields_map_to_model() {
        let raw = r#"{
            "__component": "blocks.hero",
            "heading": "Ship faster",
            "subHeading": "Vetrina",
            "image": {"url": "http://127.0.0.1:1337/uploads/hero.png", "alternativeText": "Hero"},
            "links": [{"label": "Docs", "href": "https://docs.example.com", "isExternal": true}]
        }"#;

        let block: Block = serde_json::from_str(raw).expect("valid hero");
        let Block::Hero(hero) = block else {
            panic!("expected hero block");
        };
        assert_eq!(hero.sub_heading.as_deref(), Some("Vetrina"));
        assert_eq!(hero.text, None);
        let image = hero.image.expect("image present");
        assert_eq!(image.alternative_text.as_deref(), Some("Hero"));
        assert!(hero.links[0].is_external);
    }

    #[test]
    fn link_external_flag_defaults_to_false() {
        let raw = r#"{"label": "Go", "href": "/go"}"#;
        let link: Link = serde_json::from_str(raw).expect("valid link");
        assert!(!link.is_external);
    }
}
