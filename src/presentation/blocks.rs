//! Block dispatch and per-variant view models.
//!
//! [`block_view`] is the routing step between fetched content and templates:
//! a pure, total function from one block and its position to at most one view.
//! Dispatch is an exact match on the closed variant set; blocks outside it
//! produce nothing and leave their siblings untouched.

use metrics::counter;
use tracing::{debug, warn};
use url::Url;

use crate::domain::blocks::{
    Block, Card, CardCarouselBlock, HeadingBlock, HeroBlock, ImageRef, Link, SectionBlock,
};
use crate::domain::images::ImagePolicy;

/// One renderable page element: the view plus its position-derived identity.
/// Identity follows the block's position in the source list, not its content,
/// so repeated content stays distinguishable and reorderings re-key.
pub struct RenderedBlock {
    pub index: usize,
    pub view: BlockView,
}

pub enum BlockView {
    Hero(HeroView),
    Heading(HeadingView),
    Section(SectionView),
    CardCarousel(CardCarouselView),
}

pub struct LinkView {
    pub label: String,
    pub href: String,
    pub target: Option<&'static str>,
    pub rel: Option<&'static str>,
}

pub struct ImageView {
    pub url: String,
    pub alt: String,
}

pub struct HeroView {
    pub heading: String,
    pub sub_heading: Option<String>,
    pub text: Option<String>,
    pub image: Option<ImageView>,
    pub links: Vec<LinkView>,
}

pub struct HeadingView {
    pub anchor: String,
    pub heading: String,
    pub sub_heading: Option<String>,
    pub text: Option<String>,
    pub links: Vec<LinkView>,
}

pub struct SectionView {
    pub anchor: String,
    pub heading: String,
    pub sub_heading: String,
    pub links: Vec<LinkView>,
}

pub struct CardView {
    pub heading: Option<String>,
    pub text: Option<String>,
    pub image: Option<ImageView>,
}

pub struct CardCarouselView {
    pub cards: Vec<CardView>,
}

/// Map an ordered block list to its renderable views, preserving order.
/// Sequential iteration with no skipping and no reordering; unrenderable
/// elements simply produce no entry.
pub fn page_blocks(blocks: &[Block], base: &Url, images: &ImagePolicy) -> Vec<RenderedBlock> {
    blocks
        .iter()
        .enumerate()
        .filter_map(|(index, block)| {
            block_view(block, index, base, images).map(|view| RenderedBlock { index, view })
        })
        .collect()
}

/// Route one block to its view by exact tag dispatch. Returns `None` for
/// blocks outside the known set; never fails.
pub fn block_view(
    block: &Block,
    index: usize,
    base: &Url,
    images: &ImagePolicy,
) -> Option<BlockView> {
    match block {
        Block::Hero(hero) => Some(BlockView::Hero(hero_view(hero, base, images))),
        Block::Heading(heading) => Some(BlockView::Heading(heading_view(heading))),
        Block::Section(section) => Some(BlockView::Section(section_view(section))),
        Block::CardCarousel(carousel) => {
            Some(BlockView::CardCarousel(carousel_view(carousel, base, images)))
        }
        Block::Unknown => {
            counter!("vetrina_blocks_unknown_total").increment(1);
            debug!(
                target: "vetrina::blocks",
                index,
                "skipping block with unrecognized component tag"
            );
            None
        }
    }
}

fn hero_view(hero: &HeroBlock, base: &Url, images: &ImagePolicy) -> HeroView {
    HeroView {
        heading: hero.heading.clone(),
        sub_heading: hero.sub_heading.clone(),
        text: hero.text.clone(),
        image: hero
            .image
            .as_ref()
            .and_then(|image| image_view(image, base, images)),
        links: link_views(&hero.links),
    }
}

fn heading_view(heading: &HeadingBlock) -> HeadingView {
    HeadingView {
        anchor: slug::slugify(&heading.heading),
        heading: heading.heading.clone(),
        sub_heading: heading.sub_heading.clone(),
        text: heading.text.clone(),
        links: link_views(&heading.links),
    }
}

fn section_view(section: &SectionBlock) -> SectionView {
    SectionView {
        anchor: slug::slugify(&section.heading),
        heading: section.heading.clone(),
        sub_heading: section.sub_heading.clone(),
        links: link_views(&section.links),
    }
}

fn carousel_view(carousel: &CardCarouselBlock, base: &Url, images: &ImagePolicy) -> CardCarouselView {
    CardCarouselView {
        cards: carousel
            .cards
            .iter()
            .map(|card| card_view(card, base, images))
            .collect(),
    }
}

fn card_view(card: &Card, base: &Url, images: &ImagePolicy) -> CardView {
    CardView {
        heading: card.heading.clone(),
        text: card.text.clone(),
        image: card
            .image
            .as_ref()
            .and_then(|image| image_view(image, base, images)),
    }
}

fn link_views(links: &[Link]) -> Vec<LinkView> {
    links.iter().map(link_view).collect()
}

/// External links open in a new browsing context with opener/referrer
/// isolation; internal links navigate in place.
fn link_view(link: &Link) -> LinkView {
    let (target, rel) = if link.is_external {
        (Some("_blank"), Some("noopener noreferrer"))
    } else {
        (None, None)
    };

    LinkView {
        label: link.label.clone(),
        href: link.href.clone(),
        target,
        rel,
    }
}

/// Resolve an image reference against the backend base address and check the
/// allow-list. Backend-relative upload paths resolve onto the backend host;
/// anything the policy rejects is omitted from the page.
fn image_view(image: &ImageRef, base: &Url, images: &ImagePolicy) -> Option<ImageView> {
    match base.join(&image.url) {
        Ok(resolved) if images.permits(&resolved) => Some(ImageView {
            url: resolved.to_string(),
            alt: image.alternative_text.clone().unwrap_or_default(),
        }),
        Ok(resolved) => {
            warn!(
                target: "vetrina::blocks",
                host = resolved.host_str().unwrap_or(""),
                "image host is not in the allow-list, omitting image"
            );
            None
        }
        Err(err) => {
            warn!(
                target: "vetrina::blocks",
                url = %image.url,
                error = %err,
                "image url could not be resolved, omitting image"
            );
            None
        }
    }
}
