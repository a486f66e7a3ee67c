//! Population query for the home-page document.
//!
//! The content backend returns only scalar attributes unless a request spells
//! out which nested relations to populate, using bracket-syntax query keys
//! (`populate[blocks][on][blocks.hero][populate][links]=true`). The shape is
//! static per page type, so the serialized string is built once and reused for
//! every request.

use once_cell::sync::Lazy;
use url::form_urlencoded;

/// Request path for the home-page document, relative to the backend root.
pub const HOME_PAGE_PATH: &str = "api/home-page";

/// Field selection for one node of the populate tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Populate every field and relation (`populate=*`).
    All,
    /// Populate the relation with its default fields (`=true`).
    Enable,
    /// Restrict the node to the named scalar fields.
    Fields(Vec<&'static str>),
    /// Populate the named child relations, each with its own selection.
    Nested(Vec<(&'static str, Selection)>),
}

/// Per-variant population of the home page's dynamic block zone.
///
/// Every member of the closed block set appears here; a variant omitted from
/// the descriptor would come back with unpopulated relations and render with
/// its optional regions missing.
fn home_page_descriptor() -> Vec<(&'static str, Selection)> {
    vec![
        (
            "blocks.hero",
            Selection::Nested(vec![
                ("image", Selection::Fields(vec!["url", "alternativeText"])),
                ("links", Selection::Enable),
            ]),
        ),
        (
            "blocks.card-carousel",
            Selection::Nested(vec![("cards", Selection::Enable)]),
        ),
        ("blocks.heading", Selection::All),
        (
            "blocks.section",
            Selection::Nested(vec![("links", Selection::Enable)]),
        ),
    ]
}

static HOME_PAGE_QUERY: Lazy<String> = Lazy::new(|| serialize(&home_page_descriptor()));

/// The serialized home-page query string, built once per process.
pub fn home_page_query() -> &'static str {
    &HOME_PAGE_QUERY
}

fn serialize(descriptor: &[(&'static str, Selection)]) -> String {
    let mut pairs = Vec::new();
    for (variant, selection) in descriptor {
        let key = format!("populate[blocks][on][{variant}][populate]");
        push_selection(&mut pairs, key, selection);
    }

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

fn push_selection(pairs: &mut Vec<(String, String)>, key: String, selection: &Selection) {
    match selection {
        Selection::All => pairs.push((key, "*".to_string())),
        Selection::Enable => pairs.push((key, "true".to_string())),
        Selection::Fields(fields) => {
            for (index, field) in fields.iter().enumerate() {
                pairs.push((format!("{key}[fields][{index}]"), (*field).to_string()));
            }
        }
        Selection::Nested(children) => {
            for (name, child) in children {
                let child_key = match child {
                    Selection::Nested(_) => format!("{key}[{name}][populate]"),
                    _ => format!("{key}[{name}]"),
                };
                push_selection(pairs, child_key, child);
            }
        }
    }
}
