//! Vetrina assembles marketing pages from structured content blocks served by
//! a headless CMS backend. The crate fetches a page's ordered block list,
//! decodes it into a closed tagged union, and renders each known block variant
//! into HTML while tolerating unknown block types.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
