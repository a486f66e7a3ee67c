//! Remote image allow-list.
//!
//! Only images whose resolved URL matches a configured pattern may be
//! rendered. Patterns are parsed and validated when configuration loads;
//! render-time evaluation is a plain lookup that cannot fail.

use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImagePatternError {
    #[error("image pattern is empty")]
    Empty,
    #[error("image pattern `{pattern}` is not a valid URL: {reason}")]
    Invalid { pattern: String, reason: String },
    #[error("image pattern `{pattern}` must use http or https")]
    UnsupportedScheme { pattern: String },
    #[error("image pattern `{pattern}` is missing a host")]
    MissingHost { pattern: String },
}

/// One allow-list entry: scheme + host + port, with an optional path prefix.
///
/// A bare host such as `images.example.com` is shorthand for the whole host
/// over https. A path, when present, constrains matches to that prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePattern {
    scheme: String,
    host: String,
    port: u16,
    path_prefix: String,
}

impl ImagePattern {
    pub fn parse(pattern: &str) -> Result<Self, ImagePatternError> {
        let trimmed = pattern.trim();
        if trimmed.is_empty() {
            return Err(ImagePatternError::Empty);
        }

        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&candidate).map_err(|err| ImagePatternError::Invalid {
            pattern: trimmed.to_string(),
            reason: err.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(ImagePatternError::UnsupportedScheme {
                pattern: trimmed.to_string(),
            });
        }

        let host = url
            .host_str()
            .ok_or_else(|| ImagePatternError::MissingHost {
                pattern: trimmed.to_string(),
            })?
            .to_ascii_lowercase();

        let port = url
            .port_or_known_default()
            .ok_or_else(|| ImagePatternError::MissingHost {
                pattern: trimmed.to_string(),
            })?;

        Ok(Self {
            scheme: url.scheme().to_string(),
            host,
            port,
            path_prefix: url.path().trim_end_matches('/').to_string(),
        })
    }

    fn matches(&self, url: &Url) -> bool {
        if url.scheme() != self.scheme {
            return false;
        }
        let host_matches = url
            .host_str()
            .is_some_and(|host| host.eq_ignore_ascii_case(&self.host));
        if !host_matches {
            return false;
        }
        if url.port_or_known_default() != Some(self.port) {
            return false;
        }
        self.path_prefix.is_empty() || url.path().starts_with(&self.path_prefix)
    }
}

/// Validated allow-list consulted when mapping image references to views.
/// An empty policy permits nothing.
#[derive(Debug, Clone, Default)]
pub struct ImagePolicy {
    patterns: Vec<ImagePattern>,
}

impl ImagePolicy {
    pub fn new(patterns: Vec<ImagePattern>) -> Self {
        Self { patterns }
    }

    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, ImagePatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed = patterns
            .into_iter()
            .map(|pattern| ImagePattern::parse(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(parsed))
    }

    pub fn permits(&self, url: &Url) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(url))
    }
}
