use std::path::PathBuf;

use thiserror::Error;

/// Failures of the post loader.
#[derive(Error, Debug)]
pub enum PostError {
    #[error("invalid slug {0:?}: slug must be lowercase kebab-case")]
    InvalidSlug(String),

    #[error("no post named {0:?}")]
    NotFound(String),

    #[error("post {0:?} has no front matter")]
    MissingFrontMatter(String),

    #[error("failed to parse front matter of post {slug:?}: {message}")]
    FrontMatter { slug: String, message: String },

    #[error("failed to read post {slug:?}: {source}")]
    Io {
        slug: String,
        #[source]
        source: std::io::Error,
    },
}

impl PostError {
    /// Errors the router should present as a not-found page.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PostError::InvalidSlug(_) | PostError::NotFound(_))
    }
}

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("layout template is missing the {0} placeholder")]
    MissingPlaceholder(&'static str),

    #[error("UI asset bundle not found at {}", .0.display())]
    MissingAssets(PathBuf),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::PostError;

    #[test]
    fn only_lookup_failures_count_as_not_found() {
        assert!(PostError::NotFound("a".into()).is_not_found());
        assert!(PostError::InvalidSlug("../a".into()).is_not_found());
        assert!(!PostError::MissingFrontMatter("a".into()).is_not_found());
    }
}
