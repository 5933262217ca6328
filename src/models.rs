use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone)]
pub struct FrontMatter {
    pub title: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
    pub slug: String,
    pub title: String,
    pub date: String,
}

/// What a post page is built from.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct PageData {
    pub content: String,
    pub title: String,
    pub date: String,
}

#[derive(Debug, Clone)]
pub struct PostEntry {
    pub source: PathBuf,
    pub summary: PostSummary,
}
