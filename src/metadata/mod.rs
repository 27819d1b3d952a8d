//! Catalog metadata inferred from a storage key.
//!
//! Parsing is layered per field: the configured [`FilenameClassifier`] runs
//! first and whatever it leaves empty is filled by the folder/filename
//! heuristic in [`heuristic::BasicClassifier`]. Parsing never fails; keys
//! that follow no known convention come back with empty fields and
//! `uncategorized`.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};

use crate::normalization::category::Category;

pub mod heuristic;
pub mod rich;

pub use heuristic::BasicClassifier;
pub use rich::RichClassifier;

/// Storage key split into the pieces the classifiers look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyParts<'a> {
    /// First path segment, empty when the key has no folder.
    pub folder: &'a str,
    pub file_name: &'a str,
    /// File name without its final extension.
    pub stem: &'a str,
}

impl<'a> KeyParts<'a> {
    pub fn from_key(key: &'a str) -> Self {
        let mut segments = key.split('/');
        let first = segments.next().unwrap_or("");
        let file_name = key.rsplit('/').next().unwrap_or("");
        let folder = if key.contains('/') { first } else { "" };
        let stem = match file_name.rsplit_once('.') {
            Some((stem, _ext)) if !stem.is_empty() => stem,
            _ => file_name,
        };
        Self {
            folder,
            file_name,
            stem,
        }
    }
}

/// What a classifier could tell about a key. `None` means "no opinion".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub category: Option<Category>,
    pub subcategory: Option<String>,
    pub event: Option<String>,
    pub round_num: Option<String>,
    pub team: Option<String>,
    pub jump_num: Option<String>,
}

/// Category/event/team detection from a bare folder + filename.
pub trait FilenameClassifier: Send + Sync {
    fn name(&self) -> &'static str;
    fn classify(&self, parts: &KeyParts<'_>) -> Classification;
}

/// Which classifier runs ahead of the heuristic fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClassifierKind {
    #[default]
    Rich,
    Basic,
}

impl FromStr for ClassifierKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rich" => Ok(ClassifierKind::Rich),
            "basic" | "heuristic" => Ok(ClassifierKind::Basic),
            other => Err(anyhow!("unknown classifier '{other}' (expected rich|basic)")),
        }
    }
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::Rich => f.write_str("rich"),
            ClassifierKind::Basic => f.write_str("basic"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoMetadata {
    pub category: Category,
    pub subcategory: String,
    pub event: String,
    pub title: String,
    pub round_num: String,
    pub team: String,
    pub jump_num: String,
}

pub struct MetadataParser {
    delegate: Option<Box<dyn FilenameClassifier>>,
    fallback: BasicClassifier,
}

impl MetadataParser {
    pub fn new(kind: ClassifierKind) -> Result<Self> {
        match kind {
            ClassifierKind::Rich => Ok(Self::with_delegate(Box::new(RichClassifier::new()?))),
            ClassifierKind::Basic => Ok(Self::basic()),
        }
    }

    /// Heuristic only.
    pub fn basic() -> Self {
        Self {
            delegate: None,
            fallback: BasicClassifier,
        }
    }

    pub fn with_delegate(delegate: Box<dyn FilenameClassifier>) -> Self {
        Self {
            delegate: Some(delegate),
            fallback: BasicClassifier,
        }
    }

    pub fn delegate_name(&self) -> &'static str {
        self.delegate
            .as_ref()
            .map(|d| d.name())
            .unwrap_or_else(|| self.fallback.name())
    }

    pub fn parse(&self, key: &str) -> VideoMetadata {
        let parts = KeyParts::from_key(key);
        let preferred = self
            .delegate
            .as_ref()
            .map(|d| d.classify(&parts))
            .unwrap_or_default();
        let fallback = self.fallback.classify(&parts);

        let category = preferred
            .category
            .filter(Category::is_known)
            .or(fallback.category)
            .unwrap_or_default();
        let event = pick(preferred.event, fallback.event);
        let title = build_title(parts.stem, &event);

        VideoMetadata {
            category,
            subcategory: pick(preferred.subcategory, fallback.subcategory),
            event,
            title,
            round_num: pick(preferred.round_num, fallback.round_num),
            team: pick(preferred.team, fallback.team),
            jump_num: pick(preferred.jump_num, fallback.jump_num),
        }
    }
}

fn pick(preferred: Option<String>, fallback: Option<String>) -> String {
    preferred
        .filter(|v| !v.trim().is_empty())
        .or(fallback)
        .unwrap_or_default()
}

/// Human title: stem with underscores as spaces, prefixed by the event unless
/// the stem already mentions it.
fn build_title(stem: &str, event: &str) -> String {
    let title = stem.replace('_', " ").trim().to_string();
    if event.is_empty() || title.contains(event) {
        return title;
    }
    if title.is_empty() {
        return event.to_string();
    }
    format!("{event} - {title}")
}
