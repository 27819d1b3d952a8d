//! Folder/filename heuristic used when no richer classification is available.

use super::{Classification, FilenameClassifier, KeyParts};
use crate::normalization::category::Category;

/// Ordered folder-substring → category table; first hit wins.
pub const CATEGORY_PATTERNS: &[(&str, Category)] = &[
    ("4way", Category::FormationSkydiving),
    ("4-way", Category::FormationSkydiving),
    ("8way", Category::FormationSkydiving),
    ("8-way", Category::FormationSkydiving),
    ("vfs", Category::FormationSkydiving),
    ("fs", Category::FormationSkydiving),
    ("cf", Category::CanopyFormation),
    ("ae", Category::ArtisticEvents),
    ("freestyle", Category::ArtisticEvents),
    ("freefly", Category::ArtisticEvents),
    ("nationals", Category::FormationSkydiving),
];

/// Ordered substring → subcategory table, tested against folder then stem.
pub const SUBCATEGORY_PATTERNS: &[(&str, &str)] = &[
    ("4way", "fs_4way_fs"),
    ("4-way", "fs_4way_fs"),
    ("8way", "fs_8way"),
    ("8-way", "fs_8way"),
    ("vfs", "fs_4way_vfs"),
    ("2way_vfs", "fs_4way_vfs"),
    ("cf2", "cf_2way_open"),
    ("cf4", "cf_4way_seq"),
];

/// Folders that hold unsorted uploads rather than naming an event.
pub const NON_EVENT_FOLDERS: &[&str] = &["uncategorized"];

/// Filenames follow `round_day_team_jump` when they carry competition data.
const MIN_POSITIONAL_SEGMENTS: usize = 4;

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicClassifier;

impl BasicClassifier {
    pub fn category(folder: &str) -> Option<Category> {
        let folder = folder.to_lowercase();
        CATEGORY_PATTERNS
            .iter()
            .find(|(pattern, _)| folder.contains(*pattern))
            .map(|(_, cat)| *cat)
    }

    pub fn subcategory(folder: &str, stem: &str) -> Option<String> {
        let folder = folder.to_lowercase();
        let stem = stem.to_lowercase();
        SUBCATEGORY_PATTERNS
            .iter()
            .find(|(pattern, _)| folder.contains(*pattern) || stem.contains(*pattern))
            .map(|(_, sub)| (*sub).to_string())
    }

    pub fn event(folder: &str) -> Option<String> {
        let is_sentinel = NON_EVENT_FOLDERS
            .iter()
            .any(|s| folder.eq_ignore_ascii_case(s));
        if is_sentinel {
            return None;
        }
        let event = folder.replace('_', " ").trim().to_string();
        (!event.is_empty()).then_some(event)
    }
}

impl FilenameClassifier for BasicClassifier {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn classify(&self, parts: &KeyParts<'_>) -> Classification {
        let mut out = Classification {
            category: Self::category(parts.folder),
            subcategory: Self::subcategory(parts.folder, parts.stem),
            event: Self::event(parts.folder),
            ..Default::default()
        };

        // Three segments are ambiguous; only the four-part form is trusted.
        let segments: Vec<&str> = parts.stem.split('_').collect();
        if segments.len() >= MIN_POSITIONAL_SEGMENTS {
            let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());
            out.round_num = non_empty(segments[0]);
            out.jump_num = non_empty(segments[1]);
            out.team = non_empty(segments[2]);
        }
        out
    }
}
