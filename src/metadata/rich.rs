//! Token-level filename classifier.
//!
//! Unlike the substring heuristic, this one only trusts whole tokens of the
//! file name (`vfs`, `cf4`, `R3`, `T1601`, `J6`), so short codes like `ae`
//! or `fs` do not fire inside unrelated words. Folder-level facts (event and
//! folder-based category) are left to the heuristic fallback.

use anyhow::Result;
use regex::Regex;

use super::{Classification, FilenameClassifier, KeyParts};
use crate::normalization::category::Category;

const CATEGORY_TOKENS: &[(&str, Category)] = &[
    ("4way", Category::FormationSkydiving),
    ("8way", Category::FormationSkydiving),
    ("16way", Category::FormationSkydiving),
    ("vfs", Category::FormationSkydiving),
    ("fs", Category::FormationSkydiving),
    ("cf", Category::CanopyFormation),
    ("cf2", Category::CanopyFormation),
    ("cf4", Category::CanopyFormation),
    ("ae", Category::ArtisticEvents),
    ("freestyle", Category::ArtisticEvents),
    ("freefly", Category::ArtisticEvents),
];

// vfs first: a "4way_vfs" name is a VFS jump, not 4-way FS.
const SUBCATEGORY_TOKENS: &[(&str, &str)] = &[
    ("vfs", "fs_4way_vfs"),
    ("4way", "fs_4way_fs"),
    ("8way", "fs_8way"),
    ("cf2", "cf_2way_open"),
    ("cf4", "cf_4way_seq"),
];

pub struct RichClassifier {
    round: Regex,
    team: Regex,
    jump: Regex,
}

impl RichClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            round: Regex::new(r"^(?:r|rd|round)(\d{1,3})$")?,
            team: Regex::new(r"^(?:t|team)(\d{1,5})$")?,
            jump: Regex::new(r"^(?:j|jump)(\d{1,4})$")?,
        })
    }

    /// Lowercase, hyphen-free tokens of a file stem.
    fn tokens(stem: &str) -> Vec<String> {
        stem.split(['_', ' ', '.'])
            .map(|t| t.to_lowercase().replace('-', ""))
            .filter(|t| !t.is_empty())
            .collect()
    }

    fn labelled(re: &Regex, tokens: &[String]) -> Option<String> {
        tokens
            .iter()
            .find_map(|t| re.captures(t).map(|c| c[1].to_string()))
    }
}

impl FilenameClassifier for RichClassifier {
    fn name(&self) -> &'static str {
        "rich"
    }

    fn classify(&self, parts: &KeyParts<'_>) -> Classification {
        let tokens = Self::tokens(parts.stem);
        let has = |needle: &str| tokens.iter().any(|t| t == needle);

        let category = CATEGORY_TOKENS
            .iter()
            .find(|(tok, _)| has(*tok))
            .map(|(_, cat)| *cat);
        let subcategory = SUBCATEGORY_TOKENS
            .iter()
            .find(|(tok, _)| has(*tok))
            .map(|(_, sub)| (*sub).to_string());

        Classification {
            category,
            subcategory,
            event: None,
            round_num: Self::labelled(&self.round, &tokens),
            team: Self::labelled(&self.team, &tokens),
            jump_num: Self::labelled(&self.jump, &tokens),
        }
    }
}
