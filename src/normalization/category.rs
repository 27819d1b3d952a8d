use std::fmt;

/// Closed category vocabulary of the `videos` table.
///
/// Anything that does not map onto a known discipline lands in
/// [`Category::Uncategorized`] instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Category {
    /// Formation skydiving (4-way, 8-way, VFS, nationals FS rounds).
    FormationSkydiving,
    /// Canopy formation.
    CanopyFormation,
    /// Artistic events (freestyle, freefly).
    ArtisticEvents,
    #[default]
    Uncategorized,
}

impl Category {
    /// Database label stored in `videos.category`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::FormationSkydiving => "fs",
            Category::CanopyFormation => "cf",
            Category::ArtisticEvents => "ae",
            Category::Uncategorized => "uncategorized",
        }
    }

    /// Parse a stored label; unknown labels fall back to `Uncategorized`.
    pub fn from_label(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "fs" => Category::FormationSkydiving,
            "cf" => Category::CanopyFormation,
            "ae" => Category::ArtisticEvents,
            _ => Category::Uncategorized,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Uncategorized)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
