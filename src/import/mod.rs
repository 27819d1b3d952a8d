//! Turning reconciled storage keys into catalog rows.

pub mod builder;
pub mod ids;
pub mod importer;

pub use builder::RecordBuilder;
pub use ids::IdAllocator;
pub use importer::{ImportPreview, ImportSummary, Importer};
