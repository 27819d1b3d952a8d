pub mod import_missing;
