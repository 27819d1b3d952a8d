pub mod cli;
pub mod config;
pub mod database_ops;
pub mod import;
pub mod metadata;
pub mod normalization;
pub mod reconcile;
pub mod storage;

pub mod util {
    pub mod env;
    pub mod logging;
}
