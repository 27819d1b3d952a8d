pub mod category;
pub mod storage_url;
