pub mod fetcher;
pub mod relay;
pub mod staging;
pub mod store;
pub mod uploader;
