pub mod backup;
pub mod browser;
pub mod config;
pub mod content;
pub mod logging;
pub mod output;
pub mod scoring;
pub mod store;
