pub mod analyzers;
pub mod config;
pub mod dataset;
pub mod fetch;
pub mod loader;
pub mod output;
