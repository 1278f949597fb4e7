pub mod collation;
pub mod config;
pub mod document;
pub mod errors;
pub mod extraction;
pub mod fetch;
pub mod resolution;
pub mod types;
