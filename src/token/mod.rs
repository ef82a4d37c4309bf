// src/token/mod.rs

pub mod extractor;
pub mod metadata;

pub use extractor::{extract, format_token_details, TokenParameters};
pub use metadata::build_metadata;
