//! File system access layer: one adapter per supported container format.

pub mod archive;
pub mod document;
pub mod rar;
pub mod single;
mod util;

pub use util::{
    IMAGE_EXTENSIONS, Token, compare_names, is_page_image, natural_cmp, sort_names, tokenize,
};

/// Shared result type for fs operations.
pub type Result<T> = crate::Result<T>;
