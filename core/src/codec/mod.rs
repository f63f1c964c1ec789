//! Image encoding and inspection helpers.

pub mod image;

pub use self::image::{encode_png, probe_dimensions, sniff_extension};

pub type Result<T> = crate::Result<T>;
