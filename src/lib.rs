//! Service core for an anime catalog and streaming front-end: a Kitsu
//! metadata client plus an AnimeFLV stream resolver. Presentation layers
//! drive these providers and render whatever they return.

pub mod config;
pub mod error;
pub mod metadata;
pub mod streams;

pub use error::{Error, Result};
