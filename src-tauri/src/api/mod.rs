//! REST client for the image-processing service.

pub mod client;
pub mod types;
