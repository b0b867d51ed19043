//! geoenrich: IP geolocation enrichment for structured event pipelines

pub mod app;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
