//! 功能元件模組
//!
//! 每個子模組實現一個獨立的功能，包含主要邏輯和專用工具

pub mod curation_browser;
pub mod list_materializer;

pub use curation_browser::{CurationBrowser, CurationSession, ImageBrowser};
pub use list_materializer::{ListMaterializer, MaterializationReport, Materializer};
