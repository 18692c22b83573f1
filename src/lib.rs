//! metacrawl - crawls a relational database's metadata interface
//!
//! This library builds an in-memory catalog of what a database engine can
//! do and which types it exposes:
//! - Metadata interface seam (operation table, row cursors, fixtures)
//! - Capability introspection into a property catalog
//! - Base and user-defined type catalog construction
//! - Configuration and logging setup

pub mod catalog;
pub mod config;
pub mod crawl;
pub mod error;
pub mod logging;
pub mod metadata;

pub use catalog::{PropertyCatalog, PropertyValue, TypeDescriptor};
pub use crawl::{crawl, CrawlScope};
pub use error::{Error, Result};
