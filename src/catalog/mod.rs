//! Catalog module
//!
//! This module contains the property catalog, type descriptors, and values.

pub mod catalog;
pub mod types;
pub mod value;

pub use catalog::{DatabaseInfo, PropertyCatalog};
pub use types::{BaseTypeRef, Nullability, TypeDescriptor};
pub use value::{PropertyValue, Value};
