//! Property catalog for metacrawl
//!
//! This module holds everything one crawl learns about a database: its
//! capability properties and its type descriptors.

use super::types::{BaseTypeRef, TypeDescriptor};
use super::value::PropertyValue;
use crate::error::Result;
use indexmap::IndexMap;
use serde::Serialize;

/// Identification of the crawled database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseInfo {
    /// Database product name
    pub product_name: Option<String>,
    /// Database product version
    pub product_version: Option<String>,
    /// Catalog the crawl was scoped to
    pub catalog: Option<String>,
    /// Schema pattern the crawl was scoped to
    pub schema_pattern: Option<String>,
}

/// Catalog of harvested properties and type descriptors
#[derive(Debug, Clone, Default, Serialize)]
pub struct PropertyCatalog {
    info: DatabaseInfo,
    /// Properties by derived name
    properties: IndexMap<String, PropertyValue>,
    /// Type descriptors by type name
    types: IndexMap<String, TypeDescriptor>,
}

impl PropertyCatalog {
    /// Create a new empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty catalog for the given database
    pub fn with_info(info: DatabaseInfo) -> Self {
        Self {
            info,
            ..Self::default()
        }
    }

    /// Get the database identification
    pub fn info(&self) -> &DatabaseInfo {
        &self.info
    }

    /// Store a property, replacing any previous value
    pub fn put_property(&mut self, name: impl Into<String>, value: PropertyValue) {
        self.properties.insert(name.into(), value);
    }

    /// Get a property by name
    pub fn get_property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// All properties in catalog order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of properties
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Add a type descriptor. A descriptor with the same name is replaced
    /// in place.
    pub fn add_type(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.type_name.clone(), descriptor);
    }

    /// Get a type descriptor by name
    pub fn get_type(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// First type descriptor in catalog order with the given type code
    pub fn lookup_type_by_code(&self, type_code: i32) -> Option<&TypeDescriptor> {
        self.types.values().find(|ty| ty.type_code == type_code)
    }

    /// All type descriptors in catalog order
    pub fn types(&self) -> impl Iterator<Item = &TypeDescriptor> {
        self.types.values()
    }

    /// Number of type descriptors
    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    /// Follow a descriptor's base type link
    pub fn resolve_base_type(&self, descriptor: &TypeDescriptor) -> Option<&TypeDescriptor> {
        descriptor
            .base_type
            .type_name()
            .and_then(|name| self.types.get(name))
    }

    /// Build the link for a declared base type code against the current
    /// contents of the catalog
    pub fn link_base_type(&self, type_code: i32) -> BaseTypeRef {
        match self.lookup_type_by_code(type_code) {
            Some(base) => BaseTypeRef::Resolved {
                type_name: base.type_name.clone(),
                type_code,
            },
            None => BaseTypeRef::Unresolved { type_code },
        }
    }

    /// Retry every unresolved base type link, returning how many resolved
    pub fn relink_unresolved(&mut self) -> usize {
        let pending: Vec<(String, i32)> = self
            .types
            .values()
            .filter_map(|ty| match ty.base_type {
                BaseTypeRef::Unresolved { type_code } => Some((ty.type_name.clone(), type_code)),
                _ => None,
            })
            .collect();

        let mut resolved = 0;
        for (name, type_code) in pending {
            let link = self.link_base_type(type_code);
            if link.is_unresolved() {
                continue;
            }
            if let Some(ty) = self.types.get_mut(&name) {
                ty.base_type = link;
                resolved += 1;
            }
        }
        resolved
    }

    /// Render the catalog as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
