//! Crawl module
//!
//! This module contains the capability introspector and the type catalog
//! builder, and runs them in order over one metadata interface.

pub mod introspector;
pub mod type_builder;

pub use introspector::{CapabilityIntrospector, HarvestReport, OperationKind};
pub use type_builder::TypeCatalogBuilder;

use crate::catalog::PropertyCatalog;
use crate::config::Config;
use crate::error::Result;
use crate::metadata::DatabaseMetadata;
use tracing::info;

/// Catalog and schema filters for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlScope {
    /// Catalog name, `None` for no filter
    pub catalog: Option<String>,
    /// Schema name pattern, `None` for no filter
    pub schema_pattern: Option<String>,
}

impl CrawlScope {
    /// Create an unfiltered scope
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the catalog name
    pub fn catalog(mut self, catalog: impl Into<String>) -> Self {
        self.catalog = Some(catalog.into());
        self
    }

    /// Set the schema pattern
    pub fn schema_pattern(mut self, schema_pattern: impl Into<String>) -> Self {
        self.schema_pattern = Some(schema_pattern.into());
        self
    }

    /// Read the scope from the `catalog` and `schemaPattern` keys
    pub fn from_config(config: &Config) -> Self {
        let read = |key: &str| {
            config
                .get(key)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };
        Self {
            catalog: read("catalog"),
            schema_pattern: read("schemaPattern"),
        }
    }
}

/// Crawl a metadata interface into a new catalog.
///
/// Database info, capabilities, base types, then user-defined types. A
/// fatal interface failure stops the crawl.
pub fn crawl<M: DatabaseMetadata + ?Sized>(
    metadata: &M,
    scope: &CrawlScope,
) -> Result<PropertyCatalog> {
    let introspector = CapabilityIntrospector::new(metadata);
    let mut catalog = introspector.retrieve_database_info(scope)?;
    introspector.harvest(&mut catalog)?;

    let builder = TypeCatalogBuilder::new(metadata, scope);
    builder.build_base_types(&mut catalog)?;
    builder.build_user_defined_types(&mut catalog)?;

    info!(
        product = ?catalog.info().product_name,
        properties = catalog.property_count(),
        types = catalog.type_count(),
        "Crawled database metadata"
    );
    Ok(catalog)
}
