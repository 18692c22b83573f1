//! Capability introspection
//!
//! Walks every operation a metadata interface exposes, classifies it from
//! its descriptor, invokes it, and stores the normalized answer in a
//! [`PropertyCatalog`]. One operation failing never stops the others.

use super::CrawlScope;
use crate::catalog::{DatabaseInfo, PropertyCatalog, PropertyValue, Value};
use crate::error::{Error, Result};
use crate::metadata::operations::{self, find_operation};
use crate::metadata::{
    Argument, DatabaseMetadata, Invocation, MetadataRowCursor, Operation, ResultSetType,
    ReturnShape,
};
use tracing::{debug, info, trace, warn};

/// How an operation is harvested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// No arguments, single value
    Scalar,
    /// No arguments, single-column rows
    Tabular,
    /// One result set type argument, asked once per type
    Probed,
    /// Not harvested
    Ignored,
}

/// Classify an operation from its descriptor
pub fn classify(operation: &Operation) -> OperationKind {
    if operations::is_probed_operation(operation.name)
        && operation.params == [operations::ParamKind::Int]
        && operation.returns == ReturnShape::Boolean
    {
        return OperationKind::Probed;
    }
    if !operation.is_nullary() {
        return OperationKind::Ignored;
    }
    match operation.returns {
        ReturnShape::Rows => OperationKind::Tabular,
        ReturnShape::Connection | ReturnShape::Object => OperationKind::Ignored,
        ReturnShape::Boolean
        | ReturnShape::Integer
        | ReturnShape::String
        | ReturnShape::Enumerated => OperationKind::Scalar,
    }
}

/// Derive a property name from an operation name: drop a leading "get"
/// and capitalize what remains.
pub fn derive_property_name(operation_name: &str) -> Option<String> {
    let name = operation_name.strip_prefix("get").unwrap_or(operation_name);
    let mut chars = name.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}

/// Split a comma-separated list. Trailing empty pieces are dropped, but an
/// empty string yields one empty piece.
pub fn split_list(value: &str) -> Vec<String> {
    if value.is_empty() {
        return vec![String::new()];
    }
    let mut items: Vec<String> = value.split(',').map(str::to_string).collect();
    while items.last().is_some_and(|s| s.is_empty()) {
        items.pop();
    }
    items
}

/// Normalize a scalar answer for the property `name`.
///
/// A string under a name ending in "s" is taken to be a comma-separated
/// list. Known to misfire both ways: a plural-named plain string gets split
/// and a singular-named list does not.
pub fn normalize_scalar(name: &str, value: Value) -> PropertyValue {
    match value {
        Value::String(s) if name.ends_with('s') => PropertyValue::List(split_list(&s)),
        other => PropertyValue::from(other),
    }
}

/// Outcome of a harvest
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HarvestReport {
    /// Catalog entries written
    pub written: usize,
    /// Operations that failed and were skipped
    pub failed: usize,
    /// Operations not harvested by design
    pub ignored: usize,
}

/// Harvests capability properties from a metadata interface
pub struct CapabilityIntrospector<'a, M: DatabaseMetadata + ?Sized> {
    metadata: &'a M,
}

impl<'a, M: DatabaseMetadata + ?Sized> CapabilityIntrospector<'a, M> {
    /// Create an introspector over a metadata interface
    pub fn new(metadata: &'a M) -> Self {
        Self { metadata }
    }

    /// Create a catalog headed with the database's identification
    pub fn retrieve_database_info(&self, scope: &CrawlScope) -> Result<PropertyCatalog> {
        let info = DatabaseInfo {
            product_name: self.read_info("getDatabaseProductName")?,
            product_version: self.read_info("getDatabaseProductVersion")?,
            catalog: scope.catalog.clone(),
            schema_pattern: scope.schema_pattern.clone(),
        };
        debug!(
            product = ?info.product_name,
            version = ?info.product_version,
            "Retrieved database info"
        );
        Ok(PropertyCatalog::with_info(info))
    }

    fn read_info(&self, name: &str) -> Result<Option<String>> {
        let Some(operation) = find_operation(self.metadata.operations(), name) else {
            return Ok(None);
        };
        match self.read_scalar(operation) {
            Ok(value) => Ok(value.to_string_value()),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(operation = name, error = %e, "Could not read database info");
                Ok(None)
            }
        }
    }

    /// Harvest every operation into the catalog.
    ///
    /// Only a fatal interface failure is returned; anything else is logged
    /// and counted in the report.
    pub fn harvest(&self, catalog: &mut PropertyCatalog) -> Result<HarvestReport> {
        let mut report = HarvestReport::default();

        for operation in self.metadata.operations() {
            let kind = classify(operation);
            if kind == OperationKind::Ignored {
                trace!(operation = operation.name, "Ignoring operation");
                report.ignored += 1;
                continue;
            }

            match self.harvest_operation(operation, kind, catalog) {
                Ok(written) => report.written += written,
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    warn!(operation = operation.name, error = %e, "Skipping capability");
                    report.failed += 1;
                }
            }
        }

        info!(
            written = report.written,
            failed = report.failed,
            ignored = report.ignored,
            "Harvested database capabilities"
        );
        Ok(report)
    }

    fn harvest_operation(
        &self,
        operation: &Operation,
        kind: OperationKind,
        catalog: &mut PropertyCatalog,
    ) -> Result<usize> {
        let name = derive_property_name(operation.name)
            .ok_or_else(|| Error::InvalidOperationName(operation.name.to_string()))?;

        match kind {
            OperationKind::Scalar => {
                let value = normalize_scalar(&name, self.read_scalar(operation)?);
                trace!(property = %name, value = %value, "Harvested property");
                catalog.put_property(name, value);
                Ok(1)
            }
            OperationKind::Tabular => {
                let values = self.read_rows(operation)?;
                trace!(property = %name, count = values.len(), "Harvested listing");
                catalog.put_property(name, PropertyValue::List(values));
                Ok(1)
            }
            OperationKind::Probed => {
                // Every mode is read before any entry is written.
                let answers = self.read_probes(operation)?;
                let written = answers.len();
                for (mode, answer) in answers {
                    catalog.put_property(
                        format!("{}ResultSet{}", name, mode.label()),
                        PropertyValue::Boolean(answer),
                    );
                }
                Ok(written)
            }
            OperationKind::Ignored => Ok(0),
        }
    }

    fn read_scalar(&self, operation: &Operation) -> Result<Value> {
        match self.metadata.invoke(operation, &[])? {
            Invocation::Value(value) => Ok(value),
            Invocation::Rows(rows) => {
                MetadataRowCursor::new(rows).close();
                Err(Error::unexpected_shape(
                    operation.name,
                    operation.returns.to_string(),
                    "rows",
                ))
            }
        }
    }

    fn read_rows(&self, operation: &Operation) -> Result<Vec<String>> {
        let source = match self.metadata.invoke(operation, &[])? {
            Invocation::Rows(rows) => rows,
            Invocation::Value(value) => {
                return Err(Error::unexpected_shape(
                    operation.name,
                    "rows",
                    value.shape(),
                ))
            }
        };

        let mut rows = MetadataRowCursor::new(source);
        let mut values = Vec::new();
        while rows.next()? {
            if let Some(value) = rows.get_string_at(0) {
                values.push(value);
            }
        }
        rows.close();
        Ok(values)
    }

    fn read_probes(&self, operation: &Operation) -> Result<Vec<(ResultSetType, bool)>> {
        ResultSetType::ALL
            .iter()
            .map(|mode| {
                let args = [Argument::ResultSetType(*mode)];
                match self.metadata.invoke(operation, &args)? {
                    Invocation::Value(Value::Boolean(answer)) => Ok((*mode, answer)),
                    other => Err(Error::unexpected_shape(
                        operation.name,
                        "a boolean",
                        other.shape(),
                    )),
                }
            })
            .collect()
    }
}
