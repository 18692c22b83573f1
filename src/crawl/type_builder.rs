//! Type catalog construction
//!
//! Loads the built-in scalar types and the user-defined types into a
//! [`PropertyCatalog`], linking each user-defined type to its base type by
//! type code.

use super::CrawlScope;
use crate::catalog::{BaseTypeRef, Nullability, PropertyCatalog, TypeDescriptor};
use crate::error::{Error, Result};
use crate::metadata::{DatabaseMetadata, MetadataRowCursor, RowSource};
use tracing::{debug, trace, warn};

/// Type name pattern used when listing user-defined types
pub const UDT_TYPE_NAME_PATTERN: &str = "%";

/// Builds type descriptors from a metadata interface
pub struct TypeCatalogBuilder<'a, M: DatabaseMetadata + ?Sized> {
    metadata: &'a M,
    scope: &'a CrawlScope,
}

impl<'a, M: DatabaseMetadata + ?Sized> TypeCatalogBuilder<'a, M> {
    /// Create a builder for the given interface and scope
    pub fn new(metadata: &'a M, scope: &'a CrawlScope) -> Self {
        Self { metadata, scope }
    }

    /// Load the built-in types, returning how many rows were loaded.
    ///
    /// A type name seen twice keeps the later row.
    pub fn build_base_types(&self, catalog: &mut PropertyCatalog) -> Result<usize> {
        let loaded = load_rows("base types", self.metadata.type_info(), |rows| {
            catalog.add_type(read_base_type(rows)?);
            Ok(())
        })?;
        debug!(loaded, "Loaded base types");
        Ok(loaded)
    }

    /// Load the user-defined types, returning how many rows were loaded.
    ///
    /// Base types are looked up among the types already in the catalog, so
    /// this should run after [`Self::build_base_types`]. A code with no
    /// matching descriptor is left as [`BaseTypeRef::Unresolved`].
    pub fn build_user_defined_types(&self, catalog: &mut PropertyCatalog) -> Result<usize> {
        let source = self.metadata.user_defined_types(
            self.scope.catalog.as_deref(),
            self.scope.schema_pattern.as_deref(),
            UDT_TYPE_NAME_PATTERN,
        );
        let loaded = load_rows("user-defined types", source, |rows| {
            let descriptor = read_user_defined_type(rows, catalog)?;
            if descriptor.base_type.is_unresolved() {
                debug!(type_name = %descriptor.type_name, "Base type not resolved");
            }
            catalog.add_type(descriptor);
            Ok(())
        })?;
        debug!(loaded, "Loaded user-defined types");
        Ok(loaded)
    }
}

/// Drain a row source through `load`, one row at a time.
///
/// Row failures skip the row; a failure to acquire or advance the source
/// ends it. Both are logged. Fatal failures are returned. The source is
/// released on every path.
fn load_rows<'s, F>(
    what: &str,
    source: Result<Box<dyn RowSource + 's>>,
    mut load: F,
) -> Result<usize>
where
    F: FnMut(&mut MetadataRowCursor<'s>) -> Result<()>,
{
    let source = match source {
        Ok(source) => source,
        Err(e) if e.is_fatal() => return Err(e),
        Err(e) => {
            warn!(source = what, error = %e, "Could not retrieve types");
            return Ok(0);
        }
    };

    let mut rows = MetadataRowCursor::new(source);
    let mut loaded = 0;
    loop {
        match rows.next() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                warn!(source = what, error = %e, loaded, "Stopped reading types");
                break;
            }
        }

        match load(&mut rows) {
            Ok(()) => loaded += 1,
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => warn!(source = what, error = %e, "Skipping type"),
        }
    }
    rows.close();
    Ok(loaded)
}

fn read_type_name(rows: &mut MetadataRowCursor<'_>) -> Result<String> {
    rows.get_string("TYPE_NAME")
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::MalformedRow("type row has no TYPE_NAME".to_string()))
}

fn read_base_type(rows: &mut MetadataRowCursor<'_>) -> Result<TypeDescriptor> {
    let type_name = read_type_name(rows)?;
    let type_code = rows.get_int("DATA_TYPE", 0);
    trace!(%type_name, type_code, "Retrieving data type");

    let mut descriptor = TypeDescriptor::new(type_name)
        .type_code(type_code)
        .precision(rows.get_long("PRECISION", 0))
        .literal_quotes(
            rows.get_string("LITERAL_PREFIX"),
            rows.get_string("LITERAL_SUFFIX"),
        )
        .create_parameters(rows.get_string("CREATE_PARAMS"))
        .nullable(Nullability::from_code(
            rows.get_int("NULLABLE", Nullability::UNKNOWN),
        ));
    descriptor.case_sensitive = rows.get_bool("CASE_SENSITIVE");
    descriptor.searchable = rows.get_int("SEARCHABLE", 0);
    descriptor.unsigned = rows.get_bool("UNSIGNED_ATTRIBUTE");
    descriptor.fixed_precision_scale = rows.get_bool("FIXED_PREC_SCALE");
    descriptor.auto_incrementable = rows.get_bool("AUTO_INCREMENT");
    descriptor.local_type_name = rows.get_string("LOCAL_TYPE_NAME");
    descriptor.minimum_scale = rows.get_int("MINIMUM_SCALE", 0);
    descriptor.maximum_scale = rows.get_int("MAXIMUM_SCALE", 0);
    descriptor.numeric_precision_radix = rows.get_int("NUM_PREC_RADIX", 0);

    Ok(descriptor.add_attributes(rows.attributes()))
}

fn read_user_defined_type(
    rows: &mut MetadataRowCursor<'_>,
    catalog: &PropertyCatalog,
) -> Result<TypeDescriptor> {
    let type_name = read_type_name(rows)?;
    trace!(%type_name, "Retrieving user-defined type");

    let base_type = match rows.get_optional_int("BASE_TYPE") {
        Some(code) => catalog.link_base_type(code),
        None if rows.is_null("BASE_TYPE") => BaseTypeRef::NotDeclared,
        None => {
            return Err(Error::MalformedRow(format!(
                "type '{}' has a non-numeric BASE_TYPE",
                type_name
            )));
        }
    };

    let mut descriptor = TypeDescriptor::new(type_name)
        .user_defined(true)
        .type_code(rows.get_int("DATA_TYPE", 0))
        .base_type(base_type);
    descriptor.type_class_name = rows.get_string("CLASS_NAME");
    descriptor.remarks = rows.get_string("REMARKS");

    Ok(descriptor.add_attributes(rows.attributes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Value;
    use crate::metadata::fixture::{FixtureMetadata, FixtureTable, UdtRequest};

    fn base_types() -> FixtureTable {
        FixtureTable::new([
            "TYPE_NAME",
            "DATA_TYPE",
            "PRECISION",
            "LITERAL_PREFIX",
            "LITERAL_SUFFIX",
            "NULLABLE",
            "CASE_SENSITIVE",
            "SEARCHABLE",
            "UNSIGNED_ATTRIBUTE",
            "AUTO_INCREMENT",
            "NUM_PREC_RADIX",
            "SQL_DATA_TYPE",
        ])
        .row(vec![
            Value::from("INTEGER"),
            Value::Integer(4),
            Value::Integer(10),
            Value::Null,
            Value::Null,
            Value::Integer(1),
            Value::Boolean(false),
            Value::Integer(3),
            Value::Boolean(false),
            Value::Boolean(true),
            Value::Integer(10),
            Value::Null,
        ])
        .row(vec![
            Value::from("VARCHAR"),
            Value::Integer(12),
            Value::Integer(32672),
            Value::from("'"),
            Value::from("'"),
            Value::Null,
            Value::Boolean(true),
            Value::Integer(3),
            Value::Null,
            Value::Null,
            Value::Null,
            Value::Null,
        ])
    }

    fn user_defined_types() -> FixtureTable {
        FixtureTable::new([
            "TYPE_CAT",
            "TYPE_SCHEM",
            "TYPE_NAME",
            "CLASS_NAME",
            "DATA_TYPE",
            "REMARKS",
            "BASE_TYPE",
        ])
        .row(vec![
            Value::Null,
            Value::from("APP"),
            Value::from("MY_INT"),
            Value::from("java.lang.Integer"),
            Value::Integer(2001),
            Value::from("distinct integer"),
            Value::Integer(4),
        ])
        .row(vec![
            Value::Null,
            Value::from("APP"),
            Value::from("ADDRESS"),
            Value::from("com.example.Address"),
            Value::Integer(2002),
            Value::Null,
            Value::Null,
        ])
    }

    #[test]
    fn test_build_base_types() {
        let fixture = FixtureMetadata::new().with_type_info(base_types());
        let scope = CrawlScope::new();
        let mut catalog = PropertyCatalog::new();

        let loaded = TypeCatalogBuilder::new(&fixture, &scope)
            .build_base_types(&mut catalog)
            .unwrap();
        assert_eq!(loaded, 2);

        let integer = catalog.get_type("INTEGER").unwrap();
        assert_eq!(integer.type_code, 4);
        assert_eq!(integer.precision, 10);
        assert_eq!(integer.nullable, Nullability::Nullable);
        assert!(integer.auto_incrementable);
        assert!(!integer.user_defined);
        assert_eq!(integer.numeric_precision_radix, 10);
        assert_eq!(
            integer.attributes.keys().collect::<Vec<_>>(),
            vec!["SQL_DATA_TYPE"]
        );

        let varchar = catalog.get_type("VARCHAR").unwrap();
        assert_eq!(varchar.literal_prefix.as_deref(), Some("'"));
        assert_eq!(varchar.nullable, Nullability::Unknown);
        assert_eq!(varchar.numeric_precision_radix, 0);
        assert!(varchar.case_sensitive);
        assert_eq!(fixture.releases(), 1);
    }

    #[test]
    fn test_build_base_types_twice_is_stable() {
        let fixture = FixtureMetadata::new().with_type_info(base_types());
        let scope = CrawlScope::new();
        let builder = TypeCatalogBuilder::new(&fixture, &scope);
        let mut catalog = PropertyCatalog::new();

        builder.build_base_types(&mut catalog).unwrap();
        let first: Vec<TypeDescriptor> = catalog.types().cloned().collect();
        builder.build_base_types(&mut catalog).unwrap();
        let second: Vec<TypeDescriptor> = catalog.types().cloned().collect();

        assert_eq!(first, second);
        assert_eq!(catalog.type_count(), 2);
    }

    #[test]
    fn test_user_defined_types_link_to_base_types() {
        let fixture = FixtureMetadata::new()
            .with_type_info(base_types())
            .with_user_defined_types(user_defined_types());
        let scope = CrawlScope::new().schema_pattern("APP");
        let builder = TypeCatalogBuilder::new(&fixture, &scope);
        let mut catalog = PropertyCatalog::new();

        builder.build_base_types(&mut catalog).unwrap();
        builder.build_user_defined_types(&mut catalog).unwrap();

        let my_int = catalog.get_type("MY_INT").unwrap();
        assert!(my_int.user_defined);
        assert_eq!(my_int.type_code, 2001);
        assert_eq!(my_int.type_class_name.as_deref(), Some("java.lang.Integer"));
        assert_eq!(my_int.remarks.as_deref(), Some("distinct integer"));
        assert_eq!(catalog.resolve_base_type(my_int).unwrap().name(), "INTEGER");
        assert_eq!(my_int.attributes.get("TYPE_SCHEM"), Some(&Value::from("APP")));

        let address = catalog.get_type("ADDRESS").unwrap();
        assert_eq!(address.base_type, BaseTypeRef::NotDeclared);

        assert_eq!(
            fixture.last_udt_request(),
            Some(UdtRequest {
                catalog: None,
                schema_pattern: Some("APP".to_string()),
                type_name_pattern: "%".to_string(),
            })
        );
    }

    #[test]
    fn test_user_defined_types_before_base_types_stay_unresolved() {
        let fixture = FixtureMetadata::new()
            .with_type_info(base_types())
            .with_user_defined_types(user_defined_types());
        let scope = CrawlScope::new();
        let builder = TypeCatalogBuilder::new(&fixture, &scope);
        let mut catalog = PropertyCatalog::new();

        builder.build_user_defined_types(&mut catalog).unwrap();
        assert_eq!(
            catalog.get_type("MY_INT").unwrap().base_type,
            BaseTypeRef::Unresolved { type_code: 4 }
        );

        builder.build_base_types(&mut catalog).unwrap();
        assert_eq!(catalog.relink_unresolved(), 1);
        assert_eq!(
            catalog.get_type("MY_INT").unwrap().base_type.type_name(),
            Some("INTEGER")
        );
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let table = FixtureTable::new(["TYPE_NAME", "DATA_TYPE"])
            .row(vec![Value::Null, Value::Integer(1)])
            .row(vec![Value::from("CHAR"), Value::from("not a number")])
            .row(vec![Value::from("")]);
        let fixture = FixtureMetadata::new().with_type_info(table);
        let scope = CrawlScope::new();
        let mut catalog = PropertyCatalog::new();

        let loaded = TypeCatalogBuilder::new(&fixture, &scope)
            .build_base_types(&mut catalog)
            .unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(catalog.get_type("CHAR").unwrap().type_code, 0);
    }

    #[test]
    fn test_failing_source_keeps_loaded_rows_and_releases() {
        let fixture = FixtureMetadata::new().with_type_info(FixtureTable {
            fail_after: Some(1),
            fail_close: true,
            ..base_types()
        });
        let scope = CrawlScope::new();
        let mut catalog = PropertyCatalog::new();

        let loaded = TypeCatalogBuilder::new(&fixture, &scope)
            .build_base_types(&mut catalog)
            .unwrap();

        assert_eq!(loaded, 1);
        assert!(catalog.get_type("INTEGER").is_some());
        assert!(catalog.get_type("VARCHAR").is_none());
        assert_eq!(fixture.releases(), 1);
    }

    #[test]
    fn test_unsupported_source_yields_no_types() {
        let fixture = FixtureMetadata::new().with_user_defined_types(FixtureTable {
            unsupported: Some("UDTs not supported".to_string()),
            ..user_defined_types()
        });
        let scope = CrawlScope::new();
        let mut catalog = PropertyCatalog::new();

        let builder = TypeCatalogBuilder::new(&fixture, &scope);
        assert_eq!(builder.build_base_types(&mut catalog).unwrap(), 0);
        assert_eq!(builder.build_user_defined_types(&mut catalog).unwrap(), 0);
        assert_eq!(catalog.type_count(), 0);
        assert_eq!(fixture.releases(), 0);
    }

    #[test]
    fn test_non_numeric_base_type_skips_the_row() {
        let table = user_defined_types().row(vec![
            Value::Null,
            Value::from("APP"),
            Value::from("ODD"),
            Value::Null,
            Value::Integer(2001),
            Value::Null,
            Value::from("abc"),
        ]);
        let fixture = FixtureMetadata::new()
            .with_type_info(base_types())
            .with_user_defined_types(table);
        let scope = CrawlScope::new();
        let builder = TypeCatalogBuilder::new(&fixture, &scope);
        let mut catalog = PropertyCatalog::new();

        builder.build_base_types(&mut catalog).unwrap();
        assert_eq!(builder.build_user_defined_types(&mut catalog).unwrap(), 2);
        assert!(catalog.get_type("ODD").is_none());
        assert_eq!(
            catalog.get_type("ADDRESS").unwrap().base_type,
            BaseTypeRef::NotDeclared
        );
    }

    #[test]
    fn test_fatal_acquisition_aborts_the_build() {
        let fixture = FixtureMetadata::new().with_type_info(FixtureTable {
            fatal: Some("connection reset".to_string()),
            ..base_types()
        });
        let scope = CrawlScope::new();
        let mut catalog = PropertyCatalog::new();

        let result = TypeCatalogBuilder::new(&fixture, &scope).build_base_types(&mut catalog);

        assert!(matches!(result, Err(Error::FatalInterface(_))));
        assert_eq!(catalog.type_count(), 0);
        assert_eq!(fixture.releases(), 0);
    }

    #[test]
    fn test_fatal_while_reading_releases_the_source() {
        let fixture = FixtureMetadata::new().with_user_defined_types(FixtureTable {
            fail_after: Some(1),
            fatal: Some("connection reset".to_string()),
            ..user_defined_types()
        });
        let scope = CrawlScope::new();
        let mut catalog = PropertyCatalog::new();

        let result =
            TypeCatalogBuilder::new(&fixture, &scope).build_user_defined_types(&mut catalog);

        assert!(matches!(result, Err(Error::FatalInterface(_))));
        assert!(catalog.get_type("MY_INT").is_some());
        assert_eq!(fixture.releases(), 1);
    }
}
