//! Type descriptors for metacrawl
//!
//! This module defines the records describing the scalar types a database
//! exposes, both built-in and user-defined.

use super::value::Value;
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Whether a type accepts NULL values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Nullability {
    /// Does not allow NULL values
    NoNulls,
    /// Allows NULL values
    Nullable,
    /// Nullability is unknown
    #[default]
    Unknown,
}

impl Nullability {
    /// `typeNoNulls` in the metadata interface
    pub const NO_NULLS: i32 = 0;
    /// `typeNullable` in the metadata interface
    pub const NULLABLE: i32 = 1;
    /// `typeNullableUnknown` in the metadata interface
    pub const UNKNOWN: i32 = 2;

    /// Map a metadata nullability code
    pub fn from_code(code: i32) -> Self {
        match code {
            Self::NO_NULLS => Nullability::NoNulls,
            Self::NULLABLE => Nullability::Nullable,
            _ => Nullability::Unknown,
        }
    }
}

impl fmt::Display for Nullability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nullability::NoNulls => write!(f, "NO NULLS"),
            Nullability::Nullable => write!(f, "NULLABLE"),
            Nullability::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Link from a user-defined type to the type it is based on.
///
/// This is a relation, not ownership: a resolved link names another
/// descriptor in the same catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub enum BaseTypeRef {
    /// No base type was declared
    #[default]
    NotDeclared,
    /// Resolved to the descriptor with this name
    Resolved { type_name: String, type_code: i32 },
    /// A base type code was declared but no descriptor carries it yet
    Unresolved { type_code: i32 },
}

impl BaseTypeRef {
    /// Whether a link was declared but could not be followed
    pub fn is_unresolved(&self) -> bool {
        matches!(self, BaseTypeRef::Unresolved { .. })
    }

    /// Name of the resolved base type
    pub fn type_name(&self) -> Option<&str> {
        match self {
            BaseTypeRef::Resolved { type_name, .. } => Some(type_name),
            _ => None,
        }
    }

    /// Declared base type code, resolved or not
    pub fn type_code(&self) -> Option<i32> {
        match self {
            BaseTypeRef::NotDeclared => None,
            BaseTypeRef::Resolved { type_code, .. } | BaseTypeRef::Unresolved { type_code } => {
                Some(*type_code)
            }
        }
    }
}

/// One scalar or user-defined type known to the database
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDescriptor {
    /// Type name, unique within a catalog
    pub type_name: String,
    /// Vendor numeric type code
    pub type_code: i32,
    /// Maximum precision
    pub precision: i64,
    /// Prefix used to quote a literal
    pub literal_prefix: Option<String>,
    /// Suffix used to quote a literal
    pub literal_suffix: Option<String>,
    /// Parameters used when creating the type
    pub create_parameters: Option<String>,
    pub nullable: Nullability,
    pub case_sensitive: bool,
    /// Searchability code
    pub searchable: i32,
    pub unsigned: bool,
    /// Can be used for money values
    pub fixed_precision_scale: bool,
    pub auto_incrementable: bool,
    /// Localized type name
    pub local_type_name: Option<String>,
    pub minimum_scale: i32,
    pub maximum_scale: i32,
    pub numeric_precision_radix: i32,
    pub user_defined: bool,
    /// Host-language class name (user-defined types only)
    pub type_class_name: Option<String>,
    /// Remarks (user-defined types only)
    pub remarks: Option<String>,
    /// Base type link (user-defined types only)
    pub base_type: BaseTypeRef,
    /// Extra columns reported for this type
    pub attributes: IndexMap<String, Value>,
}

impl TypeDescriptor {
    /// Create a new descriptor with every field at its default
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            type_code: 0,
            precision: 0,
            literal_prefix: None,
            literal_suffix: None,
            create_parameters: None,
            nullable: Nullability::Unknown,
            case_sensitive: false,
            searchable: 0,
            unsigned: false,
            fixed_precision_scale: false,
            auto_incrementable: false,
            local_type_name: None,
            minimum_scale: 0,
            maximum_scale: 0,
            numeric_precision_radix: 0,
            user_defined: false,
            type_class_name: None,
            remarks: None,
            base_type: BaseTypeRef::NotDeclared,
            attributes: IndexMap::new(),
        }
    }

    /// Get the type name
    pub fn name(&self) -> &str {
        &self.type_name
    }

    /// Set the numeric type code
    pub fn type_code(mut self, type_code: i32) -> Self {
        self.type_code = type_code;
        self
    }

    /// Set the precision
    pub fn precision(mut self, precision: i64) -> Self {
        self.precision = precision.max(0);
        self
    }

    /// Set the literal prefix and suffix
    pub fn literal_quotes(mut self, prefix: Option<String>, suffix: Option<String>) -> Self {
        self.literal_prefix = prefix;
        self.literal_suffix = suffix;
        self
    }

    /// Set the create parameters
    pub fn create_parameters(mut self, create_parameters: Option<String>) -> Self {
        self.create_parameters = create_parameters;
        self
    }

    /// Set nullability
    pub fn nullable(mut self, nullable: Nullability) -> Self {
        self.nullable = nullable;
        self
    }

    /// Set the user-defined flag
    pub fn user_defined(mut self, user_defined: bool) -> Self {
        self.user_defined = user_defined;
        self
    }

    /// Set the base type link
    pub fn base_type(mut self, base_type: BaseTypeRef) -> Self {
        self.base_type = base_type;
        self
    }

    /// Add extra attributes, keeping any already present
    pub fn add_attributes(mut self, attributes: IndexMap<String, Value>) -> Self {
        self.attributes.extend(attributes);
        self
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.type_name, self.type_code)?;
        if let Some(base) = self.base_type.type_name() {
            write!(f, " based on {}", base)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let ty = TypeDescriptor::new("VARCHAR");
        assert_eq!(ty.name(), "VARCHAR");
        assert_eq!(ty.type_code, 0);
        assert_eq!(ty.nullable, Nullability::Unknown);
        assert_eq!(ty.base_type, BaseTypeRef::NotDeclared);
        assert!(!ty.user_defined);
        assert_eq!(Nullability::default(), Nullability::Unknown);
        assert_eq!(BaseTypeRef::default(), BaseTypeRef::NotDeclared);
    }

    #[test]
    fn test_nullability_codes() {
        assert_eq!(Nullability::from_code(0), Nullability::NoNulls);
        assert_eq!(Nullability::from_code(1), Nullability::Nullable);
        assert_eq!(Nullability::from_code(2), Nullability::Unknown);
        assert_eq!(Nullability::from_code(-7), Nullability::Unknown);
    }

    #[test]
    fn test_base_type_ref() {
        let unresolved = BaseTypeRef::Unresolved { type_code: 4 };
        assert!(unresolved.is_unresolved());
        assert_eq!(unresolved.type_code(), Some(4));
        assert_eq!(unresolved.type_name(), None);
        assert_eq!(BaseTypeRef::NotDeclared.type_code(), None);

        let ty = TypeDescriptor::new("MY_INT").base_type(BaseTypeRef::Resolved {
            type_name: "INTEGER".to_string(),
            type_code: 4,
        });
        assert_eq!(ty.to_string(), "MY_INT (0) based on INTEGER");
    }
}
