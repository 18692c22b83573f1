//! Metadata interface module
//!
//! This module defines the seam between the crawler and a database
//! driver's metadata surface.

pub mod cursor;
pub mod fixture;
pub mod operations;

pub use cursor::{MetadataRowCursor, RowSource, VecRowSource};
pub use fixture::FixtureMetadata;
pub use operations::{Operation, ParamKind, ReturnShape, DATABASE_METADATA_OPERATIONS};

use crate::catalog::Value;
use crate::error::Result;
use std::fmt;

/// Result set types a probed operation is asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultSetType {
    ForwardOnly,
    ScrollInsensitive,
    ScrollSensitive,
}

impl ResultSetType {
    /// Every result set type, in probing order
    pub const ALL: [ResultSetType; 3] = [
        ResultSetType::ForwardOnly,
        ResultSetType::ScrollInsensitive,
        ResultSetType::ScrollSensitive,
    ];

    /// Numeric constant passed to the driver
    pub fn code(&self) -> i32 {
        match self {
            ResultSetType::ForwardOnly => 1003,
            ResultSetType::ScrollInsensitive => 1004,
            ResultSetType::ScrollSensitive => 1005,
        }
    }

    /// Label appended to property names
    pub fn label(&self) -> &'static str {
        match self {
            ResultSetType::ForwardOnly => "TypeForwardOnly",
            ResultSetType::ScrollInsensitive => "TypeScrollInsensitive",
            ResultSetType::ScrollSensitive => "TypeScrollSensitive",
        }
    }
}

impl fmt::Display for ResultSetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Argument passed to an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Argument {
    ResultSetType(ResultSetType),
}

/// What an invoked operation handed back
pub enum Invocation<'a> {
    /// A single value
    Value(Value),
    /// Rows to be drained
    Rows(Box<dyn RowSource + 'a>),
}

impl Invocation<'_> {
    /// Name of this answer's shape, for diagnostics
    pub fn shape(&self) -> &'static str {
        match self {
            Invocation::Value(v) => v.shape(),
            Invocation::Rows(_) => "rows",
        }
    }
}

impl fmt::Debug for Invocation<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invocation::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Invocation::Rows(rows) => f.debug_tuple("Rows").field(&rows.columns()).finish(),
        }
    }
}

/// A driver's metadata surface
///
/// Any call may fail with [`crate::Error::UnsupportedCapability`] without
/// affecting the others. [`crate::Error::FatalInterface`] means the
/// interface is no longer usable.
pub trait DatabaseMetadata {
    /// Operations this interface exposes
    fn operations(&self) -> &[Operation] {
        DATABASE_METADATA_OPERATIONS
    }

    /// Invoke an operation
    fn invoke(&self, operation: &Operation, args: &[Argument]) -> Result<Invocation<'_>>;

    /// Rows describing the built-in scalar types
    fn type_info(&self) -> Result<Box<dyn RowSource + '_>>;

    /// Rows describing the user-defined types matching the given filters
    fn user_defined_types(
        &self,
        catalog: Option<&str>,
        schema_pattern: Option<&str>,
        type_name_pattern: &str,
    ) -> Result<Box<dyn RowSource + '_>>;
}
