//! In-memory metadata interface
//!
//! `FixtureMetadata` answers from recorded data instead of a live driver.
//! It can be built in code or loaded from JSON:
//!
//! ```json
//! {
//!   "answers": {
//!     "getDatabaseProductName": "HSQL Database Engine",
//!     "supportsUnion": true,
//!     "getTableTypes": { "rows": ["TABLE", "VIEW"] },
//!     "supportsResultSetType": { "probe": { "TypeForwardOnly": true } },
//!     "getURL": { "unsupported": "not implemented" }
//!   },
//!   "type_info": { "columns": ["TYPE_NAME", "DATA_TYPE"], "rows": [["INTEGER", 4]] }
//! }
//! ```

use super::cursor::RowSource;
use super::{Argument, DatabaseMetadata, Invocation, Operation};
use crate::catalog::Value;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

/// Recorded answer for one operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FixtureAnswer {
    /// The operation reports itself unsupported
    Unsupported { unsupported: String },
    /// The interface dies when this operation is invoked
    Fatal { fatal: String },
    /// Single-column rows, optionally dying after `fatal_after` of them
    Rows {
        rows: Vec<Value>,
        #[serde(default)]
        fatal_after: Option<usize>,
    },
    /// Boolean answers keyed by result set type label
    Probe { probe: IndexMap<String, bool> },
    /// A single value
    Value(Value),
}

impl From<Value> for FixtureAnswer {
    fn from(value: Value) -> Self {
        FixtureAnswer::Value(value)
    }
}

impl From<bool> for FixtureAnswer {
    fn from(b: bool) -> Self {
        FixtureAnswer::Value(Value::Boolean(b))
    }
}

impl From<i64> for FixtureAnswer {
    fn from(i: i64) -> Self {
        FixtureAnswer::Value(Value::Integer(i))
    }
}

impl From<i32> for FixtureAnswer {
    fn from(i: i32) -> Self {
        FixtureAnswer::Value(Value::from(i))
    }
}

impl From<&str> for FixtureAnswer {
    fn from(s: &str) -> Self {
        FixtureAnswer::Value(Value::from(s))
    }
}

/// Recorded rows for a type query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureTable {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
    /// Fail acquisition with this reason
    #[serde(default)]
    pub unsupported: Option<String>,
    /// Fail when advancing past this many rows
    #[serde(default)]
    pub fail_after: Option<usize>,
    /// Make failures fatal, with this reason. Without `fail_after` the
    /// acquisition itself dies.
    #[serde(default)]
    pub fatal: Option<String>,
    /// Fail when released
    #[serde(default)]
    pub fail_close: bool,
}

impl FixtureTable {
    /// Create a table with the given columns
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Add a row
    pub fn row(mut self, row: Vec<Value>) -> Self {
        self.rows.push(row);
        self
    }
}

/// The type-name query last issued for user-defined types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UdtRequest {
    pub catalog: Option<String>,
    pub schema_pattern: Option<String>,
    pub type_name_pattern: String,
}

/// A metadata interface backed by recorded answers
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureMetadata {
    #[serde(default)]
    answers: IndexMap<String, FixtureAnswer>,
    #[serde(default)]
    type_info: Option<FixtureTable>,
    #[serde(default)]
    user_defined_types: Option<FixtureTable>,
    #[serde(skip)]
    releases: Rc<Cell<usize>>,
    #[serde(skip)]
    last_udt_request: Rc<RefCell<Option<UdtRequest>>>,
}

impl FixtureMetadata {
    /// Create an interface with no answers
    pub fn new() -> Self {
        Self::default()
    }

    /// Load recorded answers from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Record the answer for an operation
    pub fn answer(mut self, operation: &str, answer: impl Into<FixtureAnswer>) -> Self {
        self.answers.insert(operation.to_string(), answer.into());
        self
    }

    /// Record single-column rows for an operation
    pub fn rows<S: Into<String>>(
        self,
        operation: &str,
        rows: impl IntoIterator<Item = S>,
    ) -> Self {
        let rows = rows.into_iter().map(|s| Value::String(s.into())).collect();
        self.answer(
            operation,
            FixtureAnswer::Rows {
                rows,
                fatal_after: None,
            },
        )
    }

    /// Record per-mode answers for a probed operation
    pub fn probe(self, operation: &str, answers: &[(&str, bool)]) -> Self {
        let probe = answers
            .iter()
            .map(|(label, b)| (label.to_string(), *b))
            .collect();
        self.answer(operation, FixtureAnswer::Probe { probe })
    }

    /// Record an operation as unsupported
    pub fn unsupported(self, operation: &str, reason: &str) -> Self {
        self.answer(
            operation,
            FixtureAnswer::Unsupported {
                unsupported: reason.to_string(),
            },
        )
    }

    /// Record the built-in type rows
    pub fn with_type_info(mut self, table: FixtureTable) -> Self {
        self.type_info = Some(table);
        self
    }

    /// Record the user-defined type rows
    pub fn with_user_defined_types(mut self, table: FixtureTable) -> Self {
        self.user_defined_types = Some(table);
        self
    }

    /// How many row sources have been released so far
    pub fn releases(&self) -> usize {
        self.releases.get()
    }

    /// The last user-defined type query, if any
    pub fn last_udt_request(&self) -> Option<UdtRequest> {
        self.last_udt_request.borrow().clone()
    }

    fn open(
        &self,
        source: &str,
        table: Option<&FixtureTable>,
    ) -> Result<Box<dyn RowSource + '_>> {
        let table = table.ok_or_else(|| Error::unsupported(source, "no rows recorded"))?;
        if let Some(reason) = &table.unsupported {
            return Err(Error::unsupported(source, reason.clone()));
        }
        if let (Some(reason), None) = (&table.fatal, table.fail_after) {
            return Err(Error::FatalInterface(reason.clone()));
        }
        Ok(Box::new(FixtureRows {
            source: source.to_string(),
            columns: table.columns.clone(),
            rows: table.rows.clone().into(),
            served: 0,
            fail_after: table.fail_after,
            fatal: table.fatal.clone(),
            fail_close: table.fail_close,
            releases: self.releases.clone(),
        }))
    }
}

impl DatabaseMetadata for FixtureMetadata {
    fn invoke(&self, operation: &Operation, args: &[Argument]) -> Result<Invocation<'_>> {
        let answer = self
            .answers
            .get(operation.name)
            .ok_or_else(|| Error::unsupported(operation.name, "no answer recorded"))?;

        match (answer, args) {
            (FixtureAnswer::Unsupported { unsupported }, _) => {
                Err(Error::unsupported(operation.name, unsupported.clone()))
            }
            (FixtureAnswer::Fatal { fatal }, _) => Err(Error::FatalInterface(fatal.clone())),
            (FixtureAnswer::Value(value), []) => Ok(Invocation::Value(value.clone())),
            (FixtureAnswer::Rows { rows, fatal_after }, []) => {
                Ok(Invocation::Rows(Box::new(FixtureRows {
                    source: operation.name.to_string(),
                    columns: vec!["VALUE".to_string()],
                    rows: rows.iter().map(|v| vec![v.clone()]).collect(),
                    served: 0,
                    fail_after: *fatal_after,
                    fatal: fatal_after.map(|_| "connection lost".to_string()),
                    fail_close: false,
                    releases: self.releases.clone(),
                })))
            }
            (FixtureAnswer::Probe { probe }, [Argument::ResultSetType(mode)]) => probe
                .get(mode.label())
                .map(|b| Invocation::Value(Value::Boolean(*b)))
                .ok_or_else(|| {
                    Error::unsupported(operation.name, format!("no answer for {}", mode))
                }),
            _ => Err(Error::unsupported(
                operation.name,
                "arguments do not match the recorded answer",
            )),
        }
    }

    fn type_info(&self) -> Result<Box<dyn RowSource + '_>> {
        self.open("getTypeInfo", self.type_info.as_ref())
    }

    fn user_defined_types(
        &self,
        catalog: Option<&str>,
        schema_pattern: Option<&str>,
        type_name_pattern: &str,
    ) -> Result<Box<dyn RowSource + '_>> {
        *self.last_udt_request.borrow_mut() = Some(UdtRequest {
            catalog: catalog.map(str::to_string),
            schema_pattern: schema_pattern.map(str::to_string),
            type_name_pattern: type_name_pattern.to_string(),
        });
        self.open("getUDTs", self.user_defined_types.as_ref())
    }
}

struct FixtureRows {
    source: String,
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    served: usize,
    fail_after: Option<usize>,
    fatal: Option<String>,
    fail_close: bool,
    releases: Rc<Cell<usize>>,
}

impl RowSource for FixtureRows {
    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn next_row(&mut self) -> Result<Option<Vec<Value>>> {
        if self.fail_after == Some(self.served) {
            let reason = format!("row source failed after {} rows", self.served);
            return Err(match &self.fatal {
                Some(fatal) => Error::FatalInterface(format!("{}: {}", fatal, reason)),
                None => Error::unsupported(self.source.clone(), reason),
            });
        }
        self.served += 1;
        Ok(self.rows.pop_front())
    }

    fn close(&mut self) -> Result<()> {
        self.releases.set(self.releases.get() + 1);
        if self.fail_close {
            return Err(Error::ResourceRelease {
                resource: self.source.clone(),
                reason: "fixture configured to fail on close".to_string(),
            });
        }
        Ok(())
    }
}
