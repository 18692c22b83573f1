//! Operation table for the standard relational metadata interface
//!
//! Each entry records an operation's name, parameter kinds, and the shape
//! of what it returns. The crawler classifies operations from this table
//! alone.

use std::fmt;

/// Kind of a parameter an operation takes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Str,
    StrArray,
    IntArray,
    Bool,
    Class,
}

/// Shape of an operation's return value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnShape {
    Boolean,
    Integer,
    String,
    /// An enumerated answer rendered as a string
    Enumerated,
    /// A cursor over metadata rows
    Rows,
    /// The connection that owns the interface
    Connection,
    /// A host-language object with no catalog meaning
    Object,
}

impl fmt::Display for ReturnShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReturnShape::Boolean => "a boolean",
            ReturnShape::Integer => "an integer",
            ReturnShape::String => "a string",
            ReturnShape::Enumerated => "an enumerated value",
            ReturnShape::Rows => "rows",
            ReturnShape::Connection => "a connection",
            ReturnShape::Object => "an object",
        };
        write!(f, "{}", name)
    }
}

/// Descriptor of one operation on a metadata interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub params: &'static [ParamKind],
    pub returns: ReturnShape,
}

impl Operation {
    pub const fn new(
        name: &'static str,
        params: &'static [ParamKind],
        returns: ReturnShape,
    ) -> Self {
        Self {
            name,
            params,
            returns,
        }
    }

    const fn flag(name: &'static str) -> Self {
        Self::new(name, &[], ReturnShape::Boolean)
    }

    const fn limit(name: &'static str) -> Self {
        Self::new(name, &[], ReturnShape::Integer)
    }

    const fn text(name: &'static str) -> Self {
        Self::new(name, &[], ReturnShape::String)
    }

    const fn rows(name: &'static str) -> Self {
        Self::new(name, &[], ReturnShape::Rows)
    }

    const fn probe(name: &'static str) -> Self {
        Self::new(name, &[ParamKind::Int], ReturnShape::Boolean)
    }

    /// Whether the operation takes no arguments
    pub fn is_nullary(&self) -> bool {
        self.params.is_empty()
    }
}

use ParamKind::{Bool, Class, Int, IntArray, Str, StrArray};

/// Operations answered once per result set type. Kept sorted.
pub const PROBED_OPERATIONS: &[&str] = &[
    "deletesAreDetected",
    "insertsAreDetected",
    "othersDeletesAreVisible",
    "othersInsertsAreVisible",
    "othersUpdatesAreVisible",
    "ownDeletesAreVisible",
    "ownInsertsAreVisible",
    "ownUpdatesAreVisible",
    "supportsResultSetType",
    "updatesAreDetected",
];

/// Whether an operation name is answered once per result set type
pub fn is_probed_operation(name: &str) -> bool {
    PROBED_OPERATIONS.binary_search(&name).is_ok()
}

/// Every operation of the standard relational metadata interface
pub static DATABASE_METADATA_OPERATIONS: &[Operation] = &[
    // ========== Boolean flags ==========
    Operation::flag("allProceduresAreCallable"),
    Operation::flag("allTablesAreSelectable"),
    Operation::flag("autoCommitFailureClosesAllResultSets"),
    Operation::flag("dataDefinitionCausesTransactionCommit"),
    Operation::flag("dataDefinitionIgnoredInTransactions"),
    Operation::flag("doesMaxRowSizeIncludeBlobs"),
    Operation::flag("generatedKeyAlwaysReturned"),
    Operation::flag("isCatalogAtStart"),
    Operation::flag("isReadOnly"),
    Operation::flag("locatorsUpdateCopy"),
    Operation::flag("nullPlusNonNullIsNull"),
    Operation::flag("nullsAreSortedAtEnd"),
    Operation::flag("nullsAreSortedAtStart"),
    Operation::flag("nullsAreSortedHigh"),
    Operation::flag("nullsAreSortedLow"),
    Operation::flag("storesLowerCaseIdentifiers"),
    Operation::flag("storesLowerCaseQuotedIdentifiers"),
    Operation::flag("storesMixedCaseIdentifiers"),
    Operation::flag("storesMixedCaseQuotedIdentifiers"),
    Operation::flag("storesUpperCaseIdentifiers"),
    Operation::flag("storesUpperCaseQuotedIdentifiers"),
    Operation::flag("supportsAlterTableWithAddColumn"),
    Operation::flag("supportsAlterTableWithDropColumn"),
    Operation::flag("supportsANSI92EntryLevelSQL"),
    Operation::flag("supportsANSI92FullSQL"),
    Operation::flag("supportsANSI92IntermediateSQL"),
    Operation::flag("supportsBatchUpdates"),
    Operation::flag("supportsCatalogsInDataManipulation"),
    Operation::flag("supportsCatalogsInIndexDefinitions"),
    Operation::flag("supportsCatalogsInPrivilegeDefinitions"),
    Operation::flag("supportsCatalogsInProcedureCalls"),
    Operation::flag("supportsCatalogsInTableDefinitions"),
    Operation::flag("supportsColumnAliasing"),
    Operation::flag("supportsConvert"),
    Operation::flag("supportsCoreSQLGrammar"),
    Operation::flag("supportsCorrelatedSubqueries"),
    Operation::flag("supportsDataDefinitionAndDataManipulationTransactions"),
    Operation::flag("supportsDataManipulationTransactionsOnly"),
    Operation::flag("supportsDifferentTableCorrelationNames"),
    Operation::flag("supportsExpressionsInOrderBy"),
    Operation::flag("supportsExtendedSQLGrammar"),
    Operation::flag("supportsFullOuterJoins"),
    Operation::flag("supportsGetGeneratedKeys"),
    Operation::flag("supportsGroupBy"),
    Operation::flag("supportsGroupByBeyondSelect"),
    Operation::flag("supportsGroupByUnrelated"),
    Operation::flag("supportsIntegrityEnhancementFacility"),
    Operation::flag("supportsLikeEscapeClause"),
    Operation::flag("supportsLimitedOuterJoins"),
    Operation::flag("supportsMinimumSQLGrammar"),
    Operation::flag("supportsMixedCaseIdentifiers"),
    Operation::flag("supportsMixedCaseQuotedIdentifiers"),
    Operation::flag("supportsMultipleOpenResults"),
    Operation::flag("supportsMultipleResultSets"),
    Operation::flag("supportsMultipleTransactions"),
    Operation::flag("supportsNamedParameters"),
    Operation::flag("supportsNonNullableColumns"),
    Operation::flag("supportsOpenCursorsAcrossCommit"),
    Operation::flag("supportsOpenCursorsAcrossRollback"),
    Operation::flag("supportsOpenStatementsAcrossCommit"),
    Operation::flag("supportsOpenStatementsAcrossRollback"),
    Operation::flag("supportsOrderByUnrelated"),
    Operation::flag("supportsOuterJoins"),
    Operation::flag("supportsPositionedDelete"),
    Operation::flag("supportsPositionedUpdate"),
    Operation::flag("supportsSavepoints"),
    Operation::flag("supportsSchemasInDataManipulation"),
    Operation::flag("supportsSchemasInIndexDefinitions"),
    Operation::flag("supportsSchemasInPrivilegeDefinitions"),
    Operation::flag("supportsSchemasInProcedureCalls"),
    Operation::flag("supportsSchemasInTableDefinitions"),
    Operation::flag("supportsSelectForUpdate"),
    Operation::flag("supportsStatementPooling"),
    Operation::flag("supportsStoredFunctionsUsingCallSyntax"),
    Operation::flag("supportsStoredProcedures"),
    Operation::flag("supportsSubqueriesInComparisons"),
    Operation::flag("supportsSubqueriesInExists"),
    Operation::flag("supportsSubqueriesInIns"),
    Operation::flag("supportsSubqueriesInQuantifieds"),
    Operation::flag("supportsTableCorrelationNames"),
    Operation::flag("supportsTransactions"),
    Operation::flag("supportsUnion"),
    Operation::flag("supportsUnionAll"),
    Operation::flag("usesLocalFilePerTable"),
    Operation::flag("usesLocalFiles"),
    // ========== Limits and versions ==========
    Operation::limit("getDatabaseMajorVersion"),
    Operation::limit("getDatabaseMinorVersion"),
    Operation::limit("getDefaultTransactionIsolation"),
    Operation::limit("getDriverMajorVersion"),
    Operation::limit("getDriverMinorVersion"),
    Operation::limit("getJDBCMajorVersion"),
    Operation::limit("getJDBCMinorVersion"),
    Operation::limit("getMaxBinaryLiteralLength"),
    Operation::limit("getMaxCatalogNameLength"),
    Operation::limit("getMaxCharLiteralLength"),
    Operation::limit("getMaxColumnNameLength"),
    Operation::limit("getMaxColumnsInGroupBy"),
    Operation::limit("getMaxColumnsInIndex"),
    Operation::limit("getMaxColumnsInOrderBy"),
    Operation::limit("getMaxColumnsInSelect"),
    Operation::limit("getMaxColumnsInTable"),
    Operation::limit("getMaxConnections"),
    Operation::limit("getMaxCursorNameLength"),
    Operation::limit("getMaxIndexLength"),
    Operation::limit("getMaxProcedureNameLength"),
    Operation::limit("getMaxRowSize"),
    Operation::limit("getMaxSchemaNameLength"),
    Operation::limit("getMaxStatementLength"),
    Operation::limit("getMaxStatements"),
    Operation::limit("getMaxTableNameLength"),
    Operation::limit("getMaxTablesInSelect"),
    Operation::limit("getMaxUserNameLength"),
    Operation::limit("getResultSetHoldability"),
    Operation::limit("getSQLStateType"),
    // ========== Strings ==========
    Operation::text("getCatalogSeparator"),
    Operation::text("getCatalogTerm"),
    Operation::text("getDatabaseProductName"),
    Operation::text("getDatabaseProductVersion"),
    Operation::text("getDriverName"),
    Operation::text("getDriverVersion"),
    Operation::text("getExtraNameCharacters"),
    Operation::text("getIdentifierQuoteString"),
    Operation::text("getNumericFunctions"),
    Operation::text("getProcedureTerm"),
    Operation::text("getSQLKeywords"),
    Operation::text("getSchemaTerm"),
    Operation::text("getSearchStringEscape"),
    Operation::text("getStringFunctions"),
    Operation::text("getSystemFunctions"),
    Operation::text("getTimeDateFunctions"),
    Operation::text("getURL"),
    Operation::text("getUserName"),
    Operation::new("getRowIdLifetime", &[], ReturnShape::Enumerated),
    // ========== Single-column listings ==========
    Operation::rows("getCatalogs"),
    Operation::rows("getClientInfoProperties"),
    Operation::rows("getSchemas"),
    Operation::rows("getTableTypes"),
    Operation::rows("getTypeInfo"),
    // ========== Handles ==========
    Operation::new("getConnection", &[], ReturnShape::Connection),
    // ========== Per-mode probes ==========
    Operation::probe("deletesAreDetected"),
    Operation::probe("insertsAreDetected"),
    Operation::probe("othersDeletesAreVisible"),
    Operation::probe("othersInsertsAreVisible"),
    Operation::probe("othersUpdatesAreVisible"),
    Operation::probe("ownDeletesAreVisible"),
    Operation::probe("ownInsertsAreVisible"),
    Operation::probe("ownUpdatesAreVisible"),
    Operation::probe("supportsResultSetType"),
    Operation::probe("updatesAreDetected"),
    // ========== Parameterized queries ==========
    Operation::new("getAttributes", &[Str, Str, Str, Str], ReturnShape::Rows),
    Operation::new(
        "getBestRowIdentifier",
        &[Str, Str, Str, Int, Bool],
        ReturnShape::Rows,
    ),
    Operation::new("getColumnPrivileges", &[Str, Str, Str, Str], ReturnShape::Rows),
    Operation::new("getColumns", &[Str, Str, Str, Str], ReturnShape::Rows),
    Operation::new(
        "getCrossReference",
        &[Str, Str, Str, Str, Str, Str],
        ReturnShape::Rows,
    ),
    Operation::new("getExportedKeys", &[Str, Str, Str], ReturnShape::Rows),
    Operation::new("getFunctionColumns", &[Str, Str, Str, Str], ReturnShape::Rows),
    Operation::new("getFunctions", &[Str, Str, Str], ReturnShape::Rows),
    Operation::new("getImportedKeys", &[Str, Str, Str], ReturnShape::Rows),
    Operation::new("getIndexInfo", &[Str, Str, Str, Bool, Bool], ReturnShape::Rows),
    Operation::new("getPrimaryKeys", &[Str, Str, Str], ReturnShape::Rows),
    Operation::new("getProcedureColumns", &[Str, Str, Str, Str], ReturnShape::Rows),
    Operation::new("getProcedures", &[Str, Str, Str], ReturnShape::Rows),
    Operation::new("getPseudoColumns", &[Str, Str, Str, Str], ReturnShape::Rows),
    Operation::new("getSuperTables", &[Str, Str, Str], ReturnShape::Rows),
    Operation::new("getSuperTypes", &[Str, Str, Str], ReturnShape::Rows),
    Operation::new("getTablePrivileges", &[Str, Str, Str], ReturnShape::Rows),
    Operation::new("getTables", &[Str, Str, Str, StrArray], ReturnShape::Rows),
    Operation::new("getUDTs", &[Str, Str, Str, IntArray], ReturnShape::Rows),
    Operation::new("getVersionColumns", &[Str, Str, Str], ReturnShape::Rows),
    Operation::new("supportsConvert", &[Int, Int], ReturnShape::Boolean),
    Operation::new(
        "supportsResultSetConcurrency",
        &[Int, Int],
        ReturnShape::Boolean,
    ),
    Operation::new("supportsResultSetHoldability", &[Int], ReturnShape::Boolean),
    Operation::new(
        "supportsTransactionIsolationLevel",
        &[Int],
        ReturnShape::Boolean,
    ),
    Operation::new("isWrapperFor", &[Class], ReturnShape::Boolean),
    Operation::new("unwrap", &[Class], ReturnShape::Object),
];

/// Find an operation in a table by name, preferring the nullary overload
pub fn find_operation<'a>(operations: &'a [Operation], name: &str) -> Option<&'a Operation> {
    operations
        .iter()
        .filter(|op| op.name == name)
        .min_by_key(|op| op.params.len())
}
