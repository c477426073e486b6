//! MAPI protocol constants
//!
//! Line markers of the MAPI response grammar, the wire type tags the type
//! registry understands, and the cursor defaults.

// =============================================================================
// Line Markers
// =============================================================================

/// Line markers (leading characters of a response line)
pub mod marker {
    /// Query-table header: `&1 id rowcount columns tuples`
    pub const QTABLE: &str = "&1";
    /// Update result: `&2 affected last_id`
    pub const QUPDATE: &str = "&2";
    /// Schema (DDL) result
    pub const QSCHEMA: &str = "&3";
    /// Transaction acknowledgement
    pub const QTRANS: &str = "&4";
    /// Prepared statement header, laid out like `&1`
    pub const QPREPARE: &str = "&5";
    /// Next page of an already announced result
    pub const QBLOCK: &str = "&6";
    /// Info line
    pub const INFO: &str = "#";
    /// Comment line, ignored
    pub const COMMENT: &str = "#-";
    /// Header field line in the `# ` form
    pub const INFO_FIELD: &str = "# ";
    /// Header field line in the `% ` form
    pub const HEADER_FIELD: &str = "% ";
    /// Tuple line
    pub const TUPLE: &str = "[";
    /// Tuple line, parenthesized form
    pub const TUPLE_PAREN: &str = "(";
    /// Single value without slicing
    pub const TUPLE_NOSLICE: &str = "=";
    /// Error line
    pub const ERROR: &str = "!";
    /// End-of-response sentinel (an empty line)
    pub const PROMPT: &str = "";
}

/// Separator between fields of a tuple line
pub const FIELD_SEPARATOR: &str = ",\t";

/// Separator between the values and the identity of a header field line
pub const IDENTITY_SEPARATOR: char = '#';

/// Raw tokens that decode to NULL regardless of the column type
pub const NULL_TOKENS: [&str; 2] = ["NULL", "nil"];

/// Suffix the server appends to object identifiers
pub const OID_SUFFIX: &str = "@0";

// =============================================================================
// Header Field Identities
// =============================================================================

/// Identity of a header field line (the text after `#`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIdentity {
    /// Column names
    Name,
    /// Table of each column (unused)
    TableName,
    /// Wire type tags
    Type,
    /// Display length of each column (unused)
    Length,
    /// `digits scale` pairs per column
    TypeSizes,
}

impl FieldIdentity {
    /// Parse an identity string, `None` when unknown
    pub fn parse(identity: &str) -> Option<Self> {
        match identity {
            "name" => Some(FieldIdentity::Name),
            "table_name" => Some(FieldIdentity::TableName),
            "type" => Some(FieldIdentity::Type),
            "length" => Some(FieldIdentity::Length),
            "typesizes" => Some(FieldIdentity::TypeSizes),
            _ => None,
        }
    }
}

// =============================================================================
// Wire Type Tags
// =============================================================================

/// Wire type tags
#[allow(missing_docs)]
pub mod type_tag {
    pub const NONE: &str = "none";
    pub const VOID: &str = "void";
    pub const STR: &str = "str";
    pub const URL: &str = "url";
    pub const COLOR: &str = "color";
    pub const INT: &str = "int";
    pub const OID: &str = "oid";
    pub const FLT: &str = "flt";
    pub const DBL: &str = "dbl";
    pub const BIT: &str = "bit";
    pub const DATE: &str = "date";
    pub const DAYTIME: &str = "daytime";
    pub const TIMESTAMP: &str = "timestamp";
    pub const UUID: &str = "uuid";
    pub const JSON: &str = "json";
    pub const DECIMAL: &str = "decimal";
}

// =============================================================================
// Date/Time Formats
// =============================================================================

/// Textual formats of temporal values on the wire
pub mod datetime_format {
    /// `date` values
    pub const DATE: &str = "%Y-%m-%d";
    /// `daytime` values, fraction optional
    pub const TIME: &str = "%H:%M:%S%.f";
    /// `timestamp` values, fraction optional
    pub const TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.f";
}

// =============================================================================
// Cursor Defaults
// =============================================================================

/// Default number of rows per page
pub const DEFAULT_ARRAYSIZE: usize = 100;

/// Name of the synthesized column for header-less results
pub const GENERIC_COLUMN_NAME: &str = "value";
