//! Issue taxonomy: stable codes, severities and the issue record handed to
//! sinks.

use std::fmt;

use serde::{Deserialize, Serialize, Serializer};

/// Issue severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Parse a declared key severity (`error` or `warning`).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "error" => Some(Self::Error),
            "warning" => Some(Self::Warning),
            _ => None,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Error => "Error",
            Self::Warning => "Warning",
        }
    }
}

/// Which part of a run an issue code belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `tcme:*`, structural problems in the schema.
    Metadata,
    /// `tcre:*`, violations found in report content.
    Report,
    /// `tcl:*`, non-normative taxonomy linter findings.
    Lint,
    /// `tc:*`, host-level conditions of the run itself.
    Processing,
}

macro_rules! codes {
    ($( $(#[$meta:meta])* $variant:ident => $text:literal, $category:ident; )*) => {
        /// Stable error code of an issue.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Code {
            $( $(#[$meta])* $variant, )*
        }

        impl Code {
            /// Every code, in taxonomy order.
            pub const ALL: &'static [Code] = &[ $( Code::$variant, )* ];

            /// The namespaced code string, e.g. `tcre:invalidValue`.
            pub fn as_str(self) -> &'static str {
                match self {
                    $( Code::$variant => $text, )*
                }
            }

            pub fn category(self) -> Category {
                match self {
                    $( Code::$variant => Category::$category, )*
                }
            }

            /// Look a code up by its namespaced string.
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $( $text => Some(Code::$variant), )*
                    _ => None,
                }
            }
        }
    };
}

codes! {
    InvalidNamespacePrefix => "tcme:invalidNamespacePrefix", Metadata;
    InvalidJsonStructure => "tcme:invalidJSONStructure", Metadata;
    MisplacedOrUnknownProperty => "tcme:misplacedOrUnknownProperty", Metadata;
    InvalidCommentColumnConstraint => "tcme:invalidCommentColumnConstraint", Metadata;
    InvalidTypeConstraint => "tcme:invalidTypeConstraint", Metadata;
    IllegalAllowedValue => "tcme:illegalAllowedValue", Metadata;
    UnknownTimeZone => "tcme:unknownTimeZone", Metadata;
    IllegalPeriodType => "tcme:illegalPeriodType", Metadata;
    UnknownPeriodType => "tcme:unknownPeriodType", Metadata;
    IllegalDurationType => "tcme:illegalDurationType", Metadata;
    UnknownDurationType => "tcme:unknownDurationType", Metadata;
    InvalidLengthType => "tcme:invalidLengthType", Metadata;
    InvalidBoundaryType => "tcme:invalidBoundaryType", Metadata;
    InvalidDigitsType => "tcme:invalidDigitsType", Metadata;
    DuplicateKeyName => "tcme:duplicateKeyName", Metadata;
    IllegalUniqueKeyField => "tcme:illegalUniqueKeyField", Metadata;
    IllegalReferenceKeyField => "tcme:illegalReferenceKeyField", Metadata;
    InvalidKeySeverity => "tcme:invalidKeySeverity", Metadata;
    InconsistentSharedKeySeverity => "tcme:inconsistentSharedKeySeverity", Metadata;
    InconsistentSharedKeySorting => "tcme:inconsistentSharedKeySorting", Metadata;
    InconsistentSharedKeyFields => "tcme:inconsistentSharedKeyFields", Metadata;
    InvalidKeyIdentifier => "tcme:invalidKeyIdentifier", Metadata;
    InvalidReferenceKey => "tcme:invalidReferenceKey", Metadata;
    InconsistentReferencedFieldType => "tcme:inconsistentReferencedFieldType", Metadata;
    ColumnParameterTypeConflict => "tcme:columnParameterTypeConflict", Metadata;
    MissingKeyProperty => "tcme:missingKeyProperty", Metadata;
    UnknownUniqueKey => "tcme:unknownUniqueKey", Metadata;
    InconsistentColumnOrderDefinition => "tcme:inconsistentColumnOrderDefinition", Metadata;

    InvalidValue => "tcre:invalidValue", Report;
    /// Also raised by the metadata validator for malformed boundary facets.
    InvalidBoundaryValue => "tcre:invalidBoundaryValue", Report;
    MissingTimeZone => "tcre:missingTimeZone", Report;
    UnexpectedTimeZone => "tcre:unexpectedTimeZone", Report;
    InvalidPeriodType => "tcre:invalidPeriodType", Report;
    InvalidDurationType => "tcre:invalidDurationType", Report;
    MissingValue => "tcre:missingValue", Report;
    UniqueKeyViolation => "tcre:uniqueKeyViolation", Report;
    UniqueKeyNilViolation => "tcre:uniqueKeyNilViolation", Report;
    ReferenceKeyViolation => "tcre:referenceKeyViolation", Report;
    KeySortViolation => "tcre:keySortViolation", Report;
    IncomparableDurations => "tcre:incomparableDurations", Report;
    IncomparablePeriods => "tcre:incomparablePeriods", Report;
    MinTablesViolation => "tcre:minTablesViolation", Report;
    MaxTablesViolation => "tcre:maxTablesViolation", Report;
    MinTableRowsViolation => "tcre:minTableRowsViolation", Report;
    MaxTableRowsViolation => "tcre:maxTableRowsViolation", Report;
    InvalidColumnOrder => "tcre:invalidColumnOrder", Report;

    LintInconsistentType => "tcl:inconsistentType", Lint;
    LintInvalidAllowedValue => "tcl:invalidAllowedValue", Lint;

    MissingCsv => "tc:missingCsv", Processing;
    ValidationFailed => "tc:validationFailed", Processing;
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Code {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One reported problem, with the structured arguments a sink may want to
/// render or filter on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub code: Code,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<u64>,
    /// Column, parameter or key field the issue is about.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

impl Issue {
    pub fn new(code: Code, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            template: None,
            table: None,
            row: None,
            field: None,
            key: None,
        }
    }

    pub fn error(code: Code, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Error, message)
    }

    pub fn warning(code: Code, message: impl Into<String>) -> Self {
        Self::new(code, Severity::Warning, message)
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_row(mut self, row: u64) -> Self {
        self.row = Some(row);
        self
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}
