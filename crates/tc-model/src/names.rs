//! Reserved property names, namespaces and tokens of the Table Constraints
//! vocabulary.

/// Prefix reserved for Table Constraints properties.
pub const TC_PREFIX: &str = "tc";

pub const CONSTRAINTS: &str = "tc:constraints";
pub const PARAMETERS: &str = "tc:parameters";
pub const KEYS: &str = "tc:keys";
pub const TABLE_CONSTRAINTS: &str = "tc:tableConstraints";
pub const COLUMN_ORDER: &str = "tc:columnOrder";

/// `tc:` properties sanctioned on a table template.
pub const TEMPLATE_PROPERTIES: &[&str] = &[PARAMETERS, KEYS, TABLE_CONSTRAINTS, COLUMN_ORDER];

/// `tc:` properties sanctioned on a column definition.
pub const COLUMN_PROPERTIES: &[&str] = &[CONSTRAINTS];

pub const DOCUMENT_INFO: &str = "documentInfo";
pub const NAMESPACES: &str = "namespaces";
pub const EXTENDS: &str = "extends";
pub const TABLE_TEMPLATES: &str = "tableTemplates";
pub const TABLES: &str = "tables";
pub const COLUMNS: &str = "columns";
pub const COMMENT: &str = "comment";
pub const DIMENSIONS: &str = "dimensions";
pub const TEMPLATE: &str = "template";
pub const URL: &str = "url";
pub const TABLE_PARAMETERS: &str = "parameters";

/// Properties of a constraint object.
pub mod constraint {
    pub const TYPE: &str = "type";
    pub const OPTIONAL: &str = "optional";
    pub const NILLABLE: &str = "nillable";
    pub const ALLOWED_VALUES: &str = "allowedValues";
    pub const ALLOWED_PATTERNS: &str = "allowedPatterns";
    pub const TIME_ZONE: &str = "timeZone";
    pub const PERIOD_TYPE: &str = "periodType";
    pub const DURATION_TYPE: &str = "durationType";
    pub const LENGTH: &str = "length";
    pub const MIN_LENGTH: &str = "minLength";
    pub const MAX_LENGTH: &str = "maxLength";
    pub const MIN_INCLUSIVE: &str = "minInclusive";
    pub const MAX_INCLUSIVE: &str = "maxInclusive";
    pub const MIN_EXCLUSIVE: &str = "minExclusive";
    pub const MAX_EXCLUSIVE: &str = "maxExclusive";
    pub const TOTAL_DIGITS: &str = "totalDigits";
    pub const FRACTION_DIGITS: &str = "fractionDigits";

    pub const ALL: &[&str] = &[
        TYPE,
        OPTIONAL,
        NILLABLE,
        ALLOWED_VALUES,
        ALLOWED_PATTERNS,
        TIME_ZONE,
        PERIOD_TYPE,
        DURATION_TYPE,
        LENGTH,
        MIN_LENGTH,
        MAX_LENGTH,
        MIN_INCLUSIVE,
        MAX_INCLUSIVE,
        MIN_EXCLUSIVE,
        MAX_EXCLUSIVE,
        TOTAL_DIGITS,
        FRACTION_DIGITS,
    ];

    /// The facet properties, in checking order.
    pub const FACETS: &[&str] = &[
        LENGTH,
        MIN_LENGTH,
        MAX_LENGTH,
        MIN_INCLUSIVE,
        MAX_INCLUSIVE,
        MIN_EXCLUSIVE,
        MAX_EXCLUSIVE,
        TOTAL_DIGITS,
        FRACTION_DIGITS,
    ];
}

/// Properties of the keys object and of unique/reference key objects.
pub mod key {
    pub const UNIQUE: &str = "unique";
    pub const REFERENCE: &str = "reference";
    pub const SORT_KEY: &str = "sortKey";

    pub const NAME: &str = "name";
    pub const FIELDS: &str = "fields";
    pub const SEVERITY: &str = "severity";
    pub const SORTED_ROWS: &str = "sortedRows";
    pub const REFERENCED_KEY_NAME: &str = "referencedKeyName";
    pub const NEGATE: &str = "negate";
    pub const SKIP_NILS: &str = "skipNils";

    pub const KEYS_PROPERTIES: &[&str] = &[UNIQUE, REFERENCE, SORT_KEY];
    pub const UNIQUE_PROPERTIES: &[&str] = &[NAME, FIELDS, SEVERITY, SORTED_ROWS];
    pub const REFERENCE_PROPERTIES: &[&str] =
        &[NAME, FIELDS, SEVERITY, REFERENCED_KEY_NAME, NEGATE, SKIP_NILS];

    pub const SEVERITY_VALUES: &[&str] = &["error", "warning"];
}

/// Properties of `tc:tableConstraints`.
pub mod table_constraint {
    pub const MIN_TABLES: &str = "minTables";
    pub const MAX_TABLES: &str = "maxTables";
    pub const MIN_TABLE_ROWS: &str = "minTableRows";
    pub const MAX_TABLE_ROWS: &str = "maxTableRows";

    pub const ALL: &[&str] = &[MIN_TABLES, MAX_TABLES, MIN_TABLE_ROWS, MAX_TABLE_ROWS];
}

/// XML Schema namespace; a type prefix must be bound to it to name a built-in type.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// The five xBRL-CSV core dimensions usable as constraint types.
pub const CORE_DIMENSIONS: &[&str] = &["concept", "entity", "period", "unit", "language"];

/// Pseudo-type for the `decimals` property; validated as an integer.
pub const DECIMALS_TYPE: &str = "decimals";

pub const PERIOD_TYPES: &[&str] = &["year", "half", "quarter", "week", "month", "day", "instant"];
pub const DURATION_TYPES: &[&str] = &["yearMonth", "dayTime"];

/// Namespace URIs accepted verbatim for the `tc` prefix.
pub const TC_NAMESPACES: &[&str] = &[
    "https://xbrl.org/2025/tc",
    "https://xbrl.org/${STATUS_DATE_URI}/tc",
    "https://xbrl.org/CR-2025-07-01/tc",
    "https://xbrl.org/PWD-2025-04-01/tc",
    "https://xbrl.org/YYYY-MM-DD/tc",
];

pub fn is_core_dimension(type_name: &str) -> bool {
    CORE_DIMENSIONS.contains(&type_name)
}

/// True when a JSON property name belongs to the Table Constraints vocabulary.
pub fn is_tc_property(name: &str) -> bool {
    name.strip_prefix(TC_PREFIX)
        .is_some_and(|rest| rest.starts_with(':'))
}
