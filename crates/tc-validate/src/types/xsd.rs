//! XML Schema built-in types and their lexical spaces.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use super::temporal;

static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("Invalid decimal regex")
});

static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+$").expect("Invalid integer regex"));

static FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?|[+-]?INF|NaN)$")
        .expect("Invalid float regex")
});

static QNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z_][\w.\-]*(:[a-zA-Z_][\w.\-]*)?$").expect("Invalid QName regex")
});

static G_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d{4}(Z|[+-]\d{2}:\d{2})?$").expect("Invalid gYear regex")
});

static G_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--\d{2}(Z|[+-]\d{2}:\d{2})?$").expect("Invalid gMonth regex")
});

static G_YEAR_MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?\d{4}-\d{2}(Z|[+-]\d{2}:\d{2})?$").expect("Invalid gYearMonth regex")
});

static G_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^--\d{2}-\d{2}(Z|[+-]\d{2}:\d{2})?$").expect("Invalid gMonthDay regex")
});

static G_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^---\d{2}(Z|[+-]\d{2}:\d{2})?$").expect("Invalid gDay regex")
});

/// A built-in XML Schema datatype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum XsdType {
    AnySimpleType,
    AnyAtomicType,
    String,
    NormalizedString,
    Token,
    Language,
    Name,
    NcName,
    Id,
    IdRef,
    IdRefs,
    Entity,
    Entities,
    NmToken,
    NmTokens,
    Decimal,
    Integer,
    Long,
    Int,
    Short,
    Byte,
    NonNegativeInteger,
    PositiveInteger,
    UnsignedLong,
    UnsignedInt,
    UnsignedShort,
    UnsignedByte,
    NonPositiveInteger,
    NegativeInteger,
    Float,
    Double,
    Boolean,
    Date,
    Time,
    DateTime,
    DateTimeStamp,
    Duration,
    YearMonthDuration,
    DayTimeDuration,
    GYear,
    GYearMonth,
    GMonth,
    GMonthDay,
    GDay,
    QName,
    Notation,
    AnyUri,
    Base64Binary,
    HexBinary,
}

const CATALOGUE: &[(&str, XsdType)] = &[
    ("anySimpleType", XsdType::AnySimpleType),
    ("anyAtomicType", XsdType::AnyAtomicType),
    ("string", XsdType::String),
    ("normalizedString", XsdType::NormalizedString),
    ("token", XsdType::Token),
    ("language", XsdType::Language),
    ("Name", XsdType::Name),
    ("NCName", XsdType::NcName),
    ("ID", XsdType::Id),
    ("IDREF", XsdType::IdRef),
    ("IDREFS", XsdType::IdRefs),
    ("ENTITY", XsdType::Entity),
    ("ENTITIES", XsdType::Entities),
    ("NMTOKEN", XsdType::NmToken),
    ("NMTOKENS", XsdType::NmTokens),
    ("decimal", XsdType::Decimal),
    ("integer", XsdType::Integer),
    ("long", XsdType::Long),
    ("int", XsdType::Int),
    ("short", XsdType::Short),
    ("byte", XsdType::Byte),
    ("nonNegativeInteger", XsdType::NonNegativeInteger),
    ("positiveInteger", XsdType::PositiveInteger),
    ("unsignedLong", XsdType::UnsignedLong),
    ("unsignedInt", XsdType::UnsignedInt),
    ("unsignedShort", XsdType::UnsignedShort),
    ("unsignedByte", XsdType::UnsignedByte),
    ("nonPositiveInteger", XsdType::NonPositiveInteger),
    ("negativeInteger", XsdType::NegativeInteger),
    ("float", XsdType::Float),
    ("double", XsdType::Double),
    ("boolean", XsdType::Boolean),
    ("date", XsdType::Date),
    ("time", XsdType::Time),
    ("dateTime", XsdType::DateTime),
    ("dateTimeStamp", XsdType::DateTimeStamp),
    ("duration", XsdType::Duration),
    ("yearMonthDuration", XsdType::YearMonthDuration),
    ("dayTimeDuration", XsdType::DayTimeDuration),
    ("gYear", XsdType::GYear),
    ("gYearMonth", XsdType::GYearMonth),
    ("gMonth", XsdType::GMonth),
    ("gMonthDay", XsdType::GMonthDay),
    ("gDay", XsdType::GDay),
    ("QName", XsdType::QName),
    ("NOTATION", XsdType::Notation),
    ("anyURI", XsdType::AnyUri),
    ("base64Binary", XsdType::Base64Binary),
    ("hexBinary", XsdType::HexBinary),
];

impl XsdType {
    /// Look a type up by its local name in the XML Schema namespace.
    pub fn from_local_name(name: &str) -> Option<Self> {
        CATALOGUE
            .iter()
            .find(|(local, _)| *local == name)
            .map(|(_, ty)| *ty)
    }

    pub fn local_name(self) -> &'static str {
        CATALOGUE
            .iter()
            .find(|(_, ty)| *ty == self)
            .map(|(local, _)| *local)
            .unwrap_or("anySimpleType")
    }

    /// `xs:integer` and every type derived from it.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::Integer
                | Self::Long
                | Self::Int
                | Self::Short
                | Self::Byte
                | Self::NonNegativeInteger
                | Self::PositiveInteger
                | Self::UnsignedLong
                | Self::UnsignedInt
                | Self::UnsignedShort
                | Self::UnsignedByte
                | Self::NonPositiveInteger
                | Self::NegativeInteger
        )
    }

    /// `xs:decimal` and its derivations.
    pub fn is_decimal(self) -> bool {
        self == Self::Decimal || self.is_integer()
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Float | Self::Double)
    }

    pub fn is_duration(self) -> bool {
        matches!(
            self,
            Self::Duration | Self::YearMonthDuration | Self::DayTimeDuration
        )
    }

    /// Types whose values may carry a timezone suffix.
    pub fn is_optionally_timezoned(self) -> bool {
        matches!(
            self,
            Self::Date
                | Self::Time
                | Self::DateTime
                | Self::GYearMonth
                | Self::GMonthDay
                | Self::GDay
        )
    }

    /// Types derived from `xs:string`, plus the list types.
    pub fn is_string_family(self) -> bool {
        matches!(
            self,
            Self::String
                | Self::NormalizedString
                | Self::Token
                | Self::Language
                | Self::Name
                | Self::NcName
                | Self::Id
                | Self::IdRef
                | Self::IdRefs
                | Self::Entity
                | Self::Entities
                | Self::NmToken
                | Self::NmTokens
        )
    }

    /// Inclusive value range of the bounded integer types.
    fn integer_range(self) -> Option<(i128, i128)> {
        Some(match self {
            Self::Long => (i64::MIN.into(), i64::MAX.into()),
            Self::Int => (i32::MIN.into(), i32::MAX.into()),
            Self::Short => (i16::MIN.into(), i16::MAX.into()),
            Self::Byte => (i8::MIN.into(), i8::MAX.into()),
            Self::UnsignedLong => (0, u64::MAX.into()),
            Self::UnsignedInt => (0, u32::MAX.into()),
            Self::UnsignedShort => (0, u16::MAX.into()),
            Self::UnsignedByte => (0, u8::MAX.into()),
            _ => return None,
        })
    }
}

/// Check `value` against the lexical space of `ty`.
pub fn validate_lexical(value: &str, ty: XsdType) -> Result<(), String> {
    let trimmed = value.trim();
    match ty {
        XsdType::Decimal => {
            if DECIMAL.is_match(trimmed) {
                Ok(())
            } else {
                Err(format!("'{value}' is not a valid decimal"))
            }
        }
        ty if ty.is_integer() => validate_integer(value, trimmed, ty),
        XsdType::Float | XsdType::Double => {
            if FLOAT.is_match(trimmed) {
                Ok(())
            } else {
                Err(format!("'{value}' is not a valid {}", ty.local_name()))
            }
        }
        XsdType::Boolean => match trimmed {
            "true" | "false" | "1" | "0" => Ok(()),
            _ => Err(format!("'{value}' is not a valid boolean")),
        },
        XsdType::Date => temporal::parse_date(trimmed)
            .map(|_| ())
            .ok_or_else(|| format!("'{value}' is not a valid date")),
        XsdType::Time => temporal::parse_time(trimmed)
            .map(|_| ())
            .ok_or_else(|| format!("'{value}' is not a valid time")),
        XsdType::DateTime => temporal::parse_date_time(trimmed)
            .map(|_| ())
            .ok_or_else(|| format!("'{value}' is not a valid dateTime")),
        XsdType::DateTimeStamp => {
            if temporal::parse_date_time(trimmed).is_some() && temporal::has_timezone(trimmed) {
                Ok(())
            } else {
                Err(format!("'{value}' is not a valid dateTimeStamp"))
            }
        }
        XsdType::Duration => temporal::XsdDuration::parse(trimmed).map(|_| ()),
        XsdType::YearMonthDuration => {
            let duration = temporal::XsdDuration::parse(trimmed)?;
            if duration.is_day_time_free() {
                Ok(())
            } else {
                Err(format!("'{value}' is not a valid yearMonthDuration"))
            }
        }
        XsdType::DayTimeDuration => {
            let duration = temporal::XsdDuration::parse(trimmed)?;
            if duration.is_year_month_free() {
                Ok(())
            } else {
                Err(format!("'{value}' is not a valid dayTimeDuration"))
            }
        }
        XsdType::GYear => pattern(&G_YEAR, value, trimmed, "gYear"),
        XsdType::GMonth => pattern(&G_MONTH, value, trimmed, "gMonth"),
        XsdType::GYearMonth => pattern(&G_YEAR_MONTH, value, trimmed, "gYearMonth"),
        XsdType::GMonthDay => pattern(&G_MONTH_DAY, value, trimmed, "gMonthDay"),
        XsdType::GDay => pattern(&G_DAY, value, trimmed, "gDay"),
        XsdType::QName => pattern(&QNAME, value, trimmed, "QName"),
        XsdType::AnyUri => {
            if value.chars().any(char::is_control) {
                Err(format!("'{value}' is not a valid anyURI"))
            } else {
                Ok(())
            }
        }
        XsdType::Base64Binary => {
            let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
            STANDARD
                .decode(compact.as_bytes())
                .map(|_| ())
                .map_err(|error| format!("'{value}' is not valid base64Binary: {error}"))
        }
        XsdType::HexBinary => hex::decode(trimmed)
            .map(|_| ())
            .map_err(|error| format!("'{value}' is not valid hexBinary: {error}")),
        _ => Ok(()),
    }
}

fn validate_integer(value: &str, trimmed: &str, ty: XsdType) -> Result<(), String> {
    if !INTEGER.is_match(trimmed) {
        return Err(format!("'{value}' is not a valid integer"));
    }
    let digits = trimmed.trim_start_matches(['+', '-']);
    let zero = digits.bytes().all(|digit| digit == b'0');
    let negative = trimmed.starts_with('-') && !zero;
    let in_range = match ty {
        XsdType::NonNegativeInteger => !negative,
        XsdType::PositiveInteger => !negative && !zero,
        XsdType::NonPositiveInteger => negative || zero,
        XsdType::NegativeInteger => negative,
        _ => match ty.integer_range() {
            Some((min, max)) => trimmed
                .parse::<i128>()
                .is_ok_and(|number| (min..=max).contains(&number)),
            None => true,
        },
    };
    if in_range {
        Ok(())
    } else {
        Err(format!("'{value}' is out of range for {}", ty.local_name()))
    }
}

fn pattern(regex: &Regex, value: &str, trimmed: &str, name: &str) -> Result<(), String> {
    if regex.is_match(trimmed) {
        Ok(())
    } else {
        Err(format!("'{value}' is not a valid {name}"))
    }
}
