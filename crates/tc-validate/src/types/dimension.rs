//! Lexical rules of the xBRL-CSV core dimensions used as constraint types.

use std::sync::LazyLock;

use regex::Regex;
use tc_model::Namespaces;

use super::temporal;

static LANGUAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]{2,3}(-[A-Z]{2})?$").expect("Invalid language regex"));

static UNIT_OPERATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[*/()]").expect("Invalid unit operator regex"));

static ABBREVIATED_PERIOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}(-(0[1-9]|1[0-2])|H[12]|Q[1-4]|W(0[1-9]|[1-4]\d|5[0-3]))?$")
        .expect("Invalid abbreviated period regex")
});

/// One of the five core dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoreDimension {
    Concept,
    Entity,
    Period,
    Unit,
    Language,
}

impl CoreDimension {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "concept" => Some(Self::Concept),
            "entity" => Some(Self::Entity),
            "period" => Some(Self::Period),
            "unit" => Some(Self::Unit),
            "language" => Some(Self::Language),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Concept => "concept",
            Self::Entity => "entity",
            Self::Period => "period",
            Self::Unit => "unit",
            Self::Language => "language",
        }
    }
}

pub fn validate_dimension(
    value: &str,
    dimension: CoreDimension,
    namespaces: &Namespaces,
) -> Result<(), String> {
    match dimension {
        CoreDimension::Concept | CoreDimension::Entity => {
            validate_qname(value, namespaces).map_err(|message| {
                format!("Invalid {} value '{value}': {message}", dimension.name())
            })
        }
        CoreDimension::Period => validate_period(value),
        CoreDimension::Unit => validate_unit(value, namespaces),
        CoreDimension::Language => {
            if LANGUAGE.is_match(value) {
                Ok(())
            } else {
                Err(format!("Invalid language code '{value}'"))
            }
        }
    }
}

/// A prefixed name must use a bound prefix.
pub fn validate_qname(value: &str, namespaces: &Namespaces) -> Result<(), String> {
    if let Some((prefix, _)) = value.split_once(':')
        && namespaces.resolve(prefix).is_none_or(str::is_empty)
    {
        return Err(format!("undefined namespace prefix '{prefix}'"));
    }
    Ok(())
}

/// Period kinds that cannot be ordered against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodKind {
    /// `date@start` or `date@end`.
    Instant,
    /// `date..date` and the abbreviated forms.
    Duration,
}

pub fn period_kind(value: &str) -> PeriodKind {
    if value.contains('@') {
        PeriodKind::Instant
    } else {
        PeriodKind::Duration
    }
}

/// Date, date-time or abbreviated date inside a period expression; a
/// timezone is tolerated.
fn period_point(value: &str) -> bool {
    temporal::parse_date(value).is_some()
        || temporal::parse_date_time(value).is_some()
        || ABBREVIATED_PERIOD.is_match(value)
}

pub fn validate_period(value: &str) -> Result<(), String> {
    let invalid = || format!("Invalid period format '{value}'");
    if value.trim().is_empty() {
        return Err(invalid());
    }
    if let Some((point, anchor)) = value.split_once('@') {
        if !matches!(anchor, "start" | "end") || !period_point(point) {
            return Err(invalid());
        }
        return Ok(());
    }
    if value.contains("..") {
        let bounds: Vec<&str> = value.split("..").collect();
        return match bounds.as_slice() {
            [start, end] if period_point(start) && period_point(end) => Ok(()),
            _ => Err(invalid()),
        };
    }
    if period_point(value) {
        Ok(())
    } else {
        Err(invalid())
    }
}

/// Some point of a period expression carries a timezone.
pub fn period_has_timezone(value: &str) -> bool {
    value.split("..").any(|bound| {
        let point = bound.split_once('@').map_or(bound, |(point, _)| point);
        temporal::has_timezone(point)
    })
}

pub fn validate_unit(value: &str, namespaces: &Namespaces) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("Invalid unit format '{value}'"));
    }
    if value.contains('-') {
        return Err(format!("Invalid unit format '{value}': '-' is not a unit operator"));
    }
    for part in UNIT_OPERATORS.split(value) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if part.matches(':').count() > 1 {
            return Err(format!("Invalid unit format '{value}'"));
        }
        if let Some((prefix, _)) = part.split_once(':')
            && namespaces.resolve(prefix).is_none_or(str::is_empty)
        {
            return Err(format!(
                "Invalid unit '{value}': undefined namespace prefix '{prefix}'"
            ));
        }
    }
    Ok(())
}
