//! Type-aware ordering and equality of lexical values.

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use tc_model::{Code, Namespaces};

use super::dimension::{CoreDimension, period_kind};
use super::temporal::{self, XsdDuration};
use super::xsd::XsdType;
use super::{TypeRef, resolve_type};

/// Two values that have no defined order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Incomparable {
    #[error("an instant period cannot be compared with a duration period")]
    Periods,
    #[error("a year-month duration cannot be compared with a day-time duration")]
    Durations,
}

impl Incomparable {
    pub fn code(self) -> Code {
        match self {
            Self::Periods => Code::IncomparablePeriods,
            Self::Durations => Code::IncomparableDurations,
        }
    }
}

/// Order two values of the declared type.
pub fn compare(
    left: &str,
    right: &str,
    type_name: &str,
    namespaces: &Namespaces,
) -> Result<Ordering, Incomparable> {
    compare_typed(left, right, resolve_type(type_name, namespaces))
}

pub fn compare_typed(left: &str, right: &str, ty: TypeRef) -> Result<Ordering, Incomparable> {
    match ty {
        TypeRef::Dimension(CoreDimension::Period) => {
            if period_kind(left) != period_kind(right) {
                return Err(Incomparable::Periods);
            }
            Ok(left.cmp(right))
        }
        TypeRef::Xsd(ty) => compare_xsd(left, right, ty),
        TypeRef::Decimals => Ok(decimal_order(left, right).unwrap_or_else(|| collapsed(left, right))),
        TypeRef::Dimension(_) | TypeRef::Unknown => Ok(left.cmp(right)),
    }
}

/// Equality in the value space of the declared type. Incomparable values
/// are unequal.
pub fn values_equal(left: &str, right: &str, type_name: &str, namespaces: &Namespaces) -> bool {
    compare(left, right, type_name, namespaces) == Ok(Ordering::Equal)
}

fn compare_xsd(left: &str, right: &str, ty: XsdType) -> Result<Ordering, Incomparable> {
    let ordered = match ty {
        ty if ty.is_decimal() => decimal_order(left, right),
        XsdType::Float | XsdType::Double => float_order(left, right),
        XsdType::Date => instant_order(left, right, temporal::parse_date),
        XsdType::Time => instant_order(left, right, temporal::parse_time),
        XsdType::DateTime | XsdType::DateTimeStamp => {
            instant_order(left, right, temporal::parse_date_time)
        }
        ty if ty.is_duration() => return duration_order(left, right),
        XsdType::Boolean => Some(boolean(left).cmp(&boolean(right))),
        _ => None,
    };
    Ok(ordered.unwrap_or_else(|| collapsed(left, right)))
}

fn decimal_order(left: &str, right: &str) -> Option<Ordering> {
    let left = BigDecimal::from_str(left.trim()).ok()?;
    let right = BigDecimal::from_str(right.trim()).ok()?;
    Some(left.cmp(&right))
}

fn float_order(left: &str, right: &str) -> Option<Ordering> {
    let left = parse_float(left)?;
    let right = parse_float(right)?;
    Some(left.partial_cmp(&right).unwrap_or(Ordering::Equal))
}

fn parse_float(value: &str) -> Option<f64> {
    match value.trim() {
        "INF" | "+INF" => Some(f64::INFINITY),
        "-INF" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        other => other.parse().ok(),
    }
}

fn instant_order(
    left: &str,
    right: &str,
    parse: fn(&str) -> Option<chrono::NaiveDateTime>,
) -> Option<Ordering> {
    Some(parse(left.trim())?.cmp(&parse(right.trim())?))
}

fn duration_order(left: &str, right: &str) -> Result<Ordering, Incomparable> {
    let (Ok(l), Ok(r)) = (XsdDuration::parse(left.trim()), XsdDuration::parse(right.trim()))
    else {
        return Ok(collapsed(left, right));
    };
    if l.kinds_conflict(&r) {
        return Err(Incomparable::Durations);
    }
    Ok(l.order(&r).unwrap_or_else(|| collapsed(left, right)))
}

fn boolean(value: &str) -> bool {
    matches!(value.trim(), "true" | "1")
}

/// Codepoint order after collapsing whitespace runs.
fn collapsed(left: &str, right: &str) -> Ordering {
    collapse(left).cmp(&collapse(right))
}

fn collapse(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
