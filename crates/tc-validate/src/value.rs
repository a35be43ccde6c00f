//! Validation of one cell or parameter value against its constraint.

use std::cell::RefCell;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;

use bigdecimal::BigDecimal;
use regex::Regex;
use tc_model::row::{EMPTY_MARKER, NIL_MARKER, NONE_MARKER};
use tc_model::{Code, Constraint, Facets, Namespaces};

use crate::types::{
    self, CoreDimension, FacetKind, TypeRef, XsdDuration, compare_typed, facet_applies_to,
    has_timezone, period_has_timezone,
};

static PERIOD_TYPE_PATTERNS: LazyLock<[(&str, Regex); 7]> = LazyLock::new(|| {
    let pattern = |source: &str| Regex::new(source).expect("Invalid period type regex");
    [
        ("year", pattern(r"^\d{4}$")),
        ("half", pattern(r"^\d{4}H[12]$")),
        ("quarter", pattern(r"^\d{4}Q[1-4]$")),
        ("month", pattern(r"^\d{4}-\d{2}$")),
        ("week", pattern(r"^\d{4}W\d{2}$")),
        ("day", pattern(r"^\d{4}-\d{2}-\d{2}$")),
        ("instant", pattern(r"^.*@(?:start|end)$")),
    ]
});

/// One failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub code: Code,
    pub message: String,
}

impl Violation {
    fn new(code: Code, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Validates values for one schema. Compiled `allowedPatterns` are cached
/// for the validator's lifetime.
#[derive(Debug)]
pub struct ValueValidator<'a> {
    namespaces: &'a Namespaces,
    patterns: RefCell<HashMap<String, Option<Regex>>>,
}

impl<'a> ValueValidator<'a> {
    pub fn new(namespaces: &'a Namespaces) -> Self {
        Self {
            namespaces,
            patterns: RefCell::new(HashMap::new()),
        }
    }

    /// Check `value` against `constraint`.
    ///
    /// `None` means no cell or parameter value was supplied at all; it is
    /// only an error for a required parameter. `context` is appended to
    /// messages.
    pub fn validate(
        &self,
        value: Option<&str>,
        constraint: &Constraint,
        context: &str,
        is_parameter: bool,
    ) -> Vec<Violation> {
        let mut violations = Vec::new();

        let Some(value) = value else {
            if is_parameter && !constraint.optional {
                violations.push(Violation::new(
                    Code::MissingValue,
                    format!("Required value is missing: {context}"),
                ));
            }
            return violations;
        };

        let explicit_empty = value == EMPTY_MARKER;
        let empty = value.is_empty() || explicit_empty;
        if constraint.optional && empty {
            return violations;
        }
        if empty && !explicit_empty {
            violations.push(Violation::new(
                Code::MissingValue,
                format!("Required value is missing: {context}"),
            ));
            return violations;
        }

        let Some(type_name) = constraint.type_name.as_deref() else {
            return violations;
        };

        let nil = value == NIL_MARKER;
        if nil && !constraint.nillable {
            violations.push(Violation::new(
                Code::InvalidValue,
                format!("Nil value not allowed: {context}"),
            ));
            return violations;
        }
        if nil || value == NONE_MARKER {
            return violations;
        }

        let text = if explicit_empty { "" } else { value };
        let ty = types::resolve_type(type_name, self.namespaces);
        if let Err(message) = types::validate_typed(text, ty, self.namespaces) {
            let message = match message {
                Some(message) => format!("Invalid {type_name} value: {message} ({context})"),
                None => format!("Unknown type '{type_name}' ({context})"),
            };
            violations.push(Violation::new(Code::InvalidValue, message));
            return violations;
        }

        if !text.is_empty() {
            if let Some(allowed) = &constraint.allowed_values
                && !allowed
                    .iter()
                    .any(|candidate| compare_typed(text, candidate, ty) == Ok(Ordering::Equal))
            {
                violations.push(Violation::new(
                    Code::InvalidValue,
                    format!("Value '{value}' not in allowed values ({context})"),
                ));
            }
            if let Some(patterns) = &constraint.allowed_patterns
                && !self.matches_any(text, patterns)
            {
                violations.push(Violation::new(
                    Code::InvalidValue,
                    format!("Value '{value}' does not match any allowed pattern ({context})"),
                ));
            }
        }

        if let Some(required) = constraint.time_zone
            && ty.accepts_time_zone()
        {
            let present = match ty {
                TypeRef::Dimension(CoreDimension::Period) => period_has_timezone(text),
                _ => has_timezone(text),
            };
            if required && !present {
                violations.push(Violation::new(
                    Code::MissingTimeZone,
                    format!("Timezone required but missing: {value} ({context})"),
                ));
            } else if !required && present {
                violations.push(Violation::new(
                    Code::UnexpectedTimeZone,
                    format!("Timezone not allowed: {value} ({context})"),
                ));
            }
        }

        if let Some(period_type) = constraint.period_type.as_deref()
            && ty == TypeRef::Dimension(CoreDimension::Period)
            && let Some((_, pattern)) = PERIOD_TYPE_PATTERNS
                .iter()
                .find(|(name, _)| *name == period_type)
            && !pattern.is_match(text)
        {
            violations.push(Violation::new(
                Code::InvalidPeriodType,
                format!("Period value '{value}' does not match type '{period_type}' ({context})"),
            ));
        }

        if let Some(duration_type) = constraint.duration_type.as_deref()
            && ty.xsd().is_some_and(|ty| ty.is_duration())
            && let Some(violation) = check_duration_type(text, duration_type, context)
        {
            violations.push(violation);
        }

        check_facets(text, &constraint.facets, ty, context, &mut violations);
        violations
    }

    /// Full match against at least one pattern. Malformed patterns never match.
    fn matches_any(&self, value: &str, patterns: &[String]) -> bool {
        let mut cache = self.patterns.borrow_mut();
        patterns.iter().any(|pattern| {
            cache
                .entry(pattern.clone())
                .or_insert_with(|| Regex::new(&format!("^(?:{pattern})$")).ok())
                .as_ref()
                .is_some_and(|regex| regex.is_match(value))
        })
    }
}

fn check_duration_type(value: &str, duration_type: &str, context: &str) -> Option<Violation> {
    let duration = XsdDuration::parse(value.trim()).ok()?;
    let (conforms, label) = match duration_type {
        "yearMonth" => (duration.is_day_time_free(), "yearMonth"),
        "dayTime" => (duration.is_year_month_free(), "dayTime"),
        _ => return None,
    };
    (!conforms).then(|| {
        Violation::new(
            Code::InvalidDurationType,
            format!("Duration '{value}' is not {label} type ({context})"),
        )
    })
}

fn check_facets(
    value: &str,
    facets: &Facets,
    ty: TypeRef,
    context: &str,
    violations: &mut Vec<Violation>,
) {
    let length = value.chars().count() as u64;
    let invalid = |message: String| Violation::new(Code::InvalidValue, message);

    if let Some(expected) = facets.length
        && length != expected
    {
        violations.push(invalid(format!(
            "Length {length} != required {expected} ({context})"
        )));
    }
    if let Some(min) = facets.min_length
        && length < min
    {
        violations.push(invalid(format!(
            "Length {length} < minimum {min} ({context})"
        )));
    }
    if let Some(max) = facets.max_length
        && length > max
    {
        violations.push(invalid(format!(
            "Length {length} > maximum {max} ({context})"
        )));
    }

    let bounds = [
        (&facets.min_inclusive, Ordering::Less, "<", "minimum"),
        (&facets.max_inclusive, Ordering::Greater, ">", "maximum"),
    ];
    for (bound, failing, symbol, label) in bounds {
        if let Some(bound) = bound
            && let Some(ordering) = boundary_order(value, bound, ty)
            && ordering == failing
        {
            violations.push(invalid(format!(
                "Value {value} {symbol} {label} {bound} ({context})"
            )));
        }
    }
    let exclusive = [
        (&facets.min_exclusive, Ordering::Greater, "<=", "exclusive minimum"),
        (&facets.max_exclusive, Ordering::Less, ">=", "exclusive maximum"),
    ];
    for (bound, required, symbol, label) in exclusive {
        if let Some(bound) = bound
            && let Some(ordering) = boundary_order(value, bound, ty)
            && ordering != required
        {
            violations.push(invalid(format!(
                "Value {value} {symbol} {label} {bound} ({context})"
            )));
        }
    }

    if facets.total_digits.is_none() && facets.fraction_digits.is_none() {
        return;
    }
    let Ok(decimal) = BigDecimal::from_str(value.trim()) else {
        return;
    };
    if let Some(max) = facets.total_digits {
        let digits = total_digits(&decimal);
        if digits > max {
            violations.push(invalid(format!(
                "Total digits {digits} > maximum {max} ({context})"
            )));
        }
    }
    if let Some(max) = facets.fraction_digits {
        let digits = fraction_digits(&decimal);
        if digits > max {
            violations.push(invalid(format!(
                "Fraction digits {digits} > maximum {max} ({context})"
            )));
        }
    }
}

/// Order of `value` relative to a boundary facet. Date, time, duration and
/// float types compare in their value space; anything else compares as
/// decimals. `None` when the two cannot be ordered.
fn boundary_order(value: &str, bound: &str, ty: TypeRef) -> Option<Ordering> {
    match ty.as_value_type() {
        TypeRef::Xsd(xsd) if !xsd.is_decimal() && facet_applies_to(FacetKind::Boundary, xsd) => {
            compare_typed(value, bound, TypeRef::Xsd(xsd)).ok()
        }
        _ => {
            let value = BigDecimal::from_str(value.trim()).ok()?;
            let bound = BigDecimal::from_str(bound.trim()).ok()?;
            Some(value.cmp(&bound))
        }
    }
}

/// Significant digits, leading zeros and sign excluded; at least 1.
pub fn total_digits(decimal: &BigDecimal) -> u64 {
    let (unscaled, _) = decimal.as_bigint_and_exponent();
    let digits = unscaled.magnitude().to_string();
    let significant = digits.trim_start_matches('0').len() as u64;
    significant.max(1)
}

/// Digits after the decimal point as written.
pub fn fraction_digits(decimal: &BigDecimal) -> u64 {
    let (_, scale) = decimal.as_bigint_and_exponent();
    u64::try_from(scale).unwrap_or(0)
}
