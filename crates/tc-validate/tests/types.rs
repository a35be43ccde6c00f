//! Type resolution, lexical checks and value-space comparison.

use std::cmp::Ordering;
use std::str::FromStr;

use bigdecimal::BigDecimal;
use proptest::prelude::*;
use tc_model::Namespaces;
use tc_model::names::XSD_NAMESPACE;
use tc_validate::types::{
    self, CoreDimension, Incomparable, PeriodKind, TypeRef, XsdType, compare, period_kind,
    values_equal,
};
use tc_validate::value::{fraction_digits, total_digits};

fn namespaces() -> Namespaces {
    let mut namespaces = Namespaces::new();
    namespaces.insert("xs", XSD_NAMESPACE);
    namespaces.insert("xsd", XSD_NAMESPACE);
    namespaces.insert("eg", "http://example.com/taxonomy");
    namespaces
}

#[test]
fn type_names_resolve_through_bound_prefixes() {
    let ns = namespaces();
    assert_eq!(
        types::resolve_type("xs:decimal", &ns),
        TypeRef::Xsd(XsdType::Decimal)
    );
    assert_eq!(
        types::resolve_type("xsd:decimal", &ns),
        TypeRef::Xsd(XsdType::Decimal)
    );
    assert_eq!(types::resolve_type("eg:decimal", &ns), TypeRef::Unknown);
    assert_eq!(types::resolve_type("zz:decimal", &ns), TypeRef::Unknown);
    assert_eq!(types::resolve_type("decimal", &ns), TypeRef::Unknown);
    assert_eq!(types::resolve_type("decimals", &ns), TypeRef::Decimals);
    assert_eq!(
        types::resolve_type("period", &ns),
        TypeRef::Dimension(CoreDimension::Period)
    );
    assert!(types::is_builtin_type("xs:gYear", &ns));
    assert!(!types::is_builtin_type("concept", &ns));
    assert!(types::is_known_type("concept", &ns));
}

#[test]
fn lexical_checks_follow_the_declared_type() {
    let ns = namespaces();
    let valid = [
        ("12.50", "xs:decimal"),
        ("-7", "xs:integer"),
        ("127", "xs:byte"),
        ("0", "xs:nonNegativeInteger"),
        ("1.5E3", "xs:double"),
        ("INF", "xs:float"),
        ("1", "xs:boolean"),
        ("2024-02-29", "xs:date"),
        ("2024-06-30T23:59:59+02:00", "xs:dateTime"),
        ("P1Y2M3DT4H", "xs:duration"),
        ("P2M", "xs:yearMonthDuration"),
        ("PT36H", "xs:dayTimeDuration"),
        ("eg:Assets", "xs:QName"),
        ("0FB7", "xs:hexBinary"),
        ("aGVsbG8=", "xs:base64Binary"),
        ("eg:Assets", "concept"),
        ("-3", "decimals"),
        ("123456789012345678901234567890", "decimals"),
        ("2024", "xs:gYear"),
        ("2024Z", "xs:gYear"),
        ("--12", "xs:gMonth"),
        ("2024-06+02:00", "xs:gYearMonth"),
    ];
    for (value, ty) in valid {
        assert_eq!(types::validate_lexical(value, ty, &ns), Ok(()), "{value} as {ty}");
    }

    let invalid = [
        ("1e3", "xs:decimal"),
        ("1.5", "xs:integer"),
        ("128", "xs:byte"),
        ("-1", "xs:nonNegativeInteger"),
        ("yes", "xs:boolean"),
        ("2023-02-29", "xs:date"),
        ("2024-01-01T10:00:00", "xs:dateTimeStamp"),
        ("P1DT", "xs:duration"),
        ("P1D", "xs:yearMonthDuration"),
        ("0FB", "xs:hexBinary"),
        ("zz:Assets", "concept"),
        ("INF", "decimals"),
        ("1.0", "decimals"),
        ("24", "xs:gYear"),
        ("2024-06", "xs:gYear"),
        ("12", "xs:gMonth"),
        ("--12-01", "xs:gMonth"),
    ];
    for (value, ty) in invalid {
        assert!(types::validate_lexical(value, ty, &ns).is_err(), "{value} as {ty}");
    }

    let unknown = types::validate_lexical("x", "eg:custom", &ns).unwrap_err();
    assert_eq!(unknown, "Unknown type 'eg:custom'");
}

#[test]
fn time_zone_applies_to_date_and_time_types() {
    for ty in [
        XsdType::Date,
        XsdType::Time,
        XsdType::DateTime,
        XsdType::GYearMonth,
        XsdType::GMonthDay,
        XsdType::GDay,
    ] {
        assert!(TypeRef::Xsd(ty).accepts_time_zone(), "{ty:?}");
    }
    for ty in [XsdType::GYear, XsdType::GMonth, XsdType::String] {
        assert!(!TypeRef::Xsd(ty).accepts_time_zone(), "{ty:?}");
    }
    assert!(TypeRef::Dimension(CoreDimension::Period).accepts_time_zone());
}

#[test]
fn numeric_types_compare_in_value_space() {
    let ns = namespaces();
    assert_eq!(compare("1.0", "1", "xs:decimal", &ns), Ok(Ordering::Equal));
    assert_eq!(compare("10", "9", "xs:integer", &ns), Ok(Ordering::Greater));
    assert_eq!(compare("10", "9", "xs:positiveInteger", &ns), Ok(Ordering::Greater));
    assert_eq!(compare("-2", "10", "decimals", &ns), Ok(Ordering::Less));
    assert_eq!(compare("1e2", "99.5", "xs:double", &ns), Ok(Ordering::Greater));
    assert_eq!(compare("INF", "1e308", "xs:float", &ns), Ok(Ordering::Greater));
    // strings compare by codepoint
    assert_eq!(compare("10", "9", "xs:string", &ns), Ok(Ordering::Less));
}

#[test]
fn unparsable_values_fall_back_to_collapsed_strings() {
    let ns = namespaces();
    assert_eq!(compare("abc", "abd", "xs:decimal", &ns), Ok(Ordering::Less));
    assert!(values_equal("a  b", " a b ", "xs:string", &ns));
    assert!(values_equal("x\ty", "x y", "xs:dateTime", &ns));
}

#[test]
fn temporal_values_compare_as_instants() {
    let ns = namespaces();
    assert_eq!(
        compare("2020-01-01T00:00:00Z", "2020-01-01T01:00:00+01:00", "xs:dateTime", &ns),
        Ok(Ordering::Equal)
    );
    assert_eq!(
        compare("2020-01-02", "2020-01-01", "xs:date", &ns),
        Ok(Ordering::Greater)
    );
    assert_eq!(compare("23:00:00", "24:00:00", "xs:time", &ns), Ok(Ordering::Less));
    assert!(values_equal("true", "1", "xs:boolean", &ns));
}

#[test]
fn durations_of_different_kinds_are_incomparable() {
    let ns = namespaces();
    assert_eq!(
        compare("P1Y", "P365D", "xs:duration", &ns),
        Err(Incomparable::Durations)
    );
    assert_eq!(
        compare("P1M", "P30D", "xs:duration", &ns),
        Err(Incomparable::Durations)
    );
    assert_eq!(compare("P1Y", "P13M", "xs:duration", &ns), Ok(Ordering::Less));
    assert_eq!(compare("PT24H", "P1D", "xs:duration", &ns), Ok(Ordering::Equal));
    assert_eq!(
        compare("P1Y2D", "P1Y1D", "xs:duration", &ns),
        Ok(Ordering::Greater)
    );
    assert_eq!(Incomparable::Durations.code().as_str(), "tcre:incomparableDurations");
}

#[test]
fn mixed_durations_always_order() {
    let ns = namespaces();
    assert_eq!(compare("P1M1D", "P31D", "xs:duration", &ns), Ok(Ordering::Equal));
    assert_eq!(compare("P1M1D", "P30D", "xs:duration", &ns), Ok(Ordering::Greater));
    assert_eq!(compare("P1Y2D", "P1M1D", "xs:duration", &ns), Ok(Ordering::Greater));
    assert_eq!(compare("P1M", "P1M1D", "xs:duration", &ns), Ok(Ordering::Less));
}

#[test]
fn instant_and_duration_periods_are_incomparable() {
    let ns = namespaces();
    assert_eq!(period_kind("2020-01-01@start"), PeriodKind::Instant);
    assert_eq!(period_kind("2020..2021"), PeriodKind::Duration);
    assert_eq!(period_kind("2020Q1"), PeriodKind::Duration);
    assert_eq!(
        compare("2020..2021", "2020-01-01@start", "period", &ns),
        Err(Incomparable::Periods)
    );
    assert_eq!(
        compare("2020-01-01@start", "2020..2021", "period", &ns),
        Err(Incomparable::Periods)
    );
    assert_eq!(
        compare("2020-01-01@end", "2020-01-01@start", "period", &ns),
        Ok(Ordering::Less)
    );
}

#[test]
fn digit_counts_ignore_sign_and_leading_zeros() {
    let digits = |text: &str| {
        let decimal = BigDecimal::from_str(text).unwrap();
        (total_digits(&decimal), fraction_digits(&decimal))
    };
    assert_eq!(digits("123.45"), (5, 2));
    assert_eq!(digits("-0.0012"), (2, 4));
    assert_eq!(digits("007"), (1, 0));
    assert_eq!(digits("0"), (1, 0));
    assert_eq!(digits("1.50"), (3, 2));
}

proptest! {
    #[test]
    fn decimal_comparison_is_reflexive_and_antisymmetric(
        a in -1_000_000_000i64..1_000_000_000,
        b in -1_000_000_000i64..1_000_000_000,
        scale in 0u32..6,
    ) {
        let ns = namespaces();
        let left = BigDecimal::new(a.into(), i64::from(scale)).to_string();
        let right = BigDecimal::new(b.into(), i64::from(scale)).to_string();

        prop_assert_eq!(compare(&left, &left, "xs:decimal", &ns), Ok(Ordering::Equal));
        let forward = compare(&left, &right, "xs:decimal", &ns).unwrap();
        let backward = compare(&right, &left, "xs:decimal", &ns).unwrap();
        prop_assert_eq!(forward, backward.reverse());
        prop_assert_eq!(forward, a.cmp(&b));
    }

    #[test]
    fn total_digits_never_counts_leading_zeros(value in 1u64..u64::MAX, zeros in 0usize..5) {
        let padded = format!("{}{value}", "0".repeat(zeros));
        let decimal = BigDecimal::from_str(&padded).unwrap();
        prop_assert_eq!(total_digits(&decimal), value.to_string().len() as u64);
        prop_assert_eq!(fraction_digits(&decimal), 0);
    }
}
