//! Issue code taxonomy and report tallies.

use tc_model::{Category, Code, Issue, Severity, ValidationReport};

#[test]
fn code_listing_is_stable() {
    let listing = Code::ALL
        .iter()
        .map(|code| code.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    insta::assert_snapshot!(listing, @r"
    tcme:invalidNamespacePrefix
    tcme:invalidJSONStructure
    tcme:misplacedOrUnknownProperty
    tcme:invalidCommentColumnConstraint
    tcme:invalidTypeConstraint
    tcme:illegalAllowedValue
    tcme:unknownTimeZone
    tcme:illegalPeriodType
    tcme:unknownPeriodType
    tcme:illegalDurationType
    tcme:unknownDurationType
    tcme:invalidLengthType
    tcme:invalidBoundaryType
    tcme:invalidDigitsType
    tcme:duplicateKeyName
    tcme:illegalUniqueKeyField
    tcme:illegalReferenceKeyField
    tcme:invalidKeySeverity
    tcme:inconsistentSharedKeySeverity
    tcme:inconsistentSharedKeySorting
    tcme:inconsistentSharedKeyFields
    tcme:invalidKeyIdentifier
    tcme:invalidReferenceKey
    tcme:inconsistentReferencedFieldType
    tcme:columnParameterTypeConflict
    tcme:missingKeyProperty
    tcme:unknownUniqueKey
    tcme:inconsistentColumnOrderDefinition
    tcre:invalidValue
    tcre:invalidBoundaryValue
    tcre:missingTimeZone
    tcre:unexpectedTimeZone
    tcre:invalidPeriodType
    tcre:invalidDurationType
    tcre:missingValue
    tcre:uniqueKeyViolation
    tcre:uniqueKeyNilViolation
    tcre:referenceKeyViolation
    tcre:keySortViolation
    tcre:incomparableDurations
    tcre:incomparablePeriods
    tcre:minTablesViolation
    tcre:maxTablesViolation
    tcre:minTableRowsViolation
    tcre:maxTableRowsViolation
    tcre:invalidColumnOrder
    tcl:inconsistentType
    tcl:invalidAllowedValue
    tc:missingCsv
    tc:validationFailed
    ");
}

#[test]
fn codes_parse_back_and_match_their_category() {
    for &code in Code::ALL {
        assert_eq!(Code::parse(code.as_str()), Some(code));
        let prefix = code.as_str().split(':').next().unwrap_or_default();
        let expected = match prefix {
            "tcme" => Category::Metadata,
            "tcl" => Category::Lint,
            "tc" => Category::Processing,
            _ => Category::Report,
        };
        assert_eq!(code.category(), expected, "{code}");
    }
    assert_eq!(Code::parse("tcre:noSuchCode"), None);
}

#[test]
fn issue_serializes_with_structured_arguments() {
    let issue = Issue::warning(Code::UniqueKeyNilViolation, "all key fields are nil")
        .with_table("facts")
        .with_row(3)
        .with_key("pk");
    insta::assert_json_snapshot!(issue, @r#"
    {
      "code": "tcre:uniqueKeyNilViolation",
      "severity": "warning",
      "message": "all key fields are nil",
      "table": "facts",
      "row": 3,
      "key": "pk"
    }
    "#);
}

#[test]
fn tally_counts_everything_but_keeps_at_most_the_limit() {
    let mut report = ValidationReport::default();
    let kept: Vec<bool> = (0..3)
        .map(|_| report.tally(Code::InvalidValue, Severity::Error, Some(2)))
        .collect();
    assert_eq!(kept, vec![true, true, false]);
    assert!(report.tally(Code::MissingCsv, Severity::Warning, Some(2)));

    assert_eq!(report.error_count, 3);
    assert_eq!(report.warning_count, 1);
    assert_eq!(report.suppressed, 1);
    assert_eq!(report.count(Code::InvalidValue), 3);
    assert_eq!(report.count(Code::KeySortViolation), 0);
    assert!(report.has_errors());
}

#[test]
fn severity_parses_declared_values_only() {
    assert_eq!(Severity::parse("error"), Some(Severity::Error));
    assert_eq!(Severity::parse("warning"), Some(Severity::Warning));
    assert_eq!(Severity::parse("fatal"), None);
}
