//! Scalar type engine: type resolution, lexical validation, ordering and
//! facet applicability.
//!
//! A constraint type is either a prefixed XML Schema built-in (the prefix
//! must be bound to the XML Schema namespace), one of the core dimensions,
//! or the `decimals` pseudo-type.

mod compare;
mod dimension;
mod temporal;
mod xsd;

pub use compare::{Incomparable, compare, compare_typed, values_equal};
pub use dimension::{CoreDimension, PeriodKind, period_has_timezone, period_kind, validate_qname};
pub use temporal::{XsdDuration, has_timezone};
pub use xsd::XsdType;

use tc_model::Namespaces;
use tc_model::names::{DECIMALS_TYPE, XSD_NAMESPACE};

/// What a declared type name denotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Xsd(XsdType),
    Dimension(CoreDimension),
    /// The `decimals` pseudo-type.
    Decimals,
    /// Not a recognised type.
    Unknown,
}

impl TypeRef {
    pub fn xsd(self) -> Option<XsdType> {
        match self {
            Self::Xsd(ty) => Some(ty),
            _ => None,
        }
    }

    /// `decimals` behaves as `xs:integer` for lexical and facet purposes.
    pub fn as_value_type(self) -> Self {
        match self {
            Self::Decimals => Self::Xsd(XsdType::Integer),
            other => other,
        }
    }

    /// `period` or one of the optionally-timezoned date/time types.
    pub fn accepts_time_zone(self) -> bool {
        match self {
            Self::Dimension(CoreDimension::Period) => true,
            Self::Xsd(ty) => ty.is_optionally_timezoned(),
            _ => false,
        }
    }
}

/// Resolve a declared type name against the schema's namespace bindings.
pub fn resolve_type(type_name: &str, namespaces: &Namespaces) -> TypeRef {
    if type_name == DECIMALS_TYPE {
        return TypeRef::Decimals;
    }
    if let Some(dimension) = CoreDimension::from_name(type_name) {
        return TypeRef::Dimension(dimension);
    }
    let Some((prefix, local)) = type_name.split_once(':') else {
        return TypeRef::Unknown;
    };
    if namespaces.resolve(prefix) != Some(XSD_NAMESPACE) {
        return TypeRef::Unknown;
    }
    XsdType::from_local_name(local).map_or(TypeRef::Unknown, TypeRef::Xsd)
}

/// A namespace-qualified XML Schema built-in type.
pub fn is_builtin_type(type_name: &str, namespaces: &Namespaces) -> bool {
    matches!(resolve_type(type_name, namespaces), TypeRef::Xsd(_))
}

/// Any type usable in a constraint: built-in, core dimension or `decimals`.
pub fn is_known_type(type_name: &str, namespaces: &Namespaces) -> bool {
    resolve_type(type_name, namespaces) != TypeRef::Unknown
}

/// Check `value` against the lexical rules of `type_name`.
pub fn validate_lexical(value: &str, type_name: &str, namespaces: &Namespaces) -> Result<(), String> {
    validate_typed(value, resolve_type(type_name, namespaces), namespaces)
        .map_err(|message| message.unwrap_or_else(|| format!("Unknown type '{type_name}'")))
}

/// Lexical check against a resolved type. `Err(None)` for an unknown type.
pub fn validate_typed(
    value: &str,
    ty: TypeRef,
    namespaces: &Namespaces,
) -> Result<(), Option<String>> {
    match ty {
        TypeRef::Xsd(ty) => xsd::validate_lexical(value, ty).map_err(Some),
        TypeRef::Dimension(dimension) => {
            dimension::validate_dimension(value, dimension, namespaces).map_err(Some)
        }
        TypeRef::Decimals => xsd::validate_lexical(value, XsdType::Integer)
            .map_err(|_| Some(format!("Invalid decimals value '{value}'"))),
        TypeRef::Unknown => Err(None),
    }
}

/// Facet families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacetKind {
    /// `length`, `minLength`, `maxLength`.
    Length,
    /// The inclusive and exclusive bounds.
    Boundary,
    /// `totalDigits`, `fractionDigits`.
    Digits,
}

impl FacetKind {
    pub fn of(facet: &str) -> Option<Self> {
        match facet {
            "length" | "minLength" | "maxLength" => Some(Self::Length),
            "minInclusive" | "maxInclusive" | "minExclusive" | "maxExclusive" => {
                Some(Self::Boundary)
            }
            "totalDigits" | "fractionDigits" => Some(Self::Digits),
            _ => None,
        }
    }
}

/// Whether a facet may constrain the given type.
pub fn facet_applicable(facet: &str, type_name: &str, namespaces: &Namespaces) -> bool {
    let Some(kind) = FacetKind::of(facet) else {
        return false;
    };
    match resolve_type(type_name, namespaces).as_value_type() {
        TypeRef::Xsd(ty) => facet_applies_to(kind, ty),
        _ => false,
    }
}

pub fn facet_applies_to(kind: FacetKind, ty: XsdType) -> bool {
    match kind {
        FacetKind::Length => {
            ty.is_string_family()
                || matches!(
                    ty,
                    XsdType::AnyUri
                        | XsdType::QName
                        | XsdType::Notation
                        | XsdType::HexBinary
                        | XsdType::Base64Binary
                )
        }
        FacetKind::Boundary => {
            ty.is_decimal()
                || ty.is_float()
                || ty.is_duration()
                || matches!(
                    ty,
                    XsdType::Date
                        | XsdType::Time
                        | XsdType::DateTime
                        | XsdType::DateTimeStamp
                        | XsdType::GYear
                        | XsdType::GYearMonth
                        | XsdType::GMonth
                        | XsdType::GMonthDay
                        | XsdType::GDay
                )
        }
        FacetKind::Digits => ty.is_decimal(),
    }
}
