//! Comparison and coercion rules for [`FieldValue`]s.
//!
//! | left            | right            | compared as                         |
//! |-----------------|------------------|-------------------------------------|
//! | number          | number           | numbers                             |
//! | number          | numeric string   | numbers                             |
//! | date            | date / date-like | dates                               |
//! | date-like str   | date-like str    | dates                               |
//! | string          | string           | strings (byte order)                |
//! | boolean         | boolean / "true" | booleans (`false < true`)           |
//! | list / mapping  | same shape       | structural equality, no ordering    |
//! | anything else   |                  | type mismatch                       |
//!
//! Missing values never satisfy a comparison.

use std::cmp::Ordering;

use serde::Serialize;

use super::error::EvalError;
use crate::frontmatter::{FieldValue, parse_date};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CmpOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CmpOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            CmpOp::Eq => ordering == Ordering::Equal,
            CmpOp::Ne => ordering != Ordering::Equal,
            CmpOp::Gt => ordering == Ordering::Greater,
            CmpOp::Ge => ordering != Ordering::Less,
            CmpOp::Lt => ordering == Ordering::Less,
            CmpOp::Le => ordering != Ordering::Greater,
        }
    }
}

/// Evaluate `left op right`.
pub fn compare(op: CmpOp, left: &FieldValue, right: &FieldValue) -> Result<bool, EvalError> {
    if left.is_missing() || right.is_missing() {
        return Ok(false);
    }

    match (left, right) {
        (FieldValue::List(_), FieldValue::List(_))
        | (FieldValue::Mapping(_), FieldValue::Mapping(_)) => match op {
            CmpOp::Eq => Ok(values_equal(left, right)),
            CmpOp::Ne => Ok(!values_equal(left, right)),
            _ => Err(mismatch(left, right)),
        },
        _ => scalar_cmp(left, right).map(|ordering| op.accepts(ordering)),
    }
}

/// Order two scalar values under the coercion rules.
pub fn scalar_cmp(left: &FieldValue, right: &FieldValue) -> Result<Ordering, EvalError> {
    use FieldValue::{Boolean, Date, Number, String};

    match (left, right) {
        (Number(a), Number(b)) => Some(a.total_cmp(b)),
        (Number(a), String(s)) => parse_number(s).map(|b| a.total_cmp(&b)),
        (String(s), Number(b)) => parse_number(s).map(|a| a.total_cmp(b)),
        (Date(a), Date(b)) => Some(a.cmp(b)),
        (Date(a), String(s)) => parse_date(s).map(|b| a.cmp(&b)),
        (String(s), Date(b)) => parse_date(s).map(|a| a.cmp(b)),
        (String(a), String(b)) => match (parse_date(a), parse_date(b)) {
            (Some(da), Some(db)) => Some(da.cmp(&db)),
            _ => Some(a.cmp(b)),
        },
        (Boolean(a), Boolean(b)) => Some(a.cmp(b)),
        (Boolean(a), String(s)) => parse_bool(s).map(|b| a.cmp(&b)),
        (String(s), Boolean(b)) => parse_bool(s).map(|a| a.cmp(b)),
        _ => None,
    }
    .ok_or_else(|| mismatch(left, right))
}

/// Structural equality with scalar coercion; mismatched types are unequal.
pub fn values_equal(left: &FieldValue, right: &FieldValue) -> bool {
    match (left, right) {
        (FieldValue::Missing, FieldValue::Missing) => true,
        (FieldValue::List(a), FieldValue::List(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| values_equal(x, y))
        }
        (FieldValue::Mapping(a), FieldValue::Mapping(b)) => {
            a.len() == b.len()
                && a.iter().all(|(k, v)| b.get(k).is_some_and(|w| values_equal(v, w)))
        }
        _ => scalar_cmp(left, right) == Ok(Ordering::Equal),
    }
}

/// `contains(haystack, needle)`.
pub fn contains(haystack: &FieldValue, needle: &FieldValue) -> Result<bool, EvalError> {
    if haystack.is_missing() || needle.is_missing() {
        return Ok(false);
    }

    match haystack {
        FieldValue::List(items) => Ok(items.iter().any(|item| values_equal(item, needle))),
        FieldValue::String(s) => Ok(scalar_text(needle).is_some_and(|n| s.contains(&n))),
        FieldValue::Mapping(map) => {
            Ok(scalar_text(needle).is_some_and(|key| map.contains_key(&key)))
        }
        other => Err(EvalError::NotAContainer(other.type_name())),
    }
}

/// Total order used for SORT. Missing values are handled by the caller.
///
/// Each value is normalised on its own (numeric strings sort as numbers,
/// date-like strings as dates) so the order stays transitive across mixed
/// types: booleans, numbers, dates, strings, then lists and mappings.
pub fn sort_cmp(left: &FieldValue, right: &FieldValue) -> Ordering {
    let (a, b) = (SortKey::of(left), SortKey::of(right));
    a.rank().cmp(&b.rank()).then_with(|| match (a, b) {
        (SortKey::Bool(x), SortKey::Bool(y)) => x.cmp(&y),
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Date(x), SortKey::Date(y)) => x.cmp(&y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        _ => Ordering::Equal,
    })
}

enum SortKey<'a> {
    Bool(bool),
    Number(f64),
    Date(chrono::NaiveDateTime),
    Text(&'a str),
    List,
    Mapping,
    Missing,
}

impl<'a> SortKey<'a> {
    fn of(value: &'a FieldValue) -> Self {
        match value {
            FieldValue::Boolean(b) => SortKey::Bool(*b),
            FieldValue::Number(n) => SortKey::Number(*n),
            FieldValue::Date(d) => SortKey::Date(*d),
            FieldValue::String(s) => parse_number(s)
                .map(SortKey::Number)
                .or_else(|| parse_date(s).map(SortKey::Date))
                .unwrap_or(SortKey::Text(s)),
            FieldValue::List(_) => SortKey::List,
            FieldValue::Mapping(_) => SortKey::Mapping,
            FieldValue::Missing => SortKey::Missing,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            SortKey::Bool(_) => 0,
            SortKey::Number(_) => 1,
            SortKey::Date(_) => 2,
            SortKey::Text(_) => 3,
            SortKey::List => 4,
            SortKey::Mapping => 5,
            SortKey::Missing => 6,
        }
    }
}

fn scalar_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::String(s) => Some(s.clone()),
        FieldValue::Number(n) => Some(crate::render::format_number(*n)),
        FieldValue::Boolean(b) => Some(b.to_string()),
        FieldValue::Date(d) => Some(crate::frontmatter::value::format_date(d)),
        _ => None,
    }
}

/// Parse a numeric string. `inf` and `NaN` stay strings.
fn parse_number(s: &str) -> Option<f64> {
    let s = s.trim();
    let numeric_start = s.starts_with(|c: char| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'));
    if numeric_start { s.parse().ok().filter(|n: &f64| n.is_finite()) } else { None }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn mismatch(left: &FieldValue, right: &FieldValue) -> EvalError {
    EvalError::TypeMismatch { left: left.type_name(), right: right.type_name() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn s(v: &str) -> FieldValue {
        FieldValue::String(v.to_string())
    }

    fn n(v: f64) -> FieldValue {
        FieldValue::Number(v)
    }

    fn date(v: &str) -> FieldValue {
        FieldValue::Date(parse_date(v).unwrap())
    }

    #[rstest]
    #[case(CmpOp::Gt, n(5.0), n(3.0), true)]
    #[case(CmpOp::Gt, n(3.0), n(3.0), false)]
    #[case(CmpOp::Ge, n(3.0), n(3.0), true)]
    #[case(CmpOp::Eq, n(3.0), s("3"), true)]
    #[case(CmpOp::Lt, s("10"), n(9.0), false)]
    #[case(CmpOp::Lt, date("2024-01-01"), s("2024-02-01"), true)]
    #[case(CmpOp::Gt, s("2024-01-10"), s("2024-01-09"), true)]
    #[case(CmpOp::Lt, s("apple"), s("banana"), true)]
    #[case(CmpOp::Eq, FieldValue::Boolean(true), s("true"), true)]
    #[case(CmpOp::Ne, s("a"), s("b"), true)]
    #[case(CmpOp::Le, date("2024-05-05T10:00"), date("2024-05-05"), false)]
    fn comparisons(
        #[case] op: CmpOp,
        #[case] left: FieldValue,
        #[case] right: FieldValue,
        #[case] expected: bool,
    ) {
        assert_eq!(compare(op, &left, &right), Ok(expected));
    }

    #[test]
    fn missing_never_matches() {
        for op in [CmpOp::Eq, CmpOp::Ne, CmpOp::Gt, CmpOp::Lt] {
            assert_eq!(compare(op, &FieldValue::Missing, &n(1.0)), Ok(false));
            assert_eq!(compare(op, &n(1.0), &FieldValue::Missing), Ok(false));
        }
    }

    #[test]
    fn list_against_number_is_a_mismatch() {
        let list = FieldValue::List(vec![n(1.0)]);
        assert_eq!(
            compare(CmpOp::Gt, &list, &n(1.0)),
            Err(EvalError::TypeMismatch { left: "list", right: "number" })
        );
        assert!(compare(CmpOp::Eq, &list, &n(1.0)).is_err());
        assert!(compare(CmpOp::Lt, &s("abc"), &n(1.0)).is_err());
    }

    #[test]
    fn list_equality_is_structural() {
        let a = FieldValue::List(vec![s("x"), n(1.0)]);
        let b = FieldValue::List(vec![s("x"), s("1")]);
        assert_eq!(compare(CmpOp::Eq, &a, &b), Ok(true));
        assert!(compare(CmpOp::Gt, &a, &b).is_err());
    }

    #[test]
    fn contains_semantics() {
        let tags = FieldValue::List(vec![s("rust"), s("cli")]);
        assert_eq!(contains(&tags, &s("cli")), Ok(true));
        assert_eq!(contains(&tags, &s("go")), Ok(false));
        assert_eq!(contains(&s("hello world"), &s("lo w")), Ok(true));
        assert_eq!(contains(&FieldValue::Missing, &s("x")), Ok(false));
        assert_eq!(contains(&n(3.0), &s("3")), Err(EvalError::NotAContainer("number")));
    }

    #[test]
    fn sort_order_is_total() {
        let mut values = vec![s("b"), n(2.0), s("a"), FieldValue::Boolean(true), n(1.0)];
        values.sort_by(sort_cmp);
        assert_eq!(values, vec![FieldValue::Boolean(true), n(1.0), n(2.0), s("a"), s("b")]);

        let mut mixed = vec![s("10"), s("9"), n(9.5), s("2024-01-01"), s("x")];
        mixed.sort_by(sort_cmp);
        assert_eq!(mixed, vec![s("9"), n(9.5), s("10"), s("2024-01-01"), s("x")]);
    }
}
