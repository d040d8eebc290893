//! Translation of raw HTTP query parameters into a [`ReadPlan`].
//!
//! The translation is total: any flat string map produces a usable plan.
//! Unrecognized keys become equality filters, malformed numerics fall back
//! to defaults, and reserved parameters are never interpreted as fields.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use crate::query::plan::{FilterExpr, Order, Projection, ReadPlan, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::store::document::Value;

/// Parameters claimed by the plan itself, stripped before filtering.
pub const RESERVED_PARAMS: [&str; 4] = ["page", "sort", "limit", "fields"];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_PARAMS.contains(&key)
}

impl ReadPlan {
    /// Builds a plan from a flat query-parameter map. Never fails.
    pub fn from_params(params: &BTreeMap<String, String>) -> ReadPlan {
        let mut plan = ReadPlan {
            predicate: None,
            sort: parse_sort(params.get("sort").map(String::as_str)),
            projection: parse_fields(params.get("fields").map(String::as_str)),
            page: parse_positive(params.get("page").map(String::as_str), DEFAULT_PAGE),
            limit: parse_positive(params.get("limit").map(String::as_str), DEFAULT_PAGE_SIZE),
        };

        for (key, raw) in params {
            if is_reserved(key) {
                continue;
            }
            plan.predicate = FilterExpr::merge(
                plan.predicate.take(),
                Some(parse_constraint(key, raw)),
            );
        }

        plan
    }
}

/// `price[gte]=100` style keys become comparison constraints; everything
/// else is an equality constraint. An unrecognized operator token degrades
/// to equality on the raw key, which matches nothing rather than failing.
fn parse_constraint(key: &str, raw: &str) -> FilterExpr {
    let value = parse_literal(raw);
    if let Some((field, op)) = split_bracket_key(key) {
        match op {
            "gte" => return FilterExpr::Gte(field.to_string(), value),
            "gt" => return FilterExpr::Gt(field.to_string(), value),
            "lte" => return FilterExpr::Lte(field.to_string(), value),
            "lt" => return FilterExpr::Lt(field.to_string(), value),
            _ => {}
        }
    }
    FilterExpr::Eq(key.to_string(), value)
}

fn split_bracket_key(key: &str) -> Option<(&str, &str)> {
    let open = key.find('[')?;
    if !key.ends_with(']') || open == 0 {
        return None;
    }
    Some((&key[..open], &key[open + 1..key.len() - 1]))
}

/// Literal coercion order: integer, float, boolean, text.
fn parse_literal(raw: &str) -> Value {
    if let Ok(v) = raw.parse::<i64>() {
        return Value::Integer(v);
    }
    if let Ok(v) = raw.parse::<f64>() {
        if v.is_finite() {
            return Value::Float(v);
        }
    }
    match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => Value::Text(raw.to_string()),
    }
}

fn parse_sort(raw: Option<&str>) -> Vec<(String, Order)> {
    let Some(raw) = raw else {
        return ReadPlan::default().sort;
    };
    let keys: Vec<(String, Order)> = raw
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty() && *field != "-")
        .map(|field| match field.strip_prefix('-') {
            Some(stripped) => (stripped.to_string(), Order::Desc),
            None => (field.to_string(), Order::Asc),
        })
        .collect();
    if keys.is_empty() {
        return ReadPlan::default().sort;
    }
    keys
}

fn parse_fields(raw: Option<&str>) -> Projection {
    let Some(raw) = raw else {
        return Projection::DefaultExclude;
    };
    let fields: BTreeSet<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect();
    if fields.is_empty() {
        return Projection::DefaultExclude;
    }
    Projection::Include(fields)
}

/// Positive-integer coercion with a fallback default; `0`, negatives and
/// non-numeric input all recover to the default instead of failing.
fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|raw| raw.trim().parse::<u64>().ok())
        .filter(|v| *v >= 1)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use super::{is_reserved, ReadPlan, RESERVED_PARAMS};
    use crate::query::plan::{FilterExpr, Order, Projection};
    use crate::store::document::Value;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn filter_fields(expr: &FilterExpr, out: &mut Vec<String>) {
        match expr {
            FilterExpr::Eq(f, _)
            | FilterExpr::Ne(f, _)
            | FilterExpr::Gt(f, _)
            | FilterExpr::Gte(f, _)
            | FilterExpr::Lt(f, _)
            | FilterExpr::Lte(f, _) => out.push(f.clone()),
            FilterExpr::And(a, b) => {
                filter_fields(a, out);
                filter_fields(b, out);
            }
        }
    }

    #[test]
    fn reserved_keys_never_become_filters() {
        let plan = ReadPlan::from_params(&params(&[
            ("page", "2"),
            ("sort", "price"),
            ("limit", "10"),
            ("fields", "name"),
            ("difficulty", "easy"),
        ]));
        let mut fields = Vec::new();
        if let Some(expr) = &plan.predicate {
            filter_fields(expr, &mut fields);
        }
        assert_eq!(fields, vec!["difficulty".to_string()]);
    }

    #[test]
    fn bracket_operators_become_comparisons() {
        let plan = ReadPlan::from_params(&params(&[("price[gte]", "100")]));
        assert_eq!(
            plan.predicate,
            Some(FilterExpr::Gte("price".into(), Value::Integer(100)))
        );
    }

    #[test]
    fn multiple_operators_on_one_field_combine_conjunctively() {
        let plan = ReadPlan::from_params(&params(&[
            ("price[gte]", "100"),
            ("price[lte]", "800.5"),
        ]));
        let mut fields = Vec::new();
        filter_fields(plan.predicate.as_ref().expect("predicate"), &mut fields);
        assert_eq!(fields, vec!["price".to_string(), "price".to_string()]);
    }

    #[test]
    fn unknown_bracket_operator_degrades_to_equality_on_raw_key() {
        let plan = ReadPlan::from_params(&params(&[("price[near]", "100")]));
        assert_eq!(
            plan.predicate,
            Some(FilterExpr::Eq("price[near]".into(), Value::Integer(100)))
        );
    }

    #[test]
    fn bare_keys_are_equality_with_coerced_literals() {
        let plan = ReadPlan::from_params(&params(&[
            ("difficulty", "easy"),
            ("secretTour", "false"),
            ("ratingsAverage", "4.7"),
        ]));
        let mut fields = Vec::new();
        filter_fields(plan.predicate.as_ref().expect("predicate"), &mut fields);
        fields.sort();
        assert_eq!(fields, vec!["difficulty", "ratingsAverage", "secretTour"]);
    }

    #[test]
    fn sort_parses_direction_prefixes() {
        let plan = ReadPlan::from_params(&params(&[("sort", "-ratingsAverage,price")]));
        assert_eq!(
            plan.sort,
            vec![
                ("ratingsAverage".to_string(), Order::Desc),
                ("price".to_string(), Order::Asc),
            ]
        );
    }

    #[test]
    fn missing_sort_defaults_to_created_at_descending() {
        let plan = ReadPlan::from_params(&params(&[("duration", "5")]));
        assert_eq!(plan.sort, vec![("createdAt".to_string(), Order::Desc)]);
    }

    #[test]
    fn fields_parse_as_inclusion_projection() {
        let plan = ReadPlan::from_params(&params(&[("fields", "name,price , summary")]));
        match plan.projection {
            Projection::Include(fields) => {
                assert!(fields.contains("name"));
                assert!(fields.contains("price"));
                assert!(fields.contains("summary"));
            }
            other => panic!("expected inclusion projection, got {other:?}"),
        }
    }

    #[test]
    fn pagination_window_is_computed_from_page_and_limit() {
        let plan = ReadPlan::from_params(&params(&[("page", "2"), ("limit", "10")]));
        assert_eq!(plan.skip(), 10);
        assert_eq!(plan.limit, 10);
    }

    #[test]
    fn malformed_page_falls_back_to_defaults() {
        let plan = ReadPlan::from_params(&params(&[
            ("page", "abc"),
            ("limit", "-3"),
        ]));
        assert_eq!(plan.page, 1);
        assert_eq!(plan.limit, 100);
    }

    #[test]
    fn zero_page_recovers_to_first_page() {
        let plan = ReadPlan::from_params(&params(&[("page", "0")]));
        assert_eq!(plan.page, 1);
    }

    proptest! {
        #[test]
        fn reserved_params_never_appear_as_filter_fields(
            mut entries in prop::collection::btree_map("[a-z]{1,12}", "[a-z0-9.]{0,8}", 0..8),
        ) {
            for reserved in RESERVED_PARAMS {
                entries.insert(reserved.to_string(), "1".to_string());
            }
            let plan = ReadPlan::from_params(&entries);
            let mut fields = Vec::new();
            if let Some(expr) = &plan.predicate {
                filter_fields(expr, &mut fields);
            }
            for reserved in RESERVED_PARAMS {
                prop_assert!(!fields.iter().any(|f| f == reserved));
            }
        }

        #[test]
        fn translation_is_total(
            entries in prop::collection::btree_map(".{0,16}", ".{0,16}", 0..8),
        ) {
            let plan = ReadPlan::from_params(&entries);
            prop_assert!(plan.page >= 1);
            prop_assert!(plan.limit >= 1);
        }
    }

    #[test]
    fn reserved_list_is_exactly_the_plan_parameters() {
        for key in ["page", "sort", "limit", "fields"] {
            assert!(is_reserved(key));
        }
        assert!(!is_reserved("price"));
    }
}
