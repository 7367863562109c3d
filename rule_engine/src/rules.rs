//! Rule checks and the name -> check registry.
//!
//! Every rule is a plain function from a [`RuleContext`] to a
//! [`RuleOutcome`]; the [`Registry`] maps rule names to boxed checks so new
//! rules can be registered without touching any dispatcher.

use std::collections::HashMap;

use regex::Regex;
use serde_json::{Map, Value};

use crate::dates;

/// Everything a rule check can see: the field under validation, its value
/// (None when the key is absent from the input), the parsed rule arguments,
/// and the whole input map (for presence checks).
pub struct RuleContext<'a> {
    pub field: &'a str,
    pub value: Option<&'a Value>,
    pub args: &'a [String],
    pub data: &'a Map<String, Value>,
}

impl RuleContext<'_> {
    fn value_or_null(&self) -> &Value {
        self.value.unwrap_or(&Value::Null)
    }

    fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// Result of one rule applied to one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub valid: bool,
    pub message: String,
}

impl RuleOutcome {
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: String::new(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }
}

/// A single rule check.
pub trait RuleCheck: Send + Sync {
    fn check(&self, ctx: &RuleContext<'_>) -> RuleOutcome;
}

impl<F> RuleCheck for F
where
    F: Fn(&RuleContext<'_>) -> RuleOutcome + Send + Sync,
{
    fn check(&self, ctx: &RuleContext<'_>) -> RuleOutcome {
        self(ctx)
    }
}

/// Registry mapping rule names to their checks.
pub struct Registry {
    checks: HashMap<String, Box<dyn RuleCheck>>,
}

impl Registry {
    /// Empty registry with no rules.
    pub fn empty() -> Self {
        Self {
            checks: HashMap::new(),
        }
    }

    /// Registry loaded with the full default rule set.
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();

        registry.register("required", check_required);
        registry.register("email", check_email);
        registry.register("numeric", check_numeric);
        registry.register("integer", check_integer);
        registry.register("string", check_string);
        registry.register("array", check_array);
        registry.register("boolean", check_boolean);
        registry.register("accepted", check_accepted);
        registry.register("alpha", check_alpha);
        registry.register("alpha_numeric", check_alpha_numeric);
        registry.register("date", check_date);
        registry.register("size", check_size);
        registry.register("digits", check_digits);
        registry.register("digits_between", check_digits_between);
        registry.register("between", check_between);
        registry.register("max", check_max);
        registry.register("min", check_min);
        registry.register("regex", check_regex);
        registry.register("in", check_in);
        registry.register("not_in", check_not_in);
        registry.register("date_equals", check_date_equals);
        registry.register("after", check_after);
        registry.register("after_or_equal", check_after_or_equal);
        registry.register("before", check_before);
        registry.register("before_or_equal", check_before_or_equal);
        registry.register("date_age_minor", check_date_age_minor);
        registry.register("date_format", check_date_format);
        registry.register("only_date_format", check_only_date_format);

        registry
    }

    /// Register (or replace) a rule by name.
    pub fn register<C>(&mut self, name: impl Into<String>, check: C)
    where
        C: RuleCheck + 'static,
    {
        self.checks.insert(name.into(), Box::new(check));
    }

    pub fn get(&self, name: &str) -> Option<&dyn RuleCheck> {
        self.checks.get(name).map(Box::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ---- value helpers -------------------------------------------------------

/// Loose string cast: numbers render as decimal, true as "1", false and
/// null as "".
fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Character length of the stringified value; arrays count elements.
fn length_of(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        other => stringify(other).chars().count(),
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn is_numeric(value: &Value) -> bool {
    as_f64(value).is_some()
}

fn parse_bound(ctx: &RuleContext<'_>, index: usize) -> Result<f64, RuleOutcome> {
    ctx.arg(index)
        .and_then(|a| a.parse().ok())
        .ok_or_else(|| RuleOutcome::fail(format!("Rule on field {} is missing a numeric argument", ctx.field)))
}

// ---- rule checks ---------------------------------------------------------

fn check_required(ctx: &RuleContext<'_>) -> RuleOutcome {
    if !ctx.data.contains_key(ctx.field) {
        return RuleOutcome::fail(format!(
            "The {} field is required and must be present",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn check_email(ctx: &RuleContext<'_>) -> RuleOutcome {
    let value = stringify(ctx.value_or_null());
    let well_formed = match (value.find('@'), value.rfind('.')) {
        (Some(at), Some(dot)) => {
            at > 0
                && dot > at + 1
                && dot < value.len() - 1
                && !value.contains(char::is_whitespace)
                && value.matches('@').count() == 1
        }
        _ => false,
    };

    if !well_formed {
        return RuleOutcome::fail("Invalid email format");
    }
    RuleOutcome::pass()
}

fn check_numeric(ctx: &RuleContext<'_>) -> RuleOutcome {
    if !is_numeric(ctx.value_or_null()) {
        return RuleOutcome::fail(format!("The {} field must be a number", ctx.field));
    }
    RuleOutcome::pass()
}

fn check_integer(ctx: &RuleContext<'_>) -> RuleOutcome {
    let valid = matches!(ctx.value_or_null(), Value::Number(n) if n.is_i64() || n.is_u64());
    if !valid {
        return RuleOutcome::fail(format!("The {} field must be an integer", ctx.field));
    }
    RuleOutcome::pass()
}

fn check_string(ctx: &RuleContext<'_>) -> RuleOutcome {
    if !ctx.value_or_null().is_string() {
        return RuleOutcome::fail(format!("The {} field must be a string", ctx.field));
    }
    RuleOutcome::pass()
}

fn check_array(ctx: &RuleContext<'_>) -> RuleOutcome {
    if !ctx.value_or_null().is_array() {
        return RuleOutcome::fail(format!("The {} field must be an array", ctx.field));
    }
    RuleOutcome::pass()
}

fn check_boolean(ctx: &RuleContext<'_>) -> RuleOutcome {
    let valid = match ctx.value_or_null() {
        Value::Bool(_) => true,
        Value::Number(n) => n.as_i64() == Some(0) || n.as_i64() == Some(1),
        Value::String(s) => s == "0" || s == "1",
        _ => false,
    };
    if !valid {
        return RuleOutcome::fail(format!(
            "The {} field must be given as true / false",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn check_accepted(ctx: &RuleContext<'_>) -> RuleOutcome {
    let valid = match ctx.value_or_null() {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.as_str(), "yes" | "on" | "1"),
        _ => false,
    };
    if !valid {
        return RuleOutcome::fail(format!(
            "The {} field must be yes, on, 1 or true",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn check_alpha(ctx: &RuleContext<'_>) -> RuleOutcome {
    const ACCENTED: &str = "áàâãéèêíïóôõöúçñÁÀÂÃÉÈÍÏÓÔÕÖÚÇÑ";
    let value = stringify(ctx.value_or_null());
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphabetic() || c == ' ' || ACCENTED.contains(c));
    if !valid {
        return RuleOutcome::fail(format!(
            "The {} field must contain only alphabetic characters",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn check_alpha_numeric(ctx: &RuleContext<'_>) -> RuleOutcome {
    let value = stringify(ctx.value_or_null());
    let valid = !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric());
    if !valid {
        return RuleOutcome::fail(format!(
            "The {} field must contain only alphanumeric characters",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn check_date(ctx: &RuleContext<'_>) -> RuleOutcome {
    if dates::parse(&stringify(ctx.value_or_null())).is_none() {
        return RuleOutcome::fail(format!("The {} field must be a valid date", ctx.field));
    }
    RuleOutcome::pass()
}

fn check_size(ctx: &RuleContext<'_>) -> RuleOutcome {
    let expected = match parse_bound(ctx, 0) {
        Ok(v) => v as usize,
        Err(outcome) => return outcome,
    };
    if length_of(ctx.value_or_null()) != expected {
        return RuleOutcome::fail(format!(
            "The {} field must have size {}",
            ctx.field, expected
        ));
    }
    RuleOutcome::pass()
}

fn check_digits(ctx: &RuleContext<'_>) -> RuleOutcome {
    let expected = match parse_bound(ctx, 0) {
        Ok(v) => v as usize,
        Err(outcome) => return outcome,
    };
    let value = ctx.value_or_null();
    if !is_numeric(value) || length_of(value) != expected {
        return RuleOutcome::fail(format!(
            "The {} field must contain only numbers and have size {}",
            ctx.field, expected
        ));
    }
    RuleOutcome::pass()
}

// Length bounds, not numeric magnitude: `digits_between:1,12` constrains
// how many characters the stringified value has.
fn check_digits_between(ctx: &RuleContext<'_>) -> RuleOutcome {
    let (min, max) = match (parse_bound(ctx, 0), parse_bound(ctx, 1)) {
        (Ok(min), Ok(max)) => (min as usize, max as usize),
        (Err(outcome), _) | (_, Err(outcome)) => return outcome,
    };
    let length = length_of(ctx.value_or_null());
    if length < min || length > max {
        return RuleOutcome::fail(format!(
            "The length of the {} field must be between {} and {}",
            ctx.field, min, max
        ));
    }
    RuleOutcome::pass()
}

// Same length semantics as digits_between: `between:6,16` on a numeric
// field constrains its stringified length, not its value range.
fn check_between(ctx: &RuleContext<'_>) -> RuleOutcome {
    let (min, max) = match (parse_bound(ctx, 0), parse_bound(ctx, 1)) {
        (Ok(min), Ok(max)) => (min as usize, max as usize),
        (Err(outcome), _) | (_, Err(outcome)) => return outcome,
    };
    let length = length_of(ctx.value_or_null());
    if length < min || length > max {
        return RuleOutcome::fail(format!(
            "The number of characters in the {} field must be between {} and {}",
            ctx.field, min, max
        ));
    }
    RuleOutcome::pass()
}

fn check_max(ctx: &RuleContext<'_>) -> RuleOutcome {
    let bound = match parse_bound(ctx, 0) {
        Ok(v) => v,
        Err(outcome) => return outcome,
    };
    let value = ctx.value_or_null();
    let within = match as_f64(value) {
        Some(n) => n <= bound,
        None => length_of(value) as f64 <= bound,
    };
    if !within {
        return RuleOutcome::fail(format!(
            "The {} field exceeds the maximum allowed value",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn check_min(ctx: &RuleContext<'_>) -> RuleOutcome {
    let bound = match parse_bound(ctx, 0) {
        Ok(v) => v,
        Err(outcome) => return outcome,
    };
    let value = ctx.value_or_null();
    let within = match as_f64(value) {
        Some(n) => n >= bound,
        None => length_of(value) as f64 >= bound,
    };
    if !within {
        return RuleOutcome::fail(format!(
            "The {} field is smaller than the minimum allowed value",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn check_regex(ctx: &RuleContext<'_>) -> RuleOutcome {
    let Some(raw_pattern) = ctx.arg(0) else {
        return RuleOutcome::fail(format!("Rule on field {} is missing a pattern", ctx.field));
    };

    // Accept PHP-delimited patterns (`/^x$/`) as well as bare ones.
    let pattern = raw_pattern
        .strip_prefix('/')
        .and_then(|rest| rest.rfind('/').map(|end| &rest[..end]))
        .unwrap_or(raw_pattern);

    let Ok(regex) = Regex::new(pattern) else {
        return RuleOutcome::fail(format!(
            "Rule on field {} has an invalid pattern",
            ctx.field
        ));
    };

    if !regex.is_match(&stringify(ctx.value_or_null())) {
        return RuleOutcome::fail(format!(
            "The {} field does not match the expected pattern",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn check_in(ctx: &RuleContext<'_>) -> RuleOutcome {
    let value = stringify(ctx.value_or_null());
    if !ctx.args.iter().any(|a| a == &value) {
        return RuleOutcome::fail(format!(
            "The value of the {} field is not accepted",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn check_not_in(ctx: &RuleContext<'_>) -> RuleOutcome {
    let value = stringify(ctx.value_or_null());
    if ctx.args.iter().any(|a| a == &value) {
        return RuleOutcome::fail(format!(
            "The value of the {} field is not allowed",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn compare_dates(
    ctx: &RuleContext<'_>,
    ok: impl Fn(std::cmp::Ordering) -> bool,
    message: &str,
) -> RuleOutcome {
    let value = dates::parse(&stringify(ctx.value_or_null()));
    let reference = ctx.arg(0).and_then(dates::parse);

    match (value, reference) {
        (Some(value), Some(reference)) if ok(value.cmp(&reference)) => RuleOutcome::pass(),
        _ => RuleOutcome::fail(format!("The {} field {}", ctx.field, message)),
    }
}

fn check_date_equals(ctx: &RuleContext<'_>) -> RuleOutcome {
    compare_dates(ctx, |ord| ord.is_eq(), "is not equal to the given date")
}

fn check_after(ctx: &RuleContext<'_>) -> RuleOutcome {
    compare_dates(ctx, |ord| ord.is_gt(), "must be after the given date")
}

fn check_after_or_equal(ctx: &RuleContext<'_>) -> RuleOutcome {
    compare_dates(ctx, |ord| ord.is_ge(), "must be after or equal to the given date")
}

fn check_before(ctx: &RuleContext<'_>) -> RuleOutcome {
    compare_dates(ctx, |ord| ord.is_lt(), "must be before the given date")
}

fn check_before_or_equal(ctx: &RuleContext<'_>) -> RuleOutcome {
    compare_dates(ctx, |ord| ord.is_le(), "must be before or equal to the given date")
}

fn check_date_age_minor(ctx: &RuleContext<'_>) -> RuleOutcome {
    let Some(birth) = dates::parse(&stringify(ctx.value_or_null())) else {
        return RuleOutcome::fail(format!("The {} field must be a valid date", ctx.field));
    };
    if dates::age_in_years(birth) >= 18 {
        return RuleOutcome::fail(format!(
            "The {} field indicates the user is 18 or older",
            ctx.field
        ));
    }
    RuleOutcome::pass()
}

fn check_date_format(ctx: &RuleContext<'_>) -> RuleOutcome {
    let Some(format) = ctx.arg(0) else {
        return RuleOutcome::fail(format!("Rule on field {} is missing a format", ctx.field));
    };
    let value = stringify(ctx.value_or_null());

    // A bare year is accepted as-is.
    if dates::is_year_only(&value) {
        return RuleOutcome::pass();
    }

    let Some(parsed) = dates::parse_with_php_format(&value, format) else {
        return RuleOutcome::fail(format!(
            "The {} field does not have a valid date format",
            ctx.field
        ));
    };

    if parsed > chrono::Local::now().naive_local() {
        return RuleOutcome::fail("Cannot supply a date later than the current date");
    }
    RuleOutcome::pass()
}

fn check_only_date_format(ctx: &RuleContext<'_>) -> RuleOutcome {
    let Some(format) = ctx.arg(0) else {
        return RuleOutcome::fail(format!("Rule on field {} is missing a format", ctx.field));
    };
    let value = stringify(ctx.value_or_null());

    if dates::is_year_only(&value) || dates::parse_with_php_format(&value, format).is_some() {
        return RuleOutcome::pass();
    }
    RuleOutcome::fail(format!(
        "The {} field does not have a valid date format",
        ctx.field
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn run(rule: &str, args: &[&str], value: Option<Value>) -> RuleOutcome {
        let registry = Registry::with_defaults();
        let mut data = Map::new();
        if let Some(value) = value.clone() {
            data.insert("field".to_string(), value);
        }
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let ctx = RuleContext {
            field: "field",
            value: data.get("field"),
            args: &args,
            data: &data,
        };
        registry.get(rule).expect("rule registered").check(&ctx)
    }

    #[test]
    fn test_required_presence() {
        assert!(!run("required", &[], None).valid);
        assert!(run("required", &[], Some(json!("x"))).valid);
        // present-but-null still satisfies required
        assert!(run("required", &[], Some(Value::Null)).valid);
    }

    #[test]
    fn test_email() {
        assert!(run("email", &[], Some(json!("a@b.com"))).valid);
        assert!(!run("email", &[], Some(json!("not-an-email"))).valid);
        assert!(!run("email", &[], Some(json!("a@b"))).valid);
        assert!(!run("email", &[], Some(json!("a b@c.com"))).valid);
    }

    #[test]
    fn test_numeric_accepts_numeric_strings() {
        assert!(run("numeric", &[], Some(json!(12))).valid);
        assert!(run("numeric", &[], Some(json!("12.5"))).valid);
        assert!(!run("numeric", &[], Some(json!("abc"))).valid);
    }

    #[test]
    fn test_integer_is_strict() {
        assert!(run("integer", &[], Some(json!(12))).valid);
        assert!(!run("integer", &[], Some(json!(12.5))).valid);
        assert!(!run("integer", &[], Some(json!("12"))).valid);
    }

    #[test]
    fn test_boolean_accepted_forms() {
        for value in [json!(true), json!(false), json!(1), json!(0), json!("1"), json!("0")] {
            assert!(run("boolean", &[], Some(value)).valid);
        }
        assert!(!run("boolean", &[], Some(json!("yes"))).valid);
        assert!(!run("boolean", &[], Some(json!(2))).valid);
    }

    #[test]
    fn test_accepted() {
        for value in [json!("yes"), json!("on"), json!(1), json!(true), json!("1")] {
            assert!(run("accepted", &[], Some(value)).valid);
        }
        assert!(!run("accepted", &[], Some(json!(false))).valid);
    }

    #[test]
    fn test_alpha_allows_accents_and_spaces() {
        assert!(run("alpha", &[], Some(json!("José da Silva"))).valid);
        assert!(!run("alpha", &[], Some(json!("abc123"))).valid);
    }

    #[test]
    fn test_alpha_numeric() {
        assert!(run("alpha_numeric", &[], Some(json!("abc123"))).valid);
        assert!(!run("alpha_numeric", &[], Some(json!("abc 123"))).valid);
    }

    #[test]
    fn test_between_measures_string_length() {
        // 3 chars < 6: fails on length, not numeric magnitude
        let outcome = run("between", &["6", "16"], Some(json!("abc")));
        assert!(!outcome.valid);
        assert!(outcome.message.contains("between 6 and 16"));

        assert!(run("between", &["6", "16"], Some(json!("abcdef"))).valid);
        // numeric 1234567 has 7 digits, within 6..=16
        assert!(run("between", &["6", "16"], Some(json!(1234567))).valid);
        // numeric 123 has 3 digits, outside
        assert!(!run("between", &["6", "16"], Some(json!(123))).valid);
    }

    #[test]
    fn test_digits_between_is_length_bound() {
        assert!(run("digits_between", &["1", "12"], Some(json!("123456"))).valid);
        assert!(!run("digits_between", &["1", "3"], Some(json!("1234"))).valid);
    }

    #[test]
    fn test_digits_requires_numeric_and_exact_length() {
        assert!(run("digits", &["4"], Some(json!("1234"))).valid);
        assert!(!run("digits", &["4"], Some(json!("123"))).valid);
        assert!(!run("digits", &["4"], Some(json!("abcd"))).valid);
    }

    #[test]
    fn test_size_counts_array_elements() {
        assert!(run("size", &["2"], Some(json!([1, 2]))).valid);
        assert!(!run("size", &["2"], Some(json!([1, 2, 3]))).valid);
        assert!(run("size", &["8"], Some(json!("12345678"))).valid);
    }

    #[test]
    fn test_max_min_numeric_comparison() {
        assert!(run("max", &["10"], Some(json!(9))).valid);
        assert!(!run("max", &["10"], Some(json!(11))).valid);
        assert!(run("min", &["10"], Some(json!("10"))).valid);
        assert!(!run("min", &["10"], Some(json!(9))).valid);
    }

    #[test]
    fn test_max_falls_back_to_length_for_strings() {
        assert!(run("max", &["5"], Some(json!("abc"))).valid);
        assert!(!run("max", &["5"], Some(json!("abcdef"))).valid);
    }

    #[test]
    fn test_regex_with_and_without_delimiters() {
        assert!(run("regex", &["^[a-z]+$"], Some(json!("abc"))).valid);
        assert!(run("regex", &["/^[a-z]+$/"], Some(json!("abc"))).valid);
        assert!(!run("regex", &["^[a-z]+$"], Some(json!("abc1"))).valid);
    }

    #[test]
    fn test_in_and_not_in() {
        assert!(run("in", &["red", "green", "blue"], Some(json!("green"))).valid);
        assert!(!run("in", &["red", "green"], Some(json!("yellow"))).valid);
        assert!(run("not_in", &["4", "5"], Some(json!(3))).valid);

        let forbidden = run("not_in", &["4", "5"], Some(json!(4)));
        assert!(!forbidden.valid);
        assert_eq!(forbidden.message, "The value of the field field is not allowed");
    }

    #[test]
    fn test_date_comparisons() {
        assert!(run("after", &["2020-01-01"], Some(json!("2021-01-01"))).valid);
        assert!(!run("after", &["2020-01-01"], Some(json!("2019-01-01"))).valid);
        assert!(run("after_or_equal", &["2020-01-01"], Some(json!("2020-01-01"))).valid);
        assert!(run("before", &["tomorrow"], Some(json!("2000-01-01"))).valid);
        assert!(run("date_equals", &["2020-05-17"], Some(json!("17/05/2020"))).valid);
    }

    #[test]
    fn test_date_age_minor() {
        assert!(run("date_age_minor", &[], Some(json!("2020-01-01"))).valid);
        assert!(!run("date_age_minor", &[], Some(json!("1990-01-01"))).valid);
    }

    #[test]
    fn test_date_format() {
        assert!(run("date_format", &["Y-m-d"], Some(json!("2020-05-17"))).valid);
        assert!(!run("date_format", &["Y-m-d"], Some(json!("17-05-2020"))).valid);
        // bare year accepted
        assert!(run("date_format", &["Y-m-d"], Some(json!("1999"))).valid);
        // future date rejected
        assert!(!run("date_format", &["Y-m-d"], Some(json!("2999-01-01"))).valid);
        // future date allowed when only the format is checked
        assert!(run("only_date_format", &["Y-m-d"], Some(json!("2999-01-01"))).valid);
    }

    #[test]
    fn test_custom_rule_registration() {
        let mut registry = Registry::with_defaults();
        registry.register("always_fails", |ctx: &RuleContext<'_>| {
            RuleOutcome::fail(format!("The {} field never passes", ctx.field))
        });

        let data = Map::new();
        let ctx = RuleContext {
            field: "x",
            value: None,
            args: &[],
            data: &data,
        };
        assert!(!registry.get("always_fails").unwrap().check(&ctx).valid);
    }
}
