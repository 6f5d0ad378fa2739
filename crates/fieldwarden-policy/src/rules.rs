//! Field validation rule expressions: parsing and value checking.
//!
//! An expression is a `|`-separated list of rules, e.g.
//! `"required|string|max:255"`. Every rule except `required` passes
//! vacuously on a blank value (JSON null or the empty string), so
//! content rules only constrain values that are actually supplied.

use serde_json::Value;

use crate::error::RuleError;

/// One parsed validation rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Required,
    String,
    Integer,
    Numeric,
    Boolean,
    Array,
    Email,
    Min(f64),
    Max(f64),
    In(Vec<String>),
}

impl Rule {
    /// The rule's name as written in expressions and message keys.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::String => "string",
            Rule::Integer => "integer",
            Rule::Numeric => "numeric",
            Rule::Boolean => "boolean",
            Rule::Array => "array",
            Rule::Email => "email",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
            Rule::In(_) => "in",
        }
    }

    fn parse_one(raw: &str) -> Result<Self, RuleError> {
        let (name, arg) = match raw.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (raw, None),
        };
        match name {
            "required" => Ok(Rule::Required),
            "string" => Ok(Rule::String),
            "integer" => Ok(Rule::Integer),
            "numeric" => Ok(Rule::Numeric),
            "boolean" => Ok(Rule::Boolean),
            "array" => Ok(Rule::Array),
            "email" => Ok(Rule::Email),
            "min" => Ok(Rule::Min(numeric_arg("min", arg)?)),
            "max" => Ok(Rule::Max(numeric_arg("max", arg)?)),
            "in" => {
                let arg = arg.ok_or(RuleError::MissingArgument("in"))?;
                Ok(Rule::In(arg.split(',').map(str::to_string).collect()))
            }
            other => Err(RuleError::UnknownRule(other.to_string())),
        }
    }

    fn passes(&self, value: &Value) -> bool {
        match self {
            Rule::Required => has_content(value),
            Rule::String => value.is_string(),
            Rule::Integer => matches!(value, Value::Number(n) if n.is_i64() || n.is_u64()),
            Rule::Numeric => value.is_number(),
            Rule::Boolean => value.is_boolean(),
            Rule::Array => value.is_array(),
            Rule::Email => matches!(value, Value::String(s) if is_email(s)),
            Rule::Min(limit) => size_of(value).is_some_and(|size| size >= *limit),
            Rule::Max(limit) => size_of(value).is_some_and(|size| size <= *limit),
            Rule::In(options) => {
                scalar_form(value).is_some_and(|form| options.iter().any(|o| *o == form))
            }
        }
    }

    fn default_message(&self, field: &str) -> String {
        match self {
            Rule::Required => format!("The {field} field is required."),
            Rule::String => format!("The {field} must be a string."),
            Rule::Integer => format!("The {field} must be an integer."),
            Rule::Numeric => format!("The {field} must be a number."),
            Rule::Boolean => format!("The {field} field must be true or false."),
            Rule::Array => format!("The {field} must be an array."),
            Rule::Email => format!("The {field} must be a valid email address."),
            Rule::Min(limit) => format!("The {field} must be at least {limit}."),
            Rule::Max(limit) => format!("The {field} may not be greater than {limit}."),
            Rule::In(_) => format!("The selected {field} is invalid."),
        }
    }
}

fn numeric_arg(rule: &'static str, arg: Option<&str>) -> Result<f64, RuleError> {
    let arg = arg.ok_or(RuleError::MissingArgument(rule))?;
    arg.parse().map_err(|_| RuleError::InvalidArgument {
        rule,
        arg: arg.to_string(),
    })
}

/// A parsed rule expression for one field.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Parse a `|`-separated expression. Empty segments are skipped, so
    /// `"required|"` and `"required"` are equivalent.
    pub fn parse(expr: &str) -> Result<Self, RuleError> {
        let mut rules = Vec::new();
        for raw in expr.split('|') {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            rules.push(Rule::parse_one(raw)?);
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Check `value` against every rule, yielding one violation per
    /// failed rule in expression order.
    pub fn check(&self, field: &str, value: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        for rule in &self.rules {
            // Blank values only ever violate `required`.
            if !matches!(rule, Rule::Required) && is_blank(value) {
                continue;
            }
            if !rule.passes(value) {
                violations.push(Violation {
                    rule: rule.name(),
                    message: rule.default_message(field),
                });
            }
        }
        violations
    }
}

/// A single failed rule with its built-in default message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub rule: &'static str,
    pub message: String,
}

/// Null and the empty string count as "not supplied".
fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// What `required` demands: a non-blank value, and for arrays at least
/// one element.
fn has_content(value: &Value) -> bool {
    match value {
        Value::Array(items) => !items.is_empty(),
        other => !is_blank(other),
    }
}

/// The magnitude `min`/`max` compare: numeric value for numbers,
/// character count for strings, element count for arrays. Other shapes
/// have no size and fail both rules.
fn size_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        _ => None,
    }
}

/// String form used by `in` comparisons. Only scalars compare.
fn scalar_form(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Shape check, not an RFC parser: one `@`, a non-empty local part, and
/// a dotted domain.
fn is_email(s: &str) -> bool {
    if s.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
