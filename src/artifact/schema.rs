//! Structural contracts and the walker that checks a JSON document against
//! them.
//!
//! The contract language is deliberately small: closed objects with
//! required/optional fields, bounded arrays, bounded strings (pattern,
//! date format, enum), bounded integers and string constants. Every
//! violation is collected; nothing short-circuits except a type mismatch,
//! which stops descent into that one value.

use std::fmt;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_json::{json, Value as Json};

use super::{contracts, DocumentKind, KindError};

// ============================================================================
// Contract language
// ============================================================================

#[derive(Debug, Clone)]
pub enum Schema {
    Object(ObjectSchema),
    Array(ArraySchema),
    String(StringSchema),
    Integer { minimum: Option<i64>, maximum: Option<i64> },
    Const(&'static str),
}

impl Schema {
    pub fn object(fields: Vec<Field>) -> Self {
        Schema::Object(ObjectSchema { fields, any_non_empty: &[] })
    }

    pub fn array(min_items: usize, max_items: usize, items: impl Into<Schema>) -> Self {
        Schema::Array(ArraySchema { min_items, max_items: Some(max_items), items: Box::new(items.into()) })
    }

    pub fn integer(minimum: i64, maximum: i64) -> Self {
        Schema::Integer { minimum: Some(minimum), maximum: Some(maximum) }
    }
}

/// Closed object: keys not listed in `fields` are violations.
#[derive(Debug, Clone)]
pub struct ObjectSchema {
    pub fields: Vec<Field>,
    /// At least one of these fields must hold a non-empty array.
    pub any_non_empty: &'static [&'static str],
}

impl ObjectSchema {
    pub fn require_any_non_empty(mut self, names: &'static [&'static str]) -> Self {
        self.any_non_empty = names;
        self
    }
}

impl From<ObjectSchema> for Schema {
    fn from(o: ObjectSchema) -> Self { Schema::Object(o) }
}

#[derive(Debug, Clone)]
pub struct ArraySchema {
    pub min_items: usize,
    pub max_items: Option<usize>,
    pub items: Box<Schema>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// RFC 3339 full-date, `YYYY-MM-DD`.
    Date,
}

impl Format {
    fn name(&self) -> &'static str {
        match self {
            Format::Date => "date",
        }
    }

    fn accepts(&self, s: &str) -> bool {
        match self {
            Format::Date => s.len() == 10 && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
        }
    }
}

/// String bounds are in Unicode scalar values, not bytes.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    pub min_length: usize,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub format: Option<Format>,
    pub allowed: &'static [&'static str],
}

impl StringSchema {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn bounded(min_length: usize, max_length: usize) -> Self {
        Self { min_length, max_length: Some(max_length), ..Self::default() }
    }

    pub fn non_empty() -> Self {
        Self { min_length: 1, ..Self::default() }
    }

    pub fn pattern(mut self, re: Regex) -> Self {
        self.pattern = Some(re);
        self
    }

    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    pub fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = allowed;
        self
    }
}

impl From<StringSchema> for Schema {
    fn from(s: StringSchema) -> Self { Schema::String(s) }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: &'static str,
    pub required: bool,
    pub schema: Schema,
}

impl Field {
    pub fn required(name: &'static str, schema: impl Into<Schema>) -> Self {
        Self { name, required: true, schema: schema.into() }
    }

    pub fn optional(name: &'static str, schema: impl Into<Schema>) -> Self {
        Self { name, required: false, schema: schema.into() }
    }
}

// ============================================================================
// Violations
// ============================================================================

/// One structural violation: where, which rule, and the rule's parameters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeViolation {
    /// JSON pointer to the offending value (`""` for the root).
    pub path: String,
    pub rule: &'static str,
    pub params: Json,
}

impl ShapeViolation {
    fn new(path: &str, rule: &'static str, params: Json) -> Self {
        Self { path: path.to_owned(), rule, params }
    }
}

impl fmt::Display for ShapeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{} {}", self.rule, self.params)
        } else {
            write!(f, "{} at {} {}", self.rule, self.path, self.params)
        }
    }
}

/// Outcome of checking one document against its kind's contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShapeReport {
    pub kind: DocumentKind,
    pub violations: Vec<ShapeViolation>,
}

impl ShapeReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }
}

// ============================================================================
// Walker
// ============================================================================

/// Check a document's structure against the contract named by its `kind`.
///
/// A missing or unknown discriminant is a hard failure; otherwise every
/// violation is reported, in contract order.
pub fn validate_shape(doc: &Json) -> Result<ShapeReport, KindError> {
    let kind = DocumentKind::detect(doc)?;
    Ok(ShapeReport { kind, violations: check_document(contracts::contract(kind), doc) })
}

/// Check any value against any contract.
pub fn check_document(schema: &Schema, doc: &Json) -> Vec<ShapeViolation> {
    let mut out = Vec::new();
    check(schema, doc, "", &mut out);
    out
}

fn check(schema: &Schema, value: &Json, path: &str, out: &mut Vec<ShapeViolation>) {
    match schema {
        Schema::Object(o) => check_object(o, value, path, out),
        Schema::Array(a) => check_array(a, value, path, out),
        Schema::String(s) => check_string(s, value, path, out),
        Schema::Integer { minimum, maximum } => check_integer(*minimum, *maximum, value, path, out),
        Schema::Const(expected) => {
            if value.as_str() != Some(*expected) {
                out.push(ShapeViolation::new(path, "const", json!({ "allowedValue": expected })));
            }
        }
    }
}

fn check_object(schema: &ObjectSchema, value: &Json, path: &str, out: &mut Vec<ShapeViolation>) {
    let Some(map) = value.as_object() else {
        out.push(ShapeViolation::new(path, "type", json!({ "type": "object" })));
        return;
    };

    for field in schema.fields.iter().filter(|f| f.required) {
        if !map.contains_key(field.name) {
            out.push(ShapeViolation::new(path, "required", json!({ "missingProperty": field.name })));
        }
    }

    for key in map.keys() {
        if !schema.fields.iter().any(|f| f.name == key.as_str()) {
            out.push(ShapeViolation::new(path, "additionalProperties", json!({ "additionalProperty": key })));
        }
    }

    for field in &schema.fields {
        if let Some(child) = map.get(field.name) {
            check(&field.schema, child, &format!("{path}/{}", field.name), out);
        }
    }

    if !schema.any_non_empty.is_empty() {
        let satisfied = schema.any_non_empty.iter().any(|name| {
            map.get(*name)
                .and_then(Json::as_array)
                .is_some_and(|items| !items.is_empty())
        });
        if !satisfied {
            out.push(ShapeViolation::new(path, "anyOf", json!({ "nonEmpty": schema.any_non_empty })));
        }
    }
}

fn check_array(schema: &ArraySchema, value: &Json, path: &str, out: &mut Vec<ShapeViolation>) {
    let Some(items) = value.as_array() else {
        out.push(ShapeViolation::new(path, "type", json!({ "type": "array" })));
        return;
    };

    if items.len() < schema.min_items {
        out.push(ShapeViolation::new(path, "minItems", json!({ "limit": schema.min_items })));
    }
    if let Some(max) = schema.max_items {
        if items.len() > max {
            out.push(ShapeViolation::new(path, "maxItems", json!({ "limit": max })));
        }
    }

    for (i, item) in items.iter().enumerate() {
        check(&schema.items, item, &format!("{path}/{i}"), out);
    }
}

fn check_string(schema: &StringSchema, value: &Json, path: &str, out: &mut Vec<ShapeViolation>) {
    let Some(s) = value.as_str() else {
        out.push(ShapeViolation::new(path, "type", json!({ "type": "string" })));
        return;
    };

    let len = s.chars().count();
    if len < schema.min_length {
        out.push(ShapeViolation::new(path, "minLength", json!({ "limit": schema.min_length })));
    }
    if let Some(max) = schema.max_length {
        if len > max {
            out.push(ShapeViolation::new(path, "maxLength", json!({ "limit": max })));
        }
    }
    if let Some(re) = &schema.pattern {
        if !re.is_match(s) {
            out.push(ShapeViolation::new(path, "pattern", json!({ "pattern": re.as_str() })));
        }
    }
    if let Some(format) = schema.format {
        if !format.accepts(s) {
            out.push(ShapeViolation::new(path, "format", json!({ "format": format.name() })));
        }
    }
    if !schema.allowed.is_empty() && !schema.allowed.iter().any(|a| *a == s) {
        out.push(ShapeViolation::new(path, "enum", json!({ "allowedValues": schema.allowed })));
    }
}

fn check_integer(
    minimum: Option<i64>,
    maximum: Option<i64>,
    value: &Json,
    path: &str,
    out: &mut Vec<ShapeViolation>,
) {
    let Some(n) = value.as_f64().filter(|n| n.is_finite() && n.fract() == 0.0) else {
        out.push(ShapeViolation::new(path, "type", json!({ "type": "integer" })));
        return;
    };

    if let Some(min) = minimum {
        if n < min as f64 {
            out.push(ShapeViolation::new(path, "minimum", json!({ "comparison": ">=", "limit": min })));
        }
    }
    if let Some(max) = maximum {
        if n > max as f64 {
            out.push(ShapeViolation::new(path, "maximum", json!({ "comparison": "<=", "limit": max })));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn person() -> Schema {
        Schema::object(vec![
            Field::required("name", StringSchema::bounded(1, 5)),
            Field::optional("age", Schema::integer(0, 150)),
            Field::optional("tags", Schema::array(0, 2, StringSchema::non_empty())),
            Field::optional("born", StringSchema::any().format(Format::Date)),
            Field::optional("role", StringSchema::any().one_of(&["admin", "user"])),
        ])
    }

    fn rendered(schema: &Schema, doc: Json) -> Vec<String> {
        check_document(schema, &doc).iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_valid_object() {
        assert!(check_document(&person(), &json!({"name": "Ada", "age": 36})).is_empty());
    }

    #[test]
    fn test_all_violations_enumerated_in_order() {
        let errs = rendered(&person(), json!({
            "age": 200,
            "extra": 1,
            "tags": ["", "b", "c"],
            "born": "2024-02-30",
            "role": "root"
        }));
        assert_eq!(errs, vec![
            r#"required {"missingProperty":"name"}"#,
            r#"additionalProperties {"additionalProperty":"extra"}"#,
            r#"maximum at /age {"comparison":"<=","limit":150}"#,
            r#"maxItems at /tags {"limit":2}"#,
            r#"minLength at /tags/0 {"limit":1}"#,
            r#"format at /born {"format":"date"}"#,
            r#"enum at /role {"allowedValues":["admin","user"]}"#,
        ]);
    }

    #[test]
    fn test_type_mismatch_stops_descent() {
        let errs = rendered(&person(), json!({"name": 7, "tags": "a"}));
        assert_eq!(errs, vec![
            r#"type at /name {"type":"string"}"#,
            r#"type at /tags {"type":"array"}"#,
        ]);
        assert_eq!(rendered(&person(), json!([])), vec![r#"type {"type":"object"}"#]);
    }

    #[test]
    fn test_integer_accepts_integral_floats() {
        assert!(check_document(&person(), &json!({"name": "a", "age": 3.0})).is_empty());
        assert_eq!(
            rendered(&person(), json!({"name": "a", "age": 3.5})),
            vec![r#"type at /age {"type":"integer"}"#]
        );
    }

    #[test]
    fn test_length_counts_chars_not_bytes() {
        assert!(check_document(&person(), &json!({"name": "日本語です"})).is_empty());
    }

    #[test]
    fn test_any_non_empty() {
        let schema: Schema = ObjectSchema {
            fields: vec![
                Field::optional("a", Schema::array(0, 5, StringSchema::any())),
                Field::optional("b", Schema::array(0, 5, StringSchema::any())),
            ],
            any_non_empty: &[],
        }
        .require_any_non_empty(&["a", "b"])
        .into();
        assert!(check_document(&schema, &json!({"b": ["x"]})).is_empty());
        assert_eq!(
            rendered(&schema, json!({"a": []})),
            vec![r#"anyOf {"nonEmpty":["a","b"]}"#]
        );
    }
}
