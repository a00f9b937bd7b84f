//! The decode contract for domain types.
//!
//! A [`Decodable`] type always produces a value: shape mismatches are
//! replaced by defaults and reported as [`DecodeDiagnostic`]s alongside the
//! value instead of failing the fetch. Callers that depend on a field being
//! present must validate after decoding.

use std::any::type_name;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

/// Longest JSON excerpt kept in a diagnostic.
const PREVIEW_LEN: usize = 120;

/// What went wrong while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The JSON value did not have the expected shape.
    DecodeFailed,
    /// A field was missing or could not be coerced; a default was used.
    OptionalUnwrapFailed,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DecodeFailed => f.write_str("DECODING FAILED"),
            Self::OptionalUnwrapFailed => f.write_str("OPTIONAL UNWRAP FAILED"),
        }
    }
}

/// A shape mismatch found while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeDiagnostic {
    /// Name of the type being decoded.
    pub target: &'static str,
    pub kind: DiagnosticKind,
    pub detail: String,
}

impl DecodeDiagnostic {
    /// A value that should have been `expected` was something else.
    pub fn decode_failed(target: &'static str, expected: &str, found: &Value) -> Self {
        Self {
            target,
            kind: DiagnosticKind::DecodeFailed,
            detail: format!("expected {expected}, found: {}", preview(found)),
        }
    }

    /// A field could not be read; `returning` is the default used instead.
    pub fn unwrap_failed(
        target: &'static str,
        key: &str,
        found: Option<&Value>,
        returning: &str,
    ) -> Self {
        let found = found.map_or_else(|| "nothing".to_string(), preview);
        Self {
            target,
            kind: DiagnosticKind::OptionalUnwrapFailed,
            detail: format!("key: {key}, found: {found}, returning: {returning}"),
        }
    }
}

impl fmt::Display for DecodeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "|{}| |{}| {}", self.target, self.kind, self.detail)
    }
}

fn preview(value: &Value) -> String {
    let mut text = value.to_string();
    if text.len() > PREVIEW_LEN {
        let cut = (0..=PREVIEW_LEN)
            .rev()
            .find(|&i| text.is_char_boundary(i))
            .unwrap_or(0);
        text.truncate(cut);
        text.push_str("...");
    }
    text
}

/// A decoded value and whatever went wrong producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub value: T,
    pub diagnostics: Vec<DecodeDiagnostic>,
}

impl<T> Decoded<T> {
    /// A value decoded without problems.
    pub fn clean(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    /// A fallback value with the diagnostic explaining it.
    pub fn fallback(value: T, diagnostic: DecodeDiagnostic) -> Self {
        Self {
            value,
            diagnostics: vec![diagnostic],
        }
    }

    /// Returns true if nothing was reported.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Map the value, keeping the diagnostics.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Decoded<U> {
        Decoded {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    /// Log every diagnostic and return the value.
    pub fn reported(self) -> T {
        for diagnostic in &self.diagnostics {
            tracing::warn!(
                target: "pagefetch::decode",
                decoder = diagnostic.target,
                kind = %diagnostic.kind,
                "{}",
                diagnostic.detail
            );
        }
        self.value
    }
}

/// Capability of a domain type to decode itself from JSON.
///
/// Unlike `serde::Deserialize`, decoding never fails: implementations fill
/// in defaults and report what they could not read.
///
/// # Example
///
/// ```
/// use pagefetch::{Decodable, Decoded, Fields};
/// use serde_json::{json, Value};
///
/// struct Tag {
///     name: String,
///     uses: i64,
/// }
///
/// impl Decodable for Tag {
///     fn decode(json: &Value) -> Decoded<Self> {
///         let mut fields = Fields::of::<Self>(json);
///         let tag = Tag {
///             name: fields.string("name"),
///             uses: fields.int("uses"),
///         };
///         fields.finish(tag)
///     }
///
///     fn encode(&self) -> Value {
///         json!({ "name": self.name, "uses": self.uses })
///     }
/// }
///
/// let decoded = Tag::decode(&json!({ "name": "rust", "uses": "12" }));
/// assert!(decoded.is_clean());
/// assert_eq!(decoded.value.uses, 12);
/// ```
pub trait Decodable: Sized {
    /// Decode a single instance.
    fn decode(json: &Value) -> Decoded<Self>;

    /// Decode a sequence of instances.
    ///
    /// The default expects an array of objects. Anything else is reported
    /// and yields an empty vector.
    fn decode_many(json: &Value) -> Decoded<Vec<Self>> {
        let target = type_name::<Self>();
        let items = match json.as_array() {
            Some(items) if items.iter().all(Value::is_object) => items,
            _ => {
                let diagnostic = DecodeDiagnostic::decode_failed(target, "array of objects", json);
                return Decoded::fallback(Vec::new(), diagnostic);
            }
        };

        let mut diagnostics = Vec::new();
        let values = items
            .iter()
            .map(|item| {
                let decoded = Self::decode(item);
                diagnostics.extend(decoded.diagnostics);
                decoded.value
            })
            .collect();

        Decoded {
            value: values,
            diagnostics,
        }
    }

    /// Encode into a JSON value.
    fn encode(&self) -> Value;
}

/// Encode a slice of decodable values as a JSON array.
pub fn encode_all<T: Decodable>(items: &[T]) -> Value {
    Value::Array(items.iter().map(Decodable::encode).collect())
}

impl Decodable for Value {
    fn decode(json: &Value) -> Decoded<Self> {
        Decoded::clean(json.clone())
    }

    fn decode_many(json: &Value) -> Decoded<Vec<Self>> {
        match json {
            Value::Array(items) => Decoded::clean(items.clone()),
            other => Decoded::fallback(
                Vec::new(),
                DecodeDiagnostic::decode_failed(type_name::<Self>(), "array", other),
            ),
        }
    }

    fn encode(&self) -> Value {
        self.clone()
    }
}

/// Lenient reader for the fields of one JSON object.
///
/// Each getter coerces what it finds (numbers from numeric strings, booleans
/// from `"true"`/`"t"`/`1`, ...) and records a diagnostic when it has to fall
/// back to a default. [`Fields::finish`] pairs the built value with them.
#[derive(Debug)]
pub struct Fields<'a> {
    target: &'static str,
    object: Option<&'a Map<String, Value>>,
    diagnostics: Vec<DecodeDiagnostic>,
}

impl<'a> Fields<'a> {
    /// Start reading `json` as an object for type `T`.
    pub fn of<T>(json: &'a Value) -> Self {
        Self::named(type_name::<T>(), json)
    }

    fn named(target: &'static str, json: &'a Value) -> Self {
        let mut diagnostics = Vec::new();
        let object = json.as_object();
        if object.is_none() {
            diagnostics.push(DecodeDiagnostic::decode_failed(target, "object", json));
        }
        Self {
            target,
            object,
            diagnostics,
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.object.and_then(|o| o.get(key))
    }

    fn fail(&mut self, key: &str, returning: &str) {
        let found = self.get(key);
        self.diagnostics
            .push(DecodeDiagnostic::unwrap_failed(self.target, key, found, returning));
    }

    /// Raw access to a field.
    pub fn value(&self, key: &str) -> Option<&'a Value> {
        self.get(key)
    }

    /// A string field, or `""`.
    pub fn string(&mut self, key: &str) -> String {
        match self.get(key).and_then(check_string) {
            Some(s) => s,
            None => {
                self.fail(key, "\"\"");
                String::new()
            }
        }
    }

    /// A string field that may be absent. Only a present value of the wrong
    /// type is reported.
    pub fn optional_string(&mut self, key: &str) -> Option<String> {
        let value = self.get(key)?;
        let checked = check_string(value);
        if checked.is_none() && !value.is_null() {
            self.fail(key, "None");
        }
        checked
    }

    /// A non-empty string field, or `default`. Never reported.
    pub fn string_or(&mut self, key: &str, default: &str) -> String {
        self.get(key)
            .and_then(check_string)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// An integer field, or 0.
    pub fn int(&mut self, key: &str) -> i64 {
        match self.get(key).and_then(check_int) {
            Some(i) => i,
            None => {
                self.fail(key, "0");
                0
            }
        }
    }

    /// An integer field that may be absent.
    pub fn optional_int(&mut self, key: &str) -> Option<i64> {
        let value = self.get(key)?;
        let checked = check_int(value);
        if checked.is_none() && !value.is_null() {
            self.fail(key, "None");
        }
        checked
    }

    /// A floating point field, or 0.0.
    pub fn float(&mut self, key: &str) -> f64 {
        match self.get(key).and_then(check_float) {
            Some(f) => f,
            None => {
                self.fail(key, "0");
                0.0
            }
        }
    }

    /// A boolean field, or `false`.
    pub fn bool(&mut self, key: &str) -> bool {
        match self.get(key).and_then(check_bool) {
            Some(b) => b,
            None => {
                self.fail(key, "false");
                false
            }
        }
    }

    /// A date field; `None` when absent or unparseable. Never reported.
    pub fn date(&mut self, key: &str) -> Option<DateTime<Utc>> {
        self.get(key).and_then(check_date)
    }

    /// Reader for a nested object field.
    ///
    /// A missing or non-object field is reported here and the nested reader
    /// sees no fields. Merge it back with [`Fields::absorb`].
    pub fn nested(&mut self, key: &str) -> Fields<'a> {
        let object = self.get(key).and_then(Value::as_object);
        if object.is_none() {
            self.fail(key, "{}");
        }
        Fields {
            target: self.target,
            object,
            diagnostics: Vec::new(),
        }
    }

    /// Take over the diagnostics of a nested reader.
    pub fn absorb(&mut self, nested: Fields<'a>) {
        self.diagnostics.extend(nested.diagnostics);
    }

    /// Elements of an array field, or an empty slice.
    pub fn array(&mut self, key: &str) -> &'a [Value] {
        match self.get(key).and_then(Value::as_array) {
            Some(items) => items.as_slice(),
            None => {
                self.fail(key, "[]");
                &[]
            }
        }
    }

    /// Pair the built value with everything reported so far.
    pub fn finish<T>(self, value: T) -> Decoded<T> {
        Decoded {
            value,
            diagnostics: self.diagnostics,
        }
    }
}

fn check_string(value: &Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn check_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn check_bool(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.as_str() {
            "T" | "t" | "True" | "true" => Some(true),
            "F" | "f" | "False" | "false" => Some(false),
            _ => None,
        },
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn check_date(value: &Value) -> Option<DateTime<Utc>> {
    let text = value.as_str()?;
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
