//! Compile-time values.
//! 编译期值。
//!
//! The data half of JavaScript: primitives, arrays and plain objects,
//! with the coercions the operator tables need.

use crate::EvalError;
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::fmt;
use std::rc::Rc;

/// A value known at compile time.
#[derive(Clone)]
pub enum Value {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// Boolean value
    Bool(bool),
    /// IEEE-754 double
    Number(f64),
    /// String value
    String(Rc<str>),
    /// Array value
    Array(Rc<Vec<Value>>),
    /// Plain object; keys are unique and kept in insertion order
    Object(Rc<Vec<(String, Value)>>),
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", number_to_string(*n)),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {:?}: {:?}", key, value)?;
                }
                if !entries.is_empty() {
                    write!(f, " ")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Structural equality, used by tests and the literal encoder.
/// JavaScript equality lives in [`Value::strict_equals`] and
/// [`Value::loose_equals`].
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<&JsonValue> for Value {
    fn from(json: &JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(*b),
            JsonValue::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::String(s) => Value::from(s.as_str()),
            JsonValue::Array(items) => Value::array(items.iter().map(Value::from).collect()),
            JsonValue::Object(map) => Value::object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(items))
    }

    /// Build an object from entries. A repeated key keeps its first
    /// position and its last value.
    pub fn object(entries: Vec<(String, Value)>) -> Self {
        let mut unique: Vec<(String, Value)> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match unique.iter_mut().find(|(existing, _)| *existing == key) {
                Some(slot) => slot.1 = value,
                None => unique.push((key, value)),
            }
        }
        Value::Object(Rc::new(unique))
    }

    /// The name `typeof` would report.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null | Value::Array(_) | Value::Object(_) => "object",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
        }
    }

    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// JavaScript truthiness.
    /// 真值判断。
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// ToPrimitive with the default hint. Arrays and plain objects go
    /// through their `toString`.
    pub fn to_primitive(&self) -> Value {
        match self {
            Value::Array(_) | Value::Object(_) => Value::from(self.to_js_string()),
            _ => self.clone(),
        }
    }

    /// ToNumber.
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Undefined => f64::NAN,
            Value::Null => 0.0,
            Value::Bool(b) => f64::from(u8::from(*b)),
            Value::Number(n) => *n,
            Value::String(s) => string_to_number(s),
            Value::Array(_) | Value::Object(_) => self.to_primitive().to_number(),
        }
    }

    /// ToString.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::String(s) => s.to_string(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }

    /// ToInt32.
    pub fn to_int32(&self) -> i32 {
        self.to_uint32() as i32
    }

    /// ToUint32.
    pub fn to_uint32(&self) -> u32 {
        let n = self.to_number();
        if !n.is_finite() {
            return 0;
        }
        n.trunc().rem_euclid(4_294_967_296.0) as u32
    }

    /// `===`
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// `==`
    pub fn loose_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (a, b) if a.is_nullish() || b.is_nullish() => a.is_nullish() && b.is_nullish(),
            (Value::Number(_), Value::String(_)) | (Value::String(_), Value::Number(_)) => {
                self.to_number() == other.to_number()
            }
            (Value::Bool(_), _) => Value::Number(self.to_number()).loose_equals(other),
            (_, Value::Bool(_)) => self.loose_equals(&Value::Number(other.to_number())),
            (Value::Array(_) | Value::Object(_), Value::Number(_) | Value::String(_)) => {
                self.to_primitive().loose_equals(other)
            }
            (Value::Number(_) | Value::String(_), Value::Array(_) | Value::Object(_)) => {
                self.loose_equals(&other.to_primitive())
            }
            _ => self.strict_equals(other),
        }
    }

    /// The abstract relational comparison `self < other`. `None` stands
    /// for the comparison being undefined, which happens with `NaN`.
    pub fn less_than(&self, other: &Value) -> Option<bool> {
        let (left, right) = (self.to_primitive(), other.to_primitive());
        if let (Value::String(a), Value::String(b)) = (&left, &right) {
            return Some(a.encode_utf16().cmp(b.encode_utf16()) == Ordering::Less);
        }
        let (a, b) = (left.to_number(), right.to_number());
        if a.is_nan() || b.is_nan() {
            return None;
        }
        Some(a < b)
    }

    /// ToPropertyKey.
    pub fn to_property_key(&self) -> String {
        self.to_js_string()
    }

    /// Read `self[key]`.
    ///
    /// Own data is visible: array elements and `length`, string code units
    /// and `length`, and object entries. A missing key reads as `undefined`
    /// unless it names a prototype member, which fails. Reading from `null`
    /// or `undefined` fails too.
    pub fn get_property(&self, key: &Value) -> Result<Value, EvalError> {
        let key = key.to_property_key();
        let own = match self {
            Value::Undefined | Value::Null => {
                return Err(EvalError::PropertyOfNullish {
                    key,
                    object: self.type_name_for_errors(),
                });
            }
            Value::Array(items) if key == "length" => Some(Value::Number(items.len() as f64)),
            Value::Array(items) => array_index(&key).and_then(|index| items.get(index).cloned()),
            Value::String(s) if key == "length" => {
                Some(Value::Number(s.encode_utf16().count() as f64))
            }
            Value::String(s) => match array_index(&key) {
                Some(index) => code_unit_at(s, index)?,
                None => None,
            },
            Value::Object(entries) => entries
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| value.clone()),
            Value::Bool(_) | Value::Number(_) => None,
        };
        if let Some(value) = own {
            return Ok(value);
        }
        match self.inherited_from(&key) {
            Some(prototype) => Err(EvalError::InheritedProperty { key, prototype }),
            None => Ok(Value::Undefined),
        }
    }

    /// The prototype that supplies `key` when it is not an own property.
    fn inherited_from(&self, key: &str) -> Option<&'static str> {
        let own_proto = match self {
            Value::Array(_) => Some(("Array.prototype", ARRAY_PROTOTYPE)),
            Value::String(_) => Some(("String.prototype", STRING_PROTOTYPE)),
            Value::Number(_) => Some(("Number.prototype", NUMBER_PROTOTYPE)),
            Value::Bool(_) => Some(("Boolean.prototype", BOOLEAN_PROTOTYPE)),
            _ => None,
        };
        own_proto
            .filter(|(_, names)| names.contains(&key))
            .map(|(prototype, _)| prototype)
            .or_else(|| OBJECT_PROTOTYPE.contains(&key).then_some("Object.prototype"))
    }

    fn type_name_for_errors(&self) -> &'static str {
        match self {
            Value::Null => "null",
            _ => "undefined",
        }
    }
}

/// The string at UTF-16 index `index`, failing on half of a surrogate pair.
fn code_unit_at(s: &str, index: usize) -> Result<Option<Value>, EvalError> {
    match s.encode_utf16().nth(index) {
        Some(unit) => match String::from_utf16(&[unit]) {
            Ok(text) => Ok(Some(Value::from(text))),
            Err(_) => Err(EvalError::LoneSurrogate { index }),
        },
        None => Ok(None),
    }
}

const OBJECT_PROTOTYPE: &[&str] = &[
    "constructor",
    "hasOwnProperty",
    "isPrototypeOf",
    "propertyIsEnumerable",
    "toLocaleString",
    "toString",
    "valueOf",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
];

const ARRAY_PROTOTYPE: &[&str] = &[
    "at", "concat", "copyWithin", "entries", "every", "fill", "filter", "find", "findIndex",
    "findLast", "findLastIndex", "flat", "flatMap", "forEach", "includes", "indexOf", "join",
    "keys", "lastIndexOf", "map", "pop", "push", "reduce", "reduceRight", "reverse", "shift",
    "slice", "some", "sort", "splice", "toLocaleString", "toReversed", "toSorted", "toSpliced",
    "toString", "unshift", "values", "with",
];

const STRING_PROTOTYPE: &[&str] = &[
    "anchor", "at", "big", "blink", "bold", "charAt", "charCodeAt", "codePointAt", "concat",
    "endsWith", "fixed", "fontcolor", "fontsize", "includes", "indexOf", "isWellFormed",
    "italics", "lastIndexOf", "link", "localeCompare", "match", "matchAll", "normalize",
    "padEnd", "padStart", "repeat", "replace", "replaceAll", "search", "slice", "small",
    "split", "startsWith", "strike", "sub", "substr", "substring", "sup", "toLocaleLowerCase",
    "toLocaleUpperCase", "toLowerCase", "toString", "toUpperCase", "toWellFormed", "trim",
    "trimEnd", "trimLeft", "trimRight", "trimStart", "valueOf",
];

const NUMBER_PROTOTYPE: &[&str] = &[
    "toExponential",
    "toFixed",
    "toLocaleString",
    "toPrecision",
    "toString",
    "valueOf",
];

const BOOLEAN_PROTOTYPE: &[&str] = &["toString", "valueOf"];

/// Parse a canonical array index such as `"3"`, rejecting `"03"` or `"3.0"`.
fn array_index(key: &str) -> Option<usize> {
    let index: u32 = key.parse().ok()?;
    if index.to_string() == key && index != u32::MAX {
        Some(index as usize)
    } else {
        None
    }
}

/// StringToNumber.
fn string_to_number(s: &str) -> f64 {
    let text = s.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if text.is_empty() {
        return 0.0;
    }
    match text {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = text.strip_prefix(prefix) {
            return parse_radix(digits, radix);
        }
    }
    let well_formed = text.bytes().any(|b| b.is_ascii_digit())
        && text
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'));
    if !well_formed {
        return f64::NAN;
    }
    text.parse().unwrap_or(f64::NAN)
}

fn parse_radix(digits: &str, radix: u32) -> f64 {
    if digits.is_empty() {
        return f64::NAN;
    }
    digits
        .chars()
        .try_fold(0.0, |acc: f64, c| {
            c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
        })
        .unwrap_or(f64::NAN)
}

/// Format a number the way `Number.prototype.toString()` does.
/// 按 JavaScript 规则格式化数字。
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    // Shortest round-trip digits, e.g. "1.2345e-7".
    let exp_form = format!("{:e}", n);
    let (mantissa, exponent) = exp_form.split_once('e').unwrap_or((exp_form.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let point = exponent + 1;

    if k <= point && point <= 21 {
        format!("{}{}", digits, "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{}.{}", int, frac)
    } else if -6 < point && point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), digits)
    } else {
        let sign = if point - 1 < 0 { '-' } else { '+' };
        let (first, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{}e{}{}", first, sign, (point - 1).abs())
        } else {
            format!("{}.{}e{}{}", first, rest, sign, (point - 1).abs())
        }
    }
}
