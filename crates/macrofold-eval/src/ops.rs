//! Operator tables.
//! 运算符表。
//!
//! Only operators listed here fold. Anything else (`**`, `typeof`,
//! `in`, `instanceof`, `delete`) stays unknown.

use crate::Value;

pub type BinaryFn = fn(&Value, &Value) -> Value;
pub type UnaryFn = fn(&Value) -> Value;

/// Binary and logical operators, by source spelling.
pub static BINARY_OPERATORS: &[(&str, BinaryFn)] = &[
    ("||", logical_or),
    ("&&", logical_and),
    ("??", nullish_coalesce),
    ("|", bit_or),
    ("^", bit_xor),
    ("&", bit_and),
    ("==", loose_eq),
    ("!=", loose_ne),
    ("===", strict_eq),
    ("!==", strict_ne),
    ("<", lt),
    (">", gt),
    ("<=", le),
    (">=", ge),
    ("<<", shl),
    (">>", shr),
    (">>>", ushr),
    ("+", add),
    ("-", sub),
    ("*", mul),
    ("/", div),
    ("%", rem),
];

/// Unary operators, by source spelling.
pub static UNARY_OPERATORS: &[(&str, UnaryFn)] = &[
    ("-", negate),
    ("+", to_number),
    ("~", bit_not),
    ("!", not),
    ("void", void),
];

pub fn lookup_binary(op: &str) -> Option<BinaryFn> {
    BINARY_OPERATORS
        .iter()
        .find(|(name, _)| *name == op)
        .map(|(_, f)| *f)
}

pub fn lookup_unary(op: &str) -> Option<UnaryFn> {
    UNARY_OPERATORS
        .iter()
        .find(|(name, _)| *name == op)
        .map(|(_, f)| *f)
}

fn logical_or(a: &Value, b: &Value) -> Value {
    if a.is_truthy() { a.clone() } else { b.clone() }
}

fn logical_and(a: &Value, b: &Value) -> Value {
    if a.is_truthy() { b.clone() } else { a.clone() }
}

fn nullish_coalesce(a: &Value, b: &Value) -> Value {
    if a.is_nullish() { b.clone() } else { a.clone() }
}

fn bit_or(a: &Value, b: &Value) -> Value {
    Value::Number(f64::from(a.to_int32() | b.to_int32()))
}

fn bit_xor(a: &Value, b: &Value) -> Value {
    Value::Number(f64::from(a.to_int32() ^ b.to_int32()))
}

fn bit_and(a: &Value, b: &Value) -> Value {
    Value::Number(f64::from(a.to_int32() & b.to_int32()))
}

fn loose_eq(a: &Value, b: &Value) -> Value {
    Value::Bool(a.loose_equals(b))
}

fn loose_ne(a: &Value, b: &Value) -> Value {
    Value::Bool(!a.loose_equals(b))
}

fn strict_eq(a: &Value, b: &Value) -> Value {
    Value::Bool(a.strict_equals(b))
}

fn strict_ne(a: &Value, b: &Value) -> Value {
    Value::Bool(!a.strict_equals(b))
}

fn lt(a: &Value, b: &Value) -> Value {
    Value::Bool(a.less_than(b) == Some(true))
}

fn gt(a: &Value, b: &Value) -> Value {
    Value::Bool(b.less_than(a) == Some(true))
}

fn le(a: &Value, b: &Value) -> Value {
    Value::Bool(b.less_than(a) == Some(false))
}

fn ge(a: &Value, b: &Value) -> Value {
    Value::Bool(a.less_than(b) == Some(false))
}

fn shift_count(b: &Value) -> u32 {
    b.to_uint32() & 31
}

fn shl(a: &Value, b: &Value) -> Value {
    Value::Number(f64::from(a.to_int32().wrapping_shl(shift_count(b))))
}

fn shr(a: &Value, b: &Value) -> Value {
    Value::Number(f64::from(a.to_int32() >> shift_count(b)))
}

fn ushr(a: &Value, b: &Value) -> Value {
    Value::Number(f64::from(a.to_uint32() >> shift_count(b)))
}

fn add(a: &Value, b: &Value) -> Value {
    let (a, b) = (a.to_primitive(), b.to_primitive());
    match (&a, &b) {
        (Value::String(_), _) | (_, Value::String(_)) => {
            Value::from(a.to_js_string() + &b.to_js_string())
        }
        _ => Value::Number(a.to_number() + b.to_number()),
    }
}

fn sub(a: &Value, b: &Value) -> Value {
    Value::Number(a.to_number() - b.to_number())
}

fn mul(a: &Value, b: &Value) -> Value {
    Value::Number(a.to_number() * b.to_number())
}

fn div(a: &Value, b: &Value) -> Value {
    Value::Number(a.to_number() / b.to_number())
}

fn rem(a: &Value, b: &Value) -> Value {
    Value::Number(a.to_number() % b.to_number())
}

fn negate(a: &Value) -> Value {
    Value::Number(-a.to_number())
}

fn to_number(a: &Value) -> Value {
    Value::Number(a.to_number())
}

fn bit_not(a: &Value) -> Value {
    Value::Number(f64::from(!a.to_int32()))
}

fn not(a: &Value) -> Value {
    Value::Bool(!a.is_truthy())
}

fn void(_: &Value) -> Value {
    Value::Undefined
}
