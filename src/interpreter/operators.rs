//! Operator dispatch tables

use std::cmp::Ordering;

use crate::ast::{BinaryOp, UnaryOp, UpdateOp};
use crate::error::JsError;
use crate::realm::{PreferredType, Realm};
use crate::value::{JsString, JsValue, to_int32, to_uint32};

/// Apply a binary operator to evaluated operands
pub fn binary(
    realm: &Realm,
    op: &BinaryOp,
    left: &JsValue,
    right: &JsValue,
) -> Result<JsValue, JsError> {
    let relational = |accept: fn(Ordering) -> bool| {
        JsValue::Boolean(realm.compare(left, right).is_some_and(accept))
    };
    let numeric = |f: fn(f64, f64) -> f64| {
        JsValue::Number(f(realm.to_number(left), realm.to_number(right)))
    };
    let int32 = |f: fn(i32, i32) -> i32| {
        let lhs = to_int32(realm.to_number(left));
        let rhs = to_int32(realm.to_number(right));
        JsValue::Number(f(lhs, rhs) as f64)
    };
    let shift_count = || to_uint32(realm.to_number(right)) & 0x1f;

    Ok(match op {
        // Equality
        BinaryOp::Eq => JsValue::Boolean(realm.loose_equals(left, right)),
        BinaryOp::NotEq => JsValue::Boolean(!realm.loose_equals(left, right)),
        BinaryOp::StrictEq => JsValue::Boolean(left.strict_equals(right)),
        BinaryOp::StrictNotEq => JsValue::Boolean(!left.strict_equals(right)),

        // Relational; NaN answers false to all four
        BinaryOp::Lt => relational(|o| o == Ordering::Less),
        BinaryOp::LtEq => relational(|o| o != Ordering::Greater),
        BinaryOp::Gt => relational(|o| o == Ordering::Greater),
        BinaryOp::GtEq => relational(|o| o != Ordering::Less),

        // Arithmetic
        BinaryOp::Add => add(realm, left, right)?,
        BinaryOp::Sub => numeric(|a, b| a - b),
        BinaryOp::Mul => numeric(|a, b| a * b),
        BinaryOp::Div => numeric(|a, b| a / b),
        BinaryOp::Mod => numeric(|a, b| a % b),

        // Bitwise
        BinaryOp::BitAnd => int32(|a, b| a & b),
        BinaryOp::BitOr => int32(|a, b| a | b),
        BinaryOp::BitXor => int32(|a, b| a ^ b),
        BinaryOp::LShift => {
            JsValue::Number(to_int32(realm.to_number(left)).wrapping_shl(shift_count()) as f64)
        }
        BinaryOp::RShift => {
            JsValue::Number(to_int32(realm.to_number(left)).wrapping_shr(shift_count()) as f64)
        }
        BinaryOp::URShift => {
            JsValue::Number(to_uint32(realm.to_number(left)).wrapping_shr(shift_count()) as f64)
        }

        // Object relations
        BinaryOp::In => {
            let key = realm.to_property_key(left);
            JsValue::Boolean(realm.has_property(right, &key)?)
        }
        BinaryOp::Instanceof => {
            let Some(constructor) = right.as_object().filter(|_| realm.is_callable(right)) else {
                return Err(JsError::type_error(
                    "Right-hand side of 'instanceof' is not callable",
                ));
            };
            JsValue::Boolean(!left.is_primitive() && realm.isa(left, constructor))
        }

        BinaryOp::Unknown(token) => return Err(JsError::unknown_operator(token.as_str())),
    })
}

/// `+`: concatenation wins when either primitive operand is a string
fn add(realm: &Realm, left: &JsValue, right: &JsValue) -> Result<JsValue, JsError> {
    let left = realm.try_to_primitive(left, PreferredType::Default)?;
    let right = realm.try_to_primitive(right, PreferredType::Default)?;
    Ok(match (&left, &right) {
        (JsValue::String(a), _) => JsValue::String(a.clone() + &right.to_js_string()),
        (_, JsValue::String(b)) => JsValue::String(left.to_js_string() + b),
        _ => JsValue::Number(left.to_number() + right.to_number()),
    })
}

/// Apply a unary operator to an evaluated operand. `delete` of a non-reference
/// is always true.
pub fn unary(realm: &Realm, op: &UnaryOp, operand: &JsValue) -> Result<JsValue, JsError> {
    Ok(match op {
        UnaryOp::Minus => JsValue::Number(-realm.to_number(operand)),
        UnaryOp::Plus => JsValue::Number(realm.to_number(operand)),
        UnaryOp::Not => JsValue::Boolean(!operand.to_boolean()),
        UnaryOp::BitNot => JsValue::Number(!to_int32(realm.to_number(operand)) as f64),
        UnaryOp::Typeof => JsValue::String(JsString::from(realm.type_of(operand))),
        UnaryOp::Void => JsValue::Undefined,
        UnaryOp::Delete => JsValue::Boolean(true),
        UnaryOp::Unknown(token) => return Err(JsError::unknown_operator(token.as_str())),
    })
}

/// New value for `++`/`--`
pub fn update(op: &UpdateOp, old: f64) -> Result<f64, JsError> {
    match op {
        UpdateOp::Increment => Ok(old + 1.0),
        UpdateOp::Decrement => Ok(old - 1.0),
        UpdateOp::Unknown(token) => Err(JsError::unknown_operator(token.as_str())),
    }
}
