//! The Math object
//!
//! Transcendental functions go through `libm` so results do not depend on the
//! platform's C library.

use super::{arg, define_global};
use crate::error::JsError;
use crate::realm::Realm;
use crate::value::JsValue;

type NativeMethod = fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

/// Create the Math object with its constants and functions
pub fn init_math(realm: &mut Realm) {
    let math = realm.create_plain_object();
    define_global(realm, "Math", JsValue::Object(math), false);

    // Constants
    for (name, value) in [
        ("E", std::f64::consts::E),
        ("LN2", std::f64::consts::LN_2),
        ("LN10", std::f64::consts::LN_10),
        ("LOG2E", std::f64::consts::LOG2_E),
        ("LOG10E", std::f64::consts::LOG10_E),
        ("PI", std::f64::consts::PI),
        ("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2),
        ("SQRT2", std::f64::consts::SQRT_2),
    ] {
        realm.define_property(math, name, JsValue::Number(value), true, false);
    }

    let functions: [(&str, NativeMethod); 13] = [
        ("abs", math_abs),
        ("acos", math_acos),
        ("asin", math_asin),
        ("atan", math_atan),
        ("ceil", math_ceil),
        ("cos", math_cos),
        ("exp", math_exp),
        ("floor", math_floor),
        ("log", math_log),
        ("round", math_round),
        ("sin", math_sin),
        ("sqrt", math_sqrt),
        ("tan", math_tan),
    ];
    for (name, func) in functions {
        realm.register_method(math, name, func, 1);
    }

    realm.register_method(math, "atan2", math_atan2, 2);
    realm.register_method(math, "pow", math_pow, 2);
    realm.register_method(math, "max", math_max, 2);
    realm.register_method(math, "min", math_min, 2);
    realm.register_method(math, "random", math_random, 0);
}

fn number_arg(realm: &Realm, args: &[JsValue], index: usize) -> f64 {
    realm.to_number(&arg(args, index))
}

fn unary(realm: &Realm, args: &[JsValue], f: fn(f64) -> f64) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(f(number_arg(realm, args, 0))))
}

pub fn math_abs(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, f64::abs)
}

pub fn math_acos(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, libm::acos)
}

pub fn math_asin(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, libm::asin)
}

pub fn math_atan(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, libm::atan)
}

pub fn math_ceil(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, f64::ceil)
}

pub fn math_cos(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, libm::cos)
}

pub fn math_exp(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, libm::exp)
}

pub fn math_floor(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, f64::floor)
}

pub fn math_log(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, libm::log)
}

pub fn math_sin(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, libm::sin)
}

pub fn math_sqrt(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, libm::sqrt)
}

pub fn math_tan(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, libm::tan)
}

/// Halves round towards +Infinity: `round(-2.5)` is -2
fn js_round(x: f64) -> f64 {
    if !x.is_finite() || x == 0.0 || x.abs() >= 4_503_599_627_370_496.0 {
        return x;
    }
    if x > 0.0 && x < 0.5 {
        return 0.0;
    }
    if x < 0.0 && x >= -0.5 {
        return -0.0;
    }
    let floor = x.floor();
    if x - floor >= 0.5 { floor + 1.0 } else { floor }
}

pub fn math_round(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    unary(realm, args, js_round)
}

pub fn math_atan2(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let y = number_arg(realm, args, 0);
    let x = number_arg(realm, args, 1);
    Ok(JsValue::Number(libm::atan2(y, x)))
}

/// `pow` with the cases where JavaScript and C disagree: a NaN exponent is
/// always NaN, and ±1 to an infinite power is NaN
pub fn math_pow(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let base = number_arg(realm, args, 0);
    let exponent = number_arg(realm, args, 1);
    let result = if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        f64::NAN
    } else {
        libm::pow(base, exponent)
    };
    Ok(JsValue::Number(result))
}

pub fn math_max(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let mut result = f64::NEG_INFINITY;
    for value in args {
        let n = realm.to_number(value);
        if n.is_nan() {
            return Ok(JsValue::Number(f64::NAN));
        }
        // +0 beats -0
        if n > result || (n == 0.0 && result == 0.0 && n.is_sign_positive()) {
            result = n;
        }
    }
    Ok(JsValue::Number(result))
}

pub fn math_min(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let mut result = f64::INFINITY;
    for value in args {
        let n = realm.to_number(value);
        if n.is_nan() {
            return Ok(JsValue::Number(f64::NAN));
        }
        // -0 beats +0
        if n < result || (n == 0.0 && result == 0.0 && n.is_sign_negative()) {
            result = n;
        }
    }
    Ok(JsValue::Number(result))
}

pub fn math_random(realm: &mut Realm, _this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(realm.next_random()))
}
