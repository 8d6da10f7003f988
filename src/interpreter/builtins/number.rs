//! Number constructor, constants and Number.prototype

use super::{arg, define_global, is_construct_call};
use crate::error::JsError;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectKind, number_to_string};

pub fn init_number(realm: &mut Realm) {
    let ctor = realm.create_native_function("Number", number_constructor, 1);
    realm.intrinsics.number = ctor;
    define_global(realm, "Number", JsValue::Object(ctor), false);

    // Constants
    for (name, value) in [
        ("MAX_VALUE", f64::MAX),
        ("MIN_VALUE", 5e-324),
        ("NaN", f64::NAN),
        ("NEGATIVE_INFINITY", f64::NEG_INFINITY),
        ("POSITIVE_INFINITY", f64::INFINITY),
    ] {
        realm.define_property(ctor, name, JsValue::Number(value), true, false);
    }

    let Some(proto) = realm.prototype_object(ctor) else {
        return;
    };
    realm.register_method(proto, "toFixed", number_to_fixed, 1);
    realm.register_method(proto, "toString", number_to_string_method, 1);
    realm.register_method(proto, "toPrecision", number_to_precision, 1);
    realm.register_method(proto, "toExponential", number_to_exponential, 1);
    realm.register_method(proto, "valueOf", number_value_of, 0);
}

/// Number constructor function - Number(value) converts value to number
/// When called without `new`, returns a primitive number
/// When called with `new`, returns a Number wrapper object
pub fn number_constructor(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let n = match args.first() {
        Some(value) => realm.to_number(value),
        None => 0.0,
    };
    if let Some(id) = this.as_object() {
        if is_construct_call(realm, &this, realm.intrinsics.number) {
            if let Some(obj) = realm.object_mut(id) {
                obj.kind = ObjectKind::Primitive(JsValue::Number(n));
            }
            return Ok(this);
        }
    }
    Ok(JsValue::Number(n))
}

/// Helper to extract number value from `this`
/// Works for both primitive numbers and Number wrapper objects
fn this_number(realm: &Realm, this: &JsValue) -> Result<f64, JsError> {
    match this {
        JsValue::Number(n) => Ok(*n),
        JsValue::Object(id) => match realm.object(*id).map(|obj| &obj.kind) {
            Some(ObjectKind::Primitive(JsValue::Number(n))) => Ok(*n),
            _ => Err(JsError::type_error(
                "Number.prototype method called on incompatible receiver",
            )),
        },
        _ => Err(JsError::type_error(
            "Number.prototype method called on incompatible receiver",
        )),
    }
}

/// Integer argument with a default for undefined
fn integer_arg(realm: &Realm, args: &[JsValue], default: f64) -> f64 {
    match args.first() {
        None | Some(JsValue::Undefined) => default,
        Some(value) => {
            let n = realm.to_number(value);
            if n.is_nan() { 0.0 } else { n.trunc() }
        }
    }
}

pub fn number_value_of(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Number(this_number(realm, &this)?))
}

// Number.prototype.toFixed
pub fn number_to_fixed(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let n = this_number(realm, &this)?;
    let digits = integer_arg(realm, args, 0.0);
    if !(0.0..=100.0).contains(&digits) {
        return Err(JsError::range_error(
            "toFixed() digits argument must be between 0 and 100",
        ));
    }
    if !n.is_finite() || n.abs() >= 1e21 {
        return Ok(JsValue::from(number_to_string(n)));
    }
    // -0 prints without its sign
    let sign = if n < 0.0 { "-" } else { "" };
    let exact = format!("{:.prec$}", n.abs(), prec = EXACT_DIGITS);
    Ok(JsValue::from(format!(
        "{sign}{}",
        round_half_up(&exact, digits as usize)
    )))
}

/// Enough fraction digits to print any f64 exactly
const EXACT_DIGITS: usize = 1100;

/// Round an exact decimal expansion to `digits` fraction digits. Halves
/// round up, where Rust's formatter would round them to even.
fn round_half_up(exact: &str, digits: usize) -> String {
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact, ""));
    let mut kept: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(digits))
        .collect();
    if frac_part.as_bytes().get(digits).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            kept.insert(0, b'1');
        }
    }
    let (int_digits, frac_digits) = kept.split_at(kept.len() - digits);
    let int_digits = String::from_utf8_lossy(int_digits);
    if digits == 0 {
        int_digits.into_owned()
    } else {
        format!("{int_digits}.{}", String::from_utf8_lossy(frac_digits))
    }
}

/// Mantissa digits and decimal exponent of `x` with `fraction_digits`
/// digits after the leading one, halves rounded up
fn exponential_digits(x: f64, fraction_digits: usize) -> (String, i32) {
    let exact = format!("{:.prec$e}", x, prec = EXACT_DIGITS);
    let (mantissa, exponent) = exact.split_once('e').unwrap_or((exact.as_str(), "0"));
    let mut exponent: i32 = exponent.parse().unwrap_or(0);
    let rounded = round_half_up(mantissa, fraction_digits);
    let mut digits: String = rounded.chars().filter(char::is_ascii_digit).collect();
    // 9.99 -> 10.0
    if digits.len() > fraction_digits + 1 {
        digits.truncate(fraction_digits + 1);
        exponent += 1;
    }
    (digits, exponent)
}

/// Number.prototype.toString(radix)
pub fn number_to_string_method(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let n = this_number(realm, &this)?;
    let radix = integer_arg(realm, args, 10.0);
    if !(2.0..=36.0).contains(&radix) {
        return Err(JsError::range_error(
            "toString() radix must be between 2 and 36",
        ));
    }
    if radix == 10.0 || !n.is_finite() {
        return Ok(JsValue::from(number_to_string(n)));
    }
    Ok(JsValue::from(to_radix_string(n, radix as u32)))
}

const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

fn radix_digit(d: u32) -> char {
    DIGITS.get(d as usize).map_or('0', |&b| b as char)
}

/// Render a finite number in radix 2..=36, fraction digits included
fn to_radix_string(n: f64, radix: u32) -> String {
    let negative = n < 0.0;
    let n = n.abs();
    let mut int_part = n.trunc();
    let mut fraction = n - int_part;

    let mut digits = Vec::new();
    let base = radix as f64;
    while int_part >= 1.0 {
        digits.push(radix_digit((int_part % base) as u32));
        int_part = (int_part / base).trunc();
    }
    if digits.is_empty() {
        digits.push('0');
    }
    digits.reverse();
    let mut out: String = digits.into_iter().collect();

    if fraction > 0.0 {
        out.push('.');
        // 52 bits of mantissa never need more digits than this in radix 2
        for _ in 0..52 {
            fraction *= base;
            let digit = fraction.trunc();
            out.push(radix_digit(digit as u32));
            fraction -= digit;
            if fraction <= 0.0 {
                break;
            }
        }
    }
    if negative { format!("-{out}") } else { out }
}

/// Split Rust's `{:e}` output into mantissa digits and decimal exponent
fn scientific_parts(formatted: &str) -> (String, i32) {
    let (mantissa, exponent) = formatted.split_once('e').unwrap_or((formatted, "0"));
    let digits = mantissa.chars().filter(|c| c.is_ascii_digit()).collect();
    (digits, exponent.parse().unwrap_or(0))
}

/// `d.ddd` plus a JS-style exponent suffix
fn exponential_notation(digits: &str, exponent: i32) -> String {
    let mut chars = digits.chars();
    let mut out = String::new();
    if let Some(first) = chars.next() {
        out.push(first);
    }
    let rest: String = chars.collect();
    if !rest.is_empty() {
        out.push('.');
        out.push_str(&rest);
    }
    let sign = if exponent >= 0 { '+' } else { '-' };
    format!("{out}e{sign}{}", exponent.abs())
}

// Number.prototype.toPrecision
pub fn number_to_precision(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let n = this_number(realm, &this)?;
    if matches!(arg(args, 0), JsValue::Undefined) || !n.is_finite() {
        return Ok(JsValue::from(number_to_string(n)));
    }
    let precision = integer_arg(realm, args, 1.0);
    if !(1.0..=100.0).contains(&precision) {
        return Err(JsError::range_error(
            "toPrecision() argument must be between 1 and 100",
        ));
    }
    let precision = precision as i32;
    if n == 0.0 {
        return Ok(JsValue::from(format!(
            "{:.prec$}",
            0.0,
            prec = (precision - 1) as usize
        )));
    }

    let sign = if n < 0.0 { "-" } else { "" };
    let (digits, exponent) = exponential_digits(n.abs(), (precision - 1) as usize);

    if exponent < -6 || exponent >= precision {
        return Ok(JsValue::from(format!(
            "{sign}{}",
            exponential_notation(&digits, exponent)
        )));
    }

    let body = if exponent >= 0 {
        let split = (exponent + 1) as usize;
        let int_part: String = digits.chars().take(split).collect();
        let frac_part: String = digits.chars().skip(split).collect();
        if frac_part.is_empty() {
            int_part
        } else {
            format!("{int_part}.{frac_part}")
        }
    } else {
        format!("0.{}{digits}", "0".repeat((-exponent - 1) as usize))
    };
    Ok(JsValue::from(format!("{sign}{body}")))
}

// Number.prototype.toExponential
pub fn number_to_exponential(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let n = this_number(realm, &this)?;
    if !n.is_finite() {
        return Ok(JsValue::from(number_to_string(n)));
    }
    let (digits, exponent) = if matches!(arg(args, 0), JsValue::Undefined) {
        scientific_parts(&format!("{:e}", n.abs()))
    } else {
        let digits = integer_arg(realm, args, 0.0);
        if !(0.0..=100.0).contains(&digits) {
            return Err(JsError::range_error(
                "toExponential() argument must be between 0 and 100",
            ));
        }
        exponential_digits(n.abs(), digits as usize)
    };
    let sign = if n < 0.0 { "-" } else { "" };
    Ok(JsValue::from(format!(
        "{sign}{}",
        exponential_notation(&digits, exponent)
    )))
}
