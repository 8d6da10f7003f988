//! Global built-in values and functions (parseInt, parseFloat, URI functions, etc.)

use super::{arg, define_global};
use crate::error::JsError;
use crate::realm::Realm;
use crate::value::{JsFunction, JsString, JsValue, parse_radix_digits, to_int32};

type NativeMethod = fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

/// Register global values and functions into the global scope
pub fn init_global_functions(realm: &mut Realm) {
    define_global(realm, "Infinity", JsValue::Number(f64::INFINITY), true);
    define_global(realm, "NaN", JsValue::Number(f64::NAN), true);
    define_global(realm, "undefined", JsValue::Undefined, true);
    let global = realm.global_scope();
    define_global(realm, "self", JsValue::Object(global), false);

    let functions: [(&str, NativeMethod, u32); 10] = [
        ("isNaN", global_is_nan, 1),
        ("isFinite", global_is_finite, 1),
        ("parseInt", global_parse_int, 2),
        ("parseFloat", global_parse_float, 1),
        ("escape", global_escape, 1),
        ("unescape", global_unescape, 1),
        ("encodeURI", global_encode_uri, 1),
        ("encodeURIComponent", global_encode_uri_component, 1),
        ("decodeURI", global_decode_uri, 1),
        ("decodeURIComponent", global_decode_uri_component, 1),
    ];
    for (name, func, arity) in functions {
        let function = realm.create_native_function(name, func, arity);
        define_global(realm, name, JsValue::Object(function), false);
    }

    if realm.config().allow_eval {
        let eval = realm.create_function_object(JsFunction::Eval, 1);
        define_global(realm, "eval", JsValue::Object(eval), false);
    }
}

fn string_arg(realm: &Realm, args: &[JsValue]) -> JsString {
    realm.to_string(&arg(args, 0))
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

// Global isNaN - converts argument to number first
pub fn global_is_nan(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(realm.to_number(&arg(args, 0)).is_nan()))
}

// Global isFinite - converts argument to number first
pub fn global_is_finite(
    realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(realm.to_number(&arg(args, 0)).is_finite()))
}

/// Parse the longest prefix of digits valid in `radix`. A radix of 0 means
/// 10, or 16 when the string starts with `0x`.
pub fn global_parse_int(
    realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let string = string_arg(realm, args);
    let s = string.as_str().trim_start_matches(is_js_whitespace);
    let mut radix = to_int32(realm.to_number(&arg(args, 1)));

    // Handle sign
    let (negative, s) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    };

    let hex_body = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"));
    let s = match hex_body {
        Some(body) if radix == 0 || radix == 16 => {
            radix = 16;
            body
        }
        _ => s,
    };
    if radix == 0 {
        radix = 10;
    }
    if !(2..=36).contains(&radix) {
        return Ok(JsValue::Number(f64::NAN));
    }

    // Parse digits until invalid character
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_digit(radix as u32))
        .map_or(s.len(), |(index, _)| index);
    let digits = s.get(..end).unwrap_or_default();
    let result = parse_radix_digits(digits, radix as u32).unwrap_or(f64::NAN);
    Ok(JsValue::Number(if negative { -result } else { result }))
}

/// Length of the longest prefix of `s` that reads as a decimal literal
fn float_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut pos = 0;
    let mut valid = 0;
    let mut seen_digit = false;

    // Handle sign
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        pos += 1;
    }
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
        seen_digit = true;
        valid = pos;
    }
    if bytes.get(pos) == Some(&b'.') {
        pos += 1;
        if seen_digit {
            valid = pos;
        }
        while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
            pos += 1;
            seen_digit = true;
            valid = pos;
        }
    }
    if !seen_digit {
        return 0;
    }
    // The exponent counts only with at least one digit
    if matches!(bytes.get(pos), Some(b'e' | b'E')) {
        let mut exp = pos + 1;
        if matches!(bytes.get(exp), Some(b'-' | b'+')) {
            exp += 1;
        }
        let digits_start = exp;
        while bytes.get(exp).is_some_and(u8::is_ascii_digit) {
            exp += 1;
        }
        if exp > digits_start {
            valid = exp;
        }
    }
    valid
}

pub fn global_parse_float(
    realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let string = string_arg(realm, args);
    let s = string.as_str().trim_start_matches(is_js_whitespace);

    for (prefix, value) in [
        ("Infinity", f64::INFINITY),
        ("+Infinity", f64::INFINITY),
        ("-Infinity", f64::NEG_INFINITY),
    ] {
        if s.starts_with(prefix) {
            return Ok(JsValue::Number(value));
        }
    }

    let end = float_prefix_len(s);
    let n = s
        .get(..end)
        .and_then(|prefix| prefix.parse::<f64>().ok())
        .unwrap_or(f64::NAN);
    Ok(JsValue::Number(n))
}

// ═══════════════════════════════════════════════════════════════════════════
// escape / unescape
// ═══════════════════════════════════════════════════════════════════════════

const ESCAPE_UNESCAPED: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789@*_+-./";

/// `%XX` for Latin-1, `%uXXXX` for every other UTF-16 unit
pub fn global_escape(realm: &mut Realm, _this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    let s = string_arg(realm, args);
    let mut result = String::new();
    for c in s.as_str().chars() {
        if ESCAPE_UNESCAPED.contains(c) {
            result.push(c);
            continue;
        }
        let mut units = [0u16; 2];
        for unit in c.encode_utf16(&mut units) {
            if *unit < 256 {
                result.push_str(&format!("%{:02X}", unit));
            } else {
                result.push_str(&format!("%u{:04X}", unit));
            }
        }
    }
    Ok(JsValue::from(result))
}

/// Hex value of `len` ASCII hex digits at `pos`
fn hex_at(s: &str, pos: usize, len: usize) -> Option<u32> {
    let digits = s.get(pos..pos + len)?;
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Reverse of `escape`. Malformed sequences are kept literally.
pub fn global_unescape(
    realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let string = string_arg(realm, args);
    let s = string.as_str();
    let mut units: Vec<u16> = Vec::with_capacity(s.len());
    let mut pos = 0;
    while let Some(c) = s.get(pos..).and_then(|rest| rest.chars().next()) {
        if c == '%' {
            if s.get(pos + 1..pos + 2) == Some("u") {
                if let Some(unit) = hex_at(s, pos + 2, 4) {
                    units.push(unit as u16);
                    pos += 6;
                    continue;
                }
            } else if let Some(unit) = hex_at(s, pos + 1, 2) {
                units.push(unit as u16);
                pos += 3;
                continue;
            }
        }
        let mut buf = [0u16; 2];
        units.extend_from_slice(c.encode_utf16(&mut buf));
        pos += c.len_utf8();
    }
    let decoded: String = char::decode_utf16(units)
        .map(|unit| unit.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    Ok(JsValue::from(decoded))
}

// ═══════════════════════════════════════════════════════════════════════════
// URI functions
// ═══════════════════════════════════════════════════════════════════════════

// Characters that encodeURI should NOT encode (RFC 3986 + extra URI chars)
const URI_UNESCAPED: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_.!~*'()";
const URI_RESERVED: &str = ";/?:@&=+$,#";

fn percent_encode(s: &str, keep_reserved: bool) -> String {
    let mut result = String::with_capacity(s.len());
    let mut buf = [0u8; 4];
    for c in s.chars() {
        if URI_UNESCAPED.contains(c) || (keep_reserved && URI_RESERVED.contains(c)) {
            result.push(c);
        } else {
            for byte in c.encode_utf8(&mut buf).bytes() {
                result.push_str(&format!("%{:02X}", byte));
            }
        }
    }
    result
}

fn uri_malformed() -> JsError {
    JsError::type_error("URI malformed")
}

/// Decode `%XX` escapes as UTF-8. Escapes of characters in `preserve` stay
/// encoded.
fn percent_decode(s: &str, preserve: &str) -> Result<String, JsError> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while let Some(&byte) = bytes.get(pos) {
        if byte != b'%' {
            out.push(byte);
            pos += 1;
            continue;
        }
        let decoded = hex_at(s, pos + 1, 2).ok_or_else(uri_malformed)? as u8;
        if decoded.is_ascii() && preserve.contains(decoded as char) {
            out.extend_from_slice(bytes.get(pos..pos + 3).unwrap_or_default());
        } else {
            out.push(decoded);
        }
        pos += 3;
    }
    String::from_utf8(out).map_err(|_| uri_malformed())
}

pub fn global_encode_uri(
    realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = string_arg(realm, args);
    Ok(JsValue::from(percent_encode(s.as_str(), true)))
}

pub fn global_encode_uri_component(
    realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = string_arg(realm, args);
    Ok(JsValue::from(percent_encode(s.as_str(), false)))
}

pub fn global_decode_uri(
    realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = string_arg(realm, args);
    Ok(JsValue::from(percent_decode(s.as_str(), URI_RESERVED)?))
}

pub fn global_decode_uri_component(
    realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = string_arg(realm, args);
    Ok(JsValue::from(percent_decode(s.as_str(), "")?))
}
