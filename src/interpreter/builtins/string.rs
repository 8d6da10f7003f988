//! String constructor and String.prototype
//!
//! Positions count UTF-16 code units, matching how `length` and `s[i]` see
//! a string. A slice that splits a surrogate pair renders the lone half as
//! U+FFFD.

use super::{arg, define_global, is_construct_call};
use crate::error::JsError;
use crate::realm::Realm;
use crate::value::{CheapClone, JsString, JsValue, ObjectKind, to_uint32};

pub fn init_string(realm: &mut Realm) {
    let ctor = realm.create_native_function("String", string_constructor, 1);
    realm.intrinsics.string = ctor;
    define_global(realm, "String", JsValue::Object(ctor), false);

    let Some(proto) = realm.prototype_object(ctor) else {
        return;
    };

    // Case conversion
    realm.register_method(proto, "toLowerCase", string_to_lower_case, 0);
    realm.register_method(proto, "toUpperCase", string_to_upper_case, 0);
    realm.register_method(proto, "toLocaleLowerCase", string_to_lower_case, 0);
    realm.register_method(proto, "toLocaleUpperCase", string_to_upper_case, 0);

    // Whitespace
    realm.register_method(proto, "trim", string_trim, 0);
    realm.register_method(proto, "trimLeft", string_trim_left, 0);
    realm.register_method(proto, "trimRight", string_trim_right, 0);

    // Access and search
    realm.register_method(proto, "charAt", string_char_at, 1);
    realm.register_method(proto, "charCodeAt", string_char_code_at, 1);
    realm.register_method(proto, "indexOf", string_index_of, 1);
    realm.register_method(proto, "lastIndexOf", string_last_index_of, 1);

    // Extraction
    realm.register_method(proto, "split", string_split, 2);
    realm.register_method(proto, "substring", string_substring, 2);
    realm.register_method(proto, "substr", string_substr, 2);
    realm.register_method(proto, "concat", string_concat, 1);

    realm.register_method(proto, "toString", string_value_of, 0);
    realm.register_method(proto, "valueOf", string_value_of, 0);
}

/// `String(value)` converts; `new String(value)` wraps
pub fn string_constructor(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = match args.first() {
        Some(value) => realm.try_to_string(value)?,
        None => JsString::from(""),
    };
    if let Some(id) = this.as_object() {
        if is_construct_call(realm, &this, realm.intrinsics.string) {
            if let Some(obj) = realm.object_mut(id) {
                obj.kind = ObjectKind::Primitive(JsValue::String(s));
            }
            return Ok(this);
        }
    }
    Ok(JsValue::String(s))
}

/// Receiver coerced to a string; null and undefined are rejected
fn this_string(realm: &Realm, this: &JsValue, method: &str) -> Result<JsString, JsError> {
    if this.is_null_or_undefined() {
        return Err(JsError::type_error(format!(
            "String.prototype.{method} called on null or undefined"
        )));
    }
    Ok(realm.to_string(this))
}

fn this_units(realm: &Realm, this: &JsValue, method: &str) -> Result<Vec<u16>, JsError> {
    Ok(this_string(realm, this, method)?.code_units())
}

/// ToInteger of an argument, `default` when absent or undefined
fn position_arg(realm: &Realm, args: &[JsValue], index: usize, default: f64) -> f64 {
    match args.get(index) {
        None | Some(JsValue::Undefined) => default,
        Some(value) => {
            let n = realm.to_number(value);
            if n.is_nan() { 0.0 } else { n.trunc() }
        }
    }
}

fn clamp_index(n: f64, length: usize) -> usize {
    n.max(0.0).min(length as f64) as usize
}

fn collect(units: &[u16]) -> JsValue {
    JsValue::from(String::from_utf16_lossy(units))
}

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

pub fn string_to_lower_case(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = this_string(realm, &this, "toLowerCase")?;
    Ok(JsValue::from(s.as_str().to_lowercase()))
}

pub fn string_to_upper_case(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = this_string(realm, &this, "toUpperCase")?;
    Ok(JsValue::from(s.as_str().to_uppercase()))
}

pub fn string_trim(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = this_string(realm, &this, "trim")?;
    Ok(JsValue::from(s.as_str().trim_matches(is_js_whitespace)))
}

pub fn string_trim_left(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = this_string(realm, &this, "trimLeft")?;
    Ok(JsValue::from(s.as_str().trim_start_matches(is_js_whitespace)))
}

pub fn string_trim_right(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = this_string(realm, &this, "trimRight")?;
    Ok(JsValue::from(s.as_str().trim_end_matches(is_js_whitespace)))
}

pub fn string_char_at(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = this_string(realm, &this, "charAt")?;
    let pos = position_arg(realm, args, 0, 0.0);
    let c = if pos < 0.0 { None } else { s.char_at(pos as usize) };
    Ok(JsValue::from(c.unwrap_or_default()))
}

/// UTF-16 code unit at a position; NaN when out of range
pub fn string_char_code_at(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = this_string(realm, &this, "charCodeAt")?;
    let pos = position_arg(realm, args, 0, 0.0);
    let unit = if pos < 0.0 { None } else { s.code_unit_at(pos as usize) };
    Ok(JsValue::Number(unit.map_or(f64::NAN, f64::from)))
}

/// First occurrence of `needle` starting at or after `from`
fn find_forward(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .skip(from)
        .find(|(_, window)| *window == needle)
        .map(|(index, _)| index)
}

/// Last occurrence of `needle` starting at or before `from`
fn find_backward(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return Some(from.min(haystack.len()));
    }
    haystack
        .windows(needle.len())
        .enumerate()
        .take(from.saturating_add(1))
        .filter(|(_, window)| *window == needle)
        .map(|(index, _)| index)
        .last()
}

fn index_result(found: Option<usize>) -> JsValue {
    JsValue::Number(found.map_or(-1.0, |index| index as f64))
}

pub fn string_index_of(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let chars = this_units(realm, &this, "indexOf")?;
    let needle = realm.to_string(&arg(args, 0)).code_units();
    let from = clamp_index(position_arg(realm, args, 1, 0.0), chars.len());
    Ok(index_result(find_forward(&chars, &needle, from)))
}

pub fn string_last_index_of(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let chars = this_units(realm, &this, "lastIndexOf")?;
    let needle = realm.to_string(&arg(args, 0)).code_units();
    // NaN position means "search everything"
    let from = match args.get(1) {
        Some(value) if !realm.to_number(value).is_nan() => {
            clamp_index(position_arg(realm, args, 1, 0.0), chars.len())
        }
        _ => chars.len(),
    };
    Ok(index_result(find_backward(&chars, &needle, from)))
}

/// `split(separator, limit)`. Without a separator the whole string is the
/// only piece; an empty separator splits into code units.
pub fn string_split(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let s = this_string(realm, &this, "split")?;
    let limit = match args.get(1) {
        None | Some(JsValue::Undefined) => u32::MAX,
        Some(value) => to_uint32(realm.to_number(value)),
    } as usize;

    let pieces: Vec<JsValue> = match args.first() {
        None | Some(JsValue::Undefined) => vec![JsValue::String(s.cheap_clone())],
        Some(separator) => {
            let separator = realm.to_string(separator);
            if separator.is_empty() {
                s.code_units()
                    .into_iter()
                    .map(|unit| collect(&[unit]))
                    .collect()
            } else {
                s.as_str()
                    .split(separator.as_str())
                    .map(JsValue::from)
                    .collect()
            }
        }
    };
    let pieces = pieces.into_iter().take(limit).collect();
    Ok(JsValue::Object(realm.create_array(pieces)))
}

/// `substring(start, end)`: bounds are clamped and swapped when reversed
pub fn string_substring(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let chars = this_units(realm, &this, "substring")?;
    let length = chars.len();
    let start = clamp_index(position_arg(realm, args, 0, 0.0), length);
    let end = clamp_index(position_arg(realm, args, 1, length as f64), length);
    let (from, to) = if start <= end { (start, end) } else { (end, start) };
    Ok(collect(chars.get(from..to).unwrap_or_default()))
}

/// `substr(start, length)`: a negative start counts from the end
pub fn string_substr(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let chars = this_units(realm, &this, "substr")?;
    let length = chars.len();
    let start = position_arg(realm, args, 0, 0.0);
    let start = if start < 0.0 {
        clamp_index(length as f64 + start, length)
    } else {
        clamp_index(start, length)
    };
    let count = clamp_index(
        position_arg(realm, args, 1, length as f64),
        length - start,
    );
    Ok(collect(chars.get(start..start + count).unwrap_or_default()))
}

pub fn string_concat(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let mut s = this_string(realm, &this, "concat")?.to_string();
    for value in args {
        s.push_str(realm.to_string(value).as_str());
    }
    Ok(JsValue::from(s))
}

/// `toString`/`valueOf` only accept strings and String wrappers
pub fn string_value_of(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    match &this {
        JsValue::String(_) => Ok(this),
        JsValue::Object(id) => match realm.object(*id).map(|obj| &obj.kind) {
            Some(ObjectKind::Primitive(value @ JsValue::String(_))) => Ok(value.cheap_clone()),
            _ => Err(JsError::type_error(
                "String.prototype.valueOf requires that 'this' be a String",
            )),
        },
        _ => Err(JsError::type_error(
            "String.prototype.valueOf requires that 'this' be a String",
        )),
    }
}
