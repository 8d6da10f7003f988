//! Array constructor and Array.prototype
//!
//! The methods are generic: they read and write through `length` and index
//! properties, so they also work on array-like receivers.

use super::{arg, define_global, is_construct_call};
use crate::error::JsError;
use crate::realm::{Realm, array_index};
use crate::value::{CheapClone, JsValue, PropertyKey};

pub fn init_array(realm: &mut Realm) {
    let ctor = realm.create_native_function("Array", array_constructor, 1);
    realm.intrinsics.array = ctor;
    define_global(realm, "Array", JsValue::Object(ctor), false);

    let Some(proto) = realm.prototype_object(ctor) else {
        return;
    };

    // Mutating methods
    realm.register_method(proto, "push", array_push, 1);
    realm.register_method(proto, "pop", array_pop, 0);
    realm.register_method(proto, "shift", array_shift, 0);
    realm.register_method(proto, "unshift", array_unshift, 1);
    realm.register_method(proto, "splice", array_splice, 2);
    realm.register_method(proto, "reverse", array_reverse, 0);

    // Accessor methods
    realm.register_method(proto, "concat", array_concat, 1);
    realm.register_method(proto, "slice", array_slice, 2);
    realm.register_method(proto, "join", array_join, 1);
    realm.register_method(proto, "toString", array_to_string, 0);
    realm.register_method(proto, "indexOf", array_index_of, 1);
    realm.register_method(proto, "lastIndexOf", array_last_index_of, 1);
}

/// `Array(n)` makes an empty array of length `n`; any other argument list
/// becomes the elements
pub fn array_constructor(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let array = match this.as_object() {
        Some(id) if is_construct_call(realm, &this, realm.intrinsics.array) => id,
        _ => realm.create_array(Vec::new()),
    };
    if let [JsValue::Number(n)] = args {
        let length = array_index(*n).ok_or_else(|| JsError::range_error("Invalid array length"))?;
        realm.set_array_length(array, length);
    } else {
        for (index, value) in args.iter().enumerate() {
            realm.define_property(array, index as u32, value.cheap_clone(), false, true);
        }
    }
    Ok(JsValue::Object(array))
}

fn get_index(realm: &Realm, target: &JsValue, index: u32) -> Result<JsValue, JsError> {
    realm.get_property(target, &PropertyKey::from(index))
}

fn set_index(
    realm: &mut Realm,
    target: &JsValue,
    index: u32,
    value: JsValue,
) -> Result<(), JsError> {
    realm.set_property(target, &PropertyKey::from(index), value)
}

fn set_length(realm: &mut Realm, target: &JsValue, length: u32) -> Result<(), JsError> {
    realm.set_property(target, &PropertyKey::from("length"), JsValue::from(length))
}

fn require_object(this: &JsValue, method: &str) -> Result<(), JsError> {
    if this.is_null_or_undefined() {
        return Err(JsError::type_error(format!(
            "Array.prototype.{method} called on null or undefined"
        )));
    }
    Ok(())
}

/// Resolve a possibly negative position against `length`
fn relative_index(realm: &Realm, value: &JsValue, length: u32, default: u32) -> u32 {
    if matches!(value, JsValue::Undefined) {
        return default;
    }
    let n = realm.to_number(value);
    if n.is_nan() {
        return 0;
    }
    let length = length as f64;
    let index = if n < 0.0 {
        (length + n.trunc()).max(0.0)
    } else {
        n.trunc().min(length)
    };
    index as u32
}

pub fn array_push(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    require_object(&this, "push")?;
    let mut length = realm.length_of(&this);
    for value in args {
        let next = length.checked_add(1).ok_or_else(invalid_length)?;
        set_index(realm, &this, length, value.cheap_clone())?;
        length = next;
    }
    set_length(realm, &this, length)?;
    Ok(JsValue::from(length))
}

pub fn array_pop(realm: &mut Realm, this: JsValue, _args: &[JsValue]) -> Result<JsValue, JsError> {
    require_object(&this, "pop")?;
    let length = realm.length_of(&this);
    if length == 0 {
        set_length(realm, &this, 0)?;
        return Ok(JsValue::Undefined);
    }
    let last = length - 1;
    let value = get_index(realm, &this, last)?;
    realm.delete_property(&this, &PropertyKey::from(last));
    set_length(realm, &this, last)?;
    Ok(value)
}

pub fn array_shift(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    require_object(&this, "shift")?;
    let length = realm.length_of(&this);
    if length == 0 {
        set_length(realm, &this, 0)?;
        return Ok(JsValue::Undefined);
    }
    let first = get_index(realm, &this, 0)?;
    for (index, value) in take_elements(realm, &this, length)? {
        if index > 0 {
            set_index(realm, &this, index - 1, value)?;
        }
    }
    set_length(realm, &this, length - 1)?;
    Ok(first)
}

pub fn array_unshift(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    require_object(&this, "unshift")?;
    let length = realm.length_of(&this);
    let count = u32::try_from(args.len()).map_err(|_| invalid_length())?;
    let new_length = length.checked_add(count).ok_or_else(invalid_length)?;
    // index < length, so index + count < new_length
    for (index, value) in take_elements(realm, &this, length)? {
        set_index(realm, &this, index + count, value)?;
    }
    for (offset, value) in args.iter().enumerate() {
        set_index(realm, &this, offset as u32, value.cheap_clone())?;
    }
    set_length(realm, &this, new_length)?;
    Ok(JsValue::from(new_length))
}

fn invalid_length() -> JsError {
    JsError::range_error("Invalid array length")
}

/// Remove the elements below `length` and return them in ascending index
/// order. Huge sparse receivers only give up their present indices.
fn take_elements(
    realm: &mut Realm,
    target: &JsValue,
    length: u32,
) -> Result<Vec<(u32, JsValue)>, JsError> {
    let indices = realm.element_indices(target, length);
    let mut taken = Vec::with_capacity(indices.len());
    for index in indices {
        taken.push((index, get_index(realm, target, index)?));
        realm.delete_property(target, &PropertyKey::from(index));
    }
    Ok(taken)
}

/// Rewrite `target` to hold exactly `elements`
fn store_elements(
    realm: &mut Realm,
    target: &JsValue,
    elements: Vec<JsValue>,
) -> Result<(), JsError> {
    let old_length = realm.length_of(target);
    let new_length = elements.len() as u32;
    for (index, value) in elements.into_iter().enumerate() {
        set_index(realm, target, index as u32, value)?;
    }
    for index in new_length..old_length {
        realm.delete_property(target, &PropertyKey::from(index));
    }
    set_length(realm, target, new_length)
}

pub fn array_reverse(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    require_object(&this, "reverse")?;
    let mut elements = realm.array_elements(&this)?;
    elements.reverse();
    store_elements(realm, &this, elements)?;
    Ok(this)
}

/// `splice(start, deleteCount, ...items)`: returns the removed elements
pub fn array_splice(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    require_object(&this, "splice")?;
    let elements = realm.array_elements(&this)?;
    let length = elements.len() as u32;
    let start = relative_index(realm, &arg(args, 0), length, 0);
    let delete_count = match args.len() {
        0 => 0,
        1 => length - start,
        _ => {
            let n = realm.to_number(&arg(args, 1));
            if n.is_nan() || n <= 0.0 {
                0
            } else {
                n.trunc().min((length - start) as f64) as u32
            }
        }
    };

    let (start, delete_count) = (start as usize, delete_count as usize);
    let removed: Vec<JsValue> = elements
        .iter()
        .skip(start)
        .take(delete_count)
        .cloned()
        .collect();
    let spliced: Vec<JsValue> = elements
        .iter()
        .take(start)
        .chain(args.iter().skip(2))
        .chain(elements.iter().skip(start + delete_count))
        .cloned()
        .collect();
    store_elements(realm, &this, spliced)?;
    Ok(JsValue::Object(realm.create_array(removed)))
}

pub fn array_slice(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    require_object(&this, "slice")?;
    let elements = realm.array_elements(&this)?;
    let length = elements.len() as u32;
    let begin = relative_index(realm, &arg(args, 0), length, 0);
    let end = relative_index(realm, &arg(args, 1), length, length);
    let sliced: Vec<JsValue> = elements
        .into_iter()
        .skip(begin as usize)
        .take(end.saturating_sub(begin) as usize)
        .collect();
    Ok(JsValue::Object(realm.create_array(sliced)))
}

pub fn array_concat(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    require_object(&this, "concat")?;
    let mut result = Vec::new();
    for value in std::iter::once(&this).chain(args) {
        let is_array = value
            .as_object()
            .and_then(|id| realm.object(id))
            .is_some_and(|obj| obj.is_array());
        if is_array {
            result.extend(realm.array_elements(value)?);
        } else {
            result.push(value.cheap_clone());
        }
    }
    Ok(JsValue::Object(realm.create_array(result)))
}

pub fn array_join(realm: &mut Realm, this: JsValue, args: &[JsValue]) -> Result<JsValue, JsError> {
    require_object(&this, "join")?;
    let separator = match args.first() {
        None | Some(JsValue::Undefined) => ",".into(),
        Some(sep) => realm.to_string(sep),
    };
    match this.as_object() {
        Some(id) => Ok(JsValue::String(realm.join(id, separator.as_str())?)),
        None => Ok(JsValue::String(realm.to_string(&this))),
    }
}

/// Array.prototype.toString()
/// Equivalent to join() with the default separator.
pub fn array_to_string(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    array_join(realm, this, &[])
}

pub fn array_index_of(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    require_object(&this, "indexOf")?;
    let search = arg(args, 0);
    let length = realm.length_of(&this);
    let from = relative_index(realm, &arg(args, 1), length, 0);
    for index in realm.element_indices(&this, length) {
        if index >= from && get_index(realm, &this, index)?.strict_equals(&search) {
            return Ok(JsValue::from(index));
        }
    }
    Ok(JsValue::Number(-1.0))
}

pub fn array_last_index_of(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    require_object(&this, "lastIndexOf")?;
    let search = arg(args, 0);
    let length = realm.length_of(&this);
    let last = i64::from(length) - 1;

    let from_index = match args.get(1) {
        None | Some(JsValue::Undefined) => last,
        Some(value) => {
            let n = realm.to_number(value);
            let n = if n.is_nan() { 0 } else { n.trunc() as i64 };
            if n < 0 { (last + 1 + n).max(-1) } else { n.min(last) }
        }
    };
    if from_index < 0 {
        return Ok(JsValue::Number(-1.0));
    }

    for index in realm.element_indices(&this, length).into_iter().rev() {
        if i64::from(index) <= from_index
            && get_index(realm, &this, index)?.strict_equals(&search)
        {
            return Ok(JsValue::from(index));
        }
    }
    Ok(JsValue::Number(-1.0))
}
