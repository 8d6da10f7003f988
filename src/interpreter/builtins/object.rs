//! Object constructor and Object.prototype

use super::{arg, define_global, is_construct_call};
use crate::error::JsError;
use crate::realm::Realm;
use crate::value::{CheapClone, JsValue, ObjectId, ObjectKind};

/// Create `Object`. Its prototype has no parent; it ends every chain.
pub fn init_object(realm: &mut Realm) -> ObjectId {
    let ctor = realm.create_native_function("Object", object_constructor, 1);
    realm.intrinsics.object = ctor;
    define_global(realm, "Object", JsValue::Object(ctor), false);
    ctor
}

pub fn init_object_prototype(realm: &mut Realm) {
    let Some(proto) = realm.prototype_object(realm.intrinsics.object) else {
        return;
    };
    realm.register_method(proto, "toString", object_to_string, 0);
    realm.register_method(proto, "valueOf", object_value_of, 0);
}

/// `Object(value)`: objects pass through, primitives are wrapped, null and
/// undefined give a fresh object
pub fn object_constructor(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = arg(args, 0);
    let wrapper_ctor = match &value {
        JsValue::Object(_) => return Ok(value.cheap_clone()),
        JsValue::Undefined | JsValue::Null => {
            if is_construct_call(realm, &this, realm.intrinsics.object) {
                return Ok(this);
            }
            return Ok(JsValue::Object(realm.create_plain_object()));
        }
        JsValue::Boolean(_) => realm.intrinsics.boolean,
        JsValue::Number(_) => realm.intrinsics.number,
        JsValue::String(_) => realm.intrinsics.string,
    };
    let wrapper = realm.create_object(Some(wrapper_ctor));
    if let Some(obj) = realm.object_mut(wrapper) {
        obj.kind = ObjectKind::Primitive(value);
    }
    Ok(JsValue::Object(wrapper))
}

pub fn object_to_string(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::String(realm.to_string(&this)))
}

pub fn object_value_of(
    _realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(this)
}
