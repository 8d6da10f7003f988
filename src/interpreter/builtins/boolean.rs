//! Boolean constructor and Boolean.prototype

use super::{arg, define_global, is_construct_call};
use crate::error::JsError;
use crate::realm::Realm;
use crate::value::{JsValue, ObjectKind};

pub fn init_boolean(realm: &mut Realm) {
    let ctor = realm.create_native_function("Boolean", boolean_constructor, 1);
    realm.intrinsics.boolean = ctor;
    define_global(realm, "Boolean", JsValue::Object(ctor), false);

    let Some(proto) = realm.prototype_object(ctor) else {
        return;
    };
    realm.register_method(proto, "toString", boolean_to_string, 0);
    realm.register_method(proto, "valueOf", boolean_value_of, 0);
}

/// Boolean(value) converts to a primitive; `new Boolean(value)` wraps it
pub fn boolean_constructor(
    realm: &mut Realm,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let b = arg(args, 0).to_boolean();
    if let Some(id) = this.as_object() {
        if is_construct_call(realm, &this, realm.intrinsics.boolean) {
            if let Some(obj) = realm.object_mut(id) {
                obj.kind = ObjectKind::Primitive(JsValue::Boolean(b));
            }
            return Ok(this);
        }
    }
    Ok(JsValue::Boolean(b))
}

fn this_boolean(realm: &Realm, this: &JsValue) -> Result<bool, JsError> {
    match this {
        JsValue::Boolean(b) => Ok(*b),
        JsValue::Object(id) => match realm.object(*id).map(|obj| &obj.kind) {
            Some(ObjectKind::Primitive(JsValue::Boolean(b))) => Ok(*b),
            _ => Err(JsError::type_error("Boolean.prototype method called on incompatible receiver")),
        },
        _ => Err(JsError::type_error("Boolean.prototype method called on incompatible receiver")),
    }
}

pub fn boolean_to_string(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let b = this_boolean(realm, &this)?;
    Ok(JsValue::from(if b { "true" } else { "false" }))
}

pub fn boolean_value_of(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(JsValue::Boolean(this_boolean(realm, &this)?))
}
