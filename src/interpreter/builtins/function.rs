//! Function constructor and Function.prototype

use std::rc::Rc;

use crate::error::JsError;
use crate::interpreter::compile_function;
use crate::realm::Realm;
use crate::value::{JsFunction, JsObject, JsString, JsValue, NativeFunction, ObjectId, ObjectKind};

/// Allocate `Function` and `Function.prototype` by hand: every other function
/// object inherits from them, so they cannot be made by the usual factory.
pub fn bootstrap_function(realm: &mut Realm) -> ObjectId {
    let native = NativeFunction {
        name: JsString::from("Function"),
        func: Rc::new(function_constructor),
        arity: 1,
    };
    let ctor = realm.alloc(JsObject::new(
        None,
        ObjectKind::Function(JsFunction::Native(native)),
    ));
    let proto = realm.alloc(JsObject::new(None, ObjectKind::Ordinary));
    realm.intrinsics.function = ctor;

    // Function is itself a function
    if let Some(obj) = realm.object_mut(ctor) {
        obj.parent = Some(ctor);
    }
    realm.define_property(ctor, "prototype", JsValue::Object(proto), false, false);
    realm.define_property(proto, "constructor", JsValue::Object(ctor), false, false);
    realm.define_property(ctor, "length", JsValue::from(1), true, false);
    realm.define_property(
        realm.global_scope(),
        "Function",
        JsValue::Object(ctor),
        false,
        false,
    );
    ctor
}

/// `apply` and `call` are markers the evaluator dispatches itself
pub fn init_function_prototype(realm: &mut Realm) {
    let Some(proto) = realm.prototype_object(realm.intrinsics.function) else {
        return;
    };
    let apply = realm.create_function_object(JsFunction::Apply, 2);
    let call = realm.create_function_object(JsFunction::Call, 1);
    realm.define_property(proto, "apply", JsValue::Object(apply), false, false);
    realm.define_property(proto, "call", JsValue::Object(call), false, false);
    realm.register_method(proto, "toString", function_to_string, 0);
    realm.register_method(proto, "valueOf", function_value_of, 0);
}

/// `Function(p1, .., body)`: parses through the realm's source parser and
/// closes over the global scope
pub fn function_constructor(
    realm: &mut Realm,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let (body, params) = match args.split_last() {
        Some((body, params)) => (realm.to_string(body), params),
        None => (JsString::from(""), &[][..]),
    };
    let params: Vec<JsString> = params.iter().map(|p| realm.to_string(p)).collect();
    let function = compile_function(realm, &params, body.as_str())?;
    Ok(JsValue::Object(function))
}

pub fn function_to_string(
    realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    if !realm.is_callable(&this) {
        return Err(JsError::type_error(
            "Function.prototype.toString requires that 'this' be a Function",
        ));
    }
    Ok(JsValue::String(realm.to_string(&this)))
}

pub fn function_value_of(
    _realm: &mut Realm,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    Ok(this)
}
