//! Standard library installed into every realm

pub mod array;
pub mod boolean;
pub mod date;
pub mod function;
pub mod global;
pub mod math;
pub mod number;
pub mod object;
pub mod string;

use crate::realm::Realm;
use crate::value::{CheapClone, JsValue, ObjectId, ObjectKind};

/// Install the global constructors and functions.
///
/// `Function` has to exist before any other function object can be created
/// and `Object` before any prototype can inherit from it, so those two are
/// bootstrapped first and patched together afterwards.
pub fn init_globals(realm: &mut Realm) {
    let function = function::bootstrap_function(realm);
    let object = object::init_object(realm);

    // Function.prototype and the global scope inherit from Object.prototype
    let global = realm.global_scope();
    for id in [realm.prototype_object(function), Some(global)]
        .into_iter()
        .flatten()
    {
        if let Some(obj) = realm.object_mut(id) {
            obj.parent = Some(object);
        }
    }

    function::init_function_prototype(realm);
    object::init_object_prototype(realm);
    array::init_array(realm);
    number::init_number(realm);
    string::init_string(realm);
    boolean::init_boolean(realm);
    date::init_date(realm);
    math::init_math(realm);
    global::init_global_functions(realm);
}

/// Argument `index`, undefined when missing
pub(crate) fn arg(args: &[JsValue], index: usize) -> JsValue {
    args.get(index).map(CheapClone::cheap_clone).unwrap_or_default()
}

/// Is `this` the fresh receiver `new constructor(..)` created?
pub(crate) fn is_construct_call(realm: &Realm, this: &JsValue, constructor: ObjectId) -> bool {
    this.as_object()
        .and_then(|id| realm.object(id))
        .is_some_and(|obj| {
            obj.parent == Some(constructor)
                && obj.properties.is_empty()
                && matches!(obj.kind, ObjectKind::Ordinary | ObjectKind::Array { length: 0 })
        })
}

/// Bind a global with the given flags
pub(crate) fn define_global(realm: &mut Realm, name: &str, value: JsValue, readonly: bool) {
    let global = realm.global_scope();
    realm.define_property(global, name, value, readonly, false);
}
