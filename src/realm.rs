//! The object model instance
//!
//! A [`Realm`] owns every object a program creates (an arena indexed by
//! [`ObjectId`]), the intrinsic constructors, the global scope, the evaluator
//! settings and the optional source parser used by `eval`. Evaluators borrow it
//! mutably one step at a time; nested `eval` evaluators share it.

use std::cmp::Ordering;
use std::rc::Rc;

use rustc_hash::FxHashSet;

use crate::ast::{Function, Program, SourceParser};
use crate::config::Config;
use crate::error::JsError;
use crate::interpreter::builtins;
use crate::value::{
    CheapClone, JsFunction, JsObject, JsString, JsValue, NativeFunction, ObjectId, ObjectKind,
    Property, PropertyKey, number_to_string,
};

/// Constructors the model itself needs to reach
#[derive(Debug, Clone, Copy)]
pub struct Intrinsics {
    pub object: ObjectId,
    pub function: ObjectId,
    pub array: ObjectId,
    pub number: ObjectId,
    pub string: ObjectId,
    pub boolean: ObjectId,
    pub date: ObjectId,
}

impl Intrinsics {
    /// Ids that resolve to nothing until the builtins are installed
    fn unset() -> Self {
        let none = ObjectId(u32::MAX);
        Intrinsics {
            object: none,
            function: none,
            array: none,
            number: none,
            string: none,
            boolean: none,
            date: none,
        }
    }
}

/// Longest string, in bytes, that joining an array may build
pub const MAX_STRING_LENGTH: usize = (1 << 29) - 24;

/// Arrays longer than this are walked by their present indices only, and
/// operations that copy every element refuse them
pub const MAX_DENSE_LENGTH: u32 = 1 << 24;

/// Hint for converting an object to a primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    Default,
    Number,
    String,
}

pub struct Realm {
    objects: Vec<JsObject>,
    pub(crate) intrinsics: Intrinsics,
    global_scope: ObjectId,
    config: Config,
    parser: Option<Rc<dyn SourceParser>>,
    random_state: u64,
    /// `eval` calls currently running inside one another
    pub(crate) eval_depth: usize,
    /// Frames held by the machines suspended beneath the running one
    pub(crate) outer_frames: usize,
}

impl std::fmt::Debug for Realm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Realm")
            .field("objects", &self.objects.len())
            .field("global_scope", &self.global_scope)
            .field("config", &self.config)
            .field("eval_depth", &self.eval_depth)
            .field("outer_frames", &self.outer_frames)
            .finish_non_exhaustive()
    }
}

impl Default for Realm {
    fn default() -> Self {
        Self::new()
    }
}

impl Realm {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Create a realm with its global scope and standard library installed
    pub fn with_config(config: Config) -> Self {
        let seed = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or(0x2545_f491_4f6c_dd1d) as u64;
        let mut realm = Realm {
            objects: Vec::new(),
            intrinsics: Intrinsics::unset(),
            global_scope: ObjectId(0),
            config,
            parser: None,
            random_state: seed | 1,
            eval_depth: 0,
            outer_frames: 0,
        };
        realm.global_scope = realm.create_scope(None);
        builtins::init_globals(&mut realm);
        realm
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn intrinsics(&self) -> &Intrinsics {
        &self.intrinsics
    }

    pub fn global_scope(&self) -> ObjectId {
        self.global_scope
    }

    /// Number of objects allocated so far
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Source parser hook
    // ═══════════════════════════════════════════════════════════════════════

    /// Install the parser used by `eval` and the `Function` constructor
    pub fn set_parser(&mut self, parser: impl SourceParser + 'static) {
        self.parser = Some(Rc::new(parser));
    }

    pub fn has_parser(&self) -> bool {
        self.parser.is_some()
    }

    pub fn parse(&self, source: &str) -> Result<Program, JsError> {
        match &self.parser {
            Some(parser) => parser.parse(source),
            None => Err(JsError::syntax_error(
                "No source parser installed; cannot evaluate source text",
            )),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Arena
    // ═══════════════════════════════════════════════════════════════════════

    pub(crate) fn alloc(&mut self, object: JsObject) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<&JsObject> {
        self.objects.get(id.index())
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut JsObject> {
        self.objects.get_mut(id.index())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Factories
    // ═══════════════════════════════════════════════════════════════════════

    /// Create an object whose prototype is `parent.prototype`.
    ///
    /// Objects that inherit from `Array` get the array kind.
    pub fn create_object(&mut self, parent: Option<ObjectId>) -> ObjectId {
        let kind = match parent {
            Some(parent) if self.inherits(parent, self.intrinsics.array) => {
                ObjectKind::Array { length: 0 }
            }
            _ => ObjectKind::Ordinary,
        };
        self.alloc(JsObject::new(parent, kind))
    }

    /// `{}`
    pub fn create_plain_object(&mut self) -> ObjectId {
        let parent = self.intrinsics.object;
        self.create_object(Some(parent))
    }

    /// `[elements...]`
    pub fn create_array(&mut self, elements: Vec<JsValue>) -> ObjectId {
        let mut array = JsObject::new(
            Some(self.intrinsics.array),
            ObjectKind::Array {
                length: elements.len() as u32,
            },
        );
        for (index, value) in elements.into_iter().enumerate() {
            array
                .properties
                .insert(PropertyKey::from(index as u32), Property::data(value));
        }
        self.alloc(array)
    }

    /// A variable container linked to `parent_scope`
    pub fn create_scope(&mut self, parent_scope: Option<ObjectId>) -> ObjectId {
        self.alloc(JsObject::new(None, ObjectKind::Scope { parent_scope }))
    }

    /// A script function closing over `closure`
    pub fn create_function(&mut self, func: Rc<Function>, closure: ObjectId) -> ObjectId {
        let arity = func.params.len() as u32;
        self.create_function_object(JsFunction::Script { func, closure }, arity)
    }

    /// Wrap a host callable as a function object
    pub fn create_native_function<F>(&mut self, name: &str, func: F, arity: u32) -> ObjectId
    where
        F: Fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError> + 'static,
    {
        let native = NativeFunction {
            name: JsString::from(name),
            func: Rc::new(func),
            arity,
        };
        self.create_function_object(JsFunction::Native(native), arity)
    }

    /// Every function gets a fresh `prototype` object and a fixed `length`
    pub(crate) fn create_function_object(&mut self, function: JsFunction, arity: u32) -> ObjectId {
        let func = self.alloc(JsObject::new(
            Some(self.intrinsics.function),
            ObjectKind::Function(function),
        ));
        let object_ctor = self.intrinsics.object;
        let proto = self.alloc(JsObject::new(
            self.object(object_ctor).map(|_| object_ctor),
            ObjectKind::Ordinary,
        ));
        self.define_property(func, "prototype", JsValue::Object(proto), false, false);
        self.define_property(proto, "constructor", JsValue::Object(func), false, false);
        self.define_property(func, "length", JsValue::from(arity), true, false);
        func
    }

    /// Install a non-enumerable native method on `target`
    pub fn register_method<F>(&mut self, target: ObjectId, name: &str, func: F, arity: u32)
    where
        F: Fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError> + 'static,
    {
        let method = self.create_native_function(name, func, arity);
        self.define_property(target, name, JsValue::Object(method), false, false);
    }

    /// Store a property with explicit flags, bypassing the magic properties.
    /// A read-only property keeps its value.
    pub fn define_property(
        &mut self,
        target: ObjectId,
        key: impl Into<PropertyKey>,
        value: JsValue,
        readonly: bool,
        enumerable: bool,
    ) {
        let key = key.into();
        let Some(object) = self.object_mut(target) else {
            return;
        };
        match object.properties.get_mut(&key) {
            Some(existing) if existing.readonly => {}
            Some(existing) => {
                existing.value = value;
                existing.readonly |= readonly;
                existing.enumerable &= enumerable;
            }
            None => {
                if let (ObjectKind::Array { length }, Some(index)) =
                    (&mut object.kind, key.as_index())
                {
                    *length = (*length).max(index + 1);
                }
                object
                    .properties
                    .insert(key, Property::with_flags(value, readonly, enumerable));
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Prototype chain
    // ═══════════════════════════════════════════════════════════════════════

    /// The constructor a value inherits from. Primitives answer their wrapper
    /// constructor.
    pub fn prototype_parent(&self, value: &JsValue) -> Option<ObjectId> {
        match value {
            JsValue::Undefined | JsValue::Null => None,
            JsValue::Boolean(_) => Some(self.intrinsics.boolean),
            JsValue::Number(_) => Some(self.intrinsics.number),
            JsValue::String(_) => Some(self.intrinsics.string),
            JsValue::Object(id) => self.object(*id).and_then(|obj| obj.parent),
        }
    }

    /// `constructor.prototype`, if it is an object
    pub fn prototype_object(&self, constructor: ObjectId) -> Option<ObjectId> {
        self.object(constructor)?
            .get_own(&PropertyKey::from("prototype"))?
            .as_object()
    }

    /// Does `value` inherit from `constructor`? Terminates on cyclic chains.
    pub fn isa(&self, value: &JsValue, constructor: ObjectId) -> bool {
        match self.prototype_parent(value) {
            Some(parent) => self.inherits(parent, constructor),
            None => false,
        }
    }

    /// Is an object created with `parent` an instance of `constructor`?
    fn inherits(&self, parent: ObjectId, constructor: ObjectId) -> bool {
        let mut visited = FxHashSet::default();
        let mut current = parent;
        loop {
            if current == constructor {
                return true;
            }
            let Some(proto) = self.prototype_object(current) else {
                return false;
            };
            if !visited.insert(proto) {
                return false;
            }
            match self.object(proto).and_then(|obj| obj.parent) {
                Some(next) => current = next,
                None => return false,
            }
        }
    }

    /// The first object to search for a value's properties
    fn lookup_start(&self, value: &JsValue) -> Option<ObjectId> {
        match value {
            JsValue::Object(id) => Some(*id),
            _ => self
                .prototype_parent(value)
                .and_then(|ctor| self.prototype_object(ctor)),
        }
    }

    /// Walk own properties then `parent.prototype` links, once per object
    fn find_property(&self, start: Option<ObjectId>, key: &PropertyKey) -> Option<&Property> {
        let mut visited = FxHashSet::default();
        let mut current = start;
        while let Some(id) = current {
            if !visited.insert(id) {
                return None;
            }
            let object = self.object(id)?;
            if let Some(prop) = object.properties.get(key) {
                return Some(prop);
            }
            current = object.parent.and_then(|ctor| self.prototype_object(ctor));
        }
        None
    }

    /// Every object on a value's lookup chain, own object first
    pub fn prototype_chain(&self, value: &JsValue) -> Vec<ObjectId> {
        let mut chain = Vec::new();
        let mut current = self.lookup_start(value);
        while let Some(id) = current {
            if chain.contains(&id) {
                break;
            }
            chain.push(id);
            current = self
                .object(id)
                .and_then(|obj| obj.parent)
                .and_then(|ctor| self.prototype_object(ctor));
        }
        chain
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Property access
    // ═══════════════════════════════════════════════════════════════════════

    /// String payload of a string primitive or `new String(..)` wrapper
    fn string_data(&self, value: &JsValue) -> Option<JsString> {
        match value {
            JsValue::String(s) => Some(s.cheap_clone()),
            JsValue::Object(id) => match &self.object(*id)?.kind {
                ObjectKind::Primitive(JsValue::String(s)) => Some(s.cheap_clone()),
                _ => None,
            },
            _ => None,
        }
    }

    /// Convert a value to a property key
    pub fn to_property_key(&self, value: &JsValue) -> PropertyKey {
        match value {
            JsValue::Number(n) if *n >= 0.0 && n.fract() == 0.0 && *n < u32::MAX as f64 => {
                PropertyKey::Index(*n as u32)
            }
            JsValue::String(s) => PropertyKey::from(s.cheap_clone()),
            other => PropertyKey::from(self.to_string(other)),
        }
    }

    pub fn get_property(&self, target: &JsValue, key: &PropertyKey) -> Result<JsValue, JsError> {
        if target.is_null_or_undefined() {
            return Err(JsError::type_error(format!(
                "Cannot read property '{}' of {}",
                key,
                target.to_js_string()
            )));
        }
        if let Some(data) = self.string_data(target) {
            if key.eq_str("length") {
                return Ok(JsValue::from(data.utf16_len() as u32));
            }
            if let Some(c) = key.as_index().and_then(|i| data.char_at(i as usize)) {
                return Ok(JsValue::from(c));
            }
        }
        if key.eq_str("length") {
            if let Some(length) = target
                .as_object()
                .and_then(|id| self.object(id))
                .and_then(JsObject::array_length)
            {
                return Ok(JsValue::from(length));
            }
        }
        Ok(self
            .find_property(self.lookup_start(target), key)
            .map(|prop| prop.value.cheap_clone())
            .unwrap_or_default())
    }

    /// Shorthand for reading a named property of an object
    pub fn get(&self, target: ObjectId, name: &str) -> JsValue {
        self.get_property(&JsValue::Object(target), &PropertyKey::from(name))
            .unwrap_or_default()
    }

    /// The `in` operator. Primitives have no properties to test.
    pub fn has_property(&self, target: &JsValue, key: &PropertyKey) -> Result<bool, JsError> {
        let JsValue::Object(id) = target else {
            return Err(JsError::type_error(format!(
                "Cannot use 'in' operator to search for '{}' in {}",
                key,
                target.to_js_string()
            )));
        };
        if key.eq_str("length") && self.object(*id).is_some_and(JsObject::is_array) {
            return Ok(true);
        }
        if let Some(data) = self.string_data(target) {
            if key.eq_str("length")
                || key
                    .as_index()
                    .is_some_and(|i| (i as usize) < data.utf16_len())
            {
                return Ok(true);
            }
        }
        Ok(self.find_property(Some(*id), key).is_some())
    }

    /// Assign a property. Read-only properties, primitives and string
    /// characters ignore the write.
    pub fn set_property(
        &mut self,
        target: &JsValue,
        key: &PropertyKey,
        value: JsValue,
    ) -> Result<(), JsError> {
        let id = match target {
            JsValue::Undefined | JsValue::Null => {
                return Err(JsError::type_error(format!(
                    "Cannot set property '{}' of {}",
                    key,
                    target.to_js_string()
                )));
            }
            JsValue::Object(id) => *id,
            _ => return Ok(()),
        };
        if let Some(data) = self.string_data(target) {
            if key.eq_str("length")
                || key
                    .as_index()
                    .is_some_and(|i| (i as usize) < data.utf16_len())
            {
                return Ok(());
            }
        }
        let is_array = self.object(id).is_some_and(JsObject::is_array);
        if is_array && key.eq_str("length") {
            let length = array_index(self.to_number(&value))
                .ok_or_else(|| JsError::range_error("Invalid array length"))?;
            self.set_array_length(id, length);
            return Ok(());
        }
        let Some(object) = self.object_mut(id) else {
            return Ok(());
        };
        match object.properties.get_mut(key) {
            Some(existing) => {
                if !existing.readonly {
                    existing.value = value;
                }
            }
            None => {
                if let (ObjectKind::Array { length }, Some(index)) =
                    (&mut object.kind, key.as_index())
                {
                    *length = (*length).max(index + 1);
                }
                object
                    .properties
                    .insert(key.clone(), Property::data(value));
            }
        }
        Ok(())
    }

    /// The `delete` operator
    pub fn delete_property(&mut self, target: &JsValue, key: &PropertyKey) -> bool {
        let JsValue::Object(id) = target else {
            return false;
        };
        let Some(object) = self.object_mut(*id) else {
            return false;
        };
        if key.eq_str("length") && object.is_array() {
            return false;
        }
        match object.properties.get(key) {
            Some(prop) if prop.readonly => false,
            Some(_) => {
                object.properties.shift_remove(key);
                true
            }
            None => true,
        }
    }

    /// Current `length` of an array or array-like object
    pub fn length_of(&self, target: &JsValue) -> u32 {
        match self.get_property(target, &PropertyKey::from("length")) {
            Ok(length) => array_index(self.to_number(&length)).unwrap_or(0),
            Err(_) => 0,
        }
    }

    /// Resize an array, deleting elements at or above the new length
    pub fn set_array_length(&mut self, id: ObjectId, new_length: u32) {
        let Some(object) = self.object_mut(id) else {
            return;
        };
        if let ObjectKind::Array { length } = &mut object.kind {
            if new_length < *length {
                object
                    .properties
                    .retain(|key, _| key.as_index().is_none_or(|i| i < new_length));
            }
            *length = new_length;
        }
    }

    /// Elements `0..length` of an array-like value; holes read as undefined
    pub fn array_elements(&self, target: &JsValue) -> Result<Vec<JsValue>, JsError> {
        let length = self.length_of(target);
        if length > MAX_DENSE_LENGTH {
            return Err(JsError::range_error("Invalid array length"));
        }
        Ok((0..length)
            .map(|i| {
                self.get_property(target, &PropertyKey::from(i))
                    .unwrap_or_default()
            })
            .collect())
    }

    /// Ascending indices below `length` worth reading. Past
    /// [`MAX_DENSE_LENGTH`] only the target's own index keys are visited.
    pub fn element_indices(&self, target: &JsValue, length: u32) -> Vec<u32> {
        if length <= MAX_DENSE_LENGTH {
            return (0..length).collect();
        }
        let Some(object) = target.as_object().and_then(|id| self.object(id)) else {
            return Vec::new();
        };
        let mut indices: Vec<u32> = object
            .properties
            .keys()
            .filter_map(PropertyKey::as_index)
            .filter(|&i| i < length)
            .collect();
        indices.sort_unstable();
        indices
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Type conversion
    // ═══════════════════════════════════════════════════════════════════════

    pub fn is_callable(&self, value: &JsValue) -> bool {
        value
            .as_object()
            .and_then(|id| self.object(id))
            .is_some_and(JsObject::is_callable)
    }

    /// The `typeof` result
    pub fn type_of(&self, value: &JsValue) -> &'static str {
        match value {
            JsValue::Undefined => "undefined",
            JsValue::Null => "object",
            JsValue::Boolean(_) => "boolean",
            JsValue::Number(_) => "number",
            JsValue::String(_) => "string",
            JsValue::Object(_) if self.is_callable(value) => "function",
            JsValue::Object(_) => "object",
        }
    }

    /// ToPrimitive. Objects cannot run script `valueOf`/`toString` here, so
    /// conversion follows the object's kind. Fails only when an array is
    /// too long to render.
    pub fn try_to_primitive(
        &self,
        value: &JsValue,
        hint: PreferredType,
    ) -> Result<JsValue, JsError> {
        let JsValue::Object(id) = value else {
            return Ok(value.cheap_clone());
        };
        let Some(object) = self.object(*id) else {
            return Ok(JsValue::Undefined);
        };
        Ok(match &object.kind {
            ObjectKind::Primitive(inner) => inner.cheap_clone(),
            ObjectKind::Date { timestamp } => match hint {
                PreferredType::Number => JsValue::Number(*timestamp),
                _ => JsValue::from(builtins::date::format_date(*timestamp)),
            },
            ObjectKind::Array { .. } => JsValue::String(self.join(*id, ",")?),
            ObjectKind::Function(func) => JsValue::from(function_source(func)),
            ObjectKind::Ordinary | ObjectKind::Scope { .. } => {
                JsValue::from("[object Object]")
            }
        })
    }

    /// [`Realm::try_to_primitive`] for conversions that cannot report an
    /// error; an array too long to render becomes the empty string
    pub fn to_primitive(&self, value: &JsValue, hint: PreferredType) -> JsValue {
        self.try_to_primitive(value, hint)
            .unwrap_or_else(|_| JsValue::from(""))
    }

    /// ToNumber for any value
    pub fn to_number(&self, value: &JsValue) -> f64 {
        match value {
            JsValue::Object(_) => self.to_primitive(value, PreferredType::Number).to_number(),
            primitive => primitive.to_number(),
        }
    }

    /// ToString that reports arrays too long to render
    pub fn try_to_string(&self, value: &JsValue) -> Result<JsString, JsError> {
        match value {
            JsValue::Object(_) => Ok(self
                .try_to_primitive(value, PreferredType::String)?
                .to_js_string()),
            primitive => Ok(primitive.to_js_string()),
        }
    }

    /// ToString for any value
    pub fn to_string(&self, value: &JsValue) -> JsString {
        match value {
            JsValue::Object(_) => self
                .to_primitive(value, PreferredType::String)
                .to_js_string(),
            primitive => primitive.to_js_string(),
        }
    }

    /// Join array elements; null, undefined and cycles render empty. Fails
    /// with a RangeError when the result would exceed [`MAX_STRING_LENGTH`].
    pub fn join(&self, array: ObjectId, separator: &str) -> Result<JsString, JsError> {
        let mut visiting = FxHashSet::default();
        Ok(JsString::from(self.join_guarded(array, separator, &mut visiting)?))
    }

    fn join_guarded(
        &self,
        array: ObjectId,
        separator: &str,
        visiting: &mut FxHashSet<ObjectId>,
    ) -> Result<String, JsError> {
        if !visiting.insert(array) {
            return Ok(String::new());
        }
        let target = JsValue::Object(array);
        let length = self.length_of(&target);
        let separators = (length as usize).saturating_sub(1);
        if separators.saturating_mul(separator.len()) > MAX_STRING_LENGTH {
            return Err(JsError::range_error("Invalid string length"));
        }

        // Each index i > 0 is preceded by exactly i separators in total
        let mut out = String::new();
        let mut written = 0usize;
        for index in self.element_indices(&target, length) {
            push_separators(&mut out, separator, (index as usize).saturating_sub(written));
            written = index as usize;
            let element = self
                .get_property(&target, &PropertyKey::from(index))
                .unwrap_or_default();
            match element {
                JsValue::Undefined | JsValue::Null => {}
                JsValue::Object(id) if self.object(id).is_some_and(JsObject::is_array) => {
                    out.push_str(&self.join_guarded(id, ",", visiting)?);
                }
                other => out.push_str(self.to_string(&other).as_str()),
            }
            if out.len() > MAX_STRING_LENGTH {
                return Err(JsError::range_error("Invalid string length"));
            }
        }
        push_separators(&mut out, separator, separators.saturating_sub(written));
        visiting.remove(&array);
        Ok(out)
    }

    /// Abstract comparison: `None` when the operands are incomparable (NaN).
    /// Two strings compare lexically, anything else numerically.
    pub fn compare(&self, a: &JsValue, b: &JsValue) -> Option<Ordering> {
        if let (JsValue::Object(x), JsValue::Object(y)) = (a, b) {
            if x == y {
                return Some(Ordering::Equal);
            }
        }
        let a = self.to_primitive(a, PreferredType::Number);
        let b = self.to_primitive(b, PreferredType::Number);
        match (&a, &b) {
            (JsValue::String(x), JsValue::String(y)) => {
                Some(x.as_str().encode_utf16().cmp(y.as_str().encode_utf16()))
            }
            _ => a.to_number().partial_cmp(&b.to_number()),
        }
    }

    /// `==`: null and undefined only equal each other, two objects only
    /// themselves
    pub fn loose_equals(&self, a: &JsValue, b: &JsValue) -> bool {
        match (a, b) {
            (JsValue::Undefined | JsValue::Null, JsValue::Undefined | JsValue::Null) => true,
            (JsValue::Undefined | JsValue::Null, _) | (_, JsValue::Undefined | JsValue::Null) => {
                false
            }
            (JsValue::Object(x), JsValue::Object(y)) => x == y,
            (JsValue::Object(_), _) | (_, JsValue::Object(_)) => {
                let a = self.to_primitive(a, PreferredType::Default);
                let b = self.to_primitive(b, PreferredType::Default);
                self.compare(&a, &b) == Some(Ordering::Equal)
            }
            _ => self.compare(a, b) == Some(Ordering::Equal),
        }
    }

    /// Value for a thrown error message
    pub fn display(&self, value: &JsValue) -> String {
        match value {
            JsValue::Number(n) => number_to_string(*n),
            other => self.to_string(other).to_string(),
        }
    }

    /// xorshift64* in [0, 1)
    pub(crate) fn next_random(&mut self) -> f64 {
        let mut x = self.random_state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.random_state = x;
        let bits = x.wrapping_mul(0x2545_f491_4f6c_dd1d) >> 11;
        bits as f64 / (1u64 << 53) as f64
    }
}

/// A valid array length or index: finite, integral, within u32
pub fn array_index(n: f64) -> Option<u32> {
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 && n <= u32::MAX as f64 {
        Some(n as u32)
    } else {
        None
    }
}

/// What `toString` shows for a function. Script bodies are not kept as
/// text, so only the signature is rendered.
fn function_source(func: &JsFunction) -> String {
    let name = func.name().unwrap_or("");
    match func {
        JsFunction::Script { func, .. } => {
            let params: Vec<&str> = func.params.iter().map(|p| p.name.as_str()).collect();
            format!("function {name}({}) {{ ... }}", params.join(", "))
        }
        _ => format!("function {name}() {{ [native code] }}"),
    }
}

fn push_separators(out: &mut String, separator: &str, count: usize) {
    if !separator.is_empty() && count > 0 {
        out.push_str(&separator.repeat(count));
    }
}
