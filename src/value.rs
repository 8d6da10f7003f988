//! JavaScript value representation
//!
//! Primitives are immutable and carry their own coercions. Objects live in the
//! realm's arena and are addressed by [`ObjectId`]; every link between objects
//! (prototype parent, parent scope, closure scope) is an index, so cyclic graphs
//! never own each other.

use std::fmt;
use std::hash::BuildHasherDefault;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHasher;
use serde::{Deserialize, Deserializer};

use crate::ast::Function;
use crate::error::JsError;
use crate::realm::Realm;

/// Trait for types that have cheap (O(1), reference-counted or copy) clones.
///
/// Makes it explicit at the call site that a clone only bumps a reference
/// count. Regular `.clone()` still works for everything else.
pub trait CheapClone: Clone {
    fn cheap_clone(&self) -> Self {
        self.clone()
    }
}

impl<T: ?Sized> CheapClone for Rc<T> {}

/// Insertion-ordered map with the fast non-cryptographic hasher
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Stable handle to an object in a realm's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u32);

impl ObjectId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A JavaScript value
#[derive(Clone, Default)]
pub enum JsValue {
    #[default]
    Undefined,
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    Object(ObjectId),
}

impl CheapClone for JsValue {}

impl JsValue {
    /// Check if this value is null or undefined
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(self, JsValue::Null | JsValue::Undefined)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, JsValue::String(_))
    }

    pub fn is_primitive(&self) -> bool {
        !matches!(self, JsValue::Object(_))
    }

    pub fn as_object(&self) -> Option<ObjectId> {
        match self {
            JsValue::Object(id) => Some(*id),
            _ => None,
        }
    }

    /// Convert to boolean (ToBoolean). Objects are always truthy.
    pub fn to_boolean(&self) -> bool {
        match self {
            JsValue::Undefined | JsValue::Null => false,
            JsValue::Boolean(b) => *b,
            JsValue::Number(n) => *n != 0.0 && !n.is_nan(),
            JsValue::String(s) => !s.is_empty(),
            JsValue::Object(_) => true,
        }
    }

    /// Convert a primitive to number (ToNumber).
    ///
    /// Objects need the realm to reach their primitive value; use
    /// [`Realm::to_number`] for them. Here they answer NaN.
    pub fn to_number(&self) -> f64 {
        match self {
            JsValue::Undefined => f64::NAN,
            JsValue::Null => 0.0,
            JsValue::Boolean(true) => 1.0,
            JsValue::Boolean(false) => 0.0,
            JsValue::Number(n) => *n,
            JsValue::String(s) => string_to_number(s.as_str()),
            JsValue::Object(_) => f64::NAN,
        }
    }

    /// Convert a primitive to string (ToString).
    ///
    /// Objects answer `[object Object]`; [`Realm::to_string`] consults arrays,
    /// wrappers and dates first.
    pub fn to_js_string(&self) -> JsString {
        match self {
            JsValue::Undefined => JsString::from("undefined"),
            JsValue::Null => JsString::from("null"),
            JsValue::Boolean(true) => JsString::from("true"),
            JsValue::Boolean(false) => JsString::from("false"),
            JsValue::Number(n) => JsString::from(number_to_string(*n)),
            JsValue::String(s) => s.cheap_clone(),
            JsValue::Object(_) => JsString::from("[object Object]"),
        }
    }

    /// Strict equality (===). Objects compare by identity.
    pub fn strict_equals(&self, other: &JsValue) -> bool {
        match (self, other) {
            (JsValue::Undefined, JsValue::Undefined) => true,
            (JsValue::Null, JsValue::Null) => true,
            (JsValue::Boolean(a), JsValue::Boolean(b)) => a == b,
            // NaN !== NaN falls out of IEEE comparison
            (JsValue::Number(a), JsValue::Number(b)) => a == b,
            (JsValue::String(a), JsValue::String(b)) => a == b,
            (JsValue::Object(a), JsValue::Object(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for JsValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsValue::Undefined => write!(f, "undefined"),
            JsValue::Null => write!(f, "null"),
            JsValue::Boolean(b) => write!(f, "{}", b),
            JsValue::Number(n) => write!(f, "{}", number_to_string(*n)),
            JsValue::String(s) => write!(f, "\"{}\"", s.as_str()),
            JsValue::Object(id) => write!(f, "[object #{}]", id.0),
        }
    }
}

impl PartialEq for JsValue {
    fn eq(&self, other: &Self) -> bool {
        self.strict_equals(other)
    }
}

// Conversions from Rust types

impl From<bool> for JsValue {
    fn from(b: bool) -> Self {
        JsValue::Boolean(b)
    }
}

impl From<f64> for JsValue {
    fn from(n: f64) -> Self {
        JsValue::Number(n)
    }
}

impl From<i32> for JsValue {
    fn from(n: i32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<u32> for JsValue {
    fn from(n: u32) -> Self {
        JsValue::Number(n as f64)
    }
}

impl From<&str> for JsValue {
    fn from(s: &str) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<String> for JsValue {
    fn from(s: String) -> Self {
        JsValue::String(JsString::from(s))
    }
}

impl From<JsString> for JsValue {
    fn from(s: JsString) -> Self {
        JsValue::String(s)
    }
}

impl From<ObjectId> for JsValue {
    fn from(id: ObjectId) -> Self {
        JsValue::Object(id)
    }
}

/// Reference-counted string for efficient string handling
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JsString(Rc<str>);

// JsString wraps Rc<str>, so clone is cheap (just reference count increment)
impl CheapClone for JsString {}

impl JsString {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in UTF-16 code units, which is what scripts observe as `length`
    pub fn utf16_len(&self) -> usize {
        self.0.encode_utf16().count()
    }

    pub fn code_units(&self) -> Vec<u16> {
        self.0.encode_utf16().collect()
    }

    pub fn code_unit_at(&self, index: usize) -> Option<u16> {
        self.0.encode_utf16().nth(index)
    }

    /// The one-unit string at a code unit index; half of a surrogate pair
    /// becomes U+FFFD
    pub fn char_at(&self, index: usize) -> Option<String> {
        self.code_unit_at(index)
            .map(|unit| String::from_utf16_lossy(&[unit]))
    }
}

impl AsRef<str> for JsString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for JsString {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for JsString {
    fn eq(&self, other: &str) -> bool {
        self.0.as_ref() == other
    }
}

impl PartialEq<&str> for JsString {
    fn eq(&self, other: &&str) -> bool {
        self.0.as_ref() == *other
    }
}

impl From<&str> for JsString {
    fn from(s: &str) -> Self {
        JsString(s.into())
    }
}

impl From<String> for JsString {
    fn from(s: String) -> Self {
        JsString(s.into())
    }
}

impl fmt::Debug for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.0)
    }
}

impl fmt::Display for JsString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::ops::Add<&JsString> for JsString {
    type Output = JsString;

    fn add(self, other: &JsString) -> JsString {
        let mut s = String::with_capacity(self.0.len() + other.0.len());
        s.push_str(&self.0);
        s.push_str(&other.0);
        JsString::from(s)
    }
}

impl<'de> Deserialize<'de> for JsString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(JsString::from)
    }
}

/// Property key: canonical array indices are kept numeric
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    String(JsString),
    Index(u32),
}

impl PropertyKey {
    /// Canonical array index of a string, if it is one.
    ///
    /// `u32::MAX` is excluded so that `index + 1` always fits a length.
    fn parse_index(s: &str) -> Option<u32> {
        let first = s.bytes().next()?;
        if !first.is_ascii_digit() || (first == b'0' && s.len() > 1) {
            return None;
        }
        match s.parse::<u32>() {
            Ok(idx) if idx != u32::MAX => Some(idx),
            _ => None,
        }
    }

    pub fn as_index(&self) -> Option<u32> {
        match self {
            PropertyKey::Index(i) => Some(*i),
            PropertyKey::String(_) => None,
        }
    }

    /// Check if this key equals a string literal (avoids allocation)
    #[inline]
    pub fn eq_str(&self, s: &str) -> bool {
        match self {
            PropertyKey::String(js_str) => js_str.as_str() == s,
            PropertyKey::Index(_) => false,
        }
    }

    /// The key as a script-visible string
    pub fn to_js_string(&self) -> JsString {
        match self {
            PropertyKey::String(s) => s.cheap_clone(),
            PropertyKey::Index(i) => JsString::from(i.to_string()),
        }
    }
}

impl From<&str> for PropertyKey {
    #[inline]
    fn from(s: &str) -> Self {
        match PropertyKey::parse_index(s) {
            Some(idx) => PropertyKey::Index(idx),
            None => PropertyKey::String(JsString::from(s)),
        }
    }
}

impl From<String> for PropertyKey {
    fn from(s: String) -> Self {
        PropertyKey::from(s.as_str())
    }
}

impl From<JsString> for PropertyKey {
    #[inline]
    fn from(s: JsString) -> Self {
        match PropertyKey::parse_index(s.as_str()) {
            Some(idx) => PropertyKey::Index(idx),
            None => PropertyKey::String(s),
        }
    }
}

impl From<u32> for PropertyKey {
    fn from(idx: u32) -> Self {
        if idx == u32::MAX {
            PropertyKey::String(JsString::from(idx.to_string()))
        } else {
            PropertyKey::Index(idx)
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(s) => write!(f, "{}", s),
            PropertyKey::Index(i) => write!(f, "{}", i),
        }
    }
}

/// A stored property with its flags
#[derive(Debug, Clone)]
pub struct Property {
    pub value: JsValue,
    /// Writes are silently ignored
    pub readonly: bool,
    /// Visible to `for-in`
    pub enumerable: bool,
}

impl Property {
    pub fn data(value: JsValue) -> Self {
        Self {
            value,
            readonly: false,
            enumerable: true,
        }
    }

    pub fn with_flags(value: JsValue, readonly: bool, enumerable: bool) -> Self {
        Self {
            value,
            readonly,
            enumerable,
        }
    }
}

/// Host callable invoked with the receiver and already evaluated arguments
pub type NativeFn = Rc<dyn Fn(&mut Realm, JsValue, &[JsValue]) -> Result<JsValue, JsError>>;

/// A host-provided function
#[derive(Clone)]
pub struct NativeFunction {
    pub name: JsString,
    pub func: NativeFn,
    pub arity: u32,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// What happens when a function object is called
#[derive(Debug, Clone)]
pub enum JsFunction {
    /// Script function paired with the scope it was defined in
    Script {
        func: Rc<Function>,
        closure: ObjectId,
    },
    Native(NativeFunction),
    /// `Function.prototype.apply`; the evaluator dispatches it itself
    Apply,
    /// `Function.prototype.call`; the evaluator dispatches it itself
    Call,
    /// The global `eval`; calling it spawns a nested evaluator
    Eval,
}

impl JsFunction {
    pub fn name(&self) -> Option<&str> {
        match self {
            JsFunction::Script { func, .. } => func.id.as_ref().map(|id| id.name.as_str()),
            JsFunction::Native(native) => Some(native.name.as_str()),
            JsFunction::Apply => Some("apply"),
            JsFunction::Call => Some("call"),
            JsFunction::Eval => Some("eval"),
        }
    }
}

/// Type tag of an object
#[derive(Debug, Clone)]
pub enum ObjectKind {
    Ordinary,
    /// `length` is not a stored property; it tracks the highest index + 1
    Array {
        length: u32,
    },
    Function(JsFunction),
    /// Variable container. `parent_scope` is the lexical link, distinct from
    /// the prototype parent.
    Scope {
        parent_scope: Option<ObjectId>,
    },
    /// Milliseconds since the epoch, NaN for invalid dates
    Date {
        timestamp: f64,
    },
    /// `new Number(..)`, `new String(..)`, `new Boolean(..)`
    Primitive(JsValue),
}

/// A JavaScript object
#[derive(Debug, Clone)]
pub struct JsObject {
    /// The constructor whose `prototype` property this object inherits from
    pub parent: Option<ObjectId>,
    pub properties: FxIndexMap<PropertyKey, Property>,
    pub kind: ObjectKind,
}

impl JsObject {
    pub fn new(parent: Option<ObjectId>, kind: ObjectKind) -> Self {
        JsObject {
            parent,
            properties: FxIndexMap::default(),
            kind,
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.kind, ObjectKind::Function(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind, ObjectKind::Array { .. })
    }

    pub fn as_function(&self) -> Option<&JsFunction> {
        match &self.kind {
            ObjectKind::Function(func) => Some(func),
            _ => None,
        }
    }

    pub fn array_length(&self) -> Option<u32> {
        match self.kind {
            ObjectKind::Array { length } => Some(length),
            _ => None,
        }
    }

    pub fn parent_scope(&self) -> Option<ObjectId> {
        match self.kind {
            ObjectKind::Scope { parent_scope } => parent_scope,
            _ => None,
        }
    }

    pub fn get_own(&self, key: &PropertyKey) -> Option<&JsValue> {
        self.properties.get(key).map(|prop| &prop.value)
    }

    /// Own keys in enumeration order: indices ascending, then names in
    /// insertion order
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        let mut indices: Vec<u32> = self
            .properties
            .keys()
            .filter_map(PropertyKey::as_index)
            .collect();
        indices.sort_unstable();
        let mut keys: Vec<PropertyKey> = indices.into_iter().map(PropertyKey::Index).collect();
        keys.extend(
            self.properties
                .keys()
                .filter(|key| key.as_index().is_none())
                .cloned(),
        );
        keys
    }
}

// ============ NUMBER CONVERSIONS ============

fn is_js_whitespace(c: char) -> bool {
    c.is_whitespace() || c == '\u{feff}'
}

/// StringToNumber: decimal, hex, `Infinity`; empty or blank is 0
pub fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim_matches(is_js_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return parse_radix_digits(hex, 16).unwrap_or(f64::NAN);
    }
    // Rust's float parser also accepts "inf" and "nan"
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'))
    {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Accumulate digits in `radix`; None when empty or any digit is invalid
pub fn parse_radix_digits(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let mut result = 0.0f64;
    for c in digits.chars() {
        let digit = c.to_digit(radix)?;
        result = result * radix as f64 + digit as f64;
    }
    Some(result)
}

/// Number::toString(10), including exponent notation outside [1e-7, 1e21)
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n < 0.0 {
        return format!("-{}", number_to_string(-n));
    }

    // Shortest round-trip digits and decimal exponent
    let sci = format!("{:e}", n);
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: Vec<char> = mantissa.chars().filter(|c| *c != '.').collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let k = digits.len() as i32;
    let point = exponent + 1;

    let mut out = String::new();
    if k <= point && point <= 21 {
        out.extend(digits.iter());
        out.extend(std::iter::repeat_n('0', (point - k) as usize));
    } else if 0 < point && point <= 21 {
        let (int_part, frac_part) = digits.split_at(point as usize);
        out.extend(int_part.iter());
        out.push('.');
        out.extend(frac_part.iter());
    } else if -6 < point && point <= 0 {
        out.push_str("0.");
        out.extend(std::iter::repeat_n('0', (-point) as usize));
        out.extend(digits.iter());
    } else {
        let mut chars = digits.iter();
        if let Some(first) = chars.next() {
            out.push(*first);
        }
        if k > 1 {
            out.push('.');
            out.extend(chars);
        }
        out.push('e');
        out.push(if exponent >= 0 { '+' } else { '-' });
        out.push_str(&exponent.abs().to_string());
    }
    out
}

/// ToInt32
pub fn to_int32(n: f64) -> i32 {
    to_uint32(n) as i32
}

/// ToUint32
pub fn to_uint32(n: f64) -> u32 {
    if !n.is_finite() {
        return 0;
    }
    n.trunc().rem_euclid(4_294_967_296.0) as u32
}
