//! Lexical scopes and variable resolution
//!
//! A scope is an object of kind [`ObjectKind::Scope`](crate::value::ObjectKind)
//! whose properties are the variables. Lookup walks `parent_scope` links
//! outward; each step also consults the scope object's own prototype chain, so
//! the global scope exposes `Object.prototype` members.

use rustc_hash::FxHashSet;

use crate::ast::{Node, NodeRef};
use crate::error::JsError;
use crate::realm::Realm;
use crate::value::{JsString, JsValue, ObjectId, PropertyKey};

/// The innermost scope on the chain that defines `name`
pub fn resolve(realm: &Realm, scope: ObjectId, name: &PropertyKey) -> Option<ObjectId> {
    let mut visited = FxHashSet::default();
    let mut current = Some(scope);
    while let Some(id) = current {
        if !visited.insert(id) {
            return None;
        }
        if realm
            .has_property(&JsValue::Object(id), name)
            .unwrap_or(false)
        {
            return Some(id);
        }
        current = realm.object(id).and_then(|obj| obj.parent_scope());
    }
    None
}

/// Read a variable
pub fn lookup(realm: &Realm, scope: ObjectId, name: &JsString) -> Result<JsValue, JsError> {
    let key = PropertyKey::from(name.clone());
    match resolve(realm, scope, &key) {
        Some(holder) => realm.get_property(&JsValue::Object(holder), &key),
        None => Err(JsError::reference_error(name.as_str())),
    }
}

/// Write a variable where it is defined; unresolved names are an error
pub fn assign(
    realm: &mut Realm,
    scope: ObjectId,
    name: &JsString,
    value: JsValue,
) -> Result<(), JsError> {
    let key = PropertyKey::from(name.clone());
    match resolve(realm, scope, &key) {
        Some(holder) => realm.set_property(&JsValue::Object(holder), &key, value),
        None => Err(JsError::reference_error(name.as_str())),
    }
}

/// Bind `name` directly in `scope`
pub fn declare(realm: &mut Realm, scope: ObjectId, name: &JsString, value: JsValue) {
    realm.define_property(scope, name.clone(), value, false, true);
}

fn has_own(realm: &Realm, scope: ObjectId, name: &JsString) -> bool {
    realm
        .object(scope)
        .is_some_and(|obj| obj.properties.contains_key(&PropertyKey::from(name.clone())))
}

/// Pre-register `var` and function declarations of a body in `scope`.
///
/// Nested function bodies are skipped; they hoist when invoked. A `var` that
/// is already bound (a parameter, say) keeps its value, function
/// declarations always rebind.
pub fn hoist(realm: &mut Realm, body: &[NodeRef], scope: ObjectId) {
    let mut pending: Vec<NodeRef> = body.iter().rev().cloned().collect();
    while let Some(node) = pending.pop() {
        match node.as_ref() {
            Node::VariableDeclaration(decl) => {
                for declarator in &decl.declarations {
                    if let Node::VariableDeclarator(d) = declarator.as_ref() {
                        if !has_own(realm, scope, &d.id.name) {
                            declare(realm, scope, &d.id.name, JsValue::Undefined);
                        }
                    }
                }
            }
            Node::FunctionDeclaration(func) => {
                if let Some(id) = &func.id {
                    let function = realm.create_function(func.clone(), scope);
                    declare(realm, scope, &id.name, JsValue::Object(function));
                }
            }
            Node::BlockStatement(block) => pending.extend(block.body.iter().rev().cloned()),
            Node::IfStatement(stmt) => {
                pending.extend(stmt.alternate.iter().cloned());
                pending.push(stmt.consequent.clone());
            }
            Node::ForStatement(stmt) => {
                pending.push(stmt.body.clone());
                pending.extend(stmt.init.iter().cloned());
            }
            Node::ForInStatement(stmt) => {
                pending.push(stmt.body.clone());
                pending.push(stmt.left.clone());
            }
            Node::WhileStatement(stmt) | Node::DoWhileStatement(stmt) => {
                pending.push(stmt.body.clone());
            }
            Node::LabeledStatement(stmt) => pending.push(stmt.body.clone()),
            _ => {}
        }
    }
}
