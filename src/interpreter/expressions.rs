//! Expression handlers
//!
//! Each handler receives its own frame already popped off the stack. It either
//! descends into a child (pushing itself back first) or finishes, writing its
//! result into the frame below.

use std::rc::Rc;

use super::operators;
use super::stack::{Completion, Frame, Machine, Reference, Stage};
use crate::ast::{
    ArrayExpression, AssignmentExpression, AssignmentOp, BinaryExpression, ConditionalExpression,
    Function, Identifier, Literal, LiteralValue, LogicalExpression, LogicalOp, MemberExpression,
    Node, NodeRef, ObjectExpression, ObjectProperty, PropertyKind, UnaryExpression, UnaryOp,
    UpdateExpression,
};
use crate::error::JsError;
use crate::realm::Realm;
use crate::scope;
use crate::value::{CheapClone, JsString, JsValue, ObjectId, PropertyKey};

/// The primitive a literal node denotes
pub(crate) fn literal_value(literal: &Literal) -> Result<JsValue, JsError> {
    if literal.regex.is_some() {
        return Err(JsError::type_error(
            "Regular expression literals are not supported",
        ));
    }
    match &literal.value {
        LiteralValue::Null => Ok(JsValue::Null),
        LiteralValue::Boolean(b) => Ok(JsValue::Boolean(*b)),
        LiteralValue::Number(n) => Ok(JsValue::Number(*n)),
        LiteralValue::String(s) => Ok(JsValue::String(s.cheap_clone())),
        LiteralValue::Unrepresentable(_) => {
            Err(JsError::type_error("Unsupported literal value"))
        }
    }
}

/// Key of an object literal entry. Only plain `key: value` entries with an
/// identifier or literal key are accepted.
fn literal_key(realm: &Realm, property: &ObjectProperty) -> Result<PropertyKey, JsError> {
    if property.computed {
        return Err(JsError::type_error(
            "Computed property names are not supported",
        ));
    }
    if property.kind != PropertyKind::Init {
        return Err(JsError::type_error("Accessor properties are not supported"));
    }
    match property.key.as_ref() {
        Node::Identifier(id) => Ok(PropertyKey::from(id.name.cheap_clone())),
        Node::Literal(literal) => Ok(realm.to_property_key(&literal_value(literal)?)),
        other => Err(JsError::syntax_error(format!(
            "Invalid property key: {}",
            other.kind()
        ))),
    }
}

impl Machine {
    // ═══════════════════════════════════════════════════════════════════════
    // References
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn read_reference(
        &self,
        realm: &Realm,
        reference: &Reference,
    ) -> Result<JsValue, JsError> {
        match reference {
            Reference::Variable(name) => scope::lookup(realm, self.scope_or_global(realm), name),
            Reference::Property { base, key } => realm.get_property(base, key),
        }
    }

    pub(super) fn write_reference(
        &self,
        realm: &mut Realm,
        reference: &Reference,
        value: JsValue,
    ) -> Result<(), JsError> {
        match reference {
            Reference::Variable(name) => {
                let scope = self.scope_or_global(realm);
                scope::assign(realm, scope, name, value)
            }
            Reference::Property { base, key } => realm.set_property(base, key, value),
        }
    }

    fn scope_or_global(&self, realm: &Realm) -> ObjectId {
        self.current_scope().unwrap_or_else(|| realm.global_scope())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Atoms
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn step_identifier(
        &mut self,
        realm: &Realm,
        frame: Frame,
        ident: &Identifier,
    ) -> Result<(), JsError> {
        if frame.reference {
            self.finish(Reference::Variable(ident.name.cheap_clone()));
            return Ok(());
        }
        let value = scope::lookup(realm, self.scope_for(&frame, realm), &ident.name)?;
        self.finish(value);
        Ok(())
    }

    pub(super) fn step_literal(&mut self, literal: &Literal) -> Result<(), JsError> {
        let value = literal_value(literal)?;
        self.finish(value);
        Ok(())
    }

    pub(super) fn step_this(&mut self, realm: &Realm) {
        let this = self.this_value(realm);
        self.finish(this);
    }

    /// A named function expression sees its own name through an extra scope
    /// between it and the defining scope
    pub(super) fn step_function_expression(
        &mut self,
        realm: &mut Realm,
        frame: Frame,
        func: &Rc<Function>,
    ) {
        let defining = self.scope_for(&frame, realm);
        let function = match &func.id {
            Some(id) => {
                let closure = realm.create_scope(Some(defining));
                let function = realm.create_function(func.clone(), closure);
                scope::declare(realm, closure, &id.name, JsValue::Object(function));
                function
            }
            None => realm.create_function(func.clone(), defining),
        };
        self.finish(JsValue::Object(function));
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Literals
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn step_array(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expr: &ArrayExpression,
    ) -> Result<(), JsError> {
        let (array, mut next) = match frame.stage {
            Stage::Elements { array, next } => {
                // The element just evaluated sits at next - 1
                if let Some(index) = next.checked_sub(1) {
                    let value = frame.take_value();
                    realm.define_property(array, index as u32, value, false, true);
                }
                (array, next)
            }
            _ => (realm.create_array(Vec::new()), 0),
        };
        while let Some(element) = expr.elements.get(next) {
            next += 1;
            if let Some(element) = element {
                frame.stage = Stage::Elements { array, next };
                return self.descend(realm, frame, Frame::new(element.cheap_clone()));
            }
        }
        // Trailing holes still count
        realm.set_array_length(array, expr.elements.len() as u32);
        self.finish(JsValue::Object(array));
        Ok(())
    }

    pub(super) fn step_object(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expr: &ObjectExpression,
    ) -> Result<(), JsError> {
        let (object, next) = match frame.stage {
            Stage::Properties { object, next } => {
                if let Some(property) = next.checked_sub(1).and_then(|i| expr.properties.get(i)) {
                    let key = literal_key(realm, property)?;
                    let value = frame.take_value();
                    realm.define_property(object, key, value, false, true);
                }
                (object, next)
            }
            _ => (realm.create_plain_object(), 0),
        };
        match expr.properties.get(next) {
            Some(property) => {
                literal_key(realm, property)?;
                frame.stage = Stage::Properties {
                    object,
                    next: next + 1,
                };
                self.descend(realm, frame, Frame::new(property.value.cheap_clone()))
            }
            None => {
                self.finish(JsValue::Object(object));
                Ok(())
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Operators
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn step_binary(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expr: &BinaryExpression,
    ) -> Result<(), JsError> {
        match std::mem::replace(&mut frame.stage, Stage::Start) {
            Stage::Left => {
                let left = frame.take_value();
                frame.stage = Stage::Right { left };
                self.descend(realm, frame, Frame::new(expr.right.cheap_clone()))
            }
            Stage::Right { left } => {
                let right = frame.take_value();
                let value = operators::binary(realm, &expr.operator, &left, &right)?;
                self.finish(value);
                Ok(())
            }
            _ => {
                frame.stage = Stage::Left;
                self.descend(realm, frame, Frame::new(expr.left.cheap_clone()))
            }
        }
    }

    pub(super) fn step_logical(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expr: &LogicalExpression,
    ) -> Result<(), JsError> {
        match frame.stage {
            Stage::Left => {
                let left = frame.take_value();
                let short_circuit = match &expr.operator {
                    LogicalOp::And => !left.to_boolean(),
                    LogicalOp::Or => left.to_boolean(),
                    LogicalOp::Unknown(token) => {
                        return Err(JsError::unknown_operator(token.as_str()));
                    }
                };
                if short_circuit {
                    self.finish(left);
                    return Ok(());
                }
                frame.stage = Stage::LogicalRight;
                self.descend(realm, frame, Frame::new(expr.right.cheap_clone()))
            }
            Stage::LogicalRight => {
                let right = frame.take_value();
                self.finish(right);
                Ok(())
            }
            _ => {
                frame.stage = Stage::Left;
                self.descend(realm, frame, Frame::new(expr.left.cheap_clone()))
            }
        }
    }

    /// Resolve the target, read it for compound operators, evaluate the right
    /// side, then write back through the same reference
    pub(super) fn step_assignment(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expr: &AssignmentExpression,
    ) -> Result<(), JsError> {
        match std::mem::replace(&mut frame.stage, Stage::Start) {
            Stage::Left => {
                let target = frame.take_reference()?;
                let current = match expr.operator.binary() {
                    Some(_) => Some(self.read_reference(realm, &target)?),
                    None => None,
                };
                if let AssignmentOp::Unknown(token) = &expr.operator {
                    return Err(JsError::unknown_operator(token.as_str()));
                }
                frame.stage = Stage::AssignValue { target, current };
                self.descend(realm, frame, Frame::new(expr.right.cheap_clone()))
            }
            Stage::AssignValue { target, current } => {
                let right = frame.take_value();
                let value = match (current, expr.operator.binary()) {
                    (Some(current), Some(op)) => operators::binary(realm, &op, &current, &right)?,
                    _ => right,
                };
                self.write_reference(realm, &target, value.cheap_clone())?;
                self.finish(value);
                Ok(())
            }
            _ => {
                frame.stage = Stage::Left;
                self.descend(realm, frame, Frame::reference(expr.left.cheap_clone()))
            }
        }
    }

    pub(super) fn step_update(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expr: &UpdateExpression,
    ) -> Result<(), JsError> {
        if !matches!(frame.stage, Stage::Operand) {
            frame.stage = Stage::Operand;
            return self.descend(realm, frame, Frame::reference(expr.argument.cheap_clone()));
        }
        let target = frame.take_reference()?;
        let old = realm.to_number(&self.read_reference(realm, &target)?);
        let new = operators::update(&expr.operator, old)?;
        self.write_reference(realm, &target, JsValue::Number(new))?;
        self.finish(JsValue::Number(if expr.prefix { new } else { old }));
        Ok(())
    }

    /// `delete` and `typeof identifier` look at the reference, not the value
    pub(super) fn step_unary(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expr: &UnaryExpression,
    ) -> Result<(), JsError> {
        if !matches!(frame.stage, Stage::Operand) {
            frame.stage = Stage::Operand;
            let wants_reference = match expr.operator {
                UnaryOp::Delete => true,
                UnaryOp::Typeof => matches!(expr.argument.as_ref(), Node::Identifier(_)),
                _ => false,
            };
            let child = if wants_reference {
                Frame::reference(expr.argument.cheap_clone())
            } else {
                Frame::new(expr.argument.cheap_clone())
            };
            return self.descend(realm, frame, child);
        }

        let result = match (&expr.operator, frame.value.take()) {
            (UnaryOp::Delete, Some(Completion::Reference(Reference::Property { base, key }))) => {
                JsValue::Boolean(realm.delete_property(&base, &key))
            }
            (UnaryOp::Delete, Some(Completion::Reference(Reference::Variable(name)))) => {
                let key = PropertyKey::from(name);
                match scope::resolve(realm, self.scope_or_global(realm), &key) {
                    Some(holder) => JsValue::Boolean(
                        realm.delete_property(&JsValue::Object(holder), &key),
                    ),
                    None => JsValue::Boolean(true),
                }
            }
            (UnaryOp::Typeof, Some(Completion::Reference(Reference::Variable(name)))) => {
                let key = PropertyKey::from(name.cheap_clone());
                let scope = self.scope_or_global(realm);
                match scope::resolve(realm, scope, &key) {
                    Some(_) => {
                        let value = scope::lookup(realm, scope, &name)?;
                        JsValue::String(JsString::from(realm.type_of(&value)))
                    }
                    None => JsValue::from("undefined"),
                }
            }
            (op, Some(Completion::Value(value))) => operators::unary(realm, op, &value)?,
            (op, _) => operators::unary(realm, op, &JsValue::Undefined)?,
        };
        self.finish(result);
        Ok(())
    }

    /// The chosen branch replaces the conditional's frame
    pub(super) fn step_conditional(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expr: &ConditionalExpression,
    ) -> Result<(), JsError> {
        if !matches!(frame.stage, Stage::Test) {
            frame.stage = Stage::Test;
            return self.descend(realm, frame, Frame::new(expr.test.cheap_clone()));
        }
        let branch = if frame.take_value().to_boolean() {
            &expr.consequent
        } else {
            &expr.alternate
        };
        self.push(realm, Frame::new(branch.cheap_clone()))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Member access and sequences
    // ═══════════════════════════════════════════════════════════════════════

    pub(super) fn step_member(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expr: &MemberExpression,
    ) -> Result<(), JsError> {
        let (base, key) = match std::mem::replace(&mut frame.stage, Stage::Start) {
            Stage::MemberObject => {
                let base = frame.take_value();
                if expr.computed {
                    frame.stage = Stage::MemberProperty { base };
                    return self.descend(realm, frame, Frame::new(expr.property.cheap_clone()));
                }
                let Node::Identifier(name) = expr.property.as_ref() else {
                    return Err(JsError::syntax_error(format!(
                        "Unexpected {} after '.'",
                        expr.property.kind()
                    )));
                };
                (base, PropertyKey::from(name.name.cheap_clone()))
            }
            Stage::MemberProperty { base } => {
                let key = realm.to_property_key(&frame.take_value());
                (base, key)
            }
            _ => {
                frame.stage = Stage::MemberObject;
                return self.descend(realm, frame, Frame::new(expr.object.cheap_clone()));
            }
        };

        if frame.reference {
            self.finish(Reference::Property { base, key });
        } else {
            let value = realm.get_property(&base, &key)?;
            self.finish(value);
        }
        Ok(())
    }

    /// Comma operator: the last expression's value
    pub(super) fn step_sequence(
        &mut self,
        realm: &mut Realm,
        mut frame: Frame,
        expressions: &[NodeRef],
    ) -> Result<(), JsError> {
        let next = match frame.stage {
            Stage::Next(next) => next,
            _ => 0,
        };
        match expressions.get(next) {
            Some(expr) => {
                frame.stage = Stage::Next(next + 1);
                self.descend(realm, frame, Frame::new(expr.cheap_clone()))
            }
            None => {
                let value = frame.take_value();
                self.finish(value);
                Ok(())
            }
        }
    }
}
