//! Constructor helpers for syntax trees
//!
//! Hosts that lower their own parser output, tests and benches use these to
//! assemble trees without going through JSON. Operators are given as source
//! tokens (`"+"`, `"==="`, `"typeof"`).
//!
//! ```
//! use steprun::ast::build::*;
//!
//! // var x = 1 + 2;
//! let program = program(vec![var("x", Some(binary("+", num(1.0), num(2.0))))]);
//! assert_eq!(program.body.len(), 1);
//! ```

use std::rc::Rc;

use super::*;

pub fn program(body: Vec<NodeRef>) -> Program {
    Program { body }
}

fn node(node: Node) -> NodeRef {
    Rc::new(node)
}

fn identifier(name: &str) -> Identifier {
    Identifier {
        name: JsString::from(name),
    }
}

// ============ DECLARATIONS ============

/// `var name = init;`
pub fn var(name: &str, init: Option<NodeRef>) -> NodeRef {
    vars(vec![(name, init)])
}

/// `var a = .., b = ..;`
pub fn vars(declarations: Vec<(&str, Option<NodeRef>)>) -> NodeRef {
    node(Node::VariableDeclaration(VariableDeclaration {
        declarations: declarations
            .into_iter()
            .map(|(name, init)| {
                node(Node::VariableDeclarator(VariableDeclarator {
                    id: identifier(name),
                    init,
                }))
            })
            .collect(),
        kind: VariableKind::Var,
    }))
}

fn function(name: Option<&str>, params: &[&str], body: Vec<NodeRef>) -> Rc<Function> {
    Rc::new(Function {
        id: name.map(identifier),
        params: params.iter().map(|p| identifier(p)).collect(),
        body: block(body),
    })
}

/// `function name(params) { body }`
pub fn func_decl(name: &str, params: &[&str], body: Vec<NodeRef>) -> NodeRef {
    node(Node::FunctionDeclaration(function(Some(name), params, body)))
}

/// `function [name](params) { body }` as an expression
pub fn func_expr(name: Option<&str>, params: &[&str], body: Vec<NodeRef>) -> NodeRef {
    node(Node::FunctionExpression(function(name, params, body)))
}

// ============ EXPRESSIONS ============

pub fn ident(name: &str) -> NodeRef {
    node(Node::Identifier(identifier(name)))
}

fn literal(value: LiteralValue) -> NodeRef {
    node(Node::Literal(Literal { value, regex: None }))
}

pub fn num(n: f64) -> NodeRef {
    literal(LiteralValue::Number(n))
}

pub fn str_lit(s: &str) -> NodeRef {
    literal(LiteralValue::String(JsString::from(s)))
}

pub fn bool_lit(b: bool) -> NodeRef {
    literal(LiteralValue::Boolean(b))
}

pub fn null() -> NodeRef {
    literal(LiteralValue::Null)
}

/// `[a, , b]`; `None` is a hole
pub fn array(elements: Vec<Option<NodeRef>>) -> NodeRef {
    node(Node::ArrayExpression(ArrayExpression { elements }))
}

/// `{ key: value, .. }` with identifier keys
pub fn object(properties: Vec<(&str, NodeRef)>) -> NodeRef {
    node(Node::ObjectExpression(ObjectExpression {
        properties: properties
            .into_iter()
            .map(|(key, value)| ObjectProperty {
                key: ident(key),
                value,
                kind: PropertyKind::Init,
                computed: false,
            })
            .collect(),
    }))
}

pub fn binary(operator: &str, left: NodeRef, right: NodeRef) -> NodeRef {
    node(Node::BinaryExpression(BinaryExpression {
        operator: BinaryOp::from(operator),
        left,
        right,
    }))
}

pub fn logical(operator: &str, left: NodeRef, right: NodeRef) -> NodeRef {
    node(Node::LogicalExpression(LogicalExpression {
        operator: LogicalOp::from(operator),
        left,
        right,
    }))
}

pub fn assign(operator: &str, left: NodeRef, right: NodeRef) -> NodeRef {
    node(Node::AssignmentExpression(AssignmentExpression {
        operator: AssignmentOp::from(operator),
        left,
        right,
    }))
}

pub fn update(operator: &str, prefix: bool, argument: NodeRef) -> NodeRef {
    node(Node::UpdateExpression(UpdateExpression {
        operator: UpdateOp::from(operator),
        argument,
        prefix,
    }))
}

pub fn unary(operator: &str, argument: NodeRef) -> NodeRef {
    node(Node::UnaryExpression(UnaryExpression {
        operator: UnaryOp::from(operator),
        argument,
    }))
}

pub fn conditional(test: NodeRef, consequent: NodeRef, alternate: NodeRef) -> NodeRef {
    node(Node::ConditionalExpression(ConditionalExpression {
        test,
        consequent,
        alternate,
    }))
}

pub fn call(callee: NodeRef, arguments: Vec<NodeRef>) -> NodeRef {
    node(Node::CallExpression(CallExpression { callee, arguments }))
}

pub fn new_expr(callee: NodeRef, arguments: Vec<NodeRef>) -> NodeRef {
    node(Node::NewExpression(CallExpression { callee, arguments }))
}

/// `object.name`
pub fn member(object: NodeRef, name: &str) -> NodeRef {
    node(Node::MemberExpression(MemberExpression {
        object,
        property: ident(name),
        computed: false,
    }))
}

/// `object[property]`
pub fn index(object: NodeRef, property: NodeRef) -> NodeRef {
    node(Node::MemberExpression(MemberExpression {
        object,
        property,
        computed: true,
    }))
}

/// `object.name(arguments)`
pub fn method_call(object: NodeRef, name: &str, arguments: Vec<NodeRef>) -> NodeRef {
    call(member(object, name), arguments)
}

pub fn sequence(expressions: Vec<NodeRef>) -> NodeRef {
    node(Node::SequenceExpression(SequenceExpression { expressions }))
}

pub fn this() -> NodeRef {
    node(Node::ThisExpression)
}

// ============ STATEMENTS ============

pub fn block(body: Vec<NodeRef>) -> NodeRef {
    node(Node::BlockStatement(BlockStatement { body }))
}

pub fn expr_stmt(expression: NodeRef) -> NodeRef {
    node(Node::ExpressionStatement(ExpressionStatement { expression }))
}

pub fn if_stmt(test: NodeRef, consequent: NodeRef, alternate: Option<NodeRef>) -> NodeRef {
    node(Node::IfStatement(IfStatement {
        test,
        consequent,
        alternate,
    }))
}

pub fn for_stmt(
    init: Option<NodeRef>,
    test: Option<NodeRef>,
    update: Option<NodeRef>,
    body: NodeRef,
) -> NodeRef {
    node(Node::ForStatement(ForStatement {
        init,
        test,
        update,
        body,
    }))
}

pub fn for_in(left: NodeRef, right: NodeRef, body: NodeRef) -> NodeRef {
    node(Node::ForInStatement(ForInStatement { left, right, body }))
}

pub fn while_stmt(test: NodeRef, body: NodeRef) -> NodeRef {
    node(Node::WhileStatement(WhileStatement { test, body }))
}

pub fn do_while(body: NodeRef, test: NodeRef) -> NodeRef {
    node(Node::DoWhileStatement(WhileStatement { test, body }))
}

pub fn break_stmt(label: Option<&str>) -> NodeRef {
    node(Node::BreakStatement(JumpStatement {
        label: label.map(identifier),
    }))
}

pub fn continue_stmt(label: Option<&str>) -> NodeRef {
    node(Node::ContinueStatement(JumpStatement {
        label: label.map(identifier),
    }))
}

pub fn return_stmt(argument: Option<NodeRef>) -> NodeRef {
    node(Node::ReturnStatement(ReturnStatement { argument }))
}

pub fn throw_stmt(argument: NodeRef) -> NodeRef {
    node(Node::ThrowStatement(ThrowStatement { argument }))
}

pub fn labeled(label: &str, body: NodeRef) -> NodeRef {
    node(Node::LabeledStatement(LabeledStatement {
        label: identifier(label),
        body,
    }))
}

pub fn empty() -> NodeRef {
    node(Node::EmptyStatement)
}
