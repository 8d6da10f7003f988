//! Syntax tree types
//!
//! The evaluator does not parse source text. It consumes the ESTree shape that
//! acorn/esprima-style parsers emit, either deserialized from their JSON output
//! (`Program::from_json`) or assembled with the helpers in [`build`].
//!
//! Child nodes are reference counted so the evaluator's continuation frames and
//! script functions can hold on to a subtree without copying it.

pub mod build;

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::error::JsError;
use crate::value::JsString;

/// Shared handle to a syntax tree node
pub type NodeRef = Rc<Node>;

/// A syntax tree node, tagged by its ESTree `type`
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Program(Program),

    // Declarations
    VariableDeclaration(VariableDeclaration),
    VariableDeclarator(VariableDeclarator),
    FunctionDeclaration(Rc<Function>),

    // Expressions
    FunctionExpression(Rc<Function>),
    Identifier(Identifier),
    Literal(Literal),
    ArrayExpression(ArrayExpression),
    ObjectExpression(ObjectExpression),
    BinaryExpression(BinaryExpression),
    LogicalExpression(LogicalExpression),
    AssignmentExpression(AssignmentExpression),
    UpdateExpression(UpdateExpression),
    UnaryExpression(UnaryExpression),
    ConditionalExpression(ConditionalExpression),
    CallExpression(CallExpression),
    NewExpression(CallExpression),
    MemberExpression(MemberExpression),
    SequenceExpression(SequenceExpression),
    ThisExpression,

    // Statements
    BlockStatement(BlockStatement),
    ExpressionStatement(ExpressionStatement),
    IfStatement(IfStatement),
    ForStatement(ForStatement),
    ForInStatement(ForInStatement),
    WhileStatement(WhileStatement),
    DoWhileStatement(WhileStatement),
    BreakStatement(JumpStatement),
    ContinueStatement(JumpStatement),
    ReturnStatement(ReturnStatement),
    ThrowStatement(ThrowStatement),
    LabeledStatement(LabeledStatement),
    EmptyStatement,

    /// Any node kind the evaluator has no handler for (`TryStatement`,
    /// `SwitchStatement`, ...). Fails when executed, not when loaded.
    #[serde(other)]
    Unsupported,
}

impl Node {
    /// The ESTree type name of this node
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Program(_) => "Program",
            Node::VariableDeclaration(_) => "VariableDeclaration",
            Node::VariableDeclarator(_) => "VariableDeclarator",
            Node::FunctionDeclaration(_) => "FunctionDeclaration",
            Node::FunctionExpression(_) => "FunctionExpression",
            Node::Identifier(_) => "Identifier",
            Node::Literal(_) => "Literal",
            Node::ArrayExpression(_) => "ArrayExpression",
            Node::ObjectExpression(_) => "ObjectExpression",
            Node::BinaryExpression(_) => "BinaryExpression",
            Node::LogicalExpression(_) => "LogicalExpression",
            Node::AssignmentExpression(_) => "AssignmentExpression",
            Node::UpdateExpression(_) => "UpdateExpression",
            Node::UnaryExpression(_) => "UnaryExpression",
            Node::ConditionalExpression(_) => "ConditionalExpression",
            Node::CallExpression(_) => "CallExpression",
            Node::NewExpression(_) => "NewExpression",
            Node::MemberExpression(_) => "MemberExpression",
            Node::SequenceExpression(_) => "SequenceExpression",
            Node::ThisExpression => "ThisExpression",
            Node::BlockStatement(_) => "BlockStatement",
            Node::ExpressionStatement(_) => "ExpressionStatement",
            Node::IfStatement(_) => "IfStatement",
            Node::ForStatement(_) => "ForStatement",
            Node::ForInStatement(_) => "ForInStatement",
            Node::WhileStatement(_) => "WhileStatement",
            Node::DoWhileStatement(_) => "DoWhileStatement",
            Node::BreakStatement(_) => "BreakStatement",
            Node::ContinueStatement(_) => "ContinueStatement",
            Node::ReturnStatement(_) => "ReturnStatement",
            Node::ThrowStatement(_) => "ThrowStatement",
            Node::LabeledStatement(_) => "LabeledStatement",
            Node::EmptyStatement => "EmptyStatement",
            Node::Unsupported => "Unsupported",
        }
    }

    /// Loop statements are the targets of `break`/`continue`
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            Node::ForStatement(_)
                | Node::ForInStatement(_)
                | Node::WhileStatement(_)
                | Node::DoWhileStatement(_)
        )
    }
}

/// A complete script
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Program {
    pub body: Vec<NodeRef>,
}

impl Program {
    /// Decode an ESTree `Program` from a parser's JSON output
    pub fn from_json(json: &str) -> Result<Program, JsError> {
        match serde_json::from_str::<Node>(json)? {
            Node::Program(program) => Ok(program),
            other => Err(JsError::syntax_error(format!(
                "Expected a Program node, found {}",
                other.kind()
            ))),
        }
    }
}

/// Turns source text into a [`Program`].
///
/// The evaluator never parses on its own; hosts that want `eval("...")` and
/// `new Function(..)` to work install one on the realm.
pub trait SourceParser {
    fn parse(&self, source: &str) -> Result<Program, JsError>;
}

impl<F> SourceParser for F
where
    F: Fn(&str) -> Result<Program, JsError>,
{
    fn parse(&self, source: &str) -> Result<Program, JsError> {
        self(source)
    }
}

// ============ DECLARATIONS ============

#[derive(Debug, Clone, Deserialize)]
pub struct VariableDeclaration {
    /// Each entry is a `VariableDeclarator` node
    pub declarations: Vec<NodeRef>,
    #[serde(default)]
    pub kind: VariableKind,
}

/// `let` and `const` are accepted but scoped like `var`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableKind {
    #[default]
    Var,
    Let,
    Const,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableDeclarator {
    pub id: Identifier,
    #[serde(default)]
    pub init: Option<NodeRef>,
}

/// Shared body of function declarations and function expressions
#[derive(Debug, Clone, Deserialize)]
pub struct Function {
    #[serde(default)]
    pub id: Option<Identifier>,
    pub params: Vec<Identifier>,
    /// Always a `BlockStatement`
    pub body: NodeRef,
}

// ============ EXPRESSIONS ============

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Identifier {
    pub name: JsString,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Literal {
    #[serde(default)]
    pub value: LiteralValue,
    /// Present on regular expression literals
    #[serde(default)]
    pub regex: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(untagged)]
pub enum LiteralValue {
    #[default]
    Null,
    Boolean(bool),
    Number(f64),
    String(JsString),
    /// Anything a JSON parser emits that has no primitive meaning
    Unrepresentable(serde::de::IgnoredAny),
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArrayExpression {
    /// `None` entries are holes (`[1, , 3]`)
    pub elements: Vec<Option<NodeRef>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectExpression {
    pub properties: Vec<ObjectProperty>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ObjectProperty {
    /// `Identifier` or `Literal`
    pub key: NodeRef,
    pub value: NodeRef,
    #[serde(default)]
    pub kind: PropertyKind,
    #[serde(default)]
    pub computed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    #[default]
    Init,
    Get,
    Set,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinaryExpression {
    pub operator: BinaryOp,
    pub left: NodeRef,
    pub right: NodeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogicalExpression {
    pub operator: LogicalOp,
    pub left: NodeRef,
    pub right: NodeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssignmentExpression {
    pub operator: AssignmentOp,
    /// `Identifier` or `MemberExpression`
    pub left: NodeRef,
    pub right: NodeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateExpression {
    pub operator: UpdateOp,
    pub argument: NodeRef,
    pub prefix: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnaryExpression {
    pub operator: UnaryOp,
    pub argument: NodeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionalExpression {
    pub test: NodeRef,
    pub consequent: NodeRef,
    pub alternate: NodeRef,
}

/// Shared by `CallExpression` and `NewExpression`
#[derive(Debug, Clone, Deserialize)]
pub struct CallExpression {
    pub callee: NodeRef,
    pub arguments: Vec<NodeRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemberExpression {
    pub object: NodeRef,
    pub property: NodeRef,
    #[serde(default)]
    pub computed: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SequenceExpression {
    pub expressions: Vec<NodeRef>,
}

// ============ STATEMENTS ============

#[derive(Debug, Clone, Deserialize)]
pub struct BlockStatement {
    pub body: Vec<NodeRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExpressionStatement {
    pub expression: NodeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IfStatement {
    pub test: NodeRef,
    pub consequent: NodeRef,
    #[serde(default)]
    pub alternate: Option<NodeRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForStatement {
    #[serde(default)]
    pub init: Option<NodeRef>,
    #[serde(default)]
    pub test: Option<NodeRef>,
    #[serde(default)]
    pub update: Option<NodeRef>,
    pub body: NodeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ForInStatement {
    /// `VariableDeclaration`, `Identifier` or `MemberExpression`
    pub left: NodeRef,
    pub right: NodeRef,
    pub body: NodeRef,
}

/// Shared by `WhileStatement` and `DoWhileStatement`
#[derive(Debug, Clone, Deserialize)]
pub struct WhileStatement {
    pub test: NodeRef,
    pub body: NodeRef,
}

/// Shared by `BreakStatement` and `ContinueStatement`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JumpStatement {
    #[serde(default)]
    pub label: Option<Identifier>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReturnStatement {
    #[serde(default)]
    pub argument: Option<NodeRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThrowStatement {
    pub argument: NodeRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LabeledStatement {
    pub label: Identifier,
    pub body: NodeRef,
}

// ============ OPERATORS ============
//
// Operator tokens decode from their source spelling. Tokens outside the
// dispatch table are kept verbatim so the failure surfaces when the node runs.

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum BinaryOp {
    // Equality
    Eq,          // ==
    NotEq,       // !=
    StrictEq,    // ===
    StrictNotEq, // !==

    // Relational
    Lt,   // <
    LtEq, // <=
    Gt,   // >
    GtEq, // >=

    // Arithmetic
    Add, // +
    Sub, // -
    Mul, // *
    Div, // /
    Mod, // %

    // Bitwise
    BitAnd,  // &
    BitOr,   // |
    BitXor,  // ^
    LShift,  // <<
    RShift,  // >>
    URShift, // >>>

    // Other
    In,         // in
    Instanceof, // instanceof

    Unknown(String),
}

impl From<String> for BinaryOp {
    fn from(token: String) -> Self {
        BinaryOp::from(token.as_str())
    }
}

impl From<&str> for BinaryOp {
    fn from(token: &str) -> Self {
        match token {
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::NotEq,
            "===" => BinaryOp::StrictEq,
            "!==" => BinaryOp::StrictNotEq,
            "<" => BinaryOp::Lt,
            "<=" => BinaryOp::LtEq,
            ">" => BinaryOp::Gt,
            ">=" => BinaryOp::GtEq,
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Mod,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "<<" => BinaryOp::LShift,
            ">>" => BinaryOp::RShift,
            ">>>" => BinaryOp::URShift,
            "in" => BinaryOp::In,
            "instanceof" => BinaryOp::Instanceof,
            other => BinaryOp::Unknown(other.to_string()),
        }
    }
}

impl BinaryOp {
    pub fn as_str(&self) -> &str {
        match self {
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::LShift => "<<",
            BinaryOp::RShift => ">>",
            BinaryOp::URShift => ">>>",
            BinaryOp::In => "in",
            BinaryOp::Instanceof => "instanceof",
            BinaryOp::Unknown(token) => token,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum LogicalOp {
    And, // &&
    Or,  // ||
    Unknown(String),
}

impl From<String> for LogicalOp {
    fn from(token: String) -> Self {
        LogicalOp::from(token.as_str())
    }
}

impl From<&str> for LogicalOp {
    fn from(token: &str) -> Self {
        match token {
            "&&" => LogicalOp::And,
            "||" => LogicalOp::Or,
            other => LogicalOp::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum AssignmentOp {
    Assign,        // =
    AddAssign,     // +=
    SubAssign,     // -=
    MulAssign,     // *=
    DivAssign,     // /=
    ModAssign,     // %=
    LShiftAssign,  // <<=
    RShiftAssign,  // >>=
    URShiftAssign, // >>>=
    BitAndAssign,  // &=
    BitOrAssign,   // |=
    BitXorAssign,  // ^=
    Unknown(String),
}

impl From<String> for AssignmentOp {
    fn from(token: String) -> Self {
        AssignmentOp::from(token.as_str())
    }
}

impl From<&str> for AssignmentOp {
    fn from(token: &str) -> Self {
        match token {
            "=" => AssignmentOp::Assign,
            "+=" => AssignmentOp::AddAssign,
            "-=" => AssignmentOp::SubAssign,
            "*=" => AssignmentOp::MulAssign,
            "/=" => AssignmentOp::DivAssign,
            "%=" => AssignmentOp::ModAssign,
            "<<=" => AssignmentOp::LShiftAssign,
            ">>=" => AssignmentOp::RShiftAssign,
            ">>>=" => AssignmentOp::URShiftAssign,
            "&=" => AssignmentOp::BitAndAssign,
            "|=" => AssignmentOp::BitOrAssign,
            "^=" => AssignmentOp::BitXorAssign,
            other => AssignmentOp::Unknown(other.to_string()),
        }
    }
}

impl AssignmentOp {
    /// The binary operator a compound assignment applies before storing
    pub fn binary(&self) -> Option<BinaryOp> {
        match self {
            AssignmentOp::Assign | AssignmentOp::Unknown(_) => None,
            AssignmentOp::AddAssign => Some(BinaryOp::Add),
            AssignmentOp::SubAssign => Some(BinaryOp::Sub),
            AssignmentOp::MulAssign => Some(BinaryOp::Mul),
            AssignmentOp::DivAssign => Some(BinaryOp::Div),
            AssignmentOp::ModAssign => Some(BinaryOp::Mod),
            AssignmentOp::LShiftAssign => Some(BinaryOp::LShift),
            AssignmentOp::RShiftAssign => Some(BinaryOp::RShift),
            AssignmentOp::URShiftAssign => Some(BinaryOp::URShift),
            AssignmentOp::BitAndAssign => Some(BinaryOp::BitAnd),
            AssignmentOp::BitOrAssign => Some(BinaryOp::BitOr),
            AssignmentOp::BitXorAssign => Some(BinaryOp::BitXor),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum UnaryOp {
    Minus,  // -
    Plus,   // +
    Not,    // !
    BitNot, // ~
    Typeof,
    Void,
    Delete,
    Unknown(String),
}

impl From<String> for UnaryOp {
    fn from(token: String) -> Self {
        UnaryOp::from(token.as_str())
    }
}

impl From<&str> for UnaryOp {
    fn from(token: &str) -> Self {
        match token {
            "-" => UnaryOp::Minus,
            "+" => UnaryOp::Plus,
            "!" => UnaryOp::Not,
            "~" => UnaryOp::BitNot,
            "typeof" => UnaryOp::Typeof,
            "void" => UnaryOp::Void,
            "delete" => UnaryOp::Delete,
            other => UnaryOp::Unknown(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum UpdateOp {
    Increment, // ++
    Decrement, // --
    Unknown(String),
}

impl From<String> for UpdateOp {
    fn from(token: String) -> Self {
        UpdateOp::from(token.as_str())
    }
}

impl From<&str> for UpdateOp {
    fn from(token: &str) -> Self {
        match token {
            "++" => UpdateOp::Increment,
            "--" => UpdateOp::Decrement,
            other => UpdateOp::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
