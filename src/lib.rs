//! Pausable step evaluator for an ECMAScript-like scripting language
//!
//! The evaluator walks an ESTree syntax tree produced by an external parser,
//! one micro-step at a time, on an explicit continuation stack. Hosts drive it
//! with [`Evaluator::step`] and may stop between any two steps, so script
//! recursion depth is bounded by memory rather than the native call stack.
//!
//! # Example
//!
//! ```
//! use steprun::{Evaluator, JsValue, Program};
//!
//! // var x = 1;
//! let program = Program::from_json(r#"{
//!     "type": "Program",
//!     "body": [{
//!         "type": "VariableDeclaration",
//!         "kind": "var",
//!         "declarations": [{
//!             "type": "VariableDeclarator",
//!             "id": { "type": "Identifier", "name": "x" },
//!             "init": { "type": "Literal", "value": 1 }
//!         }]
//!     }]
//! }"#).unwrap();
//!
//! let mut evaluator = Evaluator::new(program);
//! evaluator.run().unwrap();
//! assert_eq!(evaluator.get_global("x"), JsValue::from(1));
//! ```

pub mod ast;
pub mod config;
pub mod error;
pub mod interpreter;
pub mod realm;
pub mod scope;
pub mod value;

pub use ast::{Program, SourceParser};
pub use config::Config;
pub use error::JsError;
pub use interpreter::{Evaluator, InitCallback};
pub use realm::Realm;
pub use value::CheapClone;
pub use value::JsString;
pub use value::JsValue;
pub use value::ObjectId;
