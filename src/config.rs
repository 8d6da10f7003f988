//! Evaluator settings

use serde::Deserialize;

use crate::error::JsError;

/// Configuration shared by an evaluator and every nested `eval` it spawns.
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Upper bound on continuation frames, counted across nested `eval`
    /// machines. 0 means unlimited.
    pub max_stack_depth: usize,
    /// How many `eval` calls may be running inside one another. Each level
    /// runs on the host stack, so this is always enforced.
    pub max_eval_depth: usize,
    /// Install the global `eval` binding.
    pub allow_eval: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_stack_depth: 0,
            max_eval_depth: 16,
            allow_eval: true,
        }
    }
}

impl Config {
    /// Load settings from JSON; missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Config, JsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_max_stack_depth(mut self, depth: usize) -> Self {
        self.max_stack_depth = depth;
        self
    }

    pub fn with_max_eval_depth(mut self, depth: usize) -> Self {
        self.max_eval_depth = depth;
        self
    }

    pub fn with_eval(mut self, allow: bool) -> Self {
        self.allow_eval = allow;
        self
    }

    /// Whether a stack of `depth` frames is within bounds
    pub fn stack_depth_allowed(&self, depth: usize) -> bool {
        self.max_stack_depth == 0 || depth <= self.max_stack_depth
    }
}
