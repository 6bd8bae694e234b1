//! Command definitions organized by protocol domain.
//!
//! Commands follow the DevTools `Domain.method` naming. Only the `Runtime`
//! domain is needed for injection.
//!
//! # Command Domains
//!
//! | Domain | Commands |
//! |--------|----------|
//! | `Runtime` | `Runtime.evaluate` |

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Constants
// ============================================================================

/// Execution context every evaluation targets (the page's main world).
pub const DEFAULT_CONTEXT_ID: u32 = 1;

/// Object group that evaluation results are retained under.
pub const CONSOLE_OBJECT_GROUP: &str = "console";

// ============================================================================
// Command Wrapper
// ============================================================================

/// All protocol commands organized by domain.
///
/// This enum wraps domain-specific command enums for unified serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Command {
    /// Runtime domain commands.
    Runtime(RuntimeCommand),
}

// ============================================================================
// Runtime Commands
// ============================================================================

/// Runtime domain commands for JavaScript evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params")]
pub enum RuntimeCommand {
    /// Evaluate an expression in a page.
    #[serde(rename = "Runtime.evaluate")]
    Evaluate(EvaluateParams),
}

impl RuntimeCommand {
    /// Builds the evaluation command for one script.
    #[inline]
    #[must_use]
    pub fn evaluate(expression: impl Into<String>) -> Self {
        Self::Evaluate(EvaluateParams::console(expression))
    }
}

// ============================================================================
// EvaluateParams
// ============================================================================

/// Parameters of `Runtime.evaluate`.
///
/// Field names and order match what DevTools itself sends from its console,
/// which is what remote targets expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluateParams {
    /// Execution context to evaluate in.
    #[serde(rename = "contextId")]
    pub context_id: u32,

    /// Whether to pause on exceptions and mute the console.
    #[serde(rename = "doNotPauseOnExceptionsAndMuteConsole")]
    pub do_not_pause_on_exceptions_and_mute_console: bool,

    /// Code to run.
    pub expression: String,

    /// Whether a preview of the result should be generated.
    #[serde(rename = "generatePreview")]
    pub generate_preview: bool,

    /// Expose `$`, `$$`, `copy()` and friends to the expression.
    #[serde(rename = "includeCommandLineAPI")]
    pub include_command_line_api: bool,

    /// Object group the result is retained under.
    #[serde(rename = "objectGroup")]
    pub object_group: String,

    /// Whether the result should be returned by value.
    #[serde(rename = "returnByValue")]
    pub return_by_value: bool,

    /// Treat the evaluation as initiated by a user gesture.
    #[serde(rename = "userGesture")]
    pub user_gesture: bool,
}

impl EvaluateParams {
    /// Parameters as sent by a console evaluation.
    #[must_use]
    pub fn console(expression: impl Into<String>) -> Self {
        Self {
            context_id: DEFAULT_CONTEXT_ID,
            do_not_pause_on_exceptions_and_mute_console: false,
            expression: expression.into(),
            generate_preview: false,
            include_command_line_api: true,
            object_group: CONSOLE_OBJECT_GROUP.to_string(),
            return_by_value: false,
            user_gesture: true,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_evaluate_method_and_params() {
        let command = Command::Runtime(RuntimeCommand::evaluate("1 + 1"));
        let value = serde_json::to_value(&command).expect("serialize");

        assert_eq!(value["method"], "Runtime.evaluate");
        assert_eq!(
            value["params"],
            json!({
                "contextId": 1,
                "doNotPauseOnExceptionsAndMuteConsole": false,
                "expression": "1 + 1",
                "generatePreview": false,
                "includeCommandLineAPI": true,
                "objectGroup": "console",
                "returnByValue": false,
                "userGesture": true
            })
        );
    }

    #[test]
    fn test_expression_is_not_altered() {
        let source = "console.log(\"hi\");\n// trailing\r\n\u{1F600}";
        let RuntimeCommand::Evaluate(params) = RuntimeCommand::evaluate(source);
        assert_eq!(params.expression, source);
    }
}
