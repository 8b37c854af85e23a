//! The calculator's input buffer and everything that acts on it.

use tracing::{debug, warn};

use super::angle::{AngleMode, to_radians};
use super::evaluation::{Evaluator, FastevalEvaluator, format_display, format_value};
use super::history::{HistoryEntry, HistoryLog};

/// Outcome of the most recent evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LastResult {
    /// The expression evaluated to this value.
    Value(f64),
    /// The evaluator rejected the expression.
    Error,
}

impl LastResult {
    /// Check if this is a successful result.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// The numeric value, if any.
    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Value(value) => Some(*value),
            Self::Error => None,
        }
    }

    /// Get the display string (grouped result or "Error").
    pub fn display(&self) -> String {
        match self {
            Self::Value(value) => format_display(*value),
            Self::Error => "Error".to_string(),
        }
    }

    /// Get the clipboard string (only for successful results).
    pub fn clipboard(&self) -> Option<String> {
        self.value().map(format_value)
    }
}

/// What a call to [`ExpressionEngine::evaluate`] produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub result: LastResult,
    /// The buffer contained both a '5' and a '6'.
    pub celebrate: bool,
}

/// Whether an expression triggers the celebration banner.
///
/// Plain substring containment on the text as typed; it does not care whether
/// the digits belong to the same number or whether evaluation succeeds.
pub fn should_celebrate(expression: &str) -> bool {
    expression.contains('5') && expression.contains('6')
}

/// Owns the calculator's computational state.
pub struct ExpressionEngine {
    input: String,
    last_result: Option<LastResult>,
    angle_mode: AngleMode,
    memory: Option<f64>,
    history: HistoryLog,
    secondary: bool,
    evaluator: Box<dyn Evaluator>,
}

impl Default for ExpressionEngine {
    fn default() -> Self {
        Self::new(Box::new(FastevalEvaluator))
    }
}

impl ExpressionEngine {
    pub fn new(evaluator: Box<dyn Evaluator>) -> Self {
        Self {
            input: String::new(),
            last_result: None,
            angle_mode: AngleMode::default(),
            memory: None,
            history: HistoryLog::new(),
            secondary: false,
            evaluator,
        }
    }

    /// Start in the given angle mode.
    pub fn with_angle_mode(mut self, mode: AngleMode) -> Self {
        self.angle_mode = mode;
        self
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn last_result(&self) -> Option<LastResult> {
        self.last_result
    }

    pub fn angle_mode(&self) -> AngleMode {
        self.angle_mode
    }

    pub fn memory(&self) -> Option<f64> {
        self.memory
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn is_secondary(&self) -> bool {
        self.secondary
    }

    /// Append a token verbatim. Validity is only checked on evaluation.
    pub fn append_token(&mut self, token: &str) {
        self.input.push_str(token);
    }

    /// Surround the whole buffer, e.g. `1/(` .. `)` for the reciprocal key.
    pub fn wrap(&mut self, prefix: &str, suffix: &str) {
        self.input = format!("{}{}{}", prefix, self.input, suffix);
    }

    /// Remove the last character, if any.
    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Reset the buffer and the last result. Memory and history survive.
    pub fn clear_all(&mut self) {
        self.input.clear();
        self.last_result = None;
    }

    pub fn toggle_angle_mode(&mut self) {
        self.angle_mode = self.angle_mode.toggled();
    }

    pub fn toggle_secondary_functions(&mut self) {
        self.secondary = !self.secondary;
    }

    /// Evaluate the buffer.
    ///
    /// On success the result is recorded in the history and replaces the
    /// buffer so it can be chained. On failure the buffer is emptied and the
    /// last result becomes [`LastResult::Error`]; the fault itself is only
    /// logged.
    pub fn evaluate(&mut self) -> Evaluation {
        let expression = std::mem::take(&mut self.input);
        let celebrate = should_celebrate(&expression);
        let converted = to_radians(&expression, self.angle_mode).into_owned();

        let result = match self.evaluator.evaluate(&converted) {
            Ok(value) => {
                debug!(
                    backend = self.evaluator.name(),
                    expression = %converted,
                    value,
                    "evaluated expression"
                );
                let entry = HistoryEntry::new(expression, value);
                self.input = entry.result.clone();
                self.history.push(entry);
                LastResult::Value(value)
            }
            Err(fault) => {
                debug!(
                    backend = self.evaluator.name(),
                    expression = %converted,
                    %fault,
                    "evaluation failed"
                );
                LastResult::Error
            }
        };

        self.last_result = Some(result);
        Evaluation { result, celebrate }
    }

    /// Add the buffer's value to memory.
    pub fn memory_add(&mut self) {
        let value = self.buffer_value();
        self.memory = Some(self.memory.map_or(value, |m| m + value));
    }

    /// Subtract the buffer's value from memory.
    pub fn memory_subtract(&mut self) {
        let value = self.buffer_value();
        self.memory = Some(self.memory.map_or(-value, |m| m - value));
    }

    pub fn memory_clear(&mut self) {
        self.memory = None;
    }

    /// Replace the buffer with the memory value, or empty it.
    pub fn memory_recall(&mut self) {
        self.input = self.memory.map(format_value).unwrap_or_default();
    }

    /// The buffer as a number; NaN when it is not one.
    fn buffer_value(&self) -> f64 {
        match self.input.trim().parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                warn!(input = %self.input, "buffer is not a number, memory becomes NaN");
                f64::NAN
            }
        }
    }
}
