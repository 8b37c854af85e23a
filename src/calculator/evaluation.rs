//! Expression evaluation backends.
//!
//! Evaluation itself is delegated to third-party crates behind the
//! [`Evaluator`] trait. This module also owns the textual forms of a result:
//! the raw form that goes back into the input buffer and history, and the
//! grouped form used for display.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::rewrite::{expand_factorials, to_fend_syntax};

/// Why an expression could not be turned into a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationFault {
    /// The backend rejected the expression (syntax, unknown name, ...).
    #[error("{0}")]
    Syntax(String),
    /// Evaluation produced NaN or an infinity.
    #[error("result is not finite: {0}")]
    NotFinite(f64),
    /// The backend produced something other than a plain number.
    #[error("result is not a number: {0}")]
    NotANumber(String),
    /// The backend was interrupted after running for too long.
    #[error("evaluation took longer than {0:?}")]
    TimedOut(Duration),
}

/// An external expression evaluator.
pub trait Evaluator {
    /// Backend name for logs.
    fn name(&self) -> &'static str;

    /// Evaluate `expression` to a finite number.
    fn evaluate(&mut self, expression: &str) -> Result<f64, EvaluationFault>;
}

/// Available evaluator backends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Fasteval,
    Fend,
}

impl Backend {
    /// Instantiate the evaluator for this backend.
    pub fn create(self) -> Box<dyn Evaluator> {
        match self {
            Self::Fasteval => Box::new(FastevalEvaluator),
            Self::Fend => Box::new(FendEvaluator::new()),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Fasteval => "fasteval",
            Self::Fend => "fend",
        })
    }
}

/// Reject NaN and infinities.
fn finite(value: f64) -> Result<f64, EvaluationFault> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvaluationFault::NotFinite(value))
    }
}

/// Evaluator backed by fasteval.
///
/// fasteval's builtins (`sin`, `cos`, `tan`, their inverse and hyperbolic
/// forms, `log` in base 10, `abs`, `round`, ...) are extended through a
/// callback namespace with the functions the keypad emits. Postfix `!` is
/// rewritten to `fact(..)` first.
#[derive(Clone, Copy, Debug, Default)]
pub struct FastevalEvaluator;

impl Evaluator for FastevalEvaluator {
    fn name(&self) -> &'static str {
        "fasteval"
    }

    fn evaluate(&mut self, expression: &str) -> Result<f64, EvaluationFault> {
        let mut namespace = |name: &str, args: Vec<f64>| -> Option<f64> { extension(name, &args) };

        let expression = expand_factorials(expression.trim());
        let value = fasteval::ez_eval(&expression, &mut namespace)
            .map_err(|e| EvaluationFault::Syntax(format!("{:?}", e)))?;
        finite(value)
    }
}

/// Names resolved by the fasteval callback namespace.
fn extension(name: &str, args: &[f64]) -> Option<f64> {
    match (name, args) {
        ("pi", []) => Some(std::f64::consts::PI),
        ("e", []) => Some(std::f64::consts::E),
        ("random", []) => Some(rand::random::<f64>()),
        ("sqrt", [x]) => Some(x.sqrt()),
        ("cbrt", [x]) => Some(x.cbrt()),
        ("exp", [x]) => Some(x.exp()),
        ("ln", [x]) => Some(x.ln()),
        ("log10", [x]) => Some(x.log10()),
        ("root", [x, n]) => Some(nth_root(*x, *n)),
        ("fact", [n]) => factorial(*n),
        _ => None,
    }
}

/// `n`-th root, keeping odd roots of negative numbers real.
fn nth_root(x: f64, n: f64) -> f64 {
    if x < 0.0 && n.fract() == 0.0 && (n as i64) % 2 != 0 {
        -(-x).powf(1.0 / n)
    } else {
        x.powf(1.0 / n)
    }
}

/// Factorial of a non-negative integer. Larger than 170! overflows f64.
fn factorial(n: f64) -> Option<f64> {
    if n < 0.0 || n.fract() != 0.0 || n > 170.0 {
        return None;
    }
    Some((1..=n as u64).fold(1.0, |acc, k| acc * k as f64))
}

/// Evaluator backed by fend.
///
/// fend computes exactly where it can and reports approximations as
/// `approx. 0.8939966636`; the numeric part of the main result is parsed back
/// into an `f64`. Exact arithmetic can take arbitrarily long (`9^9^9`), so
/// every evaluation runs against a deadline.
pub struct FendEvaluator {
    context: fend_core::Context,
    timeout: Duration,
}

const DEFAULT_FEND_TIMEOUT: Duration = Duration::from_secs(2);

impl FendEvaluator {
    pub fn new() -> Self {
        Self {
            context: fend_core::Context::new(),
            timeout: DEFAULT_FEND_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Interrupts fend once the instant has passed.
struct Deadline(Instant);

impl Deadline {
    fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    fn expired(&self) -> bool {
        Instant::now() >= self.0
    }
}

impl fend_core::Interrupt for Deadline {
    fn should_interrupt(&self) -> bool {
        self.expired()
    }
}

impl Default for FendEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator for FendEvaluator {
    fn name(&self) -> &'static str {
        "fend"
    }

    fn evaluate(&mut self, expression: &str) -> Result<f64, EvaluationFault> {
        let expression = to_fend_syntax(expression.trim());
        let deadline = Deadline::after(self.timeout);
        let result = fend_core::evaluate_with_interrupt(&expression, &mut self.context, &deadline)
            .map_err(|message| {
                if deadline.expired() {
                    EvaluationFault::TimedOut(self.timeout)
                } else {
                    EvaluationFault::Syntax(message)
                }
            })?;
        let text = result.get_main_result();
        let number = text.strip_prefix("approx. ").unwrap_or(text).trim();

        let value = number
            .parse::<f64>()
            .map_err(|_| EvaluationFault::NotANumber(text.to_string()))?;
        finite(value)
    }
}

/// Raw textual form of a value, as written back into the input buffer.
///
/// Uses the shortest representation that parses back to the same `f64`, so
/// evaluating the buffer again yields the identical value.
pub fn format_value(value: f64) -> String {
    value.to_string()
}

/// Format a number for display with thousand separators.
pub fn format_display(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format_with_separators(value as i64);
    }

    let formatted = format!("{:.10}", value.abs());
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    let (int_part, dec_part) = trimmed.split_at(trimmed.find('.').unwrap_or(trimmed.len()));

    let grouped = group_digits(int_part);
    if value < 0.0 && trimmed != "0" {
        format!("-{}{}", grouped, dec_part)
    } else {
        format!("{}{}", grouped, dec_part)
    }
}

/// Format an integer with thousand separators.
fn format_with_separators(value: i64) -> String {
    let grouped = group_digits(&value.unsigned_abs().to_string());
    if value < 0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Insert a comma every three digits, counting from the right.
fn group_digits(digits: &str) -> String {
    let mut result = String::new();
    for (i, c) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expression: &str) -> Result<f64, EvaluationFault> {
        FastevalEvaluator.evaluate(expression)
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_basic_evaluation() {
        assert_eq!(eval("2 + 2"), Ok(4.0));
        assert_eq!(eval("2+3*4"), Ok(14.0));
        assert_eq!(eval("(2+3)*4"), Ok(20.0));
        assert_eq!(eval("2^10"), Ok(1024.0));
    }

    #[test]
    fn test_decimal_result() {
        let value = eval("1 / 3").unwrap();
        assert!(format_display(value).starts_with("0.333"));
    }

    #[test]
    fn test_division_by_zero() {
        assert!(matches!(eval("1 / 0"), Err(EvaluationFault::NotFinite(_))));
    }

    #[test]
    fn test_invalid_expression() {
        assert!(matches!(eval("2 +* 2"), Err(EvaluationFault::Syntax(_))));
        assert!(matches!(eval("2+"), Err(EvaluationFault::Syntax(_))));
        assert!(eval("").is_err());
        assert!(eval("nosuchfn(3)").is_err());
    }

    #[test]
    fn test_trig_functions() {
        assert_eq!(eval("sin(0)"), Ok(0.0));
        assert_close(eval("sin(90)").unwrap(), 90f64.sin());
        assert_close(eval("cosh(0)").unwrap(), 1.0);
    }

    #[test]
    fn test_extension_functions() {
        assert_eq!(eval("sqrt(16)"), Ok(4.0));
        assert_close(eval("cbrt(27)").unwrap(), 3.0);
        assert_close(eval("ln(e)").unwrap(), 1.0);
        assert_close(eval("log10(1000)").unwrap(), 3.0);
        assert_close(eval("exp(0)").unwrap(), 1.0);
        assert_close(eval("root(-8, 3)").unwrap(), -2.0);
        assert_eq!(eval("fact(5)"), Ok(120.0));
        assert_close(eval("pi").unwrap(), std::f64::consts::PI);
    }

    #[test]
    fn test_factorial_domain() {
        assert_eq!(factorial(0.0), Some(1.0));
        assert_eq!(factorial(-1.0), None);
        assert_eq!(factorial(2.5), None);
        assert_eq!(factorial(171.0), None);
        assert!(eval("fact(-1)").is_err());
    }

    #[test]
    fn test_postfix_factorial() {
        assert_eq!(eval("2+3!"), Ok(8.0));
        assert_eq!(eval("(2+3)!"), Ok(120.0));
        assert_eq!(eval("5!"), Ok(120.0));
        assert!(eval("2.5!").is_err());
    }

    #[test]
    fn test_fend_backend() {
        let mut fend = FendEvaluator::new();
        assert_eq!(fend.evaluate("2+2"), Ok(4.0));
        assert_eq!(fend.evaluate("5!"), Ok(120.0));
        assert_eq!(fend.evaluate("2+3!"), Ok(8.0));
        assert!(fend.evaluate("2+").is_err());
    }

    #[test]
    fn test_keypad_functions_on_both_backends() {
        for backend in [Backend::Fasteval, Backend::Fend] {
            let mut evaluator = backend.create();
            assert_eq!(evaluator.evaluate("fact(5)"), Ok(120.0), "{backend}");
            assert_close(evaluator.evaluate("root(8, 3)").unwrap(), 2.0);
            assert_close(evaluator.evaluate("root(16,4)+1").unwrap(), 3.0);
            let random = evaluator.evaluate("random()").unwrap();
            assert!((0.0..1.0).contains(&random), "{backend}: {random}");
        }
    }

    #[test]
    fn test_fend_deadline() {
        assert!(Deadline::after(Duration::ZERO).expired());
        assert!(!Deadline::after(Duration::from_secs(60)).expired());

        let mut fend = FendEvaluator::new().with_timeout(Duration::from_millis(50));
        assert!(fend.evaluate("9^9^9").is_err());
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(Backend::Fasteval.create().name(), "fasteval");
        assert_eq!(Backend::Fend.create().name(), "fend");
        assert_eq!(Backend::Fend.to_string(), "fend");
    }

    #[test]
    fn test_format_value_round_trips() {
        assert_eq!(format_value(4.0), "4");
        assert_eq!(format_value(-0.25), "-0.25");
        let value = 90f64.sin();
        assert_eq!(format_value(value).parse::<f64>(), Ok(value));
    }

    #[test]
    fn test_thousand_separators() {
        assert_eq!(format_display(1_000_000.0), "1,000,000");
        assert_eq!(format_display(-1234.0), "-1,234");
        assert_eq!(format_display(1234.5), "1,234.5");
        assert_eq!(format_display(-0.5), "-0.5");
        assert_eq!(format_display(999.0), "999");
    }
}
