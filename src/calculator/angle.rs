//! Degree to radian rewriting for trigonometric calls.
//!
//! The evaluators only understand radians. In degree mode, calls such as
//! `sin(90)` are rewritten textually to `sin(1.5707963267948966)` before the
//! expression is handed over. Only plain numeric literals are converted;
//! arguments that are themselves expressions (`sin(45+45)`) pass through
//! untouched.

use std::borrow::Cow;
use std::f64::consts::PI;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// How trigonometric arguments are interpreted at evaluation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleMode {
    #[default]
    Radians,
    Degrees,
}

impl AngleMode {
    /// The other mode.
    pub fn toggled(self) -> Self {
        match self {
            Self::Radians => Self::Degrees,
            Self::Degrees => Self::Radians,
        }
    }

    /// Short label shown on the keypad ("Rad" / "Deg").
    pub fn label(self) -> &'static str {
        match self {
            Self::Radians => "Rad",
            Self::Degrees => "Deg",
        }
    }
}

impl fmt::Display for AngleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Radians => "radians",
            Self::Degrees => "degrees",
        })
    }
}

lazy_static! {
    /// `fn(literal)` for the six trig functions.
    static ref TRIG_LITERAL_CALL: Regex = Regex::new(
        r"(sinh|cosh|tanh|sin|cos|tan)\(\s*([+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)\s*\)"
    ).unwrap();
}

/// A match preceded by a letter or underscore is the tail of a longer name
/// (`asin(`, `acosh(`). Digits and operators may precede a call, so `2sin(30)`
/// is converted.
fn is_name_tail(expression: &str, start: usize) -> bool {
    expression[..start]
        .chars()
        .next_back()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
}

/// Rewrite degree literals in trig calls to radians.
///
/// Returns the input unchanged (borrowed) in radian mode or when nothing
/// matches.
pub fn to_radians(expression: &str, mode: AngleMode) -> Cow<'_, str> {
    if mode == AngleMode::Radians {
        return Cow::Borrowed(expression);
    }

    let mut converted = String::new();
    let mut copied = 0;
    for caps in TRIG_LITERAL_CALL.captures_iter(expression) {
        let Some(call) = caps.get(0) else { continue };
        if is_name_tail(expression, call.start()) {
            continue;
        }
        // The pattern only admits valid literals; keep the text if not.
        let Ok(degrees) = caps[2].parse::<f64>() else {
            continue;
        };
        converted.push_str(&expression[copied..call.start()]);
        converted.push_str(&format!("{}({})", &caps[1], degrees * (PI / 180.0)));
        copied = call.end();
    }

    if copied == 0 {
        return Cow::Borrowed(expression);
    }
    converted.push_str(&expression[copied..]);
    Cow::Owned(converted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radians_passthrough() {
        let input = "sin(90)+cos(0)";
        assert!(matches!(
            to_radians(input, AngleMode::Radians),
            Cow::Borrowed("sin(90)+cos(0)")
        ));
    }

    #[test]
    fn test_degree_literal_converted() {
        let converted = to_radians("sin(90)", AngleMode::Degrees);
        assert_eq!(converted, format!("sin({})", std::f64::consts::FRAC_PI_2));
    }

    #[test]
    fn test_all_trig_functions_converted() {
        for func in ["sin", "cos", "tan", "sinh", "cosh", "tanh"] {
            let input = format!("{func}(180)");
            let converted = to_radians(&input, AngleMode::Degrees);
            assert_eq!(converted, format!("{func}({})", PI));
        }
    }

    #[test]
    fn test_every_occurrence_converted() {
        let converted = to_radians("sin(30)*2+cos(60)", AngleMode::Degrees);
        let rad30 = 30.0 * (PI / 180.0);
        let rad60 = 60.0 * (PI / 180.0);
        assert_eq!(converted, format!("sin({rad30})*2+cos({rad60})"));
    }

    #[test]
    fn test_implicit_multiplication_converted() {
        let rad30 = 30.0 * (PI / 180.0);
        assert_eq!(
            to_radians("2sin(30)", AngleMode::Degrees),
            format!("2sin({rad30})")
        );
        assert_eq!(
            to_radians("sin(30)sin(30)", AngleMode::Degrees),
            format!("sin({rad30})sin({rad30})")
        );
        assert_eq!(
            to_radians("(1)cos(60)", AngleMode::Degrees),
            format!("(1)cos({})", 60.0 * (PI / 180.0))
        );
    }

    #[test]
    fn test_signed_and_decimal_literals() {
        let converted = to_radians("tan(-45.5)", AngleMode::Degrees);
        assert_eq!(converted, format!("tan({})", -45.5 * (PI / 180.0)));

        let converted = to_radians("cos( .5 )", AngleMode::Degrees);
        assert_eq!(converted, format!("cos({})", 0.5 * (PI / 180.0)));
    }

    #[test]
    fn test_nested_arguments_untouched() {
        assert_eq!(to_radians("sin(45+45)", AngleMode::Degrees), "sin(45+45)");
        assert_eq!(to_radians("cos(pi)", AngleMode::Degrees), "cos(pi)");
        assert_eq!(
            to_radians("sin(sin(30))", AngleMode::Degrees),
            format!("sin(sin({}))", 30.0 * (PI / 180.0))
        );
    }

    #[test]
    fn test_other_functions_untouched() {
        assert_eq!(to_radians("asin(1)", AngleMode::Degrees), "asin(1)");
        assert_eq!(to_radians("acosh(1)", AngleMode::Degrees), "acosh(1)");
        assert_eq!(to_radians("my_tan(1)", AngleMode::Degrees), "my_tan(1)");
        assert_eq!(to_radians("sqrt(90)", AngleMode::Degrees), "sqrt(90)");
        assert_eq!(to_radians("2+2", AngleMode::Degrees), "2+2");
    }

    #[test]
    fn test_mode_toggle() {
        assert_eq!(AngleMode::default(), AngleMode::Radians);
        assert_eq!(AngleMode::Radians.toggled(), AngleMode::Degrees);
        assert_eq!(AngleMode::Degrees.toggled(), AngleMode::Radians);
    }
}
