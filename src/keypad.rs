//! Keypad: the mapping from button labels to what they do.
//!
//! The table is built once at startup, validated, and never changes
//! afterwards. User-defined keys from the config file can add insert-only
//! buttons or change the token of an existing insert button; control keys
//! (`=`, `AC`, `m+`, ...) cannot be redefined.

use std::collections::{BTreeMap, HashMap};

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

/// What pressing a key does to the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Append a literal token to the buffer.
    Insert(String),
    /// Surround the whole buffer.
    Wrap { prefix: String, suffix: String },
    Evaluate,
    ClearAll,
    Backspace,
    ToggleAngleMode,
    ToggleSecondary,
    MemoryClear,
    MemoryAdd,
    MemorySubtract,
    MemoryRecall,
}

impl KeyAction {
    fn insert(token: &str) -> Self {
        Self::Insert(token.to_string())
    }

    fn wrap(prefix: &str, suffix: &str) -> Self {
        Self::Wrap {
            prefix: prefix.to_string(),
            suffix: suffix.to_string(),
        }
    }

    /// Check if this key only inserts text.
    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Insert(_))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeypadError {
    #[error("key label must not be empty")]
    EmptyLabel,
    #[error("key label {0:?} must not contain whitespace")]
    WhitespaceInLabel(String),
    #[error("key {label:?} has an invalid token {token:?}")]
    InvalidToken { label: String, token: String },
    #[error("key {0:?} is a control key and cannot be redefined")]
    ReservedLabel(String),
}

lazy_static! {
    /// Characters a token may consist of.
    static ref TOKEN_CHARS: Regex = Regex::new(r"^[0-9A-Za-z_.,+\-*/%^()!]+$").unwrap();
}

/// Button rows as shown on screen.
const ROWS: &[&[&str]] = &[
    &["(", ")", "mc", "m+", "m-", "mr", "C", "+/-", "%", "÷"],
    &["2nd", "x²", "x³", "xʸ", "eˣ", "10ˣ", "1", "2", "3", "×"],
    &["¹/x", "²√x", "³√x", "ʸ√x", "ln", "log₁₀", "4", "5", "6", "-"],
    &["x!", "sin", "cos", "tan", "e", "EE", "7", "8", "9", "+"],
    &["Rad", "sinh", "cosh", "tanh", "π", "Rand", "0", ".", "AC", "="],
];

/// Glyphs swapped in while the secondary function set is active.
const SECONDARY: &[(&str, &str)] = &[
    ("sin", "sin⁻¹"),
    ("cos", "cos⁻¹"),
    ("tan", "tan⁻¹"),
    ("sinh", "sinh⁻¹"),
    ("cosh", "cosh⁻¹"),
    ("tanh", "tanh⁻¹"),
];

fn standard_keys() -> Vec<(&'static str, KeyAction)> {
    use KeyAction as K;

    let mut keys = vec![
        ("=", K::Evaluate),
        ("AC", K::ClearAll),
        ("C", K::Backspace),
        ("Rad", K::ToggleAngleMode),
        ("2nd", K::ToggleSecondary),
        ("mc", K::MemoryClear),
        ("m+", K::MemoryAdd),
        ("m-", K::MemorySubtract),
        ("mr", K::MemoryRecall),
        ("¹/x", K::wrap("1/(", ")")),
        ("x!", K::insert("!")),
        ("(", K::insert("(")),
        (")", K::insert(")")),
        ("+/-", K::insert("-")),
        ("±", K::insert("-")),
        ("%", K::insert("%")),
        ("÷", K::insert("/")),
        ("×", K::insert("*")),
        ("−", K::insert("-")),
        ("-", K::insert("-")),
        ("+", K::insert("+")),
        (".", K::insert(".")),
        ("x²", K::insert("^2")),
        ("x³", K::insert("^3")),
        ("xʸ", K::insert("^")),
        ("eˣ", K::insert("exp(")),
        ("10ˣ", K::insert("10^(")),
        ("²√x", K::insert("sqrt(")),
        ("√", K::insert("sqrt(")),
        ("³√x", K::insert("cbrt(")),
        ("ʸ√x", K::insert("root(")),
        ("ln", K::insert("ln(")),
        ("log", K::insert("log10(")),
        ("log₁₀", K::insert("log10(")),
        ("sin", K::insert("sin(")),
        ("cos", K::insert("cos(")),
        ("tan", K::insert("tan(")),
        ("sinh", K::insert("sinh(")),
        ("cosh", K::insert("cosh(")),
        ("tanh", K::insert("tanh(")),
        ("sin⁻¹", K::insert("asin(")),
        ("cos⁻¹", K::insert("acos(")),
        ("tan⁻¹", K::insert("atan(")),
        ("sinh⁻¹", K::insert("asinh(")),
        ("cosh⁻¹", K::insert("acosh(")),
        ("tanh⁻¹", K::insert("atanh(")),
        ("π", K::insert("pi")),
        ("e", K::insert("e")),
        ("EE", K::insert("e")),
        ("Rand", K::insert("random()")),
    ];

    const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];
    keys.extend(DIGITS.iter().map(|d| (*d, K::insert(d))));
    keys
}

/// Immutable label-to-action table.
#[derive(Clone, Debug)]
pub struct Keypad {
    keys: HashMap<String, KeyAction>,
    custom: Vec<String>,
}

impl Keypad {
    /// The built-in keypad plus user-defined insert keys (label -> token).
    pub fn new(extra: &BTreeMap<String, String>) -> Result<Self, KeypadError> {
        let mut keys = HashMap::new();
        for (label, action) in standard_keys() {
            validate(label, &action)?;
            keys.insert(label.to_string(), action);
        }

        let mut custom = Vec::new();
        for (label, token) in extra {
            let action = KeyAction::Insert(token.clone());
            validate(label, &action)?;

            match keys.get(label.as_str()) {
                Some(existing) if !existing.is_insert() => {
                    return Err(KeypadError::ReservedLabel(label.clone()));
                }
                Some(_) => debug!(label = %label, token = %token, "overriding key"),
                None => custom.push(label.clone()),
            }
            keys.insert(label.clone(), action);
        }

        Ok(Self { keys, custom })
    }

    /// Look up the action bound to `label`.
    pub fn action(&self, label: &str) -> Option<&KeyAction> {
        self.keys.get(label)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Button rows for display, with the secondary glyphs swapped in when
    /// `secondary` is set. User-defined keys form a trailing row.
    pub fn layout(&self, secondary: bool) -> Vec<Vec<&str>> {
        let mut rows: Vec<Vec<&str>> = ROWS
            .iter()
            .map(|row| {
                row.iter()
                    .map(|&label| if secondary { secondary_glyph(label) } else { label })
                    .collect()
            })
            .collect();

        if !self.custom.is_empty() {
            rows.push(self.custom.iter().map(String::as_str).collect());
        }
        rows
    }
}

fn secondary_glyph(label: &'static str) -> &'static str {
    SECONDARY
        .iter()
        .find(|(primary, _)| *primary == label)
        .map_or(label, |&(_, glyph)| glyph)
}

fn validate(label: &str, action: &KeyAction) -> Result<(), KeypadError> {
    if label.is_empty() {
        return Err(KeypadError::EmptyLabel);
    }
    if label.chars().any(char::is_whitespace) {
        return Err(KeypadError::WhitespaceInLabel(label.to_string()));
    }

    let invalid = |token: &str| KeypadError::InvalidToken {
        label: label.to_string(),
        token: token.to_string(),
    };
    match action {
        KeyAction::Insert(token) if !TOKEN_CHARS.is_match(token) => Err(invalid(token)),
        KeyAction::Wrap { prefix, suffix }
            if !TOKEN_CHARS.is_match(prefix) || !TOKEN_CHARS.is_match(suffix) =>
        {
            Err(invalid(&format!("{prefix}…{suffix}")))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extra(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_standard_keypad_is_valid() {
        let keypad = Keypad::new(&BTreeMap::new()).unwrap();
        assert!(keypad.len() > ROWS.iter().map(|row| row.len()).sum::<usize>());
        assert_eq!(keypad.action("×"), Some(&KeyAction::Insert("*".into())));
        assert_eq!(keypad.action("sin"), Some(&KeyAction::Insert("sin(".into())));
        assert_eq!(keypad.action("="), Some(&KeyAction::Evaluate));
        assert_eq!(keypad.action("7"), Some(&KeyAction::Insert("7".into())));
        assert_eq!(keypad.action("x!"), Some(&KeyAction::Insert("!".into())));
        assert_eq!(keypad.action("nope"), None);
    }

    #[test]
    fn test_every_layout_label_is_bound() {
        let keypad = Keypad::new(&BTreeMap::new()).unwrap();
        for secondary in [false, true] {
            for row in keypad.layout(secondary) {
                for label in row {
                    assert!(keypad.action(label).is_some(), "unbound label {label}");
                }
            }
        }
    }

    #[test]
    fn test_secondary_layout() {
        let keypad = Keypad::new(&BTreeMap::new()).unwrap();
        let flat: Vec<&str> = keypad.layout(true).into_iter().flatten().collect();
        assert!(flat.contains(&"sin⁻¹"));
        assert!(!flat.contains(&"sin"));
        assert_eq!(
            keypad.action("sin⁻¹"),
            Some(&KeyAction::Insert("asin(".into()))
        );
    }

    #[test]
    fn test_custom_keys() {
        let keypad = Keypad::new(&extra(&[("tau", "(2*pi)"), ("ln", "log(")])).unwrap();
        assert_eq!(
            keypad.action("tau"),
            Some(&KeyAction::Insert("(2*pi)".into()))
        );
        assert_eq!(keypad.action("ln"), Some(&KeyAction::Insert("log(".into())));

        let layout = keypad.layout(false);
        assert_eq!(layout.last().unwrap(), &vec!["tau"]);
    }

    #[test]
    fn test_invalid_custom_keys() {
        assert_eq!(
            Keypad::new(&extra(&[("", "1")])).unwrap_err(),
            KeypadError::EmptyLabel
        );
        assert_eq!(
            Keypad::new(&extra(&[("two words", "1")])).unwrap_err(),
            KeypadError::WhitespaceInLabel("two words".into())
        );
        assert!(matches!(
            Keypad::new(&extra(&[("x", "1; rm")])).unwrap_err(),
            KeypadError::InvalidToken { .. }
        ));
        assert!(matches!(
            Keypad::new(&extra(&[("x", "")])).unwrap_err(),
            KeypadError::InvalidToken { .. }
        ));
        assert_eq!(
            Keypad::new(&extra(&[("=", "1")])).unwrap_err(),
            KeypadError::ReservedLabel("=".into())
        );
    }
}
