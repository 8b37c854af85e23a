//! Text rendering of the calculator and dispatch of key presses.

use std::fmt::Write;

use tracing::trace;

use super::celebration::Celebration;
use super::theme::{Palette, Theme};
use crate::calculator::{ExpressionEngine, LastResult};
use crate::keypad::{KeyAction, Keypad};

/// The calculator as seen by the user: engine plus display-only state.
pub struct CalculatorView {
    engine: ExpressionEngine,
    keypad: Keypad,
    theme: Theme,
    show_history: bool,
    celebration: Celebration,
}

impl CalculatorView {
    pub fn new(engine: ExpressionEngine, keypad: Keypad) -> Self {
        Self {
            engine,
            keypad,
            theme: Theme::default(),
            show_history: false,
            celebration: Celebration::new(),
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_history_visible(mut self, visible: bool) -> Self {
        self.show_history = visible;
        self
    }

    pub fn engine(&self) -> &ExpressionEngine {
        &self.engine
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    pub fn toggle_history(&mut self) {
        self.show_history = !self.show_history;
    }

    pub fn is_celebrating(&self) -> bool {
        self.celebration.is_active()
    }

    /// Handle one word of user input: a keypad label if it is one, literal
    /// expression text otherwise.
    pub fn input(&mut self, word: &str) {
        if !self.press(word) {
            self.engine.append_token(word);
        }
    }

    /// Press a keypad button. Returns `false` if no such button exists.
    pub fn press(&mut self, label: &str) -> bool {
        match self.keypad.action(label).cloned() {
            Some(action) => {
                self.apply(&action);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, action: &KeyAction) {
        trace!(?action, "key pressed");
        match action {
            KeyAction::Insert(token) => self.engine.append_token(token),
            KeyAction::Wrap { prefix, suffix } => self.engine.wrap(prefix, suffix),
            KeyAction::Evaluate => {
                if self.engine.evaluate().celebrate {
                    self.celebration.trigger();
                }
            }
            KeyAction::ClearAll => self.engine.clear_all(),
            KeyAction::Backspace => self.engine.backspace(),
            KeyAction::ToggleAngleMode => self.engine.toggle_angle_mode(),
            KeyAction::ToggleSecondary => self.engine.toggle_secondary_functions(),
            KeyAction::MemoryClear => self.engine.memory_clear(),
            KeyAction::MemoryAdd => self.engine.memory_add(),
            KeyAction::MemorySubtract => self.engine.memory_subtract(),
            KeyAction::MemoryRecall => self.engine.memory_recall(),
        }
    }

    fn palette(&self) -> Palette {
        self.theme.palette()
    }

    /// Render the display: status line, input, result, and optionally the
    /// history and the celebration banner.
    pub fn render(&self) -> String {
        let p = self.palette();
        let engine = &self.engine;
        let mut out = String::new();

        let mut status = vec![engine.angle_mode().label()];
        if engine.memory().is_some() {
            status.push("M");
        }
        if engine.is_secondary() {
            status.push("2nd");
        }
        let _ = writeln!(out, "{}", p.muted(&format!("[{}]", status.join(" "))));

        let _ = writeln!(out, "{}", p.muted(engine.input()));

        match engine.last_result() {
            Some(LastResult::Error) => {
                let _ = writeln!(out, "{}", p.error("= Error"));
            }
            Some(result) => {
                let _ = writeln!(out, "{}", p.title(&format!("= {}", result.display())));
            }
            None => {}
        }

        if self.show_history {
            let history = engine.history();
            let _ = writeln!(out, "{}", p.accent(&format!("History ({})", history.len())));
            if history.is_empty() {
                let _ = writeln!(out, "  {}", p.muted("nothing yet"));
            }
            for entry in history.entries() {
                let _ = writeln!(
                    out,
                    "  {} = {}",
                    p.muted(&entry.expression),
                    entry.display_result
                );
            }
        }

        if self.is_celebrating() {
            let _ = writeln!(out, "{}", p.accent("*** 🎉 ***"));
        }

        out
    }

    /// Render the keypad grid for the current glyph set.
    pub fn render_keys(&self) -> String {
        let p = self.palette();
        let mut out = String::new();
        for row in self.keypad.layout(self.engine.is_secondary()) {
            let cells: Vec<String> = row
                .iter()
                .map(|&label| {
                    let label = if label == "Rad" {
                        self.engine.angle_mode().label()
                    } else {
                        label
                    };
                    format!("{:^6}", label)
                })
                .collect();
            let _ = writeln!(out, "{}", p.accent(&cells.join("")));
        }
        out
    }
}
