use crate::assessment::{Assessment, Percent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single key identity: a character plus modifier flags.
///
/// Shifted keys carry the unshifted character with `shift` set, so `A` is
/// `{ char: 'a', shift: true }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyDef {
    pub char: char,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub control: bool,
    #[serde(default)]
    pub alt: bool,
}

impl KeyDef {
    pub fn new(char: char) -> Self {
        Self {
            char,
            shift: false,
            control: false,
            alt: false,
        }
    }

    pub fn with_shift(mut self, shift: bool) -> Self {
        self.shift = shift;
        self
    }

    pub fn with_control(mut self, control: bool) -> Self {
        self.control = control;
        self
    }

    pub fn with_alt(mut self, alt: bool) -> Self {
        self.alt = alt;
        self
    }

    /// Canonical key-code string, e.g. `a`, `S-a`, `C-A-x`.
    ///
    /// Every field takes part, so two keys share a code exactly when they are
    /// structurally equal.
    pub fn key_code(&self) -> String {
        let mut code = String::new();
        if self.control {
            code.push_str("C-");
        }
        if self.alt {
            code.push_str("A-");
        }
        if self.shift {
            code.push_str("S-");
        }
        code.push(self.char);
        code
    }
}

impl fmt::Display for KeyDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key_code())
    }
}

/// A key prompt with a normalized difficulty rating (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatedKeyDef {
    #[serde(flatten)]
    pub key: KeyDef,
    pub norm_difficulty: Percent,
}

impl RatedKeyDef {
    pub fn new(key: KeyDef, norm_difficulty: Percent) -> Self {
        Self {
            key,
            norm_difficulty,
        }
    }
}

/// A keystroke as received. `prompt` and `assessment` stay empty until the
/// capture is matched and moved into history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyCapture {
    #[serde(flatten)]
    pub key: KeyDef,
    pub keyed_at: DateTime<Utc>,
    pub prompt: Option<RatedKeyDef>,
    pub assessment: Option<Assessment>,
}

impl KeyCapture {
    pub fn new(key: KeyDef, keyed_at: DateTime<Utc>) -> Self {
        Self {
            key,
            keyed_at,
            prompt: None,
            assessment: None,
        }
    }

    /// Attach the prompt this capture consumed together with its score.
    pub fn matched(self, prompt: RatedKeyDef, assessment: Assessment) -> Self {
        Self {
            prompt: Some(prompt),
            assessment: Some(assessment),
            ..self
        }
    }

    pub fn is_matched(&self) -> bool {
        self.prompt.is_some()
    }

    /// True when the capture was matched against a prompt with the same key.
    pub fn is_correct(&self) -> bool {
        self.prompt
            .as_ref()
            .is_some_and(|prompt| is_key_def_match(self, prompt))
    }
}

/// Anything that carries a key identity.
pub trait AsKeyDef {
    fn key_def(&self) -> &KeyDef;
}

impl AsKeyDef for KeyDef {
    fn key_def(&self) -> &KeyDef {
        self
    }
}

impl AsKeyDef for RatedKeyDef {
    fn key_def(&self) -> &KeyDef {
        &self.key
    }
}

impl AsKeyDef for KeyCapture {
    fn key_def(&self) -> &KeyDef {
        &self.key
    }
}

/// The one match rule: character and all three modifiers must be equal.
/// Used by both accuracy scoring and prompt consumption.
pub fn is_key_def_match<L, R>(l: &L, r: &R) -> bool
where
    L: AsKeyDef + ?Sized,
    R: AsKeyDef + ?Sized,
{
    l.key_def() == r.key_def()
}
