//! Core types shared across Sphinx components.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::SphinxError;

/// Visitor identity as reported by the reverse proxy.
///
/// Trusted verbatim. Visitors sharing an address share cooldowns and
/// tokens; a missing header maps to the empty identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final-stage token: a random 128-bit identifier embedded in the URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenId(Uuid);

impl TokenId {
    /// Generate a fresh random token
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a token from a URL segment
    pub fn parse(segment: &str) -> Result<Self, SphinxError> {
        Uuid::parse_str(segment)
            .map(Self)
            .map_err(|e| SphinxError::InvalidToken(e.to_string()))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

/// The three riddles, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    First,
    Second,
    Final,
}

impl Stage {
    /// How a normalized guess is shaped before verification
    pub fn policy(&self) -> GuessPolicy {
        match self {
            Self::First | Self::Second => GuessPolicy::SingleWord,
            Self::Final => GuessPolicy::Phrase,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::First => "first",
            Self::Second => "second",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guess shape accepted by a stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessPolicy {
    /// One word only. Several words look like a list of guesses and are
    /// punished without checking the answer.
    SingleWord,
    /// Whitespace is dropped and the remaining letters are checked.
    Phrase,
}
