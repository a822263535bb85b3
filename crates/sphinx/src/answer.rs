//! Guess normalization and answer verification.
//!
//! Answers are stored as bcrypt hashes. Every comparison, real or decoy,
//! costs the same, so a visitor cannot tell a cooldown rejection from a
//! checked-and-wrong guess by timing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use sphinx_common::constants::DECOY_GUESS;
use sphinx_common::{SphinxError, Stage};

use crate::config::AnswerConfig;

/// Canonicalize a raw guess.
///
/// Trims, lowercases, and drops everything that is not an ASCII lowercase
/// letter or whitespace. The result is trimmed again so that stripped
/// digits or punctuation at the edges leave no stray whitespace behind.
pub fn normalize(raw: &str) -> String {
    let mut guess = raw.trim().to_lowercase();
    guess.retain(|c| c.is_ascii_lowercase() || c.is_ascii_whitespace());
    guess.trim().to_string()
}

/// Comparison counters
#[derive(Default)]
pub struct VerifierStats {
    /// Real guesses compared against the hash
    pub checked: AtomicU64,
    /// Decoy comparisons
    pub decoys: AtomicU64,
}

/// Compares guesses against one stage's stored hash
#[derive(Clone)]
pub struct AnswerVerifier {
    hash: Arc<str>,
    stats: Arc<VerifierStats>,
}

impl AnswerVerifier {
    /// Wrap a stored hash, rejecting anything bcrypt cannot parse.
    pub fn new(hash: &str) -> Result<Self, SphinxError> {
        bcrypt::verify(DECOY_GUESS, hash)
            .map_err(|e| SphinxError::Config(format!("invalid answer hash: {e}")))?;

        Ok(Self {
            hash: Arc::from(hash),
            stats: Arc::new(VerifierStats::default()),
        })
    }

    /// Blocking comparison. A hash error counts as a mismatch.
    pub fn matches(&self, guess: &str) -> bool {
        match bcrypt::verify(guess, &self.hash) {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(error = %e, "Answer hash comparison failed");
                false
            }
        }
    }

    /// Compare a guess on the blocking pool
    pub async fn verify(&self, guess: String) -> bool {
        self.stats.checked.fetch_add(1, Ordering::Relaxed);
        self.compare(guess).await
    }

    /// Burn one comparison against the real hash and ignore the result
    pub async fn decoy(&self) {
        self.stats.decoys.fetch_add(1, Ordering::Relaxed);
        let _ = self.compare(DECOY_GUESS.to_string()).await;
    }

    pub fn stats(&self) -> &VerifierStats {
        &self.stats
    }

    async fn compare(&self, guess: String) -> bool {
        let verifier = self.clone();
        match tokio::task::spawn_blocking(move || verifier.matches(&guess)).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(error = %e, "Answer comparison task failed");
                false
            }
        }
    }
}

/// One verifier per stage
#[derive(Clone)]
pub struct AnswerBook {
    first: AnswerVerifier,
    second: AnswerVerifier,
    last: AnswerVerifier,
}

impl AnswerBook {
    pub fn new(first: AnswerVerifier, second: AnswerVerifier, last: AnswerVerifier) -> Self {
        Self {
            first,
            second,
            last,
        }
    }

    /// Build from configured hashes
    pub fn from_config(answers: &AnswerConfig) -> Result<Self, SphinxError> {
        Ok(Self::new(
            AnswerVerifier::new(&answers.first)?,
            AnswerVerifier::new(&answers.second)?,
            AnswerVerifier::new(&answers.last)?,
        ))
    }

    pub fn for_stage(&self, stage: Stage) -> &AnswerVerifier {
        match stage {
            Stage::First => &self.first,
            Stage::Second => &self.second,
            Stage::Final => &self.last,
        }
    }
}
