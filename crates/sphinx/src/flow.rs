//! Stage flow controller.
//!
//! There is no session object. A visitor's position is reconstructed on
//! every request from the URL they hit, the cooldown map, and the token
//! store:
//!
//! ```text
//! First ──correct──▶ Second ──correct──▶ FinalPending(token) ──submit──▶ consumed
//!   ▲                  │                        │                           │
//!   └──wrong/empty/cooldown◀─────────invalid token◀────────wrong────────────┘
//!                                                          correct ──▶ destination
//! ```
//!
//! Every rejection looks the same to the visitor. The `Rejection` reason is
//! only used for logs.

use std::sync::Arc;

use sphinx_common::{ClientId, GuessPolicy, Stage, TokenId};

use crate::answer::{AnswerBook, normalize};
use crate::cooldown::CooldownTracker;
use crate::tokens::TokenStore;

/// Result of a guess submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// First riddle solved, go to the second
    Advance,
    /// Second riddle solved, final page unlocked with this token
    FinalIssued(TokenId),
    /// Final riddle solved, leave for the destination
    Escape,
    /// Back to the entry point
    Rejected(Rejection),
}

/// Why a request was sent back to the entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Nothing left after normalization
    Empty,
    /// Client is locked out
    CoolingDown,
    /// Several words on a single-word stage
    Scattershot,
    /// Checked and wrong
    Incorrect,
    /// Final token malformed, unknown, expired, foreign, or used
    InvalidToken,
}

impl Rejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::CoolingDown => "cooling_down",
            Self::Scattershot => "scattershot",
            Self::Incorrect => "incorrect",
            Self::InvalidToken => "invalid_token",
        }
    }
}

/// Orchestrates the three riddles
pub struct StageFlow {
    answers: AnswerBook,
    cooldown: Arc<CooldownTracker>,
    tokens: Arc<TokenStore>,
}

impl StageFlow {
    pub fn new(answers: AnswerBook, cooldown: Arc<CooldownTracker>, tokens: Arc<TokenStore>) -> Self {
        Self {
            answers,
            cooldown,
            tokens,
        }
    }

    /// Stage one: a correct answer opens the second page
    pub async fn submit_first(&self, client: &ClientId, raw: &str) -> Outcome {
        if let Err(rejection) = self.gate(Stage::First, client).await {
            return Outcome::Rejected(rejection);
        }
        match self.judge(Stage::First, client, raw).await {
            Ok(()) => Outcome::Advance,
            Err(rejection) => Outcome::Rejected(rejection),
        }
    }

    /// Stage two: a correct answer mints a final token for this client
    pub async fn submit_second(&self, client: &ClientId, raw: &str) -> Outcome {
        if let Err(rejection) = self.gate(Stage::Second, client).await {
            return Outcome::Rejected(rejection);
        }
        match self.judge(Stage::Second, client, raw).await {
            Ok(()) => Outcome::FinalIssued(self.tokens.issue(client)),
            Err(rejection) => Outcome::Rejected(rejection),
        }
    }

    /// Final page view. Checks the token without consuming it.
    pub fn view_final(&self, client: &ClientId, segment: &str) -> Result<TokenId, Rejection> {
        let token = TokenId::parse(segment).map_err(|_| Rejection::InvalidToken)?;
        if !self.tokens.is_valid(&token, client) {
            tracing::info!(client = %client, token = %token, "Final page requested without a valid token");
            return Err(Rejection::InvalidToken);
        }
        Ok(token)
    }

    /// Final submission. The token is burned before the guess is looked at,
    /// so each token buys exactly one attempt.
    pub async fn submit_final(&self, client: &ClientId, segment: &str, raw: &str) -> Outcome {
        if let Err(rejection) = self.gate(Stage::Final, client).await {
            return Outcome::Rejected(rejection);
        }

        let Ok(token) = TokenId::parse(segment) else {
            self.answers.for_stage(Stage::Final).decoy().await;
            return Outcome::Rejected(Rejection::InvalidToken);
        };
        if !self.tokens.consume(&token, client) {
            tracing::info!(client = %client, token = %token, "Final answer submitted without a valid token");
            self.answers.for_stage(Stage::Final).decoy().await;
            return Outcome::Rejected(Rejection::InvalidToken);
        }

        match self.judge(Stage::Final, client, raw).await {
            Ok(()) => Outcome::Escape,
            Err(rejection) => Outcome::Rejected(rejection),
        }
    }

    /// Cooldown check run at the top of every submission.
    async fn gate(&self, stage: Stage, client: &ClientId) -> Result<(), Rejection> {
        if self.cooldown.is_cooling_down(client) {
            tracing::info!(stage = %stage, client = %client, "Guess blocked by cooldown");
            self.answers.for_stage(stage).decoy().await;
            return Err(Rejection::CoolingDown);
        }
        Ok(())
    }

    /// Normalize, shape, and verify a guess. Failures past the empty check
    /// put the client on cooldown.
    async fn judge(&self, stage: Stage, client: &ClientId, raw: &str) -> Result<(), Rejection> {
        let verifier = self.answers.for_stage(stage);

        let guess = normalize(raw);
        if guess.is_empty() {
            return Err(Rejection::Empty);
        }
        tracing::info!(stage = %stage, client = %client, guess = ?guess, "Guess received");

        let guess = match stage.policy() {
            GuessPolicy::SingleWord => {
                if guess.split_whitespace().nth(1).is_some() {
                    tracing::warn!(stage = %stage, client = %client, "Multi-word guess, cooling down client");
                    self.cooldown.trigger(client);
                    verifier.decoy().await;
                    return Err(Rejection::Scattershot);
                }
                guess
            }
            GuessPolicy::Phrase => guess.split_whitespace().collect(),
        };

        if !verifier.verify(guess).await {
            tracing::debug!(stage = %stage, client = %client, "Incorrect guess");
            self.cooldown.trigger(client);
            return Err(Rejection::Incorrect);
        }

        tracing::info!(stage = %stage, client = %client, "Riddle solved");
        Ok(())
    }

    pub fn cooldown(&self) -> &CooldownTracker {
        &self.cooldown
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn answers(&self) -> &AnswerBook {
        &self.answers
    }
}
