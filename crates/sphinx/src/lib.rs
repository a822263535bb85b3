//! # Sphinx - three-riddle gate
//!
//! Visitors answer three riddles in turn. The second answer mints a one-shot
//! token for the final page; the third sends them on to the destination.
//! Wrong or scattershot guesses put the client on a shared cooldown.
//!
//! ## Architecture
//! ```text
//! Reverse proxy (X-Real-IP) → routes → StageFlow ─┬─ AnswerBook (bcrypt)
//!                                                 ├─ CooldownTracker
//!                                                 └─ TokenStore
//! ```

pub mod answer;
pub mod config;
pub mod cooldown;
pub mod flow;
pub mod pages;
pub mod routes;
pub mod state;
pub mod sweeper;
pub mod tokens;
