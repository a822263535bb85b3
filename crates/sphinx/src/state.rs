//! Application state and shared resources.

use anyhow::{Context, Result};
use std::sync::Arc;

use crate::answer::AnswerBook;
use crate::config::AppConfig;
use crate::cooldown::CooldownTracker;
use crate::flow::StageFlow;
use crate::pages::Pages;
use crate::tokens::TokenStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Stage flow controller
    pub flow: Arc<StageFlow>,

    /// Page renderer
    pub pages: Arc<Pages>,

    /// Cooldown tracker (shared with the flow and the sweeper)
    pub cooldown: Arc<CooldownTracker>,

    /// Final token store (shared with the flow and the sweeper)
    pub tokens: Arc<TokenStore>,
}

impl AppState {
    /// Build state from configuration, validating answer hashes and templates
    pub fn new(config: AppConfig) -> Result<Self> {
        let answers =
            AnswerBook::from_config(&config.answers).context("Failed to load answer hashes")?;
        let pages = Pages::new(config.index_url.clone(), config.riddles.clone())
            .context("Failed to load page templates")?;

        let cooldown = Arc::new(CooldownTracker::new(config.cooldown()));
        let tokens = Arc::new(TokenStore::new(config.final_token_ttl()));
        let flow = Arc::new(StageFlow::new(answers, cooldown.clone(), tokens.clone()));

        Ok(Self {
            config: Arc::new(config),
            flow,
            pages: Arc::new(pages),
            cooldown,
            tokens,
        })
    }
}
