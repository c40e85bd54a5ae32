use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::rate_limit::{default_rate_limiter, IpRateLimiter};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Backend chosen by `AI_SERVICE`. Handlers never see the concrete type.
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
    /// Per-IP limiter applied to every `/api` route.
    pub rate_limiter: Arc<IpRateLimiter>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(config: Config, llm: Arc<dyn TextGenerator>) -> Self {
        Self {
            llm,
            config,
            rate_limiter: default_rate_limiter(),
            started_at: Utc::now(),
        }
    }

    #[cfg(test)]
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<IpRateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }
}
