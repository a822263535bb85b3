//! Shared constants for Sphinx components.

/// Default HTTP listen address (the reverse proxy sits in front)
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8888";

/// Default entry URL failed visitors are sent back to
pub const DEFAULT_INDEX_URL: &str = "/";

/// Default destination after the final riddle (override in production)
pub const DEFAULT_REDIRECT_URL: &str = "/";

/// Cooldown after a wrong or scattershot guess (5 minutes)
pub const COOLDOWN_SECS: u64 = 300;

/// Lifetime of a final-stage token (2 minutes)
pub const FINAL_TOKEN_TTL_SECS: u64 = 120;

/// How often expired cooldowns and tokens are pruned
pub const SWEEP_INTERVAL_SECS: u64 = 60;

/// Per-request timeout
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Plaintext compared against the real hash when the outcome is already known.
pub const DECOY_GUESS: &str = "buzz";

/// Built-in answer hashes (bcrypt, cost 10)
pub mod answers {
    pub const FIRST: &str = "$2a$10$RcmgQ593JW.4ZHgtJ8adXeFfrq9BJoiXlRmsmmrAxZSGF4VJXTuXy";
    pub const SECOND: &str = "$2a$10$1IWVW4buxGjWoUE7qdXNAOU/6mlChkPjvGnoP1addD0SDHRTU7BeK";
    pub const FINAL: &str = "$2a$10$nkGgZoyIAEPdtNrxGqcxj.oEqAS7sqGIO.8v19IpD9gebVanwGLL2";
}

/// Route paths
pub mod paths {
    /// Stage-one page
    pub const INDEX: &str = "/";
    pub const INDEX_HTML: &str = "/index.html";

    /// Stage-one form target
    pub const SUBMIT_FIRST: &str = "/submit";

    /// Stage-two page (also the stage-one success redirect)
    pub const SECOND_PAGE: &str = "/q2.html";

    /// Stage-two form target
    pub const SUBMIT_SECOND: &str = "/q2";

    /// Final stage: GET /final/{token}.html, POST /final/{token}
    pub const FINAL_PREFIX: &str = "/final/";
    pub const FINAL_PAGE_SUFFIX: &str = ".html";

    pub const ROBOTS: &str = "/robots.txt";
    pub const HEALTH: &str = "/health";
    pub const STATS: &str = "/stats";
}

/// HTTP header names
pub mod headers {
    /// Client address as set by the reverse proxy
    pub const X_REAL_IP: &str = "X-Real-IP";

    /// Request correlation id
    pub const X_REQUEST_ID: &str = "X-Request-Id";
}
