//! API Configuration Module
//!
//! CORS and request-size settings for the HTTP layer. Configuration is loaded
//! from environment variables with defaults suited to local development.

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

/// Default upper bound on prompt length, in characters.
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 18_000;

/// Default JSON body limit (1 MiB).
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 1024 * 1024;

pub const DEFAULT_PORT: u16 = 3001;

// ============================================================================
// API CONFIGURATION
// ============================================================================

#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Allowed CORS origins (comma-separated in env var).
    /// Empty means allow all origins.
    pub cors_origins: Vec<String>,

    /// Max age for CORS preflight cache in seconds.
    pub cors_max_age_secs: u64,

    /// Longest accepted prompt, counted in characters after trimming.
    pub max_prompt_chars: usize,

    /// Request body limit for JSON endpoints.
    pub body_limit_bytes: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cors_origins: Vec::new(),
            cors_max_age_secs: 86400,
            max_prompt_chars: DEFAULT_MAX_PROMPT_CHARS,
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// - `PROMPTFORGE_CORS_ORIGINS`: comma-separated allowed origins (empty = allow all)
    /// - `PROMPTFORGE_CORS_MAX_AGE_SECS`: preflight cache duration (default: 86400)
    /// - `PROMPTFORGE_MAX_PROMPT_CHARS`: prompt length limit (default: 18000)
    /// - `PROMPTFORGE_BODY_LIMIT_BYTES`: JSON body limit (default: 1 MiB)
    pub fn from_env() -> Self {
        let cors_origins = std::env::var("PROMPTFORGE_CORS_ORIGINS")
            .ok()
            .map(|s| parse_origins(&s))
            .unwrap_or_default();

        let cors_max_age_secs = std::env::var("PROMPTFORGE_CORS_MAX_AGE_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(86400);

        let max_prompt_chars = std::env::var("PROMPTFORGE_MAX_PROMPT_CHARS")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_PROMPT_CHARS);

        let body_limit_bytes = std::env::var("PROMPTFORGE_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_BODY_LIMIT_BYTES);

        Self {
            cors_origins,
            cors_max_age_secs,
            max_prompt_chars,
            body_limit_bytes,
        }
    }

    /// Strict CORS is in effect.
    pub fn has_cors_allowlist(&self) -> bool {
        !self.cors_origins.is_empty()
    }

    /// Check if a given origin is allowed.
    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        if self.cors_origins.is_empty() {
            return true;
        }

        self.cors_origins.iter().any(|allowed| {
            if allowed == origin {
                return true;
            }
            // *.example.com
            if let Some(pattern) = allowed.strip_prefix("*.") {
                if let Some(origin_domain) = origin.strip_prefix("https://") {
                    return origin_domain.ends_with(&format!(".{}", pattern));
                }
            }
            false
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

// ============================================================================
// BIND ADDRESS
// ============================================================================

/// Resolve the listen address from `PROMPTFORGE_API_BIND` and `PORT` /
/// `PROMPTFORGE_API_PORT`.
pub fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("PROMPTFORGE_API_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .ok()
        .or_else(|| std::env::var("PROMPTFORGE_API_PORT").ok());
    bind_addr(&host, port.as_deref())
}

fn bind_addr(host: &str, port: Option<&str>) -> ApiResult<SocketAddr> {
    let port = match port {
        Some(raw) => raw
            .parse::<u16>()
            .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", raw)))?,
        None => DEFAULT_PORT,
    };

    let addr = format!("{}:{}", host, port);
    addr.parse::<SocketAddr>()
        .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
}
