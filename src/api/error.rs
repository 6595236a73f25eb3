//! Error types for upstream API access

use crate::api::sources::ApiSource;
use thiserror::Error;

/// Errors that can occur when fetching from an upstream API
///
/// The enum is `Clone` because a coalesced fetch shares a single outcome,
/// failure included, with every caller waiting on it. Transport errors are
/// stored as messages rather than wrapping `reqwest::Error`, which does not
/// clone.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The request never produced a response (connect failure, timeout)
    #[error("request to {source_id} failed: {message}")]
    Transport {
        source_id: ApiSource,
        message: String,
    },

    /// The upstream reported a failure, via status code or inside the body
    #[error("{source_id} error: {message}")]
    Upstream {
        source_id: ApiSource,
        /// HTTP status, absent when the failure was declared in a 2xx body
        status: Option<u16>,
        message: String,
    },

    /// Required parameters are missing; nothing was sent upstream
    #[error("missing required parameters: {missing}")]
    MissingParameters { missing: String },
}

impl ApiError {
    /// Whether the upstream refused the request for exceeding a rate limit
    pub fn is_rate_limited(&self) -> bool {
        matches!(
            self,
            ApiError::Upstream {
                status: Some(429),
                ..
            }
        )
    }
}
