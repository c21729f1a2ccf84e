//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Parse backend URLs and reject duplicates
//! - Validate value ranges (port, intervals, budgets)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure: `&BalancerConfig → Result<(), Vec<ValidationError>>`
//! - An empty backend list is not a validation error here; startup and
//!   reload each decide how to treat it

use std::collections::HashSet;
use thiserror::Error;
use url::Url;
use crate::config::schema::BalancerConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid port {0:?}")]
    InvalidPort(String),

    #[error("invalid backend url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("backend url {url:?} uses unsupported scheme {scheme:?}")]
    UnsupportedScheme { url: String, scheme: String },

    #[error("backend url {0:?} is listed more than once")]
    DuplicateBackend(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Render a list of errors on one line.
pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate the whole configuration, collecting every error.
pub fn validate_config(config: &BalancerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.port.parse::<u16>().map(|p| p == 0).unwrap_or(true) {
        errors.push(ValidationError::InvalidPort(config.port.clone()));
    }

    if let Err(mut url_errors) = parse_backend_urls(&config.urls) {
        errors.append(&mut url_errors);
    }

    if config.health_check.enabled {
        if config.health_check.interval_secs == 0 {
            errors.push(ValidationError::Zero("health_check.interval_secs"));
        }
        if config.health_check.timeout_secs == 0 {
            errors.push(ValidationError::Zero("health_check.timeout_secs"));
        }
    }
    if config.retries.max_attempts == 0 {
        errors.push(ValidationError::Zero("retries.max_attempts"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::Zero("timeouts.request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Parse backend URL strings in order.
///
/// Only plain `http` upstreams with a host are accepted; each normalized
/// address may appear once.
pub fn parse_backend_urls(raw: &[String]) -> Result<Vec<Url>, Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut urls = Vec::with_capacity(raw.len());

    for entry in raw {
        let url = match Url::parse(entry.trim()) {
            Ok(url) => url,
            Err(e) => {
                errors.push(ValidationError::InvalidUrl {
                    url: entry.clone(),
                    reason: e.to_string(),
                });
                continue;
            }
        };

        if url.scheme() != "http" {
            errors.push(ValidationError::UnsupportedScheme {
                url: entry.clone(),
                scheme: url.scheme().to_string(),
            });
            continue;
        }
        if url.host_str().is_none() {
            errors.push(ValidationError::InvalidUrl {
                url: entry.clone(),
                reason: "missing host".to_string(),
            });
            continue;
        }
        if !seen.insert(url.clone()) {
            errors.push(ValidationError::DuplicateBackend(entry.clone()));
            continue;
        }
        urls.push(url);
    }

    if errors.is_empty() {
        Ok(urls)
    } else {
        Err(errors)
    }
}
