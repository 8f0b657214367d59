//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, secret lengths and value ranges
//! - Ensure the relay has a target for every backend it needs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayChainConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RelayChainConfig;
use crate::protocol::CREDENTIAL_LEN;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: expected 4 bytes, got {actual}")]
    CredentialLength { field: &'static str, actual: usize },

    #[error("{field}: must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field}: required when the in-process service is disabled")]
    MissingTarget { field: &'static str },
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayChainConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "front_door.bind_address", &config.front_door.bind_address);
    check_address(&mut errors, "auth_service.bind_address", &config.auth_service.bind_address);
    check_address(
        &mut errors,
        "transform_service.bind_address",
        &config.transform_service.bind_address,
    );
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    match &config.relay.auth_address {
        Some(addr) => check_address(&mut errors, "relay.auth_address", addr),
        None if !config.auth_service.enabled => errors.push(ValidationError::MissingTarget {
            field: "relay.auth_address",
        }),
        None => {}
    }
    match &config.relay.transform_address {
        Some(addr) => check_address(&mut errors, "relay.transform_address", addr),
        None if !config.transform_service.enabled => errors.push(ValidationError::MissingTarget {
            field: "relay.transform_address",
        }),
        None => {}
    }

    check_credential(&mut errors, "auth_service.secret", &config.auth_service.secret);
    check_credential(&mut errors, "relay.credential", &config.relay.credential);

    check_nonzero(&mut errors, "front_door.max_body_size", config.front_door.max_body_size as u64);
    check_nonzero(
        &mut errors,
        "front_door.request_timeout_secs",
        config.front_door.request_timeout_secs,
    );
    check_nonzero(
        &mut errors,
        "auth_service.max_connections",
        config.auth_service.max_connections as u64,
    );
    check_nonzero(
        &mut errors,
        "transform_service.max_connections",
        config.transform_service.max_connections as u64,
    );
    check_nonzero(&mut errors, "relay.channel_capacity", config.relay.channel_capacity as u64);
    check_nonzero(&mut errors, "timeouts.connect_ms", config.timeouts.connect_ms);
    check_nonzero(&mut errors, "timeouts.read_ms", config.timeouts.read_ms);
    check_nonzero(
        &mut errors,
        "protocol.max_frame_length",
        config.protocol.max_frame_length as u64,
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_credential(errors: &mut Vec<ValidationError>, field: &'static str, value: &[u8]) {
    if value.len() != CREDENTIAL_LEN {
        errors.push(ValidationError::CredentialLength {
            field,
            actual: value.len(),
        });
    }
}

fn check_nonzero(errors: &mut Vec<ValidationError>, field: &'static str, value: u64) {
    if value == 0 {
        errors.push(ValidationError::Zero { field });
    }
}
