//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay chain.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::protocol::{Credential, DEFAULT_MAX_FRAME_LENGTH};

/// Root configuration for the relay chain.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayChainConfig {
    /// HTTP front door (bind address, body limits).
    pub front_door: FrontDoorConfig,

    /// Authentication service listener.
    pub auth_service: AuthServiceConfig,

    /// Transform (screaming echo) service listener.
    pub transform_service: TransformServiceConfig,

    /// Relay targets and credential.
    pub relay: RelayConfig,

    /// Timeout configuration for each relay hop.
    pub timeouts: TimeoutConfig,

    /// Wire protocol settings shared by services and relay.
    pub protocol: ProtocolConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Front door configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FrontDoorConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Payload forwarded when the inbound body is empty.
    pub default_payload: String,

    /// Maximum body size in bytes.
    pub max_body_size: usize,

    /// Total time allowed per inbound request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for FrontDoorConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            default_payload: "Hello world!".to_string(),
            max_body_size: 2 * 1024 * 1024, // 2MB
            request_timeout_secs: 30,
        }
    }
}

/// Authentication service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthServiceConfig {
    /// Run the service in this process.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:3001").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,

    /// Shared secret compared against the first 4 request bytes.
    pub secret: Vec<u8>,
}

impl Default for AuthServiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:3001".to_string(),
            max_connections: 1024,
            secret: Credential::DEFAULT.as_bytes().to_vec(),
        }
    }
}

/// Transform service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransformServiceConfig {
    /// Run the service in this process.
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:3002").
    pub bind_address: String,

    /// Maximum concurrent connections (backpressure).
    pub max_connections: usize,
}

impl Default for TransformServiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "127.0.0.1:3002".to_string(),
            max_connections: 1024,
        }
    }
}

/// Relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Address of the authentication service.
    /// `None` targets the in-process service.
    pub auth_address: Option<String>,

    /// Address of the transform service.
    /// `None` targets the in-process service.
    pub transform_address: Option<String>,

    /// Credential presented to the authentication service.
    pub credential: Vec<u8>,

    /// Bounded capacity of the front door → relay channel.
    pub channel_capacity: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            auth_address: None,
            transform_address: None,
            credential: Credential::DEFAULT.as_bytes().to_vec(),
            channel_capacity: 1024,
        }
    }
}

/// Timeout configuration for relay hops.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// TCP connect timeout in milliseconds.
    pub connect_ms: u64,

    /// Wait for one response frame, in milliseconds.
    pub read_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_ms: 2000,
            read_ms: 5000,
        }
    }
}

/// Wire protocol configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProtocolConfig {
    /// Largest accepted frame body in bytes.
    pub max_frame_length: usize,

    /// Report token store lookup failures as `INTERNAL_FAILURE` instead of
    /// the unauthorized byte.
    pub extended_status: bool,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            max_frame_length: DEFAULT_MAX_FRAME_LENGTH,
            extended_status: false,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
