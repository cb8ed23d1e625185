//! Unified error handling for appbridge.
//!
//! This module provides the error hierarchy for the actor, state tracking
//! and configuration layers, with metric labeling.
//!
//! Protocol failures are carried through unchanged as
//! [`ProtocolError`]; the enums here only add the failures the core itself
//! decides on.

use appbridge_proto::ProtocolError;
use thiserror::Error;

// ============================================================================
// Actor Errors
// ============================================================================

/// Errors returned by [`Actor`](crate::actor::Actor) operations.
#[derive(Debug, Clone, Error)]
pub enum ActorError {
    /// The service rejected the call; passed through untouched.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Every join escalation step was exhausted.
    #[error("unable to join {room_id}: {source}")]
    UnableToJoin {
        room_id: String,
        #[source]
        source: ProtocolError,
    },

    /// Neither the actor nor the administrative actor holds enough power.
    #[error("cannot escalate power for {event_type} in {room_id}: need {required}")]
    CannotEscalate {
        room_id: String,
        event_type: String,
        required: i64,
    },

    /// The room's power level content did not deserialize.
    #[error("malformed power levels in {room_id}: {reason}")]
    MalformedPowerLevels { room_id: String, reason: String },
}

impl ActorError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Protocol(e) => e.kind().as_str(),
            Self::UnableToJoin { .. } => "unable_to_join",
            Self::CannotEscalate { .. } => "cannot_escalate",
            Self::MalformedPowerLevels { .. } => "malformed_power_levels",
        }
    }

    /// The underlying protocol error, if the failure came from the service.
    pub fn protocol(&self) -> Option<&ProtocolError> {
        match self {
            Self::Protocol(e) => Some(e),
            Self::UnableToJoin { source, .. } => Some(source),
            _ => None,
        }
    }

    /// True if the service answered with a permission failure.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::Protocol(e) if e.is_permission_denied())
    }
}

/// Result type for actor operations.
pub type ActorResult<T> = Result<T, ActorError>;

// ============================================================================
// State Tracker Errors
// ============================================================================

/// Errors returned by [`StateTracker::track`](crate::tracker::StateTracker::track).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The initial state fetch failed with a structured service error.
    #[error("state fetch failed: {0}")]
    Protocol(#[from] ProtocolError),

    /// The room was untracked before the fetch completed.
    #[error("room {0} is no longer tracked")]
    Untracked(String),
}

impl StateError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "state_fetch_failed",
            Self::Untracked(_) => "untracked",
        }
    }
}

// ============================================================================
// Queue Errors
// ============================================================================

/// A deferred result whose sender was dropped without settling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("deferred result dropped before it settled")]
pub struct Abandoned;

// ============================================================================
// Validation Errors
// ============================================================================

/// Rejected constructor arguments or configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("ttl must be positive")]
    ZeroTtl,
    #[error("max size must be positive")]
    ZeroMaxSize,
    #[error("a fetch function is required")]
    MissingFetch,
    #[error("unknown queue policy '{0}' (expected none, single or per_room)")]
    UnknownPolicy(String),
    #[error("state.retry_delay_ms must be positive")]
    ZeroRetryDelay,
    #[error("state.event_types contains an empty entry")]
    EmptyEventType,
}

impl ValidationError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::ZeroTtl => "zero_ttl",
            Self::ZeroMaxSize => "zero_max_size",
            Self::MissingFetch => "missing_fetch",
            Self::UnknownPolicy(_) => "unknown_policy",
            Self::ZeroRetryDelay => "zero_retry_delay",
            Self::EmptyEventType => "empty_event_type",
        }
    }
}
