//! Error types for protocol calls.
//!
//! Every call made through a [`ProtocolClient`](crate::ProtocolClient) fails
//! with a [`ProtocolError`]. The error carries the service's errcode, the HTTP
//! status when one exists, and a [`ErrorKind`] computed once at construction.

use thiserror::Error;

/// Convenience type alias for Results using [`ProtocolError`].
pub type Result<T, E = ProtocolError> = std::result::Result<T, E>;

/// Errcode returned when the caller lacks membership or power.
pub const M_FORBIDDEN: &str = "M_FORBIDDEN";

/// Errcode returned when registering a user id that already exists.
pub const M_USER_IN_USE: &str = "M_USER_IN_USE";

/// Errcode used for failures that never reached the service.
pub const M_TRANSIENT: &str = "M_TRANSIENT";

/// Classification of a [`ProtocolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing membership or insufficient power level.
    PermissionDenied,
    /// The resource (usually a user id) already exists.
    AlreadyExists,
    /// Any other response carrying a 4xx/5xx status. Permanent.
    Service,
    /// No status attached (connection reset, timeout, DNS).
    Transient,
}

impl ErrorKind {
    /// Get a static label for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "permission_denied",
            Self::AlreadyExists => "already_exists",
            Self::Service => "service",
            Self::Transient => "transient",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed protocol call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} ({kind}{}): {message}", .status.map(|s| format!(", status {s}")).unwrap_or_default())]
pub struct ProtocolError {
    kind: ErrorKind,
    code: String,
    status: Option<u16>,
    message: String,
}

impl ProtocolError {
    /// Classify a service response.
    ///
    /// The errcode wins over the status: `M_FORBIDDEN` is always
    /// [`ErrorKind::PermissionDenied`] and `M_USER_IN_USE` is always
    /// [`ErrorKind::AlreadyExists`]. Otherwise a status in `400..=599` is a
    /// [`ErrorKind::Service`] error and anything without a status is
    /// [`ErrorKind::Transient`].
    pub fn from_response(
        status: Option<u16>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        let code = code.into();
        let kind = match code.as_str() {
            M_FORBIDDEN => ErrorKind::PermissionDenied,
            M_USER_IN_USE => ErrorKind::AlreadyExists,
            _ => match status {
                Some(400..=599) => ErrorKind::Service,
                _ => ErrorKind::Transient,
            },
        };
        Self {
            kind,
            code,
            status,
            message: message.into(),
        }
    }

    /// A `M_FORBIDDEN` response with status 403.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::from_response(Some(403), M_FORBIDDEN, message)
    }

    /// A `M_USER_IN_USE` response with status 400.
    pub fn user_in_use(message: impl Into<String>) -> Self {
        Self::from_response(Some(400), M_USER_IN_USE, message)
    }

    /// A structured service failure with the given status and errcode.
    pub fn service(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::from_response(Some(status), code, message)
    }

    /// A failure with no response from the service.
    pub fn transient(message: impl Into<String>) -> Self {
        Self::from_response(None, M_TRANSIENT, message)
    }

    /// The classification of this error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The service errcode (e.g. `M_FORBIDDEN`).
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The HTTP status, if the failure came from a response.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    /// The human readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for [`ErrorKind::PermissionDenied`].
    pub fn is_permission_denied(&self) -> bool {
        self.kind == ErrorKind::PermissionDenied
    }

    /// True for [`ErrorKind::Transient`].
    pub fn is_transient(&self) -> bool {
        self.kind == ErrorKind::Transient
    }

    /// True when the error came from a 4xx/5xx response, whatever its kind.
    pub fn is_structured(&self) -> bool {
        matches!(self.status, Some(400..=599))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_errcode_is_permission_denied() {
        let err = ProtocolError::from_response(Some(403), "M_FORBIDDEN", "nope");
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
        assert!(err.is_structured());
    }

    #[test]
    fn errcode_beats_status() {
        let err = ProtocolError::from_response(Some(500), "M_USER_IN_USE", "taken");
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    }

    #[test]
    fn status_without_special_errcode_is_service() {
        let err = ProtocolError::service(404, "M_NOT_FOUND", "no such room");
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn missing_status_is_transient() {
        let err = ProtocolError::from_response(None, "M_UNKNOWN", "reset");
        assert!(err.is_transient());
        assert!(!err.is_structured());
    }

    #[test]
    fn display_includes_code_and_status() {
        let err = ProtocolError::forbidden("not in room");
        let text = err.to_string();
        assert!(text.contains("M_FORBIDDEN"));
        assert!(text.contains("403"));
        assert!(text.contains("not in room"));
    }
}
