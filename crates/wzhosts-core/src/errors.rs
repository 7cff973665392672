use thiserror::Error;

/// Result type alias using HostsError
pub type Result<T> = std::result::Result<T, HostsError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every failure surfaced by the host store is classified into one of these
/// kinds. Each kind maps to a stable code that the HTTP layer and the
/// scheduler use to pick a response without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// Another mutation holds the exclusivity flag
    Busy,
    /// The hosts file could not be read or written
    Io,
    /// The referenced host id is not in the store
    NotFound,
    /// A mutation was requested on a store with no hosts
    PreconditionFailed,
    /// A caller-supplied host id is already taken
    AlreadyExists,
    /// A record block or the host list does not have the expected shape
    Codec,
    InvalidInput,
    Serialization,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Busy => "ERR_BUSY",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::PreconditionFailed => "ERR_PRECONDITION_FAILED",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::Codec => "ERR_CODEC",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus the
/// operation and host id that failed, for logs and error responses.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add host id context
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when the caller may retry the same call later
    pub fn is_retryable(&self) -> bool {
        self.kind == ExErrorKind::Busy
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (host_id: {})", entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for host store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostsError {
    /// The exclusivity flag is already held by another mutation
    #[error("Another process is updating the configuration file")]
    Busy,

    /// No host with this id exists in the store
    #[error("Host {id} not found")]
    HostNotFound { id: String },

    /// The store has no hosts at all
    #[error("There are not configured hosts")]
    NoHostsConfigured,

    /// A single record cannot be encoded or matched
    #[error("Malformed host record: {reason}")]
    MalformedRecord { reason: String },

    /// The `wazuh.hosts` section cannot be parsed
    #[error("Malformed host list: {reason}")]
    MalformedHostList { reason: String },

    /// An encoded credential could not be decoded
    #[error("Invalid credential: {reason}")]
    InvalidCredential { reason: String },
}

impl From<HostsError> for ExError {
    fn from(err: HostsError) -> Self {
        let message = err.to_string();
        match err {
            HostsError::Busy => ExError::new(ExErrorKind::Busy).with_message(message),
            HostsError::HostNotFound { id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(id)
                .with_message(message),
            HostsError::NoHostsConfigured => {
                ExError::new(ExErrorKind::PreconditionFailed).with_message(message)
            }
            HostsError::MalformedRecord { .. } | HostsError::MalformedHostList { .. } => {
                ExError::new(ExErrorKind::Codec).with_message(message)
            }
            HostsError::InvalidCredential { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::Busy, "ERR_BUSY"),
            (ExErrorKind::Io, "ERR_IO"),
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
            (ExErrorKind::PreconditionFailed, "ERR_PRECONDITION_FAILED"),
            (ExErrorKind::Codec, "ERR_CODEC"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_only_busy_is_retryable() {
        assert!(ExError::new(ExErrorKind::Busy).is_retryable());
        assert!(!ExError::new(ExErrorKind::NotFound).is_retryable());
        assert!(!ExError::new(ExErrorKind::Io).is_retryable());
    }

    #[test]
    fn test_display_includes_op_and_host() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("delete_host")
            .with_entity_id("internal")
            .with_message("Host internal not found");
        let rendered = err.to_string();
        assert!(rendered.starts_with("[ERR_NOT_FOUND]"));
        assert!(rendered.contains("delete_host"));
        assert!(rendered.contains("(host_id: internal)"));
    }
}
