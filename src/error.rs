//! Logger status codes

/// Why a logger operation did not complete.
///
/// `Ok(())` is the success status; everything else maps onto one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogError {
    /// Logger has not been initialized (or init failed)
    NotInitialized,
    /// Called from interrupt context
    Unsupported,
    /// Severity outside the valid range
    InvalidArgument,
    /// Timed out waiting for the logger lock
    Busy,
    /// Rendering, channel or sink setup failed
    Failed,
}

impl LogError {
    /// Get error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "L01",
            Self::Unsupported => "L02",
            Self::InvalidArgument => "L03",
            Self::Busy => "L04",
            Self::Failed => "L05",
        }
    }

    /// Get error message
    pub fn message(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not initialized",
            Self::Unsupported => "unsupported in interrupt context",
            Self::InvalidArgument => "invalid argument",
            Self::Busy => "busy",
            Self::Failed => "failed",
        }
    }
}

impl core::fmt::Display for LogError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// Status of a logger operation.
pub type LogResult = Result<(), LogError>;
