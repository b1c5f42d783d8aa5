//! Domain error types.

/// Top-level error type for pnldesk.
#[derive(Debug, thiserror::Error)]
pub enum PnldeskError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown product: {value}")]
    UnknownProduct { value: String },

    #[error("unknown category: {value}")]
    UnknownCategory { value: String },

    #[error("unknown shipment code: {value}")]
    UnknownShipment { value: String },

    #[error("unknown operation: {value}")]
    UnknownOperation { value: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&PnldeskError> for std::process::ExitCode {
    fn from(err: &PnldeskError) -> Self {
        let code: u8 = match err {
            PnldeskError::Io(_) => 1,
            PnldeskError::ConfigParse { .. }
            | PnldeskError::ConfigMissing { .. }
            | PnldeskError::ConfigInvalid { .. } => 2,
            PnldeskError::Database { .. } | PnldeskError::DatabaseQuery { .. } => 3,
            PnldeskError::UnknownProduct { .. }
            | PnldeskError::UnknownCategory { .. }
            | PnldeskError::UnknownShipment { .. }
            | PnldeskError::UnknownOperation { .. } => 4,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_error_display() {
        let err = PnldeskError::Database {
            reason: "connection refused".into(),
        };
        assert_eq!(err.to_string(), "database error: connection refused");
    }

    #[test]
    fn config_missing_display() {
        let err = PnldeskError::ConfigMissing {
            section: "sqlite".into(),
            key: "path".into(),
        };
        assert_eq!(err.to_string(), "missing config key [sqlite] path");
    }

    #[test]
    fn unknown_operation_display() {
        let err = PnldeskError::UnknownOperation {
            value: "Loan".into(),
        };
        assert_eq!(err.to_string(), "unknown operation: Loan");
    }
}
