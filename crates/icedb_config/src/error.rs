//! Error types for configuration loading and chip database opening.

use icedb::ChipDbError;

/// Errors that can occur when loading `icedb.toml` or opening a chip database.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An I/O error occurred while reading a file.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML content could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A required field is missing or empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A configuration value failed validation.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// The configured package is not part of the chip database.
    #[error("package '{package}' not found for device '{device}'")]
    UnknownPackage {
        /// The device of the chip database.
        device: String,
        /// The configured package name.
        package: String,
    },

    /// The configured device differs from the chip database's device.
    #[error("configured device '{configured}' does not match chip database device '{found}'")]
    DeviceMismatch {
        /// Device named in `icedb.toml`.
        configured: String,
        /// Device recorded in the chip database.
        found: String,
    },

    /// The chip database snapshot could not be decoded or validated.
    #[error(transparent)]
    ChipDb(#[from] ChipDbError),

    /// Neither the environment nor the configuration names an existing snapshot.
    #[error("no chip database found (set ICEDB_CHIPDB or device.chipdb)")]
    NoChipDb,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("device.name".to_string());
        assert_eq!(format!("{err}"), "missing required field: device.name");
    }

    #[test]
    fn display_unknown_package() {
        let err = ConfigError::UnknownPackage {
            device: "1k".to_string(),
            package: "qn84".to_string(),
        };
        assert_eq!(format!("{err}"), "package 'qn84' not found for device '1k'");
    }

    #[test]
    fn display_device_mismatch() {
        let err = ConfigError::DeviceMismatch {
            configured: "8k".to_string(),
            found: "1k".to_string(),
        };
        assert_eq!(
            format!("{err}"),
            "configured device '8k' does not match chip database device '1k'"
        );
    }

    #[test]
    fn chipdb_errors_pass_through() {
        let err = ConfigError::from(ChipDbError::DeviceNotSet);
        assert_eq!(format!("{err}"), "device geometry has not been set");
    }

    #[test]
    fn display_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err = ConfigError::IoError(io_err);
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
