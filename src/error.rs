//! Error types for cardfield.
//!
//! The engine itself never fails: an unavailable drawing context is a silent
//! no-op. These errors cover the edges around it - loading configuration and
//! exporting raster frames.

use std::fmt;

/// Errors that can occur while loading, saving or validating a [`FieldConfig`].
///
/// [`FieldConfig`]: crate::FieldConfig
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    Io(std::io::Error),
    /// The file is not valid config JSON.
    Json(serde_json::Error),
    /// A value is out of its accepted range.
    Invalid {
        /// Name of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access config file: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::Invalid { field, reason } => {
                write!(f, "Invalid config value for `{}`: {}", field, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid { .. } => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors that can occur when exporting a [`RasterSurface`].
///
/// [`RasterSurface`]: crate::RasterSurface
#[derive(Debug)]
pub enum RasterError {
    /// Failed to encode or write the image.
    Image(image::ImageError),
}

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::Image(e) => write!(f, "Failed to write frame: {}", e),
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RasterError::Image(e) => Some(e),
        }
    }
}

impl From<image::ImageError> for RasterError {
    fn from(e: image::ImageError) -> Self {
        RasterError::Image(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_invalid_names_field() {
        let err = ConfigError::invalid("connect_radius", "must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid config value for `connect_radius`: must be positive"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn test_io_error_has_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(err.source().is_some());
    }
}
