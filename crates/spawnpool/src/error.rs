//! # Pool Error Types
//!
//! All errors that can occur in the pool registry.

use thiserror::Error;

/// Errors that can occur in the pool registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The type has never been acquired, so it has no pool entry.
    #[error("object type not in pool: {type_name}")]
    UnknownType {
        /// Display name of the type.
        type_name: &'static str,
    },

    /// Low-water threshold below 1.
    #[error("threshold must be >= 1 for {type_name}, got {requested}")]
    InvalidThreshold {
        /// Display name of the type.
        type_name: &'static str,
        /// The rejected value.
        requested: i64,
    },

    /// The template resolver found no template for a prototype-cloned type.
    #[error("template not found for {type_name}")]
    TemplateNotFound {
        /// Display name of the type.
        type_name: &'static str,
    },

    /// The template resolver found more than one template.
    #[error("template for {type_name} must be unique, found {found}")]
    AmbiguousTemplate {
        /// Display name of the type.
        type_name: &'static str,
        /// Number of matching templates.
        found: usize,
    },

    /// Invalid configuration file.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for pool operations.
pub type PoolResult<T> = Result<T, PoolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_type() {
        let err = PoolError::AmbiguousTemplate {
            type_name: "Bullet",
            found: 2,
        };
        assert_eq!(err.to_string(), "template for Bullet must be unique, found 2");

        let err = PoolError::InvalidThreshold {
            type_name: "Bullet",
            requested: -1,
        };
        assert_eq!(err.to_string(), "threshold must be >= 1 for Bullet, got -1");
    }
}
