//! # Dashboard Error Types Module
//!
//! This module defines the error kinds surfaced by dashboard actions.
//! Every kind is handled at the action boundary and rendered back to the
//! admin; none of them is fatal to the process.

/// Which part of the library an empty-library error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    /// Images directory
    Image,
    /// Posts directory
    Post,
    /// Both directories
    Any,
}

/// Custom error types for dashboard operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    /// Interaction from a user outside the admin allow-list
    Unauthorized(i64),
    /// A random item was requested but nothing of that kind is stored
    EmptyLibrary(ContentKind),
    /// The channel transport failed to deliver or look something up
    Delivery(String),
    /// Reading or writing the media library failed
    Storage(String),
}

impl std::fmt::Display for DashboardError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DashboardError::Unauthorized(user_id) => {
                write!(f, "Unauthorized: user {user_id} is not an admin")
            }
            DashboardError::EmptyLibrary(kind) => match kind {
                ContentKind::Image => write!(f, "Empty library: no images stored"),
                ContentKind::Post => write!(f, "Empty library: no posts stored"),
                ContentKind::Any => write!(f, "Empty library: no content stored"),
            },
            DashboardError::Delivery(msg) => write!(f, "Delivery error: {msg}"),
            DashboardError::Storage(msg) => write!(f, "Storage error: {msg}"),
        }
    }
}

impl std::error::Error for DashboardError {}

impl From<std::io::Error> for DashboardError {
    fn from(err: std::io::Error) -> Self {
        DashboardError::Storage(err.to_string())
    }
}

impl From<teloxide::RequestError> for DashboardError {
    fn from(err: teloxide::RequestError) -> Self {
        DashboardError::Delivery(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            DashboardError::Delivery("chat not found".to_string()).to_string(),
            "Delivery error: chat not found"
        );
        assert_eq!(
            DashboardError::EmptyLibrary(ContentKind::Image).to_string(),
            "Empty library: no images stored"
        );
        assert_eq!(
            DashboardError::Unauthorized(99).to_string(),
            "Unauthorized: user 99 is not an admin"
        );
    }

    #[test]
    fn test_io_error_maps_to_storage() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only");
        let err: DashboardError = io.into();
        assert!(matches!(err, DashboardError::Storage(ref msg) if msg.contains("read-only")));
    }
}
