//! Per-message errors of the projection. None of these is fatal: the message is dropped
//! and the next cloud is processed independently.

use std::fmt;

use crate::point_cloud::Time;

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// No transform from the cloud frame to the target frame within the tolerance.
    TransformUnavailable {
        source_frame: String,
        target_frame: String,
        stamp: Time,
    },
    /// The cloud cannot be decoded (missing x/y/z fields, truncated buffer and the like).
    MalformedInput(String),
}

impl fmt::Display for ProjectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionError::TransformUnavailable { source_frame, target_frame, stamp } => write!(
                f,
                "Transform from '{}' to '{}' is not available at {}",
                source_frame, target_frame, stamp
            ),
            ProjectionError::MalformedInput(msg) => write!(f, "Malformed point cloud: {}", msg),
        }
    }
}

impl std::error::Error for ProjectionError {}
