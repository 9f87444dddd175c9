//! Shared types and the transform provider seam

extern crate nalgebra as na;

use na::Isometry3;

use crate::point_cloud::Time;
use crate::projection_error::ProjectionError;
use crate::transform_buffer::StampedTransform;

/// Rigid transform (translation and rotation quaternion) between two frames.
/// ```
/// extern crate nalgebra as na;
/// use na::{Isometry3, Translation3, UnitQuaternion};
///
/// type Pose = Isometry3<f64>;
///
/// // Lidar mounted 10 cm above base_link, no rotation
/// let lidar_in_base = Pose::from_parts(Translation3::new(0.0, 0.0, 0.1), UnitQuaternion::identity());
/// ```
pub type Pose = Isometry3<f64>;

/// Frame of the piper arm base, the default scan frame.
pub const BASE_LINK: &str = "base_link";

/// Frame of the Unitree lidar mounted on the platform.
pub const LIDAR_FRAME: &str = "unilidar_lidar";

/// Anything that can answer "where is `source_frame` in `target_frame` at `stamp`".
/// The returned transform maps points expressed in `source_frame` into `target_frame`.
/// Implementations must not wait longer than `tolerance` (seconds) for a transform
/// to become available; they return `ProjectionError::TransformUnavailable` instead.
pub trait TransformLookup: Send + Sync {
    fn lookup(
        &self,
        source_frame: &str,
        target_frame: &str,
        stamp: Time,
        tolerance: f64,
    ) -> Result<StampedTransform, ProjectionError>;
}
