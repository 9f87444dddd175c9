//! Projection of 3D lidar point clouds into 2D laser scans
//!
//! This crate converts the point clouds of the lidar mounted on the piper arm platform
//! (`unilidar_lidar` frame) into planar range scans in `base_link`, as consumed by the
//! navigation stack. It covers what the `pointcloud_to_laserscan` node does, without the
//! ROS middleware: the transport of clouds and scans is up to the caller.
//!
//! # Features
//!
//! - Projection is a pure function of the cloud, the transform and the parameters.
//!   The same input always gives a bit-identical scan.
//! - Height slice (`min_height`..`max_height`, inclusive) in the target frame, so the floor
//!   and the arm above the platform do not show up as obstacles.
//! - Nearest return per angular bin, rejection of returns closer than `range_min`.
//! - Bins without return are reported as infinity, or as `range_max + inf_epsilon` for
//!   consumers that cannot handle infinity.
//! - Parameters validated once when the [projector::Projector] is built. They can be read
//!   from YAML, including ROS 2 parameter files (`allow_filesystem` feature).
//! - Decoding of packed `PointCloud2`-like buffers with float32 or float64 coordinates.
//! - In-process transform buffer with static transforms, interpolation of time stamped
//!   samples and lookup tolerance.
//! - Parallel projection of batches of clouds (`parallel` feature).
//!
//! # Example
//!
//! ```
//! use nalgebra::Point3;
//! use pointcloud_to_laserscan::parameters::Parameters;
//! use pointcloud_to_laserscan::point_cloud::{Header, PointCloud, Time};
//! use pointcloud_to_laserscan::projector::Projector;
//! use pointcloud_to_laserscan::scan_traits::Pose;
//!
//! let projector = Projector::new(Parameters::piper_unilidar()).unwrap();
//! let cloud = PointCloud::new(
//!     Header::new("base_link", Time::new(1, 0)),
//!     vec![Point3::new(1.0, 0.0, 0.5)],
//! );
//! let scan = projector.project(&cloud, &Pose::identity()).unwrap();
//! assert_eq!(scan.valid_count(), 1);
//! ```

pub mod scan_traits;

pub mod parameters;
pub mod parameters_presets;

#[cfg(feature = "allow_filesystem")]
pub mod parameters_from_file;

pub mod parameter_error;
pub mod projection_error;

pub mod point_cloud;
pub mod laser_scan;

pub mod transform_buffer;

#[path = "utils/utils.rs"]
pub mod utils;

#[path = "scan/projector.rs"]
pub mod projector;

#[path = "scan/batch.rs"]
pub mod batch;

#[path = "scan/node.rs"]
pub mod node;

#[path = "utils/dummy_cloud.rs"]
pub mod dummy_cloud;

#[cfg(feature = "allow_filesystem")]
#[path = "utils/cloud_io.rs"]
pub mod cloud_io;

#[cfg(test)]
mod tests;
