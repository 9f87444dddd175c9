//! In-process transform provider.
//!
//! Holds static transforms (like the ones `static_transform_publisher` broadcasts once at
//! startup) and time stamped samples of moving frames. A lookup only follows a single edge
//! between two frames, in either direction. There is no transform tree here: the lidar is
//! mounted directly on `base_link`.

use nalgebra::{Quaternion, Translation3, UnitQuaternion};
use std::collections::HashMap;
use tracing::{debug, trace};

use crate::point_cloud::Time;
use crate::projection_error::ProjectionError;
use crate::scan_traits::{Pose, TransformLookup};

/// Default length of the dynamic transform history, seconds.
pub const DEFAULT_CACHE_TIME: f64 = 10.0;

/// Transform that maps points expressed in `child_frame` into `parent_frame`.
#[derive(Debug, Clone, PartialEq)]
pub struct StampedTransform {
    pub parent_frame: String,
    pub child_frame: String,
    pub stamp: Time,
    pub transform: Pose,
}

impl StampedTransform {
    pub fn new(parent_frame: &str, child_frame: &str, stamp: Time, transform: Pose) -> Self {
        StampedTransform {
            parent_frame: parent_frame.to_string(),
            child_frame: child_frame.to_string(),
            stamp,
            transform,
        }
    }

    /// Builds the transform from translation and quaternion in the argument order of
    /// `static_transform_publisher`: x, y, z and qx, qy, qz, qw. The quaternion is normalized.
    pub fn from_xyz_quaternion(
        parent_frame: &str,
        child_frame: &str,
        xyz: [f64; 3],
        quaternion: [f64; 4],
    ) -> Self {
        let [qx, qy, qz, qw] = quaternion;
        let rotation = UnitQuaternion::from_quaternion(Quaternion::new(qw, qx, qy, qz));
        let transform = Pose::from_parts(Translation3::new(xyz[0], xyz[1], xyz[2]), rotation);
        Self::new(parent_frame, child_frame, Time::default(), transform)
    }

    /// The same relation seen from the other side.
    pub fn inverse(&self) -> Self {
        StampedTransform {
            parent_frame: self.child_frame.clone(),
            child_frame: self.parent_frame.clone(),
            stamp: self.stamp,
            transform: self.transform.inverse(),
        }
    }
}

type Edge = (String, String);

pub struct TransformBuffer {
    /// Keyed by (parent, child)
    static_edges: HashMap<Edge, Pose>,

    /// Keyed by (parent, child), samples sorted by stamp
    dynamic_edges: HashMap<Edge, Vec<(Time, Pose)>>,

    /// How long (seconds) dynamic samples are retained, measured from the newest sample.
    pub cache_time: f64,
}

impl Default for TransformBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TIME)
    }
}

impl TransformBuffer {
    pub fn new(cache_time: f64) -> Self {
        TransformBuffer {
            static_edges: HashMap::new(),
            dynamic_edges: HashMap::new(),
            cache_time,
        }
    }

    /// Registers a transform valid at any time. Replaces an earlier static transform
    /// between the same frames.
    pub fn set_static(&mut self, transform: StampedTransform) {
        debug!(
            "Static transform {} -> {}: {:?}",
            transform.parent_frame, transform.child_frame, transform.transform
        );
        self.static_edges
            .insert((transform.parent_frame, transform.child_frame), transform.transform);
    }

    /// Adds a time stamped sample. A sample with the same stamp is replaced.
    pub fn set_transform(&mut self, transform: StampedTransform) {
        let samples = self
            .dynamic_edges
            .entry((transform.parent_frame, transform.child_frame))
            .or_default();

        let stamp = transform.stamp;
        match samples.binary_search_by(|(t, _)| t.cmp(&stamp)) {
            Ok(at) => samples[at] = (stamp, transform.transform),
            Err(at) => samples.insert(at, (stamp, transform.transform)),
        }

        if let Some((newest, _)) = samples.last().copied() {
            let cache_time = self.cache_time;
            samples.retain(|(t, _)| newest.seconds_since(t) <= cache_time);
        }
    }

    /// Number of frames pairs known to the buffer, static and dynamic.
    pub fn edge_count(&self) -> usize {
        self.static_edges.len() + self.dynamic_edges.len()
    }

    /// Transform of the single edge `parent -> child` at `stamp`.
    fn edge(&self, parent: &str, child: &str, stamp: Time, tolerance: f64) -> Option<Pose> {
        let key = (parent.to_string(), child.to_string());
        if let Some(pose) = self.static_edges.get(&key) {
            return Some(*pose);
        }
        let samples = self.dynamic_edges.get(&key)?;
        sample_at(samples, stamp, tolerance)
    }
}

/// Interpolates between the samples bracketing `stamp`. Outside the stored interval the
/// nearest sample is used only if it is not further away than `tolerance`.
fn sample_at(samples: &[(Time, Pose)], stamp: Time, tolerance: f64) -> Option<Pose> {
    let after = samples.partition_point(|(t, _)| *t <= stamp);
    if after == 0 {
        let (first_stamp, first) = samples.first()?;
        return (first_stamp.seconds_since(&stamp) <= tolerance).then_some(*first);
    }

    let (before_stamp, before) = samples[after - 1];
    if before_stamp == stamp {
        return Some(before);
    }
    if after == samples.len() {
        return (stamp.seconds_since(&before_stamp) <= tolerance).then_some(before);
    }

    let (after_stamp, next) = samples[after];
    let ratio = stamp.seconds_since(&before_stamp) / after_stamp.seconds_since(&before_stamp);
    Some(before.lerp_slerp(&next, ratio))
}

impl TransformLookup for TransformBuffer {
    fn lookup(
        &self,
        source_frame: &str,
        target_frame: &str,
        stamp: Time,
        tolerance: f64,
    ) -> Result<StampedTransform, ProjectionError> {
        if source_frame == target_frame {
            return Ok(StampedTransform::new(target_frame, source_frame, stamp, Pose::identity()));
        }

        if let Some(pose) = self.edge(target_frame, source_frame, stamp, tolerance) {
            trace!("Transform {} -> {} at {}", source_frame, target_frame, stamp);
            return Ok(StampedTransform::new(target_frame, source_frame, stamp, pose));
        }

        if let Some(pose) = self.edge(source_frame, target_frame, stamp, tolerance) {
            trace!("Inverse transform {} -> {} at {}", source_frame, target_frame, stamp);
            return Ok(StampedTransform::new(source_frame, target_frame, stamp, pose).inverse());
        }

        debug!(
            "No transform {} -> {} within {} s of {}",
            source_frame, target_frame, tolerance, stamp
        );
        Err(ProjectionError::TransformUnavailable {
            source_frame: source_frame.to_string(),
            target_frame: target_frame.to_string(),
            stamp,
        })
    }
}
