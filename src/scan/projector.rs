//! Projection of a 3D point cloud into a planar laser scan.
//!
//! Every point is moved into the target frame, kept if its height is within
//! `[min_height, max_height]`, and reduced to its planar angle and range around the
//! target frame z axis. The scan reports, for each angular bin, the nearest point that
//! fell into it. Both the height and the angle limits are inclusive. Points closer than
//! `range_min` are dropped before binning, so that noise around the sensor does not show
//! up as phantom obstacles.

use tracing::{info, trace};

use crate::laser_scan::LaserScan;
use crate::parameter_error::ParameterError;
use crate::parameters::Parameters;
use crate::point_cloud::{Header, PointCloud, RawPointCloud};
use crate::projection_error::ProjectionError;
use crate::scan_traits::{Pose, TransformLookup};

/// Stateless projector. Holds only the validated parameters, so one instance can be shared
/// between threads and reused for any number of clouds.
#[derive(Debug, Clone)]
pub struct Projector {
    parameters: Parameters,
    bins: usize,
    sentinel: f64,
}

/// Counts of points dropped by each filter, for diagnostics.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rejections {
    pub not_finite: usize,
    pub height: usize,
    pub too_close: usize,
    pub too_far: usize,
    pub angle: usize,
    pub accepted: usize,
}

impl Projector {
    /// Validates the parameters and builds the projector. This is the only place the
    /// configuration is checked.
    pub fn new(parameters: Parameters) -> Result<Self, ParameterError> {
        parameters.validate()?;
        let bins = parameters.bin_count();
        let sentinel = parameters.sentinel();
        info!(
            "Projector ready: {} bins of {:.5} rad in '{}', heights [{}, {}], ranges [{}, {}]",
            bins,
            parameters.angle_increment,
            parameters.target_frame,
            parameters.min_height,
            parameters.max_height,
            parameters.range_min,
            parameters.range_max
        );
        Ok(Projector {
            parameters,
            bins,
            sentinel,
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Number of ranges in every produced scan.
    pub fn bin_count(&self) -> usize {
        self.bins
    }

    /// Value reported for bins without a valid return.
    pub fn sentinel(&self) -> f64 {
        self.sentinel
    }

    /// Frame of the produced scan: the target frame, or the cloud frame if none is configured.
    pub fn output_frame<'a>(&'a self, cloud: &'a PointCloud) -> &'a str {
        if self.parameters.target_frame.is_empty() {
            &cloud.header.frame_id
        } else {
            &self.parameters.target_frame
        }
    }

    /// Projects the cloud using the given transform from the cloud frame to the output frame.
    pub fn project(&self, cloud: &PointCloud, transform: &Pose) -> Result<LaserScan, ProjectionError> {
        self.project_counting(cloud, transform).map(|(scan, _)| scan)
    }

    /// Same as [`Projector::project`], also reporting how many points each filter dropped.
    pub fn project_counting(
        &self,
        cloud: &PointCloud,
        transform: &Pose,
    ) -> Result<(LaserScan, Rejections), ProjectionError> {
        let transform_finite = transform.translation.vector.iter().all(|v| v.is_finite())
            && transform.rotation.coords.iter().all(|v| v.is_finite());
        if !transform_finite {
            return Err(ProjectionError::MalformedInput(format!(
                "transform from '{}' is not finite",
                cloud.header.frame_id
            )));
        }

        let p = &self.parameters;
        let mut ranges = vec![self.sentinel; self.bins];
        let mut rejections = Rejections::default();

        for point in &cloud.points {
            if !(point.x.is_finite() && point.y.is_finite() && point.z.is_finite()) {
                rejections.not_finite += 1;
                continue;
            }

            let point = transform.transform_point(point);
            if point.z < p.min_height || point.z > p.max_height {
                rejections.height += 1;
                continue;
            }

            let range = point.x.hypot(point.y);
            if range < p.range_min {
                rejections.too_close += 1;
                continue;
            }
            if range > p.range_max {
                rejections.too_far += 1;
                continue;
            }

            let angle = point.y.atan2(point.x);
            if angle < p.angle_min || angle > p.angle_max {
                rejections.angle += 1;
                continue;
            }

            let index = self.bin_of(angle);
            if range < ranges[index] {
                ranges[index] = range;
            }
            rejections.accepted += 1;
        }

        trace!(
            "Cloud of {} points at {}: {:?}",
            cloud.len(),
            cloud.header.stamp,
            rejections
        );

        let scan = LaserScan {
            header: Header::new(self.output_frame(cloud), cloud.header.stamp),
            angle_min: p.angle_min,
            angle_max: p.angle_max,
            angle_increment: p.angle_increment,
            time_increment: 0.0,
            scan_time: p.scan_time,
            range_min: p.range_min,
            range_max: p.range_max,
            ranges,
            intensities: Vec::new(),
        };
        Ok((scan, rejections))
    }

    /// Looks up the transform for the cloud and projects it. If the cloud is already in the
    /// output frame, the transform provider is not consulted.
    pub fn project_with(
        &self,
        cloud: &PointCloud,
        transforms: &dyn TransformLookup,
    ) -> Result<LaserScan, ProjectionError> {
        let frame = self.output_frame(cloud);
        let transform = if cloud.header.frame_id == frame {
            Pose::identity()
        } else {
            transforms
                .lookup(
                    &cloud.header.frame_id,
                    frame,
                    cloud.header.stamp,
                    self.parameters.transform_tolerance,
                )?
                .transform
        };
        self.project(cloud, &transform)
    }

    /// Decodes the packed cloud and projects it.
    pub fn project_raw(
        &self,
        raw: &RawPointCloud,
        transforms: &dyn TransformLookup,
    ) -> Result<LaserScan, ProjectionError> {
        let cloud = raw.decode()?;
        self.project_with(&cloud, transforms)
    }

    /// Bin of an angle within `[angle_min, angle_max]`. The angle exactly at `angle_max`
    /// belongs to the last bin.
    fn bin_of(&self, angle: f64) -> usize {
        let index = ((angle - self.parameters.angle_min) / self.parameters.angle_increment) as usize;
        index.min(self.bins - 1)
    }
}
