//! Projection of many independent clouds. Every job owns its cloud and transform; the projector
//! is shared read-only. With the `parallel` feature the jobs run on the rayon thread pool.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::laser_scan::LaserScan;
use crate::point_cloud::PointCloud;
use crate::projection_error::ProjectionError;
use crate::projector::Projector;
use crate::scan_traits::{Pose, TransformLookup};

/// A cloud with the transform into the output frame.
#[derive(Debug, Clone)]
pub struct ProjectionJob {
    pub cloud: PointCloud,
    pub transform: Pose,
}

impl ProjectionJob {
    pub fn new(cloud: PointCloud, transform: Pose) -> Self {
        ProjectionJob { cloud, transform }
    }
}

/// Projects all jobs. Results are in the order of the jobs; a failed job does not affect others.
#[cfg(feature = "parallel")]
pub fn project_batch(
    projector: &Projector,
    jobs: Vec<ProjectionJob>,
) -> Vec<Result<LaserScan, ProjectionError>> {
    debug!("Projecting {} clouds in parallel", jobs.len());
    jobs.into_par_iter()
        .map(|job| projector.project(&job.cloud, &job.transform))
        .collect()
}

/// Sequential version, used when built without rayon.
#[cfg(not(feature = "parallel"))]
pub fn project_batch(
    projector: &Projector,
    jobs: Vec<ProjectionJob>,
) -> Vec<Result<LaserScan, ProjectionError>> {
    debug!("Projecting {} clouds", jobs.len());
    jobs.into_iter()
        .map(|job| projector.project(&job.cloud, &job.transform))
        .collect()
}

/// Projects the clouds, looking up the transform of each one from the shared provider.
#[cfg(feature = "parallel")]
pub fn project_batch_with(
    projector: &Projector,
    clouds: Vec<PointCloud>,
    transforms: &dyn TransformLookup,
) -> Vec<Result<LaserScan, ProjectionError>> {
    debug!("Projecting {} clouds in parallel", clouds.len());
    clouds
        .into_par_iter()
        .map(|cloud| projector.project_with(&cloud, transforms))
        .collect()
}

#[cfg(not(feature = "parallel"))]
pub fn project_batch_with(
    projector: &Projector,
    clouds: Vec<PointCloud>,
    transforms: &dyn TransformLookup,
) -> Vec<Result<LaserScan, ProjectionError>> {
    debug!("Projecting {} clouds", clouds.len());
    clouds
        .into_iter()
        .map(|cloud| projector.project_with(&cloud, transforms))
        .collect()
}
