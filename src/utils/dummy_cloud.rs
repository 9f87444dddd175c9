//! Random point clouds for trying the node without a lidar attached.

use nalgebra::Point3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::parameter_error::ParameterError;
use crate::point_cloud::{Header, PointCloud, Time};

#[derive(Debug, Clone, PartialEq)]
pub struct DummyCloudConfig {
    /// Frame the generated points are expressed in
    pub cloud_frame_id: String,

    /// Points are uniform in the cube `[-cloud_extent, cloud_extent]` along every axis
    pub cloud_extent: f64,

    /// Points per cloud
    pub cloud_size: usize,
}

impl Default for DummyCloudConfig {
    fn default() -> Self {
        DummyCloudConfig {
            cloud_frame_id: "cloud".to_string(),
            cloud_extent: 2.0,
            cloud_size: 500,
        }
    }
}

pub struct DummyCloudGenerator {
    config: DummyCloudConfig,
    rng: StdRng,
}

impl DummyCloudGenerator {
    /// Seeded generator: the same seed gives the same sequence of clouds.
    pub fn new(config: DummyCloudConfig, seed: u64) -> Result<Self, ParameterError> {
        if !config.cloud_extent.is_finite() || config.cloud_extent < 0.0 {
            return Err(ParameterError::InvalidConfig(format!(
                "cloud_extent must be finite and not negative (got {})",
                config.cloud_extent
            )));
        }
        Ok(DummyCloudGenerator {
            config,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn config(&self) -> &DummyCloudConfig {
        &self.config
    }

    pub fn generate(&mut self, stamp: Time) -> PointCloud {
        let extent = self.config.cloud_extent;
        let points = (0..self.config.cloud_size)
            .map(|_| {
                Point3::new(
                    self.rng.gen_range(-extent..=extent),
                    self.rng.gen_range(-extent..=extent),
                    self.rng.gen_range(-extent..=extent),
                )
            })
            .collect();
        PointCloud::new(Header::new(&self.config.cloud_frame_id, stamp), points)
    }

    /// `count` clouds, `period` seconds apart, starting at `start`.
    pub fn sequence(&mut self, start: Time, period: f64, count: usize) -> Vec<PointCloud> {
        let start = start.as_secs_f64();
        (0..count)
            .map(|i| self.generate(Time::from_secs_f64(start + i as f64 * period)))
            .collect()
    }
}
