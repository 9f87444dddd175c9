//! Stream stage between the lidar driver and the scan consumer.
//!
//! The node owns the projector and a transform provider. Each incoming cloud is handled on
//! its own: a cloud that cannot be projected is logged and dropped, leaving a gap in the
//! output, and the next cloud is processed as if nothing happened.

use anyhow::Result;
use tracing::{debug, warn};

use crate::laser_scan::LaserScan;
use crate::point_cloud::{PointCloud, RawPointCloud};
use crate::projection_error::ProjectionError;
use crate::projector::Projector;
use crate::scan_traits::TransformLookup;
use crate::utils::{describe_scan, resolve_topic};

/// Namespace of the input and output topics on the piper platform.
pub const DEFAULT_NAMESPACE: &str = "scanner";

/// Input and output topic names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    pub cloud_in: String,
    pub scan: String,
}

impl Topics {
    /// `cloud_in` is remapped to `<namespace>/cloud`, `scan` to `<namespace>/scan`.
    pub fn in_namespace(namespace: &str) -> Self {
        Topics {
            cloud_in: resolve_topic(namespace, "cloud"),
            scan: resolve_topic(namespace, "scan"),
        }
    }
}

impl Default for Topics {
    fn default() -> Self {
        Self::in_namespace(DEFAULT_NAMESPACE)
    }
}

/// Message counters of the node.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NodeStats {
    pub received: usize,
    pub published: usize,
    pub dropped_no_transform: usize,
    pub dropped_malformed: usize,
}

impl NodeStats {
    pub fn dropped(&self) -> usize {
        self.dropped_no_transform + self.dropped_malformed
    }
}

pub struct ScanNode<T: TransformLookup> {
    projector: Projector,
    transforms: T,
    topics: Topics,
    stats: NodeStats,
}

impl<T: TransformLookup> ScanNode<T> {
    pub fn new(projector: Projector, transforms: T, topics: Topics) -> Self {
        debug!("Scan node {} -> {}", topics.cloud_in, topics.scan);
        ScanNode {
            projector,
            transforms,
            topics,
            stats: NodeStats::default(),
        }
    }

    pub fn projector(&self) -> &Projector {
        &self.projector
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    pub fn stats(&self) -> NodeStats {
        self.stats
    }

    /// Access to the transform provider, for instance to feed new transform samples.
    pub fn transforms_mut(&mut self) -> &mut T {
        &mut self.transforms
    }

    /// Handles one decoded cloud. Returns the scan to publish, or None if the cloud was dropped.
    pub fn on_cloud(&mut self, cloud: &PointCloud) -> Option<LaserScan> {
        self.stats.received += 1;
        let outcome = self.projector.project_with(cloud, &self.transforms);
        self.handle(outcome)
    }

    /// Handles one packed cloud as received from the driver.
    pub fn on_raw_cloud(&mut self, raw: &RawPointCloud) -> Option<LaserScan> {
        self.stats.received += 1;
        let outcome = self.projector.project_raw(raw, &self.transforms);
        self.handle(outcome)
    }

    /// Processes all clouds, handing every produced scan to `publish`. Stops only if
    /// publishing fails; dropped clouds are counted in the returned statistics.
    pub fn run<I, F>(&mut self, clouds: I, mut publish: F) -> Result<NodeStats>
    where
        I: IntoIterator<Item = PointCloud>,
        F: FnMut(&str, &LaserScan) -> Result<()>,
    {
        for cloud in clouds {
            if let Some(scan) = self.on_cloud(&cloud) {
                publish(&self.topics.scan, &scan)?;
            }
        }
        Ok(self.stats)
    }

    fn handle(&mut self, outcome: Result<LaserScan, ProjectionError>) -> Option<LaserScan> {
        match outcome {
            Ok(scan) => {
                self.stats.published += 1;
                debug!("{}: {}", self.topics.scan, describe_scan(&scan));
                Some(scan)
            }
            Err(err @ ProjectionError::TransformUnavailable { .. }) => {
                self.stats.dropped_no_transform += 1;
                warn!("{}: dropping cloud: {}", self.topics.cloud_in, err);
                None
            }
            Err(err @ ProjectionError::MalformedInput(_)) => {
                self.stats.dropped_malformed += 1;
                warn!("{}: dropping cloud: {}", self.topics.cloud_in, err);
                None
            }
        }
    }
}
