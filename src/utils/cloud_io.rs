//! JSON input of recorded clouds and JSON lines output of scans for the command line tool.
//!
//! Cloud file layout:
//! ```json
//! [
//!   {
//!     "header": { "frame_id": "unilidar_lidar", "stamp": { "sec": 12, "nanosec": 0 } },
//!     "points": [[1.0, 0.0, 0.5], [0.2, 3.1, 1.0]]
//!   }
//! ]
//! ```
//! A record that is not a valid cloud is logged and skipped, like a malformed message on the
//! cloud topic. Infinite ranges in the scan output are written as `null`, JSON has no infinity.

use anyhow::{Context, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::warn;

use crate::laser_scan::LaserScan;
use crate::point_cloud::{Header, PointCloud};
use crate::projection_error::ProjectionError;

#[derive(Serialize, Deserialize)]
struct CloudJson {
    header: Header,
    points: Vec<[f64; 3]>,
}

#[derive(Serialize)]
struct ScanLine<'a> {
    topic: &'a str,
    scan: &'a LaserScan,
}

/// Reads the clouds of a JSON array. Fails only if the text is not a JSON array; records
/// that do not describe a cloud are skipped with a warning.
pub fn clouds_from_json(json_str: &str) -> Result<Vec<PointCloud>> {
    let records: Vec<Value> =
        serde_json::from_str(json_str).context("Failed to parse point clouds JSON")?;
    let total = records.len();
    let clouds: Vec<PointCloud> = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match cloud_from_record(record) {
            Ok(cloud) => Some(cloud),
            Err(err) => {
                warn!("Skipping cloud record {}: {}", index, err);
                None
            }
        })
        .collect();
    if clouds.len() < total {
        warn!("{} of {} cloud records skipped", total - clouds.len(), total);
    }
    Ok(clouds)
}

fn cloud_from_record(record: Value) -> Result<PointCloud, ProjectionError> {
    let record: CloudJson = serde_json::from_value(record)
        .map_err(|e| ProjectionError::MalformedInput(e.to_string()))?;
    let points = record
        .points
        .into_iter()
        .map(|[x, y, z]| Point3::new(x, y, z))
        .collect();
    Ok(PointCloud::new(record.header, points))
}

pub fn clouds_to_json(clouds: &[PointCloud]) -> Result<String> {
    let records: Vec<CloudJson> = clouds
        .iter()
        .map(|cloud| CloudJson {
            header: cloud.header.clone(),
            points: cloud.points.iter().map(|p| [p.x, p.y, p.z]).collect(),
        })
        .collect();
    serde_json::to_string_pretty(&records).context("Failed to serialize point clouds")
}

pub fn read_clouds_file<P: AsRef<Path>>(path: P) -> Result<Vec<PointCloud>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read point clouds file: {}", path.display()))?;
    clouds_from_json(&contents)
}

/// One line of output: `{"topic": ..., "scan": {...}}`.
pub fn scan_to_json_line(topic: &str, scan: &LaserScan) -> Result<String> {
    serde_json::to_string(&ScanLine { topic, scan }).context("Failed to serialize laser scan")
}
