//! Helper functions

use crate::laser_scan::LaserScan;

/// One line summary of the scan: header, number of returns and the nearest obstacle.
pub fn describe_scan(scan: &LaserScan) -> String {
    let nearest = match scan.nearest() {
        Some((index, range)) => format!(
            "nearest {:.3} m at {:.1}°",
            range,
            scan.angle_of(index).to_degrees()
        ),
        None => "no returns".to_string(),
    };
    format!(
        "[{} @ {}] {}/{} bins, {}",
        scan.header.frame_id,
        scan.header.stamp,
        scan.valid_count(),
        scan.ranges.len(),
        nearest
    )
}

/// Formatting of numbers for YAML output, including infinities.
pub(crate) fn yaml_number(x: f64) -> String {
    if x.is_nan() {
        ".nan".to_string()
    } else if x == f64::INFINITY {
        ".inf".to_string()
    } else if x == f64::NEG_INFINITY {
        "-.inf".to_string()
    } else {
        format!("{}", x)
    }
}

/// Joins namespace and topic the way ROS remapping does: `scanner` + `cloud` gives
/// `scanner/cloud`, an empty namespace leaves the topic unchanged.
pub fn resolve_topic(namespace: &str, topic: &str) -> String {
    let namespace = namespace.trim_end_matches('/');
    let topic = topic.trim_start_matches('/');
    if namespace.is_empty() {
        topic.to_string()
    } else {
        format!("{}/{}", namespace, topic)
    }
}
