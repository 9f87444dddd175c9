//! Planar range scan, shaped like `sensor_msgs/LaserScan`

use crate::point_cloud::Header;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LaserScan {
    pub header: Header,

    /// Angle of the first bin, radians
    pub angle_min: f64,

    /// Upper bound of the covered angle, radians
    pub angle_max: f64,

    /// Angular width of a bin, radians
    pub angle_increment: f64,

    /// Time between measurements. Always 0: points of a cloud are treated as simultaneous.
    pub time_increment: f64,

    /// Time between scans, seconds
    pub scan_time: f64,

    pub range_min: f64,
    pub range_max: f64,

    /// One value per bin, ordered by increasing angle. A value is either within
    /// `[range_min, range_max]` or the "no return" sentinel.
    pub ranges: Vec<f64>,

    /// Never filled by the projection
    pub intensities: Vec<f64>,
}

impl LaserScan {
    /// Angle at the start of the bin `index`.
    pub fn angle_of(&self, index: usize) -> f64 {
        self.angle_min + index as f64 * self.angle_increment
    }

    /// True if the reading is a real return (not a sentinel).
    pub fn is_valid_range(&self, range: f64) -> bool {
        range.is_finite() && range >= self.range_min && range <= self.range_max
    }

    /// Number of bins holding a real return.
    pub fn valid_count(&self) -> usize {
        self.ranges.iter().filter(|r| self.is_valid_range(**r)).count()
    }

    /// Index and range of the nearest return, if any.
    pub fn nearest(&self) -> Option<(usize, f64)> {
        self.ranges
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, r)| self.is_valid_range(*r))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(ranges: Vec<f64>) -> LaserScan {
        LaserScan {
            header: Header::default(),
            angle_min: -1.0,
            angle_max: 1.0,
            angle_increment: 0.5,
            time_increment: 0.0,
            scan_time: 0.2,
            range_min: 0.3,
            range_max: 40.0,
            ranges,
            intensities: vec![],
        }
    }

    #[test]
    fn test_nearest_skips_sentinels() {
        let scan = scan(vec![f64::INFINITY, 3.0, 41.0, 2.0]);
        assert_eq!(scan.valid_count(), 2);
        assert_eq!(scan.nearest(), Some((3, 2.0)));
        assert_eq!(scan.angle_of(3), 0.5);
    }

    #[test]
    fn test_nearest_none() {
        let scan = scan(vec![f64::INFINITY; 4]);
        assert_eq!(scan.nearest(), None);
        assert_eq!(scan.valid_count(), 0);
    }
}
