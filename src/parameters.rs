//! Defines the projection parameter data structure

use crate::parameter_error::ParameterError;
use crate::utils::yaml_number;

/// Upper limit on the number of bins. A scan this large is certainly a configuration mistake
/// (for instance, angle increment given in degrees rather than radians).
pub const MAX_BINS: usize = 1 << 22;

/// Names of all recognized parameters, in the order they are written to YAML.
pub const PARAMETER_NAMES: [&str; 12] = [
    "target_frame",
    "transform_tolerance",
    "min_height",
    "max_height",
    "angle_min",
    "angle_max",
    "angle_increment",
    "scan_time",
    "range_min",
    "range_max",
    "use_inf",
    "inf_epsilon",
];

/// Parameters of the point cloud to laser scan projection. See
/// [parameters_presets.rs](parameters_presets.rs) for defaults and the piper lidar setup.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    /// Frame the scan is produced in. Empty string means the frame of the incoming cloud.
    pub target_frame: String,

    /// How far (seconds) the transform time stamp may be from the cloud time stamp.
    pub transform_tolerance: f64,

    /// Lowest point height (z in the target frame) that still counts, inclusive.
    pub min_height: f64,

    /// Highest point height (z in the target frame) that still counts, inclusive.
    pub max_height: f64,

    /// Angle of the first bin, radians.
    pub angle_min: f64,

    /// Angle where the last bin ends, radians.
    pub angle_max: f64,

    /// Width of the bin, radians.
    pub angle_increment: f64,

    /// Reported time between scans, seconds.
    pub scan_time: f64,

    /// Points closer than this are rejected (not reported as obstacles).
    pub range_min: f64,

    /// Points further than this are rejected.
    pub range_max: f64,

    /// If true, bins without return are reported as positive infinity,
    /// otherwise as `range_max + inf_epsilon`.
    pub use_inf: bool,

    /// Distance above `range_max` reported for bins without return when `use_inf` is false.
    pub inf_epsilon: f64,
}

impl Parameters {
    /// Number of bins in the produced scan, `ceil((angle_max - angle_min) / angle_increment)`.
    pub fn bin_count(&self) -> usize {
        ((self.angle_max - self.angle_min) / self.angle_increment).ceil() as usize
    }

    /// Value reported for bins that have no valid return.
    pub fn sentinel(&self) -> f64 {
        if self.use_inf {
            f64::INFINITY
        } else {
            self.range_max + self.inf_epsilon
        }
    }

    /// Checks the parameters for consistency. Called once when the projector is built.
    pub fn validate(&self) -> Result<(), ParameterError> {
        for (name, value) in self.numeric() {
            if value.is_nan() {
                return Err(invalid(format!("{} must be a number (got NaN)", name)));
            }
        }

        // Heights and range_max may be infinite to disable the limit.
        for (name, value) in [
            ("transform_tolerance", self.transform_tolerance),
            ("angle_min", self.angle_min),
            ("angle_max", self.angle_max),
            ("angle_increment", self.angle_increment),
            ("scan_time", self.scan_time),
            ("range_min", self.range_min),
            ("inf_epsilon", self.inf_epsilon),
        ] {
            if !value.is_finite() {
                return Err(invalid(format!("{} must be finite (got {})", name, value)));
            }
        }

        for (name, value) in [
            ("transform_tolerance", self.transform_tolerance),
            ("scan_time", self.scan_time),
            ("range_min", self.range_min),
            ("inf_epsilon", self.inf_epsilon),
        ] {
            if value < 0.0 {
                return Err(invalid(format!("{} must not be negative (got {})", name, value)));
            }
        }

        if self.angle_max <= self.angle_min {
            return Err(invalid(format!(
                "angle_max ({}) must be greater than angle_min ({})",
                self.angle_max, self.angle_min
            )));
        }
        if self.angle_increment <= 0.0 {
            return Err(invalid(format!(
                "angle_increment must be positive (got {})",
                self.angle_increment
            )));
        }
        if self.range_max <= self.range_min {
            return Err(invalid(format!(
                "range_max ({}) must be greater than range_min ({})",
                self.range_max, self.range_min
            )));
        }
        if !self.use_inf && !self.range_max.is_finite() {
            return Err(invalid(format!(
                "range_max must be finite when use_inf is false (got {}), empty bins \
                 would be reported as infinity",
                self.range_max
            )));
        }
        if self.min_height > self.max_height {
            return Err(invalid(format!(
                "min_height ({}) must not exceed max_height ({})",
                self.min_height, self.max_height
            )));
        }

        let ratio = (self.angle_max - self.angle_min) / self.angle_increment;
        if !ratio.is_finite() || ratio.ceil() > MAX_BINS as f64 {
            return Err(invalid(format!(
                "angle range and increment give {} bins, at most {} supported",
                ratio.ceil(),
                MAX_BINS
            )));
        }
        Ok(())
    }

    /// Convert to string yaml representation (quick viewing, saving as parameter file).
    pub fn to_yaml(&self) -> String {
        format!(
            "target_frame: \"{}\"\n\
            transform_tolerance: {}\n\
            min_height: {}\n\
            max_height: {}\n\
            angle_min: {}\n\
            angle_max: {}\n\
            angle_increment: {}\n\
            scan_time: {}\n\
            range_min: {}\n\
            range_max: {}\n\
            use_inf: {}\n\
            inf_epsilon: {}\n",
            self.target_frame,
            yaml_number(self.transform_tolerance),
            yaml_number(self.min_height),
            yaml_number(self.max_height),
            yaml_number(self.angle_min),
            yaml_number(self.angle_max),
            yaml_number(self.angle_increment),
            yaml_number(self.scan_time),
            yaml_number(self.range_min),
            yaml_number(self.range_max),
            self.use_inf,
            yaml_number(self.inf_epsilon),
        )
    }

    fn numeric(&self) -> [(&'static str, f64); 10] {
        [
            ("transform_tolerance", self.transform_tolerance),
            ("min_height", self.min_height),
            ("max_height", self.max_height),
            ("angle_min", self.angle_min),
            ("angle_max", self.angle_max),
            ("angle_increment", self.angle_increment),
            ("scan_time", self.scan_time),
            ("range_min", self.range_min),
            ("range_max", self.range_max),
            ("inf_epsilon", self.inf_epsilon),
        ]
    }
}

fn invalid(msg: String) -> ParameterError {
    ParameterError::InvalidConfig(msg)
}
