//! Hardcoded projection parameters: node defaults and the piper lidar setup

use crate::parameters::Parameters;
use crate::scan_traits::BASE_LINK;
use std::f64::consts::PI;

impl Default for Parameters {
    /// Defaults of the pointcloud_to_laserscan node: 180° scan in front of the sensor with
    /// 1° bins, no height or distance limits, scan in the cloud frame.
    fn default() -> Self {
        Parameters {
            target_frame: String::new(),
            transform_tolerance: 0.01,
            min_height: f64::NEG_INFINITY,
            max_height: f64::INFINITY,
            angle_min: -PI / 2.0,
            angle_max: PI / 2.0,
            angle_increment: PI / 180.0,
            scan_time: 1.0 / 30.0,
            range_min: 0.0,
            range_max: f64::INFINITY,
            use_inf: true,
            inf_epsilon: 1.0,
        }
    }
}

impl Parameters {
    /// Unitree lidar on the piper platform. Full circle scan in `base_link` from obstacles
    /// between 0.4 and 1.5 m above the base, ignoring returns closer than 0.3 m (the arm
    /// and the platform itself).
    pub fn piper_unilidar() -> Self {
        Parameters {
            target_frame: BASE_LINK.to_string(),
            transform_tolerance: 0.01,
            min_height: 0.40,
            max_height: 1.5,
            angle_min: -3.141592654, // -M_PI
            angle_max: 3.141592654, // M_PI
            angle_increment: 0.003141592, // M_PI / 1000
            scan_time: 0.2,
            range_min: 0.3,
            range_max: 40.0,
            use_inf: true,
            inf_epsilon: 1.0,
        }
    }

    /// Same as [`Parameters::piper_unilidar`] but bins without return are reported as
    /// `range_max + inf_epsilon` rather than infinity. Some consumers cannot handle infinity.
    pub fn piper_unilidar_bounded() -> Self {
        Parameters {
            use_inf: false,
            ..Self::piper_unilidar()
        }
    }

    /// Looks up a preset by name, used by the command line tool.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "piper" | "piper_unilidar" => Some(Self::piper_unilidar()),
            "piper_bounded" | "piper_unilidar_bounded" => Some(Self::piper_unilidar_bounded()),
            _ => None,
        }
    }
}
