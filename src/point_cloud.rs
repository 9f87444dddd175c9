//! Point cloud model as received from the lidar driver.
//!
//! The driver publishes `sensor_msgs/PointCloud2`-like messages: a packed byte buffer
//! described by a list of fields. [`RawPointCloud::decode`] extracts the x, y and z
//! coordinates from such a buffer; anything the projector cannot read is reported as
//! [`ProjectionError::MalformedInput`].

use nalgebra::Point3;
use std::fmt;

use crate::projection_error::ProjectionError;

/// Time stamp, seconds and nanoseconds as in ROS `builtin_interfaces/Time`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Time {
    pub sec: i32,
    pub nanosec: u32,
}

impl Time {
    pub fn new(sec: i32, nanosec: u32) -> Self {
        Time { sec, nanosec }
    }

    /// Stamp from seconds. Negative times keep a non-negative `nanosec` (-0.5 s is
    /// `sec = -1, nanosec = 500_000_000`). Seconds outside the `i32` range saturate to
    /// `i32::MIN` / `i32::MAX`, NaN gives zero.
    pub fn from_secs_f64(seconds: f64) -> Self {
        if seconds.is_nan() {
            return Time::default();
        }
        let seconds = seconds.clamp(i32::MIN as f64, i32::MAX as f64);
        let sec = seconds.floor();
        let nanosec = ((seconds - sec) * 1e9).round().min(999_999_999.0);
        Time {
            sec: sec as i32,
            nanosec: nanosec as u32,
        }
    }

    pub fn as_secs_f64(&self) -> f64 {
        self.sec as f64 + self.nanosec as f64 * 1e-9
    }

    /// Signed difference `self - other` in seconds.
    pub fn seconds_since(&self, other: &Time) -> f64 {
        (self.sec as i64 - other.sec as i64) as f64
            + (self.nanosec as i64 - other.nanosec as i64) as f64 * 1e-9
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:09}", self.sec, self.nanosec)
    }
}

/// Frame id and stamp of a message.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Header {
    pub frame_id: String,
    pub stamp: Time,
}

impl Header {
    pub fn new(frame_id: &str, stamp: Time) -> Self {
        Header {
            frame_id: frame_id.to_string(),
            stamp,
        }
    }
}

/// Decoded point cloud, coordinates in the `header.frame_id` frame.
/// Points may contain NaN coordinates (no return); the projector skips them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    pub header: Header,
    pub points: Vec<Point3<f64>>,
}

impl PointCloud {
    pub fn new(header: Header, points: Vec<Point3<f64>>) -> Self {
        PointCloud { header, points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Data type codes of `sensor_msgs/PointField`.
pub mod datatype {
    pub const INT8: u8 = 1;
    pub const UINT8: u8 = 2;
    pub const INT16: u8 = 3;
    pub const UINT16: u8 = 4;
    pub const INT32: u8 = 5;
    pub const UINT32: u8 = 6;
    pub const FLOAT32: u8 = 7;
    pub const FLOAT64: u8 = 8;
}

/// Describes one channel in the packed point layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PointField {
    pub name: String,
    /// Byte offset from the start of the point
    pub offset: u32,
    pub datatype: u8,
    pub count: u32,
}

impl PointField {
    pub fn new(name: &str, offset: u32, datatype: u8) -> Self {
        PointField {
            name: name.to_string(),
            offset,
            datatype,
            count: 1,
        }
    }
}

/// Packed point cloud, the wire shape of `sensor_msgs/PointCloud2`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPointCloud {
    pub header: Header,
    pub height: u32,
    pub width: u32,
    pub fields: Vec<PointField>,
    pub is_bigendian: bool,
    pub point_step: u32,
    pub row_step: u32,
    pub data: Vec<u8>,
    pub is_dense: bool,
}

/// Where and how to read one coordinate inside a point.
#[derive(Clone, Copy)]
struct Accessor {
    offset: usize,
    width: usize,
    datatype: u8,
}

impl RawPointCloud {
    /// Packs the points as an unorganized cloud (height 1) with three little-endian FLOAT32
    /// fields x, y, z. This is the layout most lidar drivers publish.
    pub fn from_xyz32(header: Header, points: &[Point3<f64>]) -> Self {
        const POINT_STEP: u32 = 12;
        let mut data = Vec::with_capacity(points.len() * POINT_STEP as usize);
        for p in points {
            data.extend_from_slice(&(p.x as f32).to_le_bytes());
            data.extend_from_slice(&(p.y as f32).to_le_bytes());
            data.extend_from_slice(&(p.z as f32).to_le_bytes());
        }
        RawPointCloud {
            header,
            height: 1,
            width: points.len() as u32,
            fields: vec![
                PointField::new("x", 0, datatype::FLOAT32),
                PointField::new("y", 4, datatype::FLOAT32),
                PointField::new("z", 8, datatype::FLOAT32),
            ],
            is_bigendian: false,
            point_step: POINT_STEP,
            row_step: POINT_STEP * points.len() as u32,
            data,
            is_dense: points.iter().all(|p| p.iter().all(|c| c.is_finite())),
        }
    }

    /// Extracts x, y, z of every point. Other fields (intensity, ring, time) are ignored.
    pub fn decode(&self) -> Result<PointCloud, ProjectionError> {
        let x = self.accessor("x")?;
        let y = self.accessor("y")?;
        let z = self.accessor("z")?;

        let point_step = self.point_step as usize;
        let row_step = self.row_step as usize;
        let width = self.width as usize;
        let height = self.height as usize;

        if width > 0 && point_step * width > row_step {
            return Err(ProjectionError::MalformedInput(format!(
                "row_step {} is shorter than width {} x point_step {}",
                row_step, width, point_step
            )));
        }
        let required = row_step * height;
        if self.data.len() < required {
            return Err(ProjectionError::MalformedInput(format!(
                "data has {} bytes, {} rows of {} bytes expected",
                self.data.len(), height, row_step
            )));
        }

        let mut points = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                let start = row * row_step + col * point_step;
                let point = &self.data[start..start + point_step];
                points.push(Point3::new(
                    self.read(point, x),
                    self.read(point, y),
                    self.read(point, z),
                ));
            }
        }
        Ok(PointCloud::new(self.header.clone(), points))
    }

    fn accessor(&self, name: &str) -> Result<Accessor, ProjectionError> {
        let field = self
            .fields
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ProjectionError::MalformedInput(format!("missing field '{}'", name)))?;

        let width = match field.datatype {
            datatype::FLOAT32 => 4,
            datatype::FLOAT64 => 8,
            other => {
                return Err(ProjectionError::MalformedInput(format!(
                    "field '{}' has datatype {}, only FLOAT32 and FLOAT64 are supported",
                    name, other
                )));
            }
        };
        let offset = field.offset as usize;
        if offset + width > self.point_step as usize {
            return Err(ProjectionError::MalformedInput(format!(
                "field '{}' at offset {} does not fit into point_step {}",
                name, offset, self.point_step
            )));
        }
        Ok(Accessor {
            offset,
            width,
            datatype: field.datatype,
        })
    }

    fn read(&self, point: &[u8], accessor: Accessor) -> f64 {
        let bytes = &point[accessor.offset..accessor.offset + accessor.width];
        match (accessor.datatype, self.is_bigendian) {
            (datatype::FLOAT64, false) => f64::from_le_bytes(to_array(bytes)),
            (datatype::FLOAT64, true) => f64::from_be_bytes(to_array(bytes)),
            (_, false) => f32::from_le_bytes(to_array(bytes)) as f64,
            (_, true) => f32::from_be_bytes(to_array(bytes)) as f64,
        }
    }
}

/// Slice length is guaranteed by the accessor width.
fn to_array<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&bytes[..N]);
    out
}
