#[cfg(test)]
mod tests {
    use crate::parameters::Parameters;
    use crate::point_cloud::{Header, PointCloud, RawPointCloud, Time};
    use crate::projection_error::ProjectionError;
    use crate::projector::Projector;
    use crate::scan_traits::{Pose, BASE_LINK, LIDAR_FRAME};
    use crate::transform_buffer::{StampedTransform, TransformBuffer};
    use approx::assert_abs_diff_eq;
    use nalgebra::{Point3, Translation3, UnitQuaternion, Vector3};
    use std::f64::consts::PI;

    const STAMP: Time = Time { sec: 100, nanosec: 0 };

    fn cloud(frame: &str, points: Vec<Point3<f64>>) -> PointCloud {
        PointCloud::new(Header::new(frame, STAMP), points)
    }

    /// Full circle, half degree bins, as in the piper example
    fn circle_parameters() -> Parameters {
        Parameters {
            target_frame: BASE_LINK.to_string(),
            min_height: 0.4,
            max_height: 1.5,
            angle_min: -PI,
            angle_max: PI,
            angle_increment: PI / 360.0,
            range_min: 0.3,
            range_max: 40.0,
            use_inf: true,
            ..Parameters::piper_unilidar()
        }
    }

    fn projector(parameters: Parameters) -> Projector {
        Projector::new(parameters).expect("Parameters must be valid")
    }

    fn finite_bins(ranges: &[f64]) -> Vec<(usize, f64)> {
        ranges
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, r)| r.is_finite())
            .collect()
    }

    #[test]
    fn test_bin_count_matches_angles() {
        for (angle_min, angle_max, increment) in [
            (-PI, PI, PI / 360.0),
            (-PI / 2.0, PI / 2.0, PI / 180.0),
            (-1.0, 1.0, 0.3),
            (0.0, 0.1, 0.25),
            (-3.141592654, 3.141592654, 0.003141592),
        ] {
            let parameters = Parameters {
                angle_min,
                angle_max,
                angle_increment: increment,
                ..circle_parameters()
            };
            let expected = ((angle_max - angle_min) / increment).ceil() as usize;
            let projector = projector(parameters);
            let scan = projector
                .project(&cloud(BASE_LINK, vec![Point3::new(1.0, 0.1, 1.0)]), &Pose::identity())
                .unwrap();
            assert_eq!(scan.ranges.len(), expected);
            assert_eq!(projector.bin_count(), expected);
        }
    }

    #[test]
    fn test_empty_cloud_all_sentinel() {
        let projector = projector(circle_parameters());
        let scan = projector.project(&cloud(BASE_LINK, vec![]), &Pose::identity()).unwrap();
        assert!(!scan.ranges.is_empty());
        assert!(scan.ranges.iter().all(|r| *r == f64::INFINITY));

        let projector = projector_bounded();
        let scan = projector.project(&cloud(BASE_LINK, vec![]), &Pose::identity()).unwrap();
        assert!(scan.ranges.iter().all(|r| *r == 41.0));
    }

    fn projector_bounded() -> Projector {
        projector(Parameters {
            use_inf: false,
            inf_epsilon: 1.0,
            ..circle_parameters()
        })
    }

    #[test]
    fn test_piper_example() {
        // One point at (1, 0, 0.5) in the target frame: 720 bins, the one at angle 0 (index 360)
        // reports 1.0
        let projector = projector(circle_parameters());
        let scan = projector
            .project(&cloud(BASE_LINK, vec![Point3::new(1.0, 0.0, 0.5)]), &Pose::identity())
            .unwrap();

        assert_eq!(scan.ranges.len(), 720);
        let finite = finite_bins(&scan.ranges);
        assert_eq!(finite.len(), 1);
        let (index, range) = finite[0];
        assert_eq!(index, 360);
        assert_abs_diff_eq!(range, 1.0, epsilon = 1e-12);
        assert!(scan.angle_of(index).abs() <= scan.angle_increment + 1e-9);
        assert_eq!(
            scan.ranges.iter().filter(|r| **r == f64::INFINITY).count(),
            scan.ranges.len() - 1
        );
    }

    #[test]
    fn test_single_point_lands_in_its_bin() {
        let parameters = Parameters {
            angle_min: -1.0,
            angle_max: 1.0,
            angle_increment: 0.25,
            ..circle_parameters()
        };
        let projector = projector(parameters);
        // angle 0.6 rad, range 2.0 -> bin (0.6 + 1.0) / 0.25 = 6.4 -> 6
        let angle: f64 = 0.6;
        let point = Point3::new(2.0 * angle.cos(), 2.0 * angle.sin(), 1.0);
        let scan = projector.project(&cloud(BASE_LINK, vec![point]), &Pose::identity()).unwrap();
        assert_eq!(scan.ranges.len(), 8);
        for (index, range) in scan.ranges.iter().enumerate() {
            if index == 6 {
                assert_abs_diff_eq!(*range, 2.0, epsilon = 1e-12);
            } else {
                assert_eq!(*range, f64::INFINITY, "bin {}", index);
            }
        }
    }

    #[test]
    fn test_nearest_wins() {
        let projector = projector(circle_parameters());
        let points = vec![
            Point3::new(3.0, 0.001, 1.0),
            Point3::new(1.5, 0.0005, 0.5),
            Point3::new(2.0, 0.0007, 0.8),
        ];
        let scan = projector.project(&cloud(BASE_LINK, points), &Pose::identity()).unwrap();
        let finite = finite_bins(&scan.ranges);
        assert_eq!(finite.len(), 1);
        assert_abs_diff_eq!(finite[0].1, (1.5f64).hypot(0.0005), epsilon = 1e-12);
    }

    #[test]
    fn test_height_limits_inclusive() {
        let projector = projector(circle_parameters());
        let eps = 1e-9;
        let cases = [
            (0.4 - eps, false),
            (0.4, true),
            (1.5, true),
            (1.5 + eps, false),
            (-10.0, false),
        ];
        for (z, kept) in cases {
            let scan = projector
                .project(&cloud(BASE_LINK, vec![Point3::new(1.0, 1.0, z)]), &Pose::identity())
                .unwrap();
            assert_eq!(scan.valid_count() == 1, kept, "height {}", z);
        }
    }

    #[test]
    fn test_range_limits() {
        let projector = projector(circle_parameters());
        for (x, kept) in [(0.29, false), (0.3, true), (40.0, true), (40.01, false)] {
            let scan = projector
                .project(&cloud(BASE_LINK, vec![Point3::new(x, 0.0, 1.0)]), &Pose::identity())
                .unwrap();
            assert_eq!(scan.valid_count() == 1, kept, "range {}", x);
        }
    }

    #[test]
    fn test_close_point_does_not_hide_real_obstacle() {
        // Noise at 0.1 m is rejected before binning, the obstacle behind it is reported
        let projector = projector(circle_parameters());
        let points = vec![Point3::new(0.1, 0.0, 1.0), Point3::new(5.0, 0.0, 1.0)];
        let scan = projector.project(&cloud(BASE_LINK, points), &Pose::identity()).unwrap();
        let finite = finite_bins(&scan.ranges);
        assert_eq!(finite.len(), 1);
        assert_abs_diff_eq!(finite[0].1, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_uses_bounded_marker() {
        let projector = projector_bounded();
        let points = vec![Point3::new(50.0, 0.0, 1.0), Point3::new(0.0, 7.0, 1.0)];
        let scan = projector.project(&cloud(BASE_LINK, points), &Pose::identity()).unwrap();
        assert_eq!(scan.valid_count(), 1);
        assert!(scan.ranges.iter().all(|r| *r == 41.0 || (*r - 7.0).abs() < 1e-12));
        // The marker is distinguishable from a real return at range_max
        assert!(!scan.is_valid_range(41.0));
    }

    #[test]
    fn test_angle_limits() {
        let parameters = Parameters {
            angle_min: -PI / 2.0,
            angle_max: PI / 2.0,
            angle_increment: PI / 180.0,
            ..circle_parameters()
        };
        let projector = projector(parameters);
        // Behind the sensor: outside the front half
        let behind = projector
            .project(&cloud(BASE_LINK, vec![Point3::new(-2.0, 0.1, 1.0)]), &Pose::identity())
            .unwrap();
        assert_eq!(behind.valid_count(), 0);

        // Exactly at angle_max lands in the last bin
        let left = projector
            .project(&cloud(BASE_LINK, vec![Point3::new(0.0, 2.0, 1.0)]), &Pose::identity())
            .unwrap();
        let finite = finite_bins(&left.ranges);
        assert_eq!(finite.len(), 1);
        assert_eq!(finite[0].0, left.ranges.len() - 1);
    }

    #[test]
    fn test_non_finite_points_skipped() {
        let projector = projector(circle_parameters());
        let points = vec![
            Point3::new(f64::NAN, 1.0, 1.0),
            Point3::new(1.0, f64::INFINITY, 1.0),
            Point3::new(2.0, 0.0, 1.0),
        ];
        let (scan, rejections) = projector
            .project_counting(&cloud(BASE_LINK, points), &Pose::identity())
            .unwrap();
        assert_eq!(rejections.not_finite, 2);
        assert_eq!(rejections.accepted, 1);
        assert_eq!(scan.valid_count(), 1);
    }

    #[test]
    fn test_transform_is_applied() {
        // Lidar 1 m above the base, rotated 90° about z: lidar x axis points along base y
        let projector = projector(circle_parameters());
        let lidar_in_base = Pose::from_parts(
            Translation3::new(0.0, 0.0, 1.0),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), PI / 2.0),
        );
        // At z = -0.5 in the lidar frame, so 0.5 in base_link
        let scan = projector
            .project(&cloud(LIDAR_FRAME, vec![Point3::new(2.0, 0.0, -0.5)]), &lidar_in_base)
            .unwrap();
        assert_eq!(scan.header.frame_id, BASE_LINK);
        let finite = finite_bins(&scan.ranges);
        assert_eq!(finite.len(), 1);
        let (index, range) = finite[0];
        assert_abs_diff_eq!(range, 2.0, epsilon = 1e-9);
        assert_abs_diff_eq!(scan.angle_of(index), PI / 2.0, epsilon = scan.angle_increment + 1e-9);

        // Without the lift the point would be below min_height
        let scan = projector
            .project(&cloud(LIDAR_FRAME, vec![Point3::new(2.0, 0.0, -0.5)]), &Pose::identity())
            .unwrap();
        assert_eq!(scan.valid_count(), 0);
    }

    #[test]
    fn test_non_finite_transform_is_malformed() {
        let projector = projector(circle_parameters());
        let broken = Pose::from_parts(Translation3::new(f64::NAN, 0.0, 0.0), UnitQuaternion::identity());
        let outcome = projector.project(&cloud(LIDAR_FRAME, vec![]), &broken);
        assert!(matches!(outcome, Err(ProjectionError::MalformedInput(_))));
    }

    #[test]
    fn test_deterministic() {
        let projector = projector(Parameters::piper_unilidar());
        let points: Vec<Point3<f64>> = (0..2000)
            .map(|i| {
                let a = i as f64 * 0.0137;
                Point3::new((1.0 + a).cos() * (0.5 + a), (1.0 + a).sin() * (0.5 + a), 0.4 + (a % 1.1))
            })
            .collect();
        let cloud = cloud(BASE_LINK, points);
        let first = projector.project(&cloud, &Pose::identity()).unwrap();
        let second = projector.project(&cloud, &Pose::identity()).unwrap();
        assert_eq!(first.ranges.len(), second.ranges.len());
        assert!(first
            .ranges
            .iter()
            .zip(second.ranges.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits()));
        assert_eq!(first, second);
    }

    #[test]
    fn test_scan_metadata() {
        let parameters = Parameters::piper_unilidar();
        let projector = projector(parameters.clone());
        let scan = projector.project(&cloud(BASE_LINK, vec![]), &Pose::identity()).unwrap();
        assert_eq!(scan.header, Header::new(BASE_LINK, STAMP));
        assert_eq!(scan.angle_min, parameters.angle_min);
        assert_eq!(scan.angle_max, parameters.angle_max);
        assert_eq!(scan.angle_increment, parameters.angle_increment);
        assert_eq!(scan.scan_time, 0.2);
        assert_eq!(scan.time_increment, 0.0);
        assert_eq!(scan.range_min, 0.3);
        assert_eq!(scan.range_max, 40.0);
        assert!(scan.intensities.is_empty());
    }

    #[test]
    fn test_empty_target_frame_uses_cloud_frame() {
        let parameters = Parameters { target_frame: String::new(), ..circle_parameters() };
        let projector = projector(parameters);
        // Empty buffer: the lookup must not be needed
        let transforms = TransformBuffer::default();
        let scan = projector
            .project_with(&cloud(LIDAR_FRAME, vec![Point3::new(1.0, 0.0, 1.0)]), &transforms)
            .unwrap();
        assert_eq!(scan.header.frame_id, LIDAR_FRAME);
        assert_eq!(scan.valid_count(), 1);
    }

    #[test]
    fn test_project_with_static_transform() {
        let projector = projector(circle_parameters());
        let mut transforms = TransformBuffer::default();
        transforms.set_static(StampedTransform::from_xyz_quaternion(
            BASE_LINK,
            LIDAR_FRAME,
            [0.0, 0.0, 0.5],
            [0.0, 0.0, 0.0, 1.0],
        ));
        let scan = projector
            .project_with(&cloud(LIDAR_FRAME, vec![Point3::new(1.0, 0.0, 0.0)]), &transforms)
            .unwrap();
        assert_eq!(scan.valid_count(), 1);
    }

    #[test]
    fn test_project_with_missing_transform() {
        let projector = projector(circle_parameters());
        let transforms = TransformBuffer::default();
        match projector.project_with(&cloud("camera", vec![Point3::new(1.0, 0.0, 1.0)]), &transforms) {
            Err(ProjectionError::TransformUnavailable { source_frame, target_frame, stamp }) => {
                assert_eq!(source_frame, "camera");
                assert_eq!(target_frame, BASE_LINK);
                assert_eq!(stamp, STAMP);
            }
            other => panic!("Expected TransformUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_project_raw() {
        let projector = projector(circle_parameters());
        let transforms = TransformBuffer::default();
        let raw = RawPointCloud::from_xyz32(
            Header::new(BASE_LINK, STAMP),
            &[Point3::new(1.0, 0.0, 1.0), Point3::new(0.0, -2.0, 1.0)],
        );
        let scan = projector.project_raw(&raw, &transforms).unwrap();
        assert_eq!(scan.valid_count(), 2);

        let mut broken = raw.clone();
        broken.fields.clear();
        assert!(matches!(
            projector.project_raw(&broken, &transforms),
            Err(ProjectionError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let parameters = Parameters { angle_increment: 0.0, ..circle_parameters() };
        assert!(Projector::new(parameters).is_err());
    }
}
