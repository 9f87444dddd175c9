use anyhow::{Context, Result, anyhow};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing::{Level, info, warn};

use pointcloud_to_laserscan::batch::project_batch_with;
use pointcloud_to_laserscan::cloud_io::{read_clouds_file, scan_to_json_line};
use pointcloud_to_laserscan::dummy_cloud::{DummyCloudConfig, DummyCloudGenerator};
use pointcloud_to_laserscan::node::{DEFAULT_NAMESPACE, ScanNode, Topics};
use pointcloud_to_laserscan::parameters::Parameters;
use pointcloud_to_laserscan::point_cloud::{PointCloud, Time};
use pointcloud_to_laserscan::projector::Projector;
use pointcloud_to_laserscan::scan_traits::{BASE_LINK, LIDAR_FRAME};
use pointcloud_to_laserscan::transform_buffer::{StampedTransform, TransformBuffer};

/// Projects lidar point clouds into laser scans. Scans are written to stdout as JSON lines,
/// logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "pointcloud_to_laserscan", version)]
struct Args {
    /// YAML parameter file, flat or in the ROS 2 `ros__parameters` layout
    #[arg(long)]
    params: Option<PathBuf>,

    /// Built-in parameters if no file is given: default, piper, piper_bounded
    #[arg(long)]
    preset: Option<String>,

    /// Print the resolved parameters as YAML and exit
    #[arg(long)]
    print_params: bool,

    /// Namespace of the cloud and scan topics
    #[arg(long, default_value = DEFAULT_NAMESPACE)]
    scanner: String,

    /// JSON file with recorded clouds. Without it, random clouds are generated.
    #[arg(long)]
    clouds: Option<PathBuf>,

    /// Number of generated clouds
    #[arg(long, default_value_t = 10)]
    cloud_count: usize,

    /// Frame of the generated clouds
    #[arg(long, default_value = LIDAR_FRAME)]
    cloud_frame_id: String,

    /// Half size of the cube the generated points are in, meters
    #[arg(long, default_value_t = 2.0)]
    cloud_extent: f64,

    /// Points per generated cloud
    #[arg(long, default_value_t = 500)]
    cloud_size: usize,

    /// Seed of the cloud generator
    #[arg(long, default_value_t = 0)]
    seed: u64,

    // Static transform, same arguments as static_transform_publisher
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    x: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    y: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    z: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    qx: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    qy: f64,
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    qz: f64,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    qw: f64,
    #[arg(long, default_value = BASE_LINK)]
    frame_id: String,
    #[arg(long, default_value = LIDAR_FRAME)]
    child_frame_id: String,

    /// Project all clouds as one parallel batch instead of streaming them through the node
    #[arg(long)]
    batch: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn load_parameters(args: &Args) -> Result<Parameters> {
    if let Some(path) = &args.params {
        return Parameters::from_yaml_file(path)
            .with_context(|| format!("Failed to load parameters from {}", path.display()));
    }
    let name = args.preset.as_deref().unwrap_or("piper");
    Parameters::preset(name).ok_or_else(|| anyhow!("Unknown parameter preset '{}'", name))
}

fn load_clouds(args: &Args, scan_time: f64) -> Result<Vec<PointCloud>> {
    if let Some(path) = &args.clouds {
        return read_clouds_file(path);
    }
    let config = DummyCloudConfig {
        cloud_frame_id: args.cloud_frame_id.clone(),
        cloud_extent: args.cloud_extent,
        cloud_size: args.cloud_size,
    };
    let mut generator = DummyCloudGenerator::new(config, args.seed)
        .context("Invalid dummy cloud configuration")?;
    Ok(generator.sequence(Time::default(), scan_time, args.cloud_count))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let parameters = load_parameters(&args)?;
    if args.print_params {
        print!("{}", parameters.to_yaml());
        return Ok(());
    }

    let scan_time = parameters.scan_time;
    let projector = Projector::new(parameters).context("Invalid projection parameters")?;

    let mut transforms = TransformBuffer::default();
    transforms.set_static(StampedTransform::from_xyz_quaternion(
        &args.frame_id,
        &args.child_frame_id,
        [args.x, args.y, args.z],
        [args.qx, args.qy, args.qz, args.qw],
    ));

    let clouds = load_clouds(&args, scan_time)?;
    let topics = Topics::in_namespace(&args.scanner);
    info!("{} clouds on {}, scans on {}", clouds.len(), topics.cloud_in, topics.scan);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.batch {
        let total = clouds.len();
        let mut published = 0;
        for outcome in project_batch_with(&projector, clouds, &transforms) {
            match outcome {
                Ok(scan) => {
                    writeln!(out, "{}", scan_to_json_line(&topics.scan, &scan)?)?;
                    published += 1;
                }
                Err(err) => warn!("{}: dropping cloud: {}", topics.cloud_in, err),
            }
        }
        info!("Published {} of {} scans", published, total);
    } else {
        let mut node = ScanNode::new(projector, transforms, topics);
        let stats = node.run(clouds, |topic, scan| {
            writeln!(out, "{}", scan_to_json_line(topic, scan)?)?;
            Ok(())
        })?;
        info!(
            "Published {} of {} scans, {} dropped",
            stats.published,
            stats.received,
            stats.dropped()
        );
    }
    out.flush()?;
    Ok(())
}
