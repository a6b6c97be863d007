#![warn(clippy::all)]

use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::{value_t, App, Arg};
use log::{info, warn};
use obstacle_algorithms::{
    collector::ObstacleDetector,
    config::{ObstacleConfig, DEFAULT_CLUSTER_SIZE_THRESHOLD, DEFAULT_EPS, DEFAULT_TILE_SIZE},
};
use obstacle_core::pointcloud::PointCloud;
use obstacle_io::{
    ascii::{AsciiPointReader, FORMAT_LITERALS_HELP},
    las::{path_is_las_file, LasPointReader},
    obstacle_db::ObstacleDatabaseWriter,
};

struct Args {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub format: String,
    pub delimiter: String,
    pub header_lines: usize,
    pub config: ObstacleConfig,
}

fn get_args() -> Result<Args> {
    let eps = DEFAULT_EPS.to_string();
    let cluster_threshold = DEFAULT_CLUSTER_SIZE_THRESHOLD.to_string();
    let tile_size = DEFAULT_TILE_SIZE.to_string();
    let format_help = format!(
        "Format of the columns of a delimited text input file, one literal per column:\n{}",
        FORMAT_LITERALS_HELP
    );

    let matches = App::new("detect_obstacles")
    .version("0.1")
    .about("Extracts obstacle volumes from a point cloud of non-ground LIDAR returns and writes them as an obstacle database")
    .arg(Arg::with_name("INPUT").short("i").long("input").takes_value(true).value_name("INPUT").help("Input point file. Files with a .las or .laz extension are read as LAS with a HeightAboveGround extra bytes attribute, all other files as delimited text").required(true))
    .arg(Arg::with_name("OUTPUT").short("o").long("output").takes_value(true).value_name("OUTPUT").help("Output obstacle database (XML)").required(true))
    .arg(Arg::with_name("FORMAT").long("format").takes_value(true).value_name("FORMAT").help(&format_help).default_value("xyzh"))
    .arg(Arg::with_name("DELIMITER").long("delimiter").takes_value(true).value_name("DELIMITER").help("Column delimiter of a delimited text input file").default_value(","))
    .arg(Arg::with_name("HEADER_LINES").long("header-lines").takes_value(true).value_name("N").help("Number of lines to skip at the start of a delimited text input file").default_value("0"))
    .arg(Arg::with_name("EPS").long("eps").takes_value(true).value_name("EPS").help("Neighbourhood radius of the clustering").default_value(&eps))
    .arg(Arg::with_name("MIN_POINTS").long("min-points").takes_value(true).value_name("MIN_POINTS").help("Minimum number of points within EPS (including the point itself) for a core point").required(true))
    .arg(Arg::with_name("CLUSTER_THRESHOLD").long("cluster-threshold").takes_value(true).value_name("EXTENT").help("Clusters with a larger x- or y-extent are split into tiles").default_value(&cluster_threshold))
    .arg(Arg::with_name("TILE_SIZE").long("tile-size").takes_value(true).value_name("SIZE").help("Side length of the tiles of split clusters").default_value(&tile_size))
    .get_matches();

    let input_file: PathBuf = matches
        .value_of("INPUT")
        .context("Missing input file")?
        .into();
    let output_file: PathBuf = matches
        .value_of("OUTPUT")
        .context("Missing output file")?
        .into();
    if output_file.exists() {
        warn!("Output file {} will be overwritten", output_file.display());
    }

    let config = ObstacleConfig::new(value_t!(matches, "MIN_POINTS", usize)?)
        .with_eps(value_t!(matches, "EPS", f64)?)
        .with_cluster_size_threshold(value_t!(matches, "CLUSTER_THRESHOLD", f64)?)
        .with_tile_size(value_t!(matches, "TILE_SIZE", f64)?);
    config.validate()?;

    Ok(Args {
        input_file,
        output_file,
        format: matches.value_of("FORMAT").unwrap_or("xyzh").to_string(),
        delimiter: matches.value_of("DELIMITER").unwrap_or(",").to_string(),
        header_lines: value_t!(matches, "HEADER_LINES", usize)?,
        config,
    })
}

fn read_points(args: &Args) -> Result<PointCloud> {
    if path_is_las_file(&args.input_file) {
        LasPointReader::from_path(&args.input_file)?.read_all()
    } else {
        AsciiPointReader::from_path(&args.input_file, &args.format, &args.delimiter)?
            .with_header_lines(args.header_lines)
            .read_all()
    }
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let args = get_args()?;

    let timer = Instant::now();
    let cloud = read_points(&args)
        .with_context(|| format!("Could not read points from {}", args.input_file.display()))?;
    info!(
        "Read {} points from {} in {:.3}s",
        cloud.len(),
        args.input_file.display(),
        timer.elapsed().as_secs_f64()
    );

    let timer = Instant::now();
    let detector = ObstacleDetector::from_config(&args.config)?;
    let records = detector.detect(&cloud)?;
    info!(
        "Detected {} obstacles in {:.3}s",
        records.len(),
        timer.elapsed().as_secs_f64()
    );

    let mut writer = ObstacleDatabaseWriter::from_path(&args.output_file)?;
    writer.write(&records)?;
    info!("Wrote obstacle database {}", args.output_file.display());

    Ok(())
}
