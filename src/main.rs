use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use imu_trajectory::storage::{read_recording, TrajectoryExport};
use imu_trajectory::{compute_trajectory, DegeneratePolicy, IntegrationMethod, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "trajectory")]
#[command(about = "Reconstruct a linear trajectory from an orientation + accelerometer recording", long_about = None)]
struct Args {
    /// Recording to process (t,w,x,y,z,ax,ay,az; .csv or .csv.gz)
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Write the full trajectory as JSON here
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// JSON pipeline config; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Drift filter cutoff in Hz
    #[arg(long)]
    cutoff: Option<f64>,

    /// g → m/s² conversion factor
    #[arg(long)]
    g_to_ms2: Option<f64>,

    /// Integration rule
    #[arg(long, value_enum)]
    method: Option<IntegrationMethod>,

    /// Use identity rotation for degenerate quaternions instead of aborting
    #[arg(long)]
    substitute_identity: bool,
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    if let Some(cutoff) = args.cutoff {
        config.filter_cutoff_hz = cutoff;
    }
    if let Some(g) = args.g_to_ms2 {
        config.g_to_ms2 = g;
    }
    if let Some(method) = args.method {
        config.integration = method;
    }
    if args.substitute_identity {
        config.degenerate_policy = DegeneratePolicy::SubstituteIdentity;
    }
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();
    let config = build_config(&args)?;

    log::info!("Loading {}", args.input.display());
    log::info!(
        "  cutoff {} Hz, g→m/s² {}, method {:?}, degenerate {:?}",
        config.filter_cutoff_hz,
        config.g_to_ms2,
        config.integration,
        config.degenerate_policy
    );

    let series = read_recording(&args.input)
        .with_context(|| format!("reading recording {}", args.input.display()))?;
    let trajectory = compute_trajectory(&series, &config)?;

    let source = args.input.display().to_string();
    let export = TrajectoryExport::new(&source, &series, &trajectory);
    let stats = &export.stats;

    println!("=== Trajectory Summary ===");
    println!("  Samples:       {}", stats.sample_count);
    println!("  Duration:      {:.3} s", stats.duration_seconds);
    println!("  Mean rate:     {:.2} Hz", stats.mean_rate_hz);
    println!("  Wn (filter):   {:.5}", stats.normalized_cutoff);
    println!("  Peak speed:    {:.4} m/s", stats.peak_speed_ms);
    println!("  Path length:   {:.4} m", stats.path_length_m);
    println!(
        "  Final offset:  ({:.4}, {:.4}, {:.4}) m",
        stats.final_displacement.x, stats.final_displacement.y, stats.final_displacement.z
    );

    if let Some(out) = &args.output {
        std::fs::write(out, export.to_json_bytes()?)
            .with_context(|| format!("writing {}", out.display()))?;
        log::info!("Trajectory written to {}", out.display());
    }

    Ok(())
}
