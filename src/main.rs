//! Entry point for the seasonal_cycle application.
//! Parses the CLI, loads the field, runs the pipeline and writes the outputs.

use clap::Parser;
use seasonal_cycle::cli::Args;
use seasonal_cycle::netcdf_io::{load_gridded_series, NetCDFWriter};
use seasonal_cycle::pipeline;
use seasonal_cycle::report::{render_text, write_json};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    println!(
        r#"
------------------------------------------------------------------
                  Mean Seasonal Cycle Extractor
          region mean -> polynomial detrend -> climatology
------------------------------------------------------------------
"#
    );

    args.parallel_config().setup_global_pool()?;
    let config = args.pipeline_config()?;

    // Open NetCDF file
    let file = netcdf::open(&args.file)?;
    println!("📂 Opened NetCDF file: {}", args.file.display());

    let field = load_gridded_series(&file, &args.load_options())?;
    let (n_time, n_lat, n_lon) = field.dim();
    println!(
        "🚀 Loaded '{}' with shape (time: {n_time}, lat: {n_lat}, lon: {n_lon})",
        field.variable()
    );

    println!(
        "⚡ Computing seasonal cycle over {} with degree {} detrending",
        config.bounds, config.degree
    );
    let output = pipeline::run(&field, &config)?;

    let style = args.report_style();
    println!("\n{}", render_text(&output, &style));

    if let Some(output_path) = &args.output_netcdf {
        NetCDFWriter::new(&file, output_path).write_output(&output, style.include_series)?;
        println!("✅ Saved result to {}", output_path.display());
    }

    if let Some(output_path) = &args.output_json {
        write_json(&output, &style, output_path)?;
        println!("✅ Saved JSON report to {}", output_path.display());
    }

    Ok(())
}
