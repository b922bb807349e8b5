//! Heat-up statistics
//!
//! Analyzes every daily SCADA log of a directory and writes the per-day
//! results and the per-sensor summary statistics reports

use chrono::NaiveDate;
use indicatif::{ProgressBar, ProgressIterator};
use oven_heatup::{aggregate, report, Aggregator, Config, ScadaLog};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "heatup-stats", about = "Oven heat-up statistics")]
struct Opt {
    /// Path to the TOML configuration file
    #[structopt(short, long)]
    config: Option<PathBuf>,
    /// Path to the directory of daily logs
    #[structopt(short, long)]
    data_dir: Option<PathBuf>,
    /// Path to the reports directory
    #[structopt(short, long)]
    output_dir: Option<PathBuf>,
    /// Plot the daily heating curves
    #[structopt(short, long)]
    plot: bool,
}

#[cfg(feature = "plot")]
fn heating_curve(config: &Config, date: NaiveDate, log: &ScadaLog) {
    match oven_heatup::plot::save_heating_curves(
        log,
        &config.sensor_targets,
        date,
        &config.output_dir,
    ) {
        Ok(path) => log::info!("Heating curves saved to {:?}", path),
        Err(e) => log::warn!("Heating curves of {}: {}", date, e),
    }
}
#[cfg(not(feature = "plot"))]
fn heating_curve(_config: &Config, _date: NaiveDate, _log: &ScadaLog) {}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();

    let mut config = Config::load(opt.config.as_ref())?;
    if let Some(arg) = opt.data_dir {
        config = config.data_dir(arg);
    }
    if let Some(arg) = opt.output_dir {
        config = config.output_dir(arg);
    }
    if opt.plot && cfg!(not(feature = "plot")) {
        log::warn!("heating curves are only available with the `plot` feature");
    }

    let files = aggregate::log_files(&config.data_dir)?;
    println!("{} logs in {:?}", files.len(), config.data_dir);
    let pb = ProgressBar::new(files.len() as u64);
    let mut aggregator = Aggregator::new(&config.sensor_targets);
    for file in files.iter().progress_with(pb) {
        let Some((date, log)) = aggregator.add_file(file) else {
            continue;
        };
        if opt.plot {
            heating_curve(&config, date, &log);
        }
    }

    let summary = aggregator.summary();
    let (detail, stats) = report::write_reports(
        &config.output_dir,
        aggregator.results(),
        &summary,
        &config.sensor_targets,
    )?;
    for skipped in aggregator.skipped() {
        println!("Error processing {:?}: {}", skipped.path, skipped.reason);
    }
    println!("Analysis complete! Results saved to {:?}", config.output_dir);
    println!("Report: {:?}", detail);
    println!("Summary: {:?}", stats);

    Ok(())
}
