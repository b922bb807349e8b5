use oven_heatup::resample::{resample_file, INTERVAL_SECONDS};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "resample", about = "Resampling of per-second SCADA logs")]
struct Opt {
    /// Path to the per-second log
    #[structopt(parse(from_os_str))]
    input: PathBuf,
    /// Path to the resampled logs directory
    #[structopt(short, long, default_value = "30s_sampled_data")]
    output_dir: PathBuf,
    /// Resampling interval [s]
    #[structopt(short, long, default_value = "30")]
    interval: i64,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    if opt.interval != INTERVAL_SECONDS {
        log::info!("resampling every {}s", opt.interval);
    }
    let path = resample_file(&opt.input, &opt.output_dir, opt.interval)?;
    println!("Created {}-second sampled file:\n{:?}", opt.interval, path);
    Ok(())
}
