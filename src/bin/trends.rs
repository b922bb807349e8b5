use oven_heatup::{aggregate::log_files, plot::trend_plot, ScadaLog};
use std::{fs, path::PathBuf};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "trends", about = "Temperature trends of SCADA logs")]
struct Opt {
    /// Path to the logs directory
    #[structopt(parse(from_os_str))]
    data_dir: PathBuf,
    /// Path to the plots directory
    #[structopt(short, long, default_value = "30s_results")]
    output_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    fs::create_dir_all(&opt.output_dir)?;
    for file in log_files(&opt.data_dir)? {
        println!("Processing file: {:?}", file);
        let log = match ScadaLog::from_path(&file) {
            Ok(log) => log,
            Err(e) => {
                log::warn!("Skipping {:?}: {}", file, e);
                continue;
            }
        };
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let path = opt.output_dir.join(&name).with_extension("png");
        let title = format!("Sampled Temperature Trends - {}", name);
        match trend_plot(&log, &title, &path) {
            Ok(()) => println!("Saved plot to: {:?}", path),
            Err(e) => log::warn!("{:?}: {}", path, e),
        }
    }
    println!("Finished processing all files. Graphs saved in: {:?}", opt.output_dir);
    Ok(())
}
