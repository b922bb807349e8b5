//! Oven heating calculator
//!
//! Asks for the time the oven must be heated by and prints, for the current
//! weather, the latest time every sensor must start heating and the time to
//! start all the burners.

use chrono::Local;
use oven_heatup::{calculate_start_times, predict::prompt_target_time, Config};
use std::{io, path::PathBuf};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "start-time", about = "Oven burners start time calculator")]
struct Opt {
    /// Path to the TOML configuration file
    #[structopt(short, long)]
    config: Option<PathBuf>,
    /// Path to the pre-trained model (.pkl or .json)
    #[structopt(short, long)]
    model: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let mut config = Config::load(opt.config.as_ref())?;
    if let Some(arg) = opt.model {
        config = config.model_path(arg);
    }

    println!("{:=^40}", " Oven Heating Calculator ");
    let target_time = prompt_target_time(io::stdin().lock(), &mut io::stdout())?;

    match calculate_start_times(&config, Local::now().date_naive(), target_time) {
        Ok(prediction) => println!("{}", prediction),
        Err(e) => {
            let msg = error_chain(&e);
            log::error!("start time calculation failed: {}", msg);
            println!("\nError: {}", msg);
        }
    }
    Ok(())
}

fn error_chain(e: &dyn std::error::Error) -> String {
    let mut msg = e.to_string();
    let mut current = e.source();
    while let Some(cause) = current {
        msg.push_str(&format!(": {}", cause));
        current = cause.source();
    }
    msg
}
