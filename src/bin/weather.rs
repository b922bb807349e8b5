use oven_heatup::{weather::current_conditions, Config};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "weather", about = "Current weather at the oven location")]
struct Opt {
    /// Path to the TOML configuration file
    #[structopt(short, long)]
    config: Option<PathBuf>,
    /// Weather location
    #[structopt(short, long)]
    location: Option<String>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let mut config = Config::load(opt.config.as_ref())?;
    if let Some(location) = opt.location {
        config.weather.location = location;
    }
    println!("{}", current_conditions(&config.weather));
    Ok(())
}
