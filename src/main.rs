use clap::Parser;
use log::debug;

use cypher_builder::cli::Args;
use cypher_builder::config::ConfigFile;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    debug!("running with {:?}", config);

    let output = args.command.run(&config, args.format)?;
    println!("{}", output);
    Ok(())
}
