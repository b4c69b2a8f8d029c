use clap::Parser;
use color_eyre::Result;
use env_logger::Env;
use ipsectopo::config::Config;
use ipsectopo::config_loader::{self, CliOverrides};
use ipsectopo::orchestrator;
use log::info;
use std::path::PathBuf;

/// Topology generator for IPsec gateway test networks
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a topology configuration YAML file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of top-level switches (defaults to the number of interfaces, or 1)
    #[arg(short, long)]
    switches: Option<u32>,

    /// Number of gateways per switch
    #[arg(short, long)]
    gateways: Option<u32>,

    /// Number of host subnets per gateway
    #[arg(long)]
    host_subnets: Option<u32>,

    /// Number of hosts per subnet
    #[arg(short = 'n', long = "hosts")]
    hosts_per_subnet: Option<u32>,

    /// Physical interface to bridge into the next top-level switch (repeatable)
    #[arg(short, long = "interface")]
    interfaces: Vec<String>,

    /// Allow more than one host subnet per gateway
    #[arg(long)]
    multi_subnet: bool,

    /// Give every gateway the NAT capability
    #[arg(long)]
    nat: bool,

    /// Output file for the topology description (.json, .yaml or .yml)
    #[arg(short, long, default_value = "topology.json")]
    output: PathBuf,

    /// Print the address plan after writing the topology
    #[arg(long)]
    summary: bool,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            switches: self.switches,
            gateways: self.gateways,
            host_subnets: self.host_subnets,
            hosts_per_subnet: self.hosts_per_subnet,
            interfaces: self.interfaces.clone(),
            multi_subnet: self.multi_subnet,
            gateway_nat: self.nat,
        }
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let mut config = match &args.config {
        Some(path) => config_loader::load_config(path)?,
        None => Config::default(),
    };
    config_loader::apply_overrides(&mut config, &args.overrides())?;

    info!("Output file: {:?}", args.output);
    let topology = orchestrator::generate_topology(&config, &args.output)?;

    if args.summary {
        print!("{}", orchestrator::summarize(&topology));
    }

    info!("Topology generation completed successfully");
    Ok(())
}
