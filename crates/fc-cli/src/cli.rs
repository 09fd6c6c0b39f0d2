use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "flightcache",
    about = "FlightCache — distributed content-addressed object cache",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a resolution server over an in-memory store
    Serve(ServeArgs),
    /// List the flights and actions of a server
    List(ConnectionArgs),
    /// Run an action on a server
    Do(DoArgs),
    /// Upload a file to a server
    Put(PutArgs),
    /// Fetch a flight by descriptor
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind and advertise
    #[arg(long)]
    pub host: Option<String>,
    #[arg(long)]
    pub port: Option<u16>,
    /// Store capacity in bytes
    #[arg(long)]
    pub capacity: Option<u64>,
    /// Enable TLS with a PEM certificate chain and key
    #[arg(long, num_args = 2, value_names = ["CERT", "KEY"])]
    pub tls: Option<Vec<PathBuf>>,
    /// Require client certificates signed by --client-ca
    #[arg(long)]
    pub verify_client: bool,
    #[arg(long, value_name = "PEM")]
    pub client_ca: Option<PathBuf>,
    /// TOML server configuration; flags override it
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// Server address: `host:port` or a full location
    pub host: String,
    /// Connect over TLS
    #[arg(long)]
    pub tls: bool,
    /// Override the trusted root certificates
    #[arg(long, value_name = "PEM")]
    pub tls_roots: Option<PathBuf>,
    /// Client certificate chain and key for mutual TLS
    #[arg(long, num_args = 2, value_names = ["CERT", "KEY"])]
    pub mtls: Option<Vec<PathBuf>>,
}

#[derive(Args, Debug)]
pub struct DoArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Action to run, e.g. `healthcheck` or `shutdown`
    pub action_type: String,
}

#[derive(Args, Debug)]
pub struct PutArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// File to upload; the object id is derived from this path
    pub file: PathBuf,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
    /// Path segment of the descriptor (repeatable)
    #[arg(short, long = "path", conflicts_with = "command", required_unless_present = "command")]
    pub path: Vec<String>,
    /// Command descriptor
    #[arg(short, long)]
    pub command: Option<String>,
    /// Write the payload to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
