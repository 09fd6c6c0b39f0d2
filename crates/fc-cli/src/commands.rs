use std::net::ToSocketAddrs;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use colored::Colorize;
use fc_client::{ClientConfig, ResolutionClient};
use fc_protocol::{ClientTlsConfig, Location, TlsIdentity};
use fc_server::{FlightServer, ServerConfig, TlsConfig};
use fc_store::InMemoryObjectStore;
use fc_types::{FlightDescriptor, ObjectId};

use crate::cli::*;

/// Healthcheck polling before every client command.
const READY_TIMEOUT: Duration = Duration::from_secs(1);
const READY_ATTEMPTS: usize = 10;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::Serve(args) => cmd_serve(args).await,
        Command::List(args) => cmd_list(args).await,
        Command::Do(args) => cmd_do(args).await,
        Command::Put(args) => cmd_put(args).await,
        Command::Get(args) => cmd_get(args).await,
    }
}

fn server_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if args.host.is_some() || args.port.is_some() {
        let host = args.host.clone().unwrap_or_else(|| config.bind_addr.ip().to_string());
        let port = args.port.unwrap_or(config.bind_addr.port());
        config.bind_addr = (host.as_str(), port)
            .to_socket_addrs()
            .with_context(|| format!("resolving {host}:{port}"))?
            .next()
            .with_context(|| format!("{host} has no addresses"))?;
        if args.host.is_some() {
            config.host = Some(host);
        }
    }
    if let Some(capacity) = args.capacity {
        config.store_capacity = capacity;
    }
    if let Some([cert, key]) = args.tls.as_deref() {
        config.tls = Some(TlsConfig { cert_path: cert.clone(), key_path: key.clone() });
    }
    if args.verify_client {
        config.verify_client = true;
    }
    if let Some(ca) = &args.client_ca {
        config.client_ca_path = Some(ca.clone());
    }
    config.validate()?;
    Ok(config)
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = server_config(&args)?;
    tracing::debug!(?config, "resolved server configuration");
    let store = Arc::new(InMemoryObjectStore::with_capacity(config.store_capacity));
    let running = FlightServer::new(config, store).spawn().await?;
    println!(
        "{} Serving flights on {}",
        "✓".green().bold(),
        running.location().to_string().bold()
    );
    let handle = running.shutdown_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            handle.trigger();
        }
    });
    running.wait().await?;
    println!("Server stopped.");
    Ok(())
}

fn client_config(args: &ConnectionArgs) -> anyhow::Result<ClientConfig> {
    let config = ClientConfig::default();
    if !args.tls && args.tls_roots.is_none() && args.mtls.is_none() {
        return Ok(config);
    }
    let mut tls = ClientTlsConfig::default();
    if let Some(path) = &args.tls_roots {
        let pem = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        tls = tls.with_root(pem);
    }
    if let Some([cert, key]) = args.mtls.as_deref() {
        let identity = TlsIdentity::from_files(cert, key)
            .with_context(|| format!("reading {} / {}", cert.display(), key.display()))?;
        tls = tls.with_identity(identity);
    }
    Ok(config.with_tls(tls))
}

/// Build a scratch client and wait until the server answers `healthcheck`.
async fn connect(args: &ConnectionArgs) -> anyhow::Result<(ResolutionClient, Location)> {
    let client = ResolutionClient::new(Arc::new(InMemoryObjectStore::new()), client_config(args)?)?;
    let location = client.parse_location(&args.host)?;
    tracing::debug!(%location, "waiting for server");
    client
        .wait_for_ready(&location, READY_TIMEOUT, READY_ATTEMPTS)
        .await
        .with_context(|| format!("server at {location} is not ready"))?;
    Ok((client, location))
}

async fn cmd_list(args: ConnectionArgs) -> anyhow::Result<()> {
    let (client, location) = connect(&args).await?;

    println!("{}\n=======", "Flights".bold());
    for flight in client.list_flights(&location).await? {
        match &flight.descriptor {
            FlightDescriptor::Path(segments) => {
                let path: Vec<_> = segments.iter().map(|s| String::from_utf8_lossy(s)).collect();
                println!("Path: {}", path.join("/").cyan());
            }
            FlightDescriptor::Command(cmd) => println!("Command: {}", cmd.cyan()),
        }
        println!("Total records: {}", count_or_unknown(flight.total_records));
        println!("Total bytes: {}", count_or_unknown(flight.total_bytes));
        println!("Number of endpoints: {}", flight.endpoints.len());
        println!("Schema:\n{}", flight.schema);
        println!("---");
    }

    println!("\n{}\n=======", "Actions".bold());
    for action in client.list_actions(&location).await? {
        println!("Type: {}", action.kind.yellow());
        println!("Description: {}", action.description);
        println!("---");
    }
    Ok(())
}

fn count_or_unknown(n: i64) -> String {
    if n >= 0 { n.to_string() } else { "Unknown".into() }
}

async fn cmd_do(args: DoArgs) -> anyhow::Result<()> {
    let (client, location) = connect(&args.connection).await?;
    println!("Running action {}", args.action_type.yellow());
    for result in client.do_action(&location, &args.action_type).await? {
        println!("Got result {}", String::from_utf8_lossy(&result));
    }
    Ok(())
}

async fn cmd_put(args: PutArgs) -> anyhow::Result<()> {
    let (client, location) = connect(&args.connection).await?;
    let data = std::fs::read(&args.file).with_context(|| format!("reading {}", args.file.display()))?;
    let id = ObjectId::generate(args.file.to_string_lossy().as_bytes());
    client.put(&data, id).await?;
    let written = client.push(&id, &location).await?;
    println!("{} Uploaded {} ({} bytes)", "✓".green().bold(), args.file.display(), written);
    println!("  Object: {}", id.to_hex().yellow());
    Ok(())
}

async fn cmd_get(args: GetArgs) -> anyhow::Result<()> {
    let (client, location) = connect(&args.connection).await?;
    let descriptor = match args.command {
        Some(cmd) => FlightDescriptor::for_command(cmd),
        None => FlightDescriptor::for_path(args.path),
    };
    let info = client.get_flight_info(&descriptor, &location).await?;
    for endpoint in &info.endpoints {
        println!("Ticket: {:?}", endpoint.ticket);
        for loc in &endpoint.locations {
            println!("  {}", loc);
        }
    }
    let data = client.redeem(&info, &location).await?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, &data).with_context(|| format!("writing {}", path.display()))?;
            println!("{} Wrote {} bytes to {}", "✓".green().bold(), data.len(), path.display());
        }
        None => println!("Received {} bytes", data.len().to_string().bold()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn serve_args(argv: &[&str]) -> ServeArgs {
        let mut full = vec!["flightcache", "serve"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Serve(args) => args,
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn serve_flags_override_defaults() {
        let config = server_config(&serve_args(&["--host", "127.0.0.1", "--port", "6000", "--capacity", "1024"])).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:6000".parse().unwrap());
        assert_eq!(config.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(config.store_capacity, 1024);
    }

    #[test]
    fn serve_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("server.toml");
        std::fs::write(&path, "bind_addr = \"127.0.0.1:7000\"\nstore_capacity = 99\n").unwrap();
        let config = server_config(&serve_args(&["--config", path.to_str().unwrap(), "--port", "7001"])).unwrap();
        assert_eq!(config.bind_addr.port(), 7001);
        assert_eq!(config.store_capacity, 99);
        assert!(config.host.is_none());
    }

    #[test]
    fn verify_client_without_tls_is_rejected() {
        assert!(server_config(&serve_args(&["--verify-client"])).is_err());
    }

    #[test]
    fn plain_connection_has_no_tls() {
        let args = ConnectionArgs { host: "h:1".into(), tls: false, tls_roots: None, mtls: None };
        assert!(client_config(&args).unwrap().tls.is_none());
    }

    #[test]
    fn tls_flag_switches_scheme() {
        let args = ConnectionArgs { host: "h:1".into(), tls: true, tls_roots: None, mtls: None };
        let config = client_config(&args).unwrap();
        assert_eq!(config.parse_location("h:1").unwrap(), Location::for_tls("h", 1));
    }

    #[test]
    fn unknown_counts_render_as_unknown() {
        assert_eq!(count_or_unknown(-1), "Unknown");
        assert_eq!(count_or_unknown(12), "12");
    }
}
