use log::error;
use sidecar::config::Config;
use sidecar::network::Sidecar;
use sidecar::reporter::Reporter;

/// Main-method of the sidecar.
/// Validates the environment, binds the UDP socket, fires the startup
/// reports, then services datagrams until a socket error or Ctrl+C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Configuration is validated before the socket binds; a missing value
    // exits non-zero without ever processing a datagram.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            error!("configuration error: {}", error);
            eprintln!("configuration error: {}", error);
            std::process::exit(1);
        }
    };

    let sidecar = Sidecar::bind(config, Reporter::new()).await?;
    sidecar.announce_startup();

    tokio::select! {
        result = sidecar.run() => {
            if let Err(e) = &result {
                error!("listener terminated: {}", e);
            }
            Ok(result?)
        }
        _ = tokio::signal::ctrl_c() => {
            println!("Received Ctrl+C, shutting down gracefully...");
            Ok(())
        }
    }
}
