//! UDP receive loop, command dispatch, and the reply path back to peers.

use crate::config::Config;
use crate::reporter::Reporter;
use log::{debug, error, info, warn};
use serde::Serialize;
use shared::{
    strip_trailing_newline, ActivePlayersReport, Command, Endpoint, HealthReport,
    MarkedForDeletionReport, StateReport,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;

/// Health value announced at startup.
const STARTUP_HEALTH: &str = "Healthy";
/// State value announced at startup.
const STARTUP_STATE: &str = "Assigned";

/// The sidecar's UDP endpoint and its shared handles.
///
/// The socket, configuration, and HTTP reporter all sit behind `Arc` so
/// every in-flight message task owns cheap clones and nothing else is
/// shared between tasks.
pub struct Sidecar {
    socket: Arc<UdpSocket>,
    config: Arc<Config>,
    reporter: Arc<Reporter>,
}

impl Sidecar {
    /// Binds the UDP socket described by `config`.
    pub async fn bind(config: Config, reporter: Reporter) -> Result<Self, std::io::Error> {
        let socket = Arc::new(UdpSocket::bind(config.bind_addr()).await?);
        info!("UDP server listening on {}", socket.local_addr()?);

        Ok(Sidecar {
            socket,
            config: Arc::new(config),
            reporter: Arc::new(reporter),
        })
    }

    /// Address the socket actually bound to (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Fires the two startup reports: health=Healthy and state=Assigned.
    ///
    /// Each runs as its own task so a control plane stuck in retries can
    /// delay neither the other report nor the receive loop.
    pub fn announce_startup(&self) {
        let config = Arc::clone(&self.config);
        let reporter = Arc::clone(&self.reporter);
        tokio::spawn(async move {
            let body = HealthReport {
                server_name: config.server_name.clone(),
                namespace: config.namespace.clone(),
                health: STARTUP_HEALTH.to_string(),
            };
            let url = config.endpoint_url(Endpoint::SetHealth);
            match reporter.deliver(&url, &body).await {
                Ok(()) => info!("startup report: health={}", STARTUP_HEALTH),
                Err(error) => error!("startup health report failed: {}", error),
            }
        });

        let config = Arc::clone(&self.config);
        let reporter = Arc::clone(&self.reporter);
        tokio::spawn(async move {
            let body = StateReport {
                server_name: config.server_name.clone(),
                namespace: config.namespace.clone(),
                state: STARTUP_STATE.to_string(),
            };
            let url = config.endpoint_url(Endpoint::SetState);
            match reporter.deliver(&url, &body).await {
                Ok(()) => info!("startup report: state={}", STARTUP_STATE),
                Err(error) => error!("startup state report failed: {}", error),
            }
        });
    }

    /// Runs the receive loop until a socket error occurs.
    ///
    /// Every datagram is handed to its own task; the loop itself never
    /// waits on an HTTP round-trip. A receive error is unrecoverable and
    /// terminates the listener.
    pub async fn run(&self) -> Result<(), std::io::Error> {
        let mut buffer = [0u8; 2048];

        loop {
            let (len, peer) = self.socket.recv_from(&mut buffer).await?;
            let text = String::from_utf8_lossy(&buffer[..len]).into_owned();
            debug!("message received from {}: {}", peer, text.trim_end());

            let socket = Arc::clone(&self.socket);
            let config = Arc::clone(&self.config);
            let reporter = Arc::clone(&self.reporter);
            tokio::spawn(async move {
                handle_message(socket, config, reporter, text, peer).await;
            });
        }
    }
}

/// Processes one datagram end to end: parse, dispatch, reply.
///
/// Runs inside its own task and owns all the context it needs, so a slow
/// report here cannot interfere with any other in-flight message.
async fn handle_message(
    socket: Arc<UdpSocket>,
    config: Arc<Config>,
    reporter: Arc<Reporter>,
    text: String,
    peer: SocketAddr,
) {
    let reply = match Command::parse(&text) {
        Ok(Command::Echo(original)) => original,
        Ok(Command::Players(count)) => {
            let body = ActivePlayersReport {
                server_name: config.server_name.clone(),
                namespace: config.namespace.clone(),
                player_count: count,
            };
            report(
                &config,
                &reporter,
                &text,
                Endpoint::SetActivePlayers,
                &count.to_string(),
                &body,
            )
            .await
        }
        Ok(Command::Health(health)) => {
            let body = HealthReport {
                server_name: config.server_name.clone(),
                namespace: config.namespace.clone(),
                health: health.clone(),
            };
            report(&config, &reporter, &text, Endpoint::SetHealth, &health, &body).await
        }
        Ok(Command::State(state)) => {
            let body = StateReport {
                server_name: config.server_name.clone(),
                namespace: config.namespace.clone(),
                state: state.clone(),
            };
            report(&config, &reporter, &text, Endpoint::SetState, &state, &body).await
        }
        Ok(Command::MarkedForDeletion(marked)) => {
            let body = MarkedForDeletionReport {
                server_name: config.server_name.clone(),
                namespace: config.namespace.clone(),
                marked_for_deletion: marked.clone(),
            };
            report(
                &config,
                &reporter,
                &text,
                Endpoint::SetMarkedForDeletion,
                &marked,
                &body,
            )
            .await
        }
        Err(parse_error) => {
            // A malformed count must never reach the control plane; the
            // peer gets told instead.
            warn!("rejected message from {}: {}", peer, parse_error);
            failure_reply(&text, Endpoint::SetActivePlayers, &parse_error.to_string())
        }
    };

    // A send failure abandons this reply; the exchange is best-effort.
    if let Err(error) = socket.send_to(reply.as_bytes(), peer).await {
        error!("failed to send reply to {}: {}", peer, error);
    } else {
        debug!("reply sent to {}", peer);
    }
}

/// Delivers one report and folds the outcome into the reply text.
async fn report<T: Serialize>(
    config: &Config,
    reporter: &Reporter,
    original: &str,
    endpoint: Endpoint,
    value: &str,
    body: &T,
) -> String {
    let url = config.endpoint_url(endpoint);
    match reporter.deliver(&url, body).await {
        Ok(()) => {
            info!("set {} to {}", endpoint.field(), value);
            success_reply(original, endpoint, value)
        }
        Err(error) => {
            error!("failed to set {}: {}", endpoint.field(), error);
            failure_reply(original, endpoint, &error.to_string())
        }
    }
}

/// `<original>, set <Field> to <value> OK`
fn success_reply(original: &str, endpoint: Endpoint, value: &str) -> String {
    format!(
        "{}, set {} to {} OK",
        strip_trailing_newline(original),
        endpoint.field(),
        value
    )
}

/// `<original>, error in setting <Field>: <description>`
fn failure_reply(original: &str, endpoint: Endpoint, description: &str) -> String {
    format!(
        "{}, error in setting {}: {}",
        strip_trailing_newline(original),
        endpoint.field(),
        description
    )
}
