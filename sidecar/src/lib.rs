//! # Game Server Sidecar Library
//!
//! This library implements a sidecar process that runs next to a dedicated
//! game server instance. It bridges two worlds: a connectionless, low-latency
//! UDP protocol used by health checks and game clients probing reachability,
//! and a reliable, retried HTTP reporting channel to the fleet-management
//! control plane.
//!
//! ## Core Responsibilities
//!
//! ### UDP Probe Handling
//! The sidecar owns a single UDP socket and answers every datagram it
//! receives. Payloads matching the `KEYWORD|value` command grammar trigger a
//! report to the control plane; anything else is echoed back unchanged so
//! that plain ping probes keep working.
//!
//! ### Reliable Reporting
//! Lifecycle signals (health, state, active player count, deletion marker)
//! are POSTed as JSON to the control-plane API. Deliveries retry on network
//! errors and 5xx responses with a fixed delay between attempts; 4xx
//! responses are terminal. The outcome of each delivery is reflected in the
//! UDP reply sent back to the probing peer.
//!
//! ### Startup Announcements
//! On boot, once the socket is bound, the sidecar reports `health=Healthy`
//! and `state=Assigned` on its own initiative so the control plane learns
//! about the instance before any probe arrives.
//!
//! ## Architecture Design
//!
//! The receive loop never waits on an HTTP round-trip: each datagram is
//! handed to its own spawned task which owns everything it needs (peer
//! address, original payload, shared handles to the socket, configuration
//! and HTTP client). Replies to different peers are therefore independent;
//! a peer whose report is stuck in retries never delays another peer's
//! echo. There is no shared mutable state between in-flight messages.
//!
//! ## Module Organization
//!
//! - [`config`] — immutable process configuration read from the environment
//!   before the socket binds; missing values are fatal.
//! - [`reporter`] — the retrying HTTP delivery mechanism.
//! - [`network`] — the UDP receive loop, command dispatch, reply path, and
//!   the startup announcements.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use sidecar::config::Config;
//! use sidecar::network::Sidecar;
//! use sidecar::reporter::Reporter;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let sidecar = Sidecar::bind(config, Reporter::new()).await?;
//!     sidecar.announce_startup();
//!     Ok(sidecar.run().await?)
//! }
//! ```

pub mod config;
pub mod network;
pub mod reporter;
