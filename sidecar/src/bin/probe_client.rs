//! Manual test client: sends one payload to a running sidecar and prints
//! the reply, e.g. `probe_client -m "PLAYERS|4"`.

use clap::Parser;
use shared::DEFAULT_PORT;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::timeout;

#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Sidecar host to probe
    #[clap(short = 'H', long, default_value = "127.0.0.1")]
    host: String,
    /// Sidecar UDP port
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Payload to send (command like "PLAYERS|4" or any echo text)
    #[clap(short, long, default_value = "ping")]
    message: String,
    /// Seconds to wait for a reply
    #[clap(short, long, default_value = "30")]
    wait: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    println!("Client socket bound to {}", socket.local_addr()?);

    let target = format!("{}:{}", args.host, args.port);
    println!("Sending {:?} to {}", args.message, target);
    socket.send_to(args.message.as_bytes(), target.as_str()).await?;

    let mut buf = [0u8; 2048];
    println!("Waiting for reply...");
    match timeout(Duration::from_secs(args.wait), socket.recv_from(&mut buf)).await {
        Ok(Ok((len, addr))) => {
            println!(
                "Reply from {}: {}",
                addr,
                String::from_utf8_lossy(&buf[..len])
            );
        }
        Ok(Err(e)) => println!("Error receiving reply: {}", e),
        Err(_) => println!("No reply within {} seconds", args.wait),
    }

    Ok(())
}
