use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, Subcommand};

use relay_chain::protocol::{Credential, SessionToken};
use relay_chain::relay::{Relay, RelayTargets};
use relay_chain::resilience::HopTimeouts;

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Operator CLI for the relay chain", long_about = None)]
struct Cli {
    /// Front door URL.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Authentication service address.
    #[arg(long, default_value = "127.0.0.1:3001")]
    auth: SocketAddr,

    /// Transform service address.
    #[arg(long, default_value = "127.0.0.1:3002")]
    transform: SocketAddr,

    /// Per-step timeout in milliseconds for direct service calls.
    #[arg(long, default_value_t = 5000)]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a payload through the front door
    Send {
        /// Request body; empty uses the server's default payload
        #[arg(default_value = "")]
        body: String,
    },
    /// Obtain a session token directly from the authentication service
    Auth,
    /// Call the transform service directly with a token
    Transform {
        /// Session token from `auth`
        #[arg(long)]
        token: String,
        payload: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let timeout = Duration::from_millis(cli.timeout_ms);
    let relay = Relay::new(
        RelayTargets {
            auth: cli.auth,
            transform: cli.transform,
        },
        Credential::DEFAULT,
        HopTimeouts {
            connect: timeout,
            read: timeout,
        },
    );

    match cli.command {
        Commands::Send { body } => {
            let res = reqwest::Client::new().post(&cli.url).body(body).send().await?;
            let status = res.status();
            let text = res.text().await?;
            if status.is_success() {
                println!("{}", text);
            } else {
                eprintln!("Error: front door returned status {}", status);
                std::process::exit(1);
            }
        }
        Commands::Auth => {
            let token = relay.authenticate().await?;
            println!("{}", token);
        }
        Commands::Transform { token, payload } => {
            let token = SessionToken::from_bytes(token.as_bytes())
                .ok_or("token must be 36 ASCII characters")?;
            let output = relay.transform(&token, &payload).await?;
            println!("{}", String::from_utf8_lossy(&output));
        }
    }

    Ok(())
}
