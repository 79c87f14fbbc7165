use std::process::ExitCode;

use chat_client::{
    cli::{self, Cli},
    client::ChatClient,
    console,
};
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};

// Every way out of the client reports status 1, including a clean `/quit`.
const EXIT_STATUS: u8 = 1;

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let (host, port) = match cli::server_from_env() {
        Ok(server) => server,
        Err(error) => {
            error!(?error, "invalid server configuration");
            return ExitCode::from(EXIT_STATUS);
        }
    };

    let mut client = ChatClient::new(cli.username());
    client.connect_to_server(&host, port).await;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    match console::run(&client, &mut stdin, &mut stdout).await {
        Ok(exit) => info!(?exit, "leaving chat"),
        Err(error) => error!(?error, "error reading from standard input"),
    }

    client.disconnect().await;
    ExitCode::from(EXIT_STATUS)
}
