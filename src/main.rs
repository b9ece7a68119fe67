// src/main.rs

use token_dashboard::{
    blockchain::to_checksum,
    config::Config,
    helpers::BusEvent,
    store::Web3ProvidersStore,
};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "commands: status | balance | mint <amount> | recipient <address> | transfer <amount> | quit";

fn status_lines(store: &Web3ProvidersStore) -> String {
    format!(
        "state: {:?}\nprovider: {:?} on chain {:?}\naccount: {}\ntoken: {} ({}) at {}\nbalance: {}\nrecipient: {}\n",
        store.load_state(),
        store.provider().status(),
        store.provider().chain_id(),
        store
            .provider()
            .address()
            .map(|a| to_checksum(&a, None))
            .unwrap_or_else(|| "not connected".to_string()),
        store.contract_name().unwrap_or("-"),
        store.contract_symbol().unwrap_or("-"),
        to_checksum(&store.contract_address(), None),
        store.contract_balance_display(),
        store.input_transfer_address(),
    )
}

// --- Console Logic ---
async fn run_console(mut store: Web3ProvidersStore) {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut stdout = io::stdout();

    let mut line = String::new();
    loop {
        line.clear();
        match stdin.read_line(&mut line).await {
            Ok(0) => {
                info!("EOF received, shutting down");
                break;
            }
            Ok(_) => {
                let mut parts = line.split_whitespace();
                let Some(command) = parts.next() else {
                    continue;
                };
                let arg = parts.next().unwrap_or_default();
                debug!("Received command: {} {}", command, arg);

                let output = match command {
                    "status" => status_lines(&store),
                    "balance" => format!("{}\n", store.contract_balance_display()),
                    "mint" => {
                        store.set_input_replenishment(arg);
                        match store.get_balance().await {
                            Ok(tx) => format!("minted in {:?}\n", tx.tx_hash),
                            Err(e) => format!("mint failed: {}\n", e),
                        }
                    }
                    "recipient" => {
                        store.set_input_transfer_address(arg);
                        format!("recipient set to {}\n", arg)
                    }
                    "transfer" => {
                        store.set_input_transfer_tokens(arg);
                        match store.transfer_tokens().await {
                            Ok(tx) => format!("transfer submitted in {:?}\n", tx.tx_hash),
                            Err(e) => format!("transfer failed: {}\n", e),
                        }
                    }
                    "quit" | "exit" => break,
                    _ => format!("{}\n", HELP),
                };

                if let Err(e) = stdout.write_all(output.as_bytes()).await {
                    error!("Failed to write output: {}", e);
                    break;
                }
                if let Err(e) = stdout.flush().await {
                    error!("Failed to flush output: {}", e);
                    break;
                }
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }

    info!("Dashboard shutting down");
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "token_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    let mut store = Web3ProvidersStore::from_config(config);

    let mut events = store.bus().subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(BusEvent::Success(msg)) => info!("✅ {}", msg),
                Ok(BusEvent::Warning(msg)) => warn!("{}", msg),
                Ok(BusEvent::Error(msg)) => error!("{}", msg),
                Err(RecvError::Lagged(n)) => debug!("Skipped {} bus events", n),
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Failures are already reported by the store; the console still starts.
    if store.init().await.is_ok() {
        info!("🚀 Dashboard ready for {:?}", store.provider().address());
    }

    println!("{}", HELP);
    run_console(store).await;
}
