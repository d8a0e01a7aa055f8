//! Icarus Console
//!
//! Drives the message router from stdin, one line per message, against a
//! real database. Useful for checking replies without the chat transport.
//!
//! Usage:
//!   cargo run --features cli --bin icarus_console -- --tenant fazenda-1
//!
//!   # Simulate another sender, print the routing envelope as JSON
//!   cargo run --features cli --bin icarus_console -- \
//!     --tenant fazenda-1 \
//!     --sender "+55 62 98888-0000" \
//!     --json

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use icarus_query::clock::SystemClock;
use icarus_query::config::{DatabaseConfig, RouterConfig};
use icarus_query::query::{PgQueryStore, TenantId};
use icarus_query::router::{DisabledActionPipeline, InboundMessage, MessageRouter};

/// Interactive console for the Icarus message router
#[derive(Parser, Debug)]
#[command(name = "icarus_console")]
#[command(about = "Send chat messages to the Icarus router from the terminal")]
struct Args {
    /// Tenant the messages are scoped to
    #[arg(long, env = "ICARUS_TENANT_ID")]
    tenant: String,

    /// Sender phone number
    #[arg(long, default_value = "5500000000000")]
    sender: String,

    /// Display name passed to the action pipeline
    #[arg(long)]
    name: Option<String>,

    /// Print the full routing envelope as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    let config = RouterConfig::from_env().context("Invalid router configuration")?;

    let db_config = DatabaseConfig::from_env().context("Invalid database configuration")?;

    let store = PgQueryStore::connect(&db_config)
        .await
        .context("Failed to connect to database")?;

    let router = MessageRouter::new(
        config,
        Arc::new(store),
        Arc::new(DisabledActionPipeline),
        Arc::new(SystemClock),
    );
    let tenant = TenantId::new(args.tenant.trim());

    println!("Icarus console - tenant {tenant}. Ctrl-D to quit.");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let text = line.trim();
        if text.is_empty() {
            continue;
        }

        let mut message = InboundMessage::new(&args.sender, text, chrono::Utc::now());
        if let Some(name) = &args.name {
            message = message.with_sender_name(name.clone());
        }

        let reply = router.handle(&message, &tenant).await;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&reply)?);
        } else {
            println!("{}\n", reply.reply);
        }
    }

    Ok(())
}
