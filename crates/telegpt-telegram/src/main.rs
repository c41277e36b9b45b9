//! TeleGPT binary.
//!
//! Start the bot with:
//! ```bash
//! BOT_TOKEN=xxx OPENAI_API_KEY=xxx ADMIN_CHAT_ID=123 CONVERSATION_FILE=conv.json \
//!     cargo run -p telegpt-telegram
//! ```

use std::sync::Arc;

use clap::Parser;
use telegpt_core::{load_env_files, Settings};
use telegpt_telegram::{open_store, TelegramBot};
use tracing_subscriber::EnvFilter;

/// TeleGPT - a personal ChatGPT assistant on Telegram
#[derive(Parser, Debug)]
#[command(name = "telegpt")]
#[command(about = "Personal Telegram chatbot backed by the OpenAI API")]
struct Args {
    /// Serve the webhook request handler instead of long polling
    #[arg(short, long)]
    webhook: bool,

    /// Webhook port (default: TELEGRAM_WEBHOOK_PORT or 8443)
    #[arg(short, long)]
    port: Option<u16>,

    /// Create the empty conversation record and exit
    #[arg(long)]
    provision: bool,

    /// Verbose logging (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let env_files = load_env_files();

    // Initialize logging based on verbosity
    let filter = match args.verbose {
        0 => "telegpt=info,teloxide=warn",
        1 => "telegpt=debug,teloxide=info",
        2 => "telegpt=trace,teloxide=debug,tower_http=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    for path in &env_files {
        tracing::debug!(path = %path.display(), "Loaded settings file");
    }

    let settings = Arc::new(Settings::from_env()?);
    tracing::debug!(?settings, "Settings loaded");

    let store = open_store(&settings.store).await?;

    if args.provision {
        if store.provision().await? {
            println!("Created empty conversation record ({})", store.backend_name());
        } else {
            println!("Conversation record already exists ({})", store.backend_name());
        }
        return Ok(());
    }

    let bot = TelegramBot::new(Arc::clone(&settings), store);

    match bot.get_me().await {
        Ok(username) => {
            tracing::info!(username = %username, "Bot initialized successfully");
            println!("\nTeleGPT");
            println!("   Bot: @{}", username);
            println!("   Mode: {}", if args.webhook { "webhook" } else { "polling" });
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to get bot info");
            return Err(e.into());
        }
    }

    if args.webhook {
        let port = args.port.unwrap_or(settings.webhook_port);
        bot.serve_webhook(port).await?;
    } else {
        println!("\nOpen Telegram and send /start to begin");
        println!("   Press Ctrl+C to stop\n");
        bot.start_polling().await?;
    }

    Ok(())
}
