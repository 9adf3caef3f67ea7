use anyhow::{Result, anyhow, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use gator_mail::api::ApiClient;
use gator_mail::auth::{CallbackListener, Session, open_store};
use gator_mail::config::{config_dir, load_config, load_config_from};
use gator_mail::decoders::capitalize;
use gator_mail::logging;
use gator_mail::router::Route;
use gator_mail::terminal::run_tui;
use gator_mail::terminal::state::{AppSettings, AppState};

#[derive(Parser)]
#[command(name = "gator_mail")]
#[command(about = "Terminal client for the Gmail AI Assistant", long_about = None)]
struct Cli {
    /// Read settings from this file instead of the default config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the TUI (default)
    Tui {
        /// Start at this location, e.g. /emails/<id>
        #[arg(long, default_value = "/")]
        route: String,
    },

    /// Sign in through the browser without starting the TUI
    Login,

    /// Forget the stored session
    Logout,

    /// Show who is signed in
    Status,

    /// Print the AI analysis of one message
    Analyze { id: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cmd = cli.cmd.unwrap_or(Command::Tui {
        route: "/".to_string(),
    });

    if matches!(cmd, Command::Tui { .. }) {
        logging::init_file(&config_dir()?.join(logging::LOG_FILE))?;
    } else {
        logging::init_stderr();
    }

    let cfg = match &cli.config {
        Some(p) => load_config_from(p),
        None => load_config(),
    }
    .map_err(|e| anyhow!("Configuration error: {e}"))?;

    let store = open_store(&cfg)?;
    let api = Arc::new(ApiClient::from_config(&cfg, store.clone())?);
    let mut session = Session::initialize(store)?;

    match cmd {
        Command::Tui { route } => {
            let start = Route::parse(&route, session.is_authenticated());
            let state = AppState::new(session, api, AppSettings::from(&cfg), start);
            run_tui(state)
        }

        Command::Login => {
            let listener = CallbackListener::bind(
                &cfg.redirect_uri,
                Duration::from_secs(cfg.callback_timeout_secs),
            )?;
            eprintln!("Complete the sign-in in your browser...");
            session.login(&api, &listener)?;
            println!(
                "Signed in as {}",
                session.user_email().unwrap_or("(account email not provided)")
            );
            Ok(())
        }

        Command::Logout => {
            session.logout()?;
            println!("Signed out.");
            Ok(())
        }

        Command::Status => {
            if !session.is_authenticated() {
                println!("Not signed in.");
                return Ok(());
            }
            println!("Signed in");
            println!("  account: {}", session.user_email().unwrap_or("-"));
            match (session.token_expiry(), session.expiry_passed(Utc::now())) {
                (Some(exp), Some(true)) => println!("  token expiry: {exp} (passed)"),
                (Some(exp), _) => println!("  token expiry: {exp}"),
                (None, _) => println!("  token expiry: -"),
            }
            println!("  backend: {}", api.base_url());
            Ok(())
        }

        Command::Analyze { id } => {
            if !session.is_authenticated() {
                bail!("Not signed in. Run: gator_mail login");
            }
            session.watch(&api);
            let a = match api.analyze_email(&id) {
                Ok(a) => a,
                Err(e) if e.is_unauthorized() => {
                    session.sync_unauthorized();
                    bail!("The backend rejected the stored session. Run: gator_mail login");
                }
                Err(e) => return Err(e.into()),
            };

            println!("Category:       {}", capitalize(&a.category));
            println!("Topic:          {}", a.topic);
            println!("Sentiment:      {}", capitalize(&a.sentiment));
            println!("Priority:       {}", capitalize(&a.priority));
            println!(
                "Recommendation: {}",
                if a.should_trash {
                    "Move to Trash"
                } else {
                    "Keep in Inbox"
                }
            );
            println!("Key points:");
            for p in &a.key_points {
                println!("  - {p}");
            }
            println!("Action items:");
            for i in &a.action_items {
                println!("  - {i}");
            }
            Ok(())
        }
    }
}
