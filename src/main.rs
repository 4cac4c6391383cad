//! # authmux 命令行
//!
//! 按配置文件注册提供商，并在终端中逐步驱动一次登录流程。

use std::path::PathBuf;

use authmux::{CallbackParams, Registry, config, logging};
use clap::{Parser, Subcommand};
use serde_json::json;
use url::Url;

/// Drive OAuth logins against configured identity providers
#[derive(Parser)]
#[command(name = "authmux", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Provider configuration file (defaults to $AUTHMUX_CONFIG or config/providers.<RUST_ENV>.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered provider names
    Providers,

    /// Start a login: print the authorization URL and the marshaled session
    Begin {
        provider: String,
        /// Opaque state echoed back on the callback
        #[arg(long, default_value = "")]
        state: String,
    },

    /// Finish a login from the callback and print the user profile
    Complete {
        provider: String,
        /// Session JSON printed by `begin`
        #[arg(long)]
        session: String,
        /// Callback URL or its query string
        #[arg(long)]
        callback: String,
    },

    /// Exchange a refresh token for a new access token
    Refresh {
        provider: String,
        #[arg(long)]
        token: String,
    },

    /// Show logging configuration help
    LogHelp,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(Some(&cli.log_level));

    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::LogHelp => logging::print_logging_help(),
        Commands::Providers => {
            let registry = load_registry(cli.config)?;
            let mut names: Vec<_> = registry.get_providers().into_keys().collect();
            names.sort();
            for name in names {
                println!("{name}");
            }
        }
        Commands::Begin { provider, state } => {
            let provider = load_registry(cli.config)?.get_provider(&provider)?;
            let session = provider.begin_auth(&state).await?;
            let output = json!({
                "auth_url": session.get_auth_url()?,
                "session": session.marshal()?,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Complete {
            provider,
            session,
            callback,
        } => {
            let provider = load_registry(cli.config)?.get_provider(&provider)?;
            let mut session = provider.unmarshal_session(&session)?;
            let params = parse_callback(&callback)?;

            session.authorize(provider.as_ref(), &params).await?;
            let user = provider.fetch_user(session.as_ref()).await?;

            let output = json!({
                "user": user,
                "session": session.marshal()?,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Refresh { provider, token } => {
            let provider = load_registry(cli.config)?.get_provider(&provider)?;
            if !provider.refresh_token_available() {
                anyhow::bail!("{} does not support refreshing tokens", provider.name());
            }
            match provider.refresh_token(&token).await? {
                Some(token) => println!("{}", serde_json::to_string_pretty(&token)?),
                None => println!("{} returned no token", provider.name()),
            }
        }
    }
    Ok(())
}

fn load_registry(path: Option<PathBuf>) -> anyhow::Result<Registry> {
    let path = path.unwrap_or_else(config::config_path);
    Ok(config::load_config(&path)?.build_registry()?)
}

/// 接受完整回调 URL 或仅查询串
fn parse_callback(callback: &str) -> anyhow::Result<CallbackParams> {
    if callback.starts_with("http://") || callback.starts_with("https://") {
        let url = Url::parse(callback)?;
        return Ok(CallbackParams::from_url(&url));
    }
    Ok(CallbackParams::parse(callback))
}
