//! CLI entry point for alchemailyst.

mod cli;
mod render;

use alchemailyst::api::{AiGateway, ContextClient};
use alchemailyst::auth::{open_in_browser, AuthError, CallbackParams, LoginOutcome, SessionManager};
use alchemailyst::config::{load_config_with_diagnostics, Config, ConfigSource};
use alchemailyst::error::{ConfigError, Error, ErrorKind};
use alchemailyst::prompt::{compose_email_prompt, summarize_email_prompt, ComposeRequest};
use clap::Parser;
use render::Renderer;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use cli::{Command, ContextCommand};

#[tokio::main]
async fn main() {
    let args = cli::Args::parse();
    init_tracing();

    let color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
    let renderer = Renderer::new(color);

    let loaded = match load_config_with_diagnostics(args.config.as_deref()) {
        Ok(loaded) => loaded,
        Err(e) => {
            renderer.error(&e.to_string());
            std::process::exit(exit_code(ErrorKind::Config));
        }
    };
    for warning in &loaded.diagnostics.deprecations {
        renderer.warn(warning);
    }

    if let Err(e) = run(args.command, &loaded.config, &loaded.source, &renderer).await {
        renderer.error(&e.to_string());
        std::process::exit(exit_code(e.kind()));
    }
}

/// `ALCHEMAILYST_LOG`, then `RUST_LOG`, then `warn`; always to stderr.
fn init_tracing() {
    let directive = std::env::var("ALCHEMAILYST_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "warn".to_string());
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::Config => 2,
        ErrorKind::Auth => 3,
        ErrorKind::Network => 4,
        ErrorKind::Provider => 5,
        ErrorKind::AiUnavailable => 6,
    }
}

async fn run(
    command: Command,
    config: &Config,
    source: &ConfigSource,
    renderer: &Renderer,
) -> Result<(), Error> {
    match command {
        Command::Login { no_browser } => {
            let session = SessionManager::from_config(config);
            let url = session.begin_login()?;
            println!("{url}");
            if !no_browser && !open_in_browser(&url) {
                renderer.warn("could not launch a browser; open the URL above manually");
            }
            renderer.detail("After approving, run `alchemailyst callback <code-or-redirect-url>`.");
        }
        Command::Callback { input } => {
            let params = CallbackParams::parse(&input)?;
            let session = SessionManager::from_config(config);
            match session.complete_login(&params.code).await? {
                LoginOutcome::Completed(profile) => {
                    renderer.section("signed in");
                    renderer.field("email", &profile.email);
                    if !profile.name.is_empty() {
                        renderer.field("name", &profile.name);
                    }
                }
                LoginOutcome::AlreadyHandled => {
                    renderer.warn("this authorization code was already used");
                }
            }
        }
        Command::Status => {
            let session = SessionManager::from_config(config);
            let restored = session.initialize().await;
            render_session(&session, restored.err(), renderer);
            render_gateway_status(&AiGateway::from_config(config), renderer);
        }
        Command::Refresh => {
            let tokens = SessionManager::from_config(config).refresh_stored().await?;
            renderer.section("token refreshed");
            renderer.field("expires_at_ms", &tokens.expires_at.to_string());
        }
        Command::Logout => {
            SessionManager::from_config(config).logout();
            renderer.section("signed out");
        }
        Command::Generate { prompt, context } => {
            let text = AiGateway::from_config(config)
                .generate(&prompt, context.as_deref())
                .await?;
            println!("{text}");
        }
        Command::Summarize { subject, content } => {
            let prompt = summarize_email_prompt(&subject, &content);
            let text = AiGateway::from_config(config).generate(&prompt, None).await?;
            println!("{text}");
        }
        Command::Compose {
            recipient,
            subject,
            brief,
            persona,
        } => {
            let prompt = compose_email_prompt(&ComposeRequest {
                recipient: &recipient,
                subject: &subject,
                brief: &brief,
                persona: persona.as_deref(),
            });
            let text = AiGateway::from_config(config).generate(&prompt, None).await?;
            println!("{text}");
        }
        Command::Doctor => run_doctor(config, source, renderer).await,
        Command::Context(sub) => {
            let client = ContextClient::from_config(
                &config.primary,
                Duration::from_secs(config.network.timeout_secs),
            );
            let result = match sub {
                ContextCommand::Add { json } => {
                    let data: serde_json::Value = serde_json::from_str(&json).map_err(|e| {
                        ConfigError::Invalid(format!("context payload is not JSON: {e}"))
                    })?;
                    client.add_context(&data).await?
                }
                ContextCommand::Search { query, threshold } => {
                    client.search_context(&query, threshold).await?
                }
                ContextCommand::Delete { source } => client.delete_context(&source).await?,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&result).unwrap_or_else(|_| result.to_string())
            );
        }
    }
    Ok(())
}

fn render_session(session: &SessionManager, restore_error: Option<AuthError>, renderer: &Renderer) {
    renderer.section("session");
    renderer.field("state", &session.state().to_string());
    if let Some(err) = restore_error {
        renderer.field("last error", &err.to_string());
    }
    if let Some(profile) = session.profile() {
        renderer.field("email", &profile.email);
        renderer.field("persona", &profile.persona);
    }
    if let Some(tokens) = session.tokens() {
        renderer.field("expires_at_ms", &tokens.expires_at.to_string());
        renderer.field(
            "refresh token",
            if tokens.refresh_token.is_some() { "stored" } else { "none" },
        );
    }
}

fn render_gateway_status(gateway: &AiGateway, renderer: &Renderer) {
    let status = gateway.config_status();
    renderer.section("ai gateway");
    renderer.check("primary configured", status.configured, None);
    if !status.missing_vars.is_empty() {
        renderer.field("missing", &status.missing_vars.join(", "));
    }
    renderer.check("fallback key present", status.has_fallback, None);
}

async fn run_doctor(config: &Config, source: &ConfigSource, renderer: &Renderer) {
    renderer.section("config");
    let source_text = match source {
        ConfigSource::Explicit(path) | ConfigSource::Global(path) => path.display().to_string(),
        ConfigSource::Local => "./alchemailyst.toml".to_string(),
        ConfigSource::BuiltInDefaults => "built-in defaults".to_string(),
    };
    renderer.field("source", &source_text);
    let token_path = config
        .storage
        .resolved_token_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "in-memory only".to_string());
    renderer.field("token file", &token_path);

    let google = config.google.require_credentials();
    renderer.check(
        "google credentials",
        google.is_ok(),
        google.as_ref().err().map(|e| e.to_string()).as_deref(),
    );

    let gateway = AiGateway::from_config(config);
    render_gateway_status(&gateway, renderer);

    renderer.section("connectivity");
    let primary = gateway.test_connection().await;
    renderer.check("primary", primary.success, primary.error.as_deref());
    let fallback = gateway.test_fallback().await;
    renderer.check("fallback", fallback.success, fallback.error.as_deref());
}
