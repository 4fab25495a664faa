//! companion - terminal front end for the health companion agent chat
//!
//! Mounts one chat surface at a time and drives it through the shared
//! conversation controller.
//!
//! Uses XDG Base Directory specification for file locations:
//! - Config: $XDG_CONFIG_HOME/companion/config.toml (~/.config/companion/config.toml)
//! - Logs: $XDG_STATE_HOME/companion/companion.log (~/.local/state/companion/companion.log)

mod chat;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use companion_core::{
    AgentConfig, AgentRequestBuilder, ChatSurface, Config, ConversationController,
    HttpAgentTransport, SubmitOutcome, SurfaceProfile,
};

#[derive(Parser)]
#[command(name = "companion")]
#[command(about = "Chat with the health companion agents from the terminal")]
#[command(version)]
struct Args {
    /// Config file to use instead of the XDG default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open an interactive conversation
    Chat {
        /// Chat surface to mount
        #[arg(short, long, default_value = "patient_assistant")]
        surface: ChatSurface,
    },

    /// Send a single message and print the reply
    Send {
        /// Chat surface to use
        #[arg(short, long, default_value = "patient_assistant")]
        surface: ChatSurface,

        /// Print the reply message as JSON
        #[arg(long)]
        json: bool,

        /// Message text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// List the available chat surfaces
    Surfaces,

    /// Show the resolved agent configuration
    Status {
        /// Show the configuration of one surface
        #[arg(short, long, default_value = "patient_assistant")]
        surface: ChatSurface,

        /// Also check whether the agent endpoint answers
        #[arg(long)]
        ping: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Ensure XDG environment variables are set before using core library
    Config::ensure_xdg_env();

    let config = load_config(args.config.as_deref())?;

    // Initialize logging (to file, the terminal belongs to the conversation)
    let _log_guard =
        companion_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("companion starting");

    match args.command {
        Command::Chat { surface } => {
            let profile = SurfaceProfile::from_config(surface, &config);
            chat::run(profile).await
        }
        Command::Send {
            surface,
            json,
            text,
        } => send(&config, surface, &text.join(" "), json).await,
        Command::Surfaces => {
            print_surfaces();
            Ok(())
        }
        Command::Status { surface, ping } => {
            status(&config, args.config.as_deref(), surface, ping).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            let mut config = Config::load_from(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            config.apply_env();
            Ok(config)
        }
        None => Config::load().context("failed to load configuration"),
    }
}

/// One turn, reply on stdout
async fn send(config: &Config, surface: ChatSurface, text: &str, json: bool) -> Result<()> {
    // Blank input never needs an agent
    let text = AgentRequestBuilder::check_input(text)?;

    let profile = SurfaceProfile::from_config(surface, config);
    let transport =
        HttpAgentTransport::new(&profile.agent).context("invalid agent configuration")?;
    let controller = ConversationController::new(profile, transport);

    let outcome = controller.submit(text).await;
    tracing::info!(
        surface = %surface,
        session_id = %controller.session().session_id(),
        "One-shot turn finished"
    );

    let Some(message) = outcome.message() else {
        anyhow::bail!("no reply was produced");
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(message).context("failed to encode reply")?
        );
    } else {
        println!("{}", message.text);
    }

    if let SubmitOutcome::Failed(_) = outcome {
        anyhow::bail!("the {} agent could not be reached", surface.display_name());
    }
    Ok(())
}

fn print_surfaces() {
    println!("Available chat surfaces:");
    for surface in ChatSurface::all() {
        println!(
            "  {:<20} {:<20} {}",
            surface.id(),
            surface.display_name(),
            surface.tagline()
        );
    }
}

async fn status(
    config: &Config,
    config_override: Option<&Path>,
    surface: ChatSurface,
    ping: bool,
) -> Result<()> {
    let config_path = config_override
        .map(Path::to_path_buf)
        .unwrap_or_else(Config::config_path);
    let agent = config.agent_for(surface);

    println!("Companion Status");
    println!("================");
    println!();
    println!(
        "Config file:  {}{}",
        config_path.display(),
        if config_path.exists() { "" } else { " (not found)" }
    );
    println!(
        "Log file:     {}",
        companion_core::logging::log_file_path().display()
    );
    println!();
    println!(
        "Surface:      {} ({})",
        surface.id(),
        surface.display_name()
    );
    print_agent(&agent);
    println!();

    let transport = match agent.validate() {
        Ok(()) => {
            println!("Configuration: valid");
            Some(HttpAgentTransport::new(&agent).context("failed to create agent transport")?)
        }
        Err(e) => {
            println!("Configuration: invalid ({})", e);
            None
        }
    };

    if ping {
        match transport {
            Some(transport) => {
                let reachable = transport.health_check().await?;
                println!(
                    "Endpoint:     {} (checked {})",
                    if reachable { "reachable" } else { "unreachable" },
                    chrono::Local::now().format("%H:%M:%S")
                );
            }
            None => println!("Endpoint:     not checked"),
        }
    }

    Ok(())
}

fn print_agent(agent: &AgentConfig) {
    println!("Agent ID:     {}", or_unset(&agent.agent_id));
    println!("Alias ID:     {}", or_unset(&agent.agent_alias_id));
    println!("Region:       {}", or_unset(&agent.region));
    println!("Endpoint:     {}", agent.resolved_endpoint());
    println!(
        "API key:      {}",
        agent
            .api_key
            .as_deref()
            .map(mask_secret)
            .unwrap_or_else(|| "(not set)".to_string())
    );
    println!(
        "Timeout:      {}",
        agent
            .timeout_secs
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "none".to_string())
    );
}

fn or_unset(value: &str) -> &str {
    if value.trim().is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// Keep only the last four characters of a secret
fn mask_secret(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_secret() {
        assert_eq!(mask_secret("abc"), "****");
        assert_eq!(mask_secret("sk-live-123456"), "****3456");
    }

    #[test]
    fn test_args_parse_surface() {
        let argv = ["companion", "send", "-s", "learner-quiz", "hi", "there"];
        let args = Args::try_parse_from(argv).unwrap();
        match args.command {
            Command::Send { surface, text, .. } => {
                assert_eq!(surface, ChatSurface::LearnerQuiz);
                assert_eq!(text.join(" "), "hi there");
            }
            _ => panic!("expected send"),
        }

        assert!(Args::try_parse_from(["companion", "chat", "--surface", "billing"]).is_err());
    }
}
