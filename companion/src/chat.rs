//! Interactive conversation loop
//!
//! Reads one line per turn from stdin. The turn runs on its own task so
//! that Ctrl-C can detach the view without cancelling the request; a reply
//! that arrives after detaching is dropped by the controller.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use companion_core::format::transcript_line;
use companion_core::{
    ConversationController, HttpAgentTransport, Rejection, SubmitOutcome, SurfaceProfile,
};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::{AsyncBufReadExt, BufReader};

type Controller = ConversationController<HttpAgentTransport>;

/// Commands understood by the chat prompt
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Quit,
    History,
    Help,
    Message(&'a str),
    Skip,
}

fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "/quit" | "/exit" => Input::Quit,
        "/history" => Input::History,
        "/help" => Input::Help,
        _ => Input::Message(line),
    }
}

/// Mount `profile` and chat until EOF, `/quit`, or Ctrl-C
pub async fn run(profile: SurfaceProfile) -> Result<()> {
    let transport =
        HttpAgentTransport::new(&profile.agent).context("invalid agent configuration")?;
    let controller = Arc::new(ConversationController::new(profile, transport));
    let surface = controller.surface();

    tracing::info!(
        surface = %surface,
        session_id = %controller.session().session_id(),
        "Chat view mounted"
    );

    println!("{} - {}", surface.display_name(), surface.tagline());
    println!("Type /history to review, /quit to leave.");
    println!();
    match controller.transcript().first() {
        Some(greeting) => println!("{}: {}", surface.display_name(), greeting.text),
        None => println!("{}", surface.empty_state_hint()),
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt(surface.placeholder())?;

        let Some(line) = lines.next_line().await.context("failed to read input")? else {
            break;
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Skip => continue,
            Input::Help => {
                println!("/history  show the conversation so far");
                println!("/quit     leave the chat");
            }
            Input::History => print_history(&controller),
            Input::Message(text) => {
                if !take_turn(&controller, text.to_string()).await? {
                    break;
                }
            }
        }
    }

    controller.detach();
    tracing::info!(turns = controller.turns_completed(), "Chat view unmounted");
    Ok(())
}

fn prompt(placeholder: &str) -> Result<()> {
    print!("you ({}) > ", placeholder.trim_end_matches('.'));
    std::io::stdout().flush().context("failed to flush stdout")
}

/// Run one turn; returns false when the user interrupted and the view detached
async fn take_turn(controller: &Arc<Controller>, text: String) -> Result<bool> {
    let surface = controller.surface();
    let spinner = spinner(surface.display_name())?;

    let mut turn = tokio::spawn({
        let controller = Arc::clone(controller);
        async move { controller.submit(&text).await }
    });

    let outcome = tokio::select! {
        joined = &mut turn => joined.context("conversation turn panicked")?,
        _ = tokio::signal::ctrl_c() => {
            controller.detach();
            spinner.finish_and_clear();
            println!();
            println!("Interrupted; leaving {}.", surface.display_name());
            tracing::info!("Chat view detached during a turn");
            return Ok(false);
        }
    };
    spinner.finish_and_clear();

    match outcome {
        SubmitOutcome::Replied(message)
        | SubmitOutcome::Empty(message)
        | SubmitOutcome::Failed(message) => {
            println!("{}: {}", surface.display_name(), message.text);
        }
        SubmitOutcome::Rejected(Rejection::Busy) => {
            println!("Still waiting for the previous reply.");
        }
        SubmitOutcome::Rejected(Rejection::Blank) | SubmitOutcome::Discarded => {}
    }
    Ok(true)
}

fn spinner(name: &str) -> Result<ProgressBar> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .context("invalid spinner template")?,
    );
    spinner.set_message(format!("{} is thinking...", name));
    spinner.enable_steady_tick(Duration::from_millis(100));
    Ok(spinner)
}

fn print_history(controller: &Controller) {
    let transcript = controller.transcript();
    if transcript.is_empty() {
        println!("(no messages yet)");
        return;
    }
    for message in &transcript {
        println!("{}", transcript_line(message));
    }
}
