use std::io::Write;

use anyhow::{bail, Result};
use clap::Parser;
use flowting_example::init_logging;
use flowting_stream::{ClientConfig, PersonaClient, StreamCallbacks, StreamOutcome, TestPersonaInput};

/// Stream a persona's reply to stdout. Ctrl-C aborts the stream silently.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Persona to test
    persona_id: String,

    /// Message to send; words are joined with spaces
    #[arg(required = true)]
    message: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    let config = ClientConfig::load()?;
    init_logging(&config);

    let persona_id = args.persona_id;
    let message = args.message.join(" ");
    if message.trim().is_empty() {
        bail!("message must not be empty");
    }

    let client = PersonaClient::new(&config)?;
    tracing::info!(endpoint = client.endpoint(), persona_id = %persona_id, "Testing persona");

    let callbacks = StreamCallbacks::new()
        .metadata(|meta| {
            eprintln!("[{} via {}]", meta.model_name, meta.provider);
        })
        .chunk(|delta| {
            print!("{}", delta);
            let _ = std::io::stdout().flush();
        })
        .done(|summary| {
            println!();
            eprintln!(
                "[tokens: {} in / {} out]",
                summary.input_tokens, summary.output_tokens
            );
        })
        .error(|message| {
            eprintln!("\nError: {}", message);
        });

    let input = TestPersonaInput::new(message).persona_id(persona_id);
    let handle = client.test_persona(input, callbacks).await;

    let abort = handle.abort_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            abort.abort();
        }
    });

    let outcome = handle.join().await;
    ctrl_c.abort();

    match outcome {
        StreamOutcome::Completed => Ok(()),
        StreamOutcome::Aborted => {
            eprintln!("\n[aborted]");
            Ok(())
        }
        StreamOutcome::Failed(message) => bail!(message),
    }
}
