use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use office_assistant_lib::ai::{Attachment, ChatSession, CredentialManager, GeminiClient};
use office_assistant_lib::config::AssistantConfig;
use office_assistant_lib::host::MemoryDocument;
use office_assistant_lib::materialize::{HostKind, MaterializationPipeline};

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "office-assistant")]
#[command(about = "Gemini chat assistant for Word, Excel and PowerPoint documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask Gemini a question and optionally insert the reply into a dry-run document
    Ask {
        prompt: String,

        /// Host application: word, excel or powerpoint
        #[arg(long, default_value = "word")]
        host: String,

        /// Document context (selection or body text) sent with the prompt
        #[arg(long)]
        context: Option<String>,

        /// File to attach to the message
        #[arg(long)]
        attach: Option<PathBuf>,

        /// Materialize the reply into an in-memory document and print the operations
        #[arg(long)]
        insert: bool,
    },

    /// Show what a response would be written as, without calling Gemini
    Plan {
        /// Host application: word, excel or powerpoint
        #[arg(long, default_value = "word")]
        host: String,

        /// Response file (reads stdin when omitted)
        file: Option<PathBuf>,
    },

    /// Store the Gemini API key
    SetKey { key: String },

    /// Remove the stored Gemini API key
    DeleteKey,
}

#[tokio::main]
async fn main() -> ExitCode {
    office_assistant_lib::init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Ask {
            prompt,
            host,
            context,
            attach,
            insert,
        } => ask(&prompt, HostKind::from_str(&host), context, attach, insert).await,
        Commands::Plan { host, file } => plan(HostKind::from_str(&host), file),
        Commands::SetKey { key } => CredentialManager::new()
            .store_api_key(&key)
            .map(|_| println!("API key saved."))
            .map_err(Into::into),
        Commands::DeleteKey => CredentialManager::new()
            .delete_api_key()
            .map(|_| println!("API key removed."))
            .map_err(Into::into),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn ask(
    prompt: &str,
    host: HostKind,
    context: Option<String>,
    attach: Option<PathBuf>,
    insert: bool,
) -> CliResult {
    let config = AssistantConfig::from_env()?;
    let client = GeminiClient::from_config(config.gemini.clone())?;
    let session = ChatSession::new(client, host, config.gemini.max_context_chars);

    if let Some(path) = attach {
        session.attach(Attachment::from_path(&path)?).await;
    }

    let Some(reply) = session.send(prompt, context.as_deref()).await? else {
        return Ok(());
    };
    println!("{}", reply.text);

    if insert && !reply.is_error {
        let document = MemoryDocument::new(host);
        let pipeline = MaterializationPipeline::new(config.materialize);
        let outcome = pipeline.materialize(&document, &reply.text, host).await;

        let report = serde_json::json!({
            "outcome": outcome,
            "operations": document.operations().await,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn plan(host: HostKind, file: Option<PathBuf>) -> CliResult {
    let response = match file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    let config = AssistantConfig::from_env()?;
    let pipeline = MaterializationPipeline::new(config.materialize);
    let plan = pipeline.plan(&response, host);
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}
