use clap::Parser;
use color_eyre::eyre::Result;
use log::{debug, error, info};
use std::process::ExitCode;

use gitsync::config::{Args, Config};
use gitsync::git::{self, VcsBackend};
use gitsync::llm::{self, LlmClient};
use gitsync::{CanonicalChange, Console, logging};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    if args.version {
        println!("gitsync version {}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    let config = Config::load()?;
    let final_config = config.merge_with_args(&args);

    logging::init_logging(final_config.debug.unwrap_or(false))?;
    color_eyre::install()?;

    let console = Console::detect(final_config.no_color.unwrap_or(false));
    let dir = match args.repo.clone() {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    info!("Starting gitsync in directory: {dir:?}");

    console.banner();
    console.step("Checking git repository...");

    let backend = match git::open_backend(final_config.get_backend(), &dir) {
        Ok(backend) => backend,
        Err(e) => {
            error!("{e}");
            console.error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };
    console.success("Git repository found");

    console.blank();
    console.step("Checking for changes...");
    let changes = match read_change_set(backend.as_ref()) {
        Ok(changes) => changes,
        Err(e) => {
            error!("{e}");
            console.error(&e.to_string());
            return Ok(ExitCode::FAILURE);
        }
    };
    console.success(&format!("Found {} changed file(s)", changes.len()));

    if changes.is_empty() {
        console.warn("No changes to commit");
        return Ok(ExitCode::SUCCESS);
    }

    console.blank();
    console.changes(&changes);
    console.blank();

    console.step("Generating commit message...");
    let transcript =
        git::assemble_transcript(backend.as_ref(), final_config.get_max_transcript_chars());
    let llm_config = final_config.llm.clone().unwrap_or_default();
    let mut client = match LlmClient::new(llm_config) {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to create LLM client: {e}");
            console.error(&e);
            return Ok(ExitCode::FAILURE);
        }
    };
    let message = match client
        .generate_commit_message(&transcript, &llm::summarize_changes(&changes))
        .await
    {
        Ok(message) => message,
        Err(e) => {
            error!("{e}");
            console.error(&e);
            return Ok(ExitCode::FAILURE);
        }
    };
    console.success(&message.status_line());

    console.blank();
    console.panel("Generated Commit Message", &message.content);
    console.blank();

    if final_config.dry_run.unwrap_or(false) {
        console.warn("Dry run: nothing committed");
        return Ok(ExitCode::SUCCESS);
    }

    console.step("Committing changes...");
    if let Err(e) = backend.commit_all(&message.content) {
        error!("Commit failed: {e}");
        console.error(&format!("Commit failed: {e}"));
        return Ok(ExitCode::FAILURE);
    }
    console.success("Changes committed successfully!");

    console.blank();
    console.success("Done!");
    Ok(ExitCode::SUCCESS)
}

fn read_change_set(backend: &dyn VcsBackend) -> Result<Vec<CanonicalChange>, gitsync::ChangeSetError> {
    let records = git::list_working_tree_changes(backend);
    let changes = git::reconcile(&records)?;
    debug!("Change set: {changes:?}");
    Ok(changes)
}
