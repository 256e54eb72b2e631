//! VoicePlan - voice-driven planning pipeline
//!
//! CLI entry point: record file -> transcribe -> route -> generate -> persist.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use clap::Parser;
use eyre::{Context, Result, eyre};
use tracing::info;

use planstore::Store;
use voiceplan::actions::VoicePlanner;
use voiceplan::cli::{Cli, Command, mime_for_path};
use voiceplan::config::Config;
use voiceplan::domain::{StoredItinerary, StoredPlan};
use voiceplan::flows::AudioPayload;
use voiceplan::llm::create_client;
use voiceplan::prompts::PromptLoader;

fn setup_logging(verbose: bool) -> Result<()> {
    // Write to a log file, keeping stdout clean for JSON output
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voiceplan")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("voiceplan.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

/// Read an audio file into a self-describing payload
fn read_audio(path: &Path) -> Result<AudioPayload> {
    let mime_type = mime_for_path(path)
        .ok_or_else(|| eyre!("Unsupported audio file: {}. Use wav, mp3, m4a, ogg, webm, flac, or aac", path.display()))?;

    let bytes = fs::read(path).context(format!("Failed to read audio file {}", path.display()))?;
    Ok(AudioPayload::new(mime_type, BASE64.encode(bytes)))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        "VoicePlan loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    let store = Store::open(&config.storage.data_dir).context("Failed to open record store")?;
    let user = config.storage.user.clone();

    // Store-only commands don't need model credentials
    match &cli.command {
        Command::List => return cmd_list(&store),
        Command::Show { id } => return cmd_show(&store, id),
        Command::Delete { id } => return cmd_delete(&store, id),
        _ => {}
    }

    config.validate()?;
    let llm = create_client(&config.llm).map_err(|e| eyre!("Failed to create model client: {}", e))?;
    let prompts = Arc::new(PromptLoader::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))));
    let planner = VoicePlanner::new(llm, prompts);

    match cli.command {
        Command::Generate { audio, context } => cmd_generate(&planner, &store, &user, &audio, context.map(|c| c.0)).await,
        Command::UpdatePlan { audio, id, template } => cmd_update_plan(&planner, &store, &audio, &id, template).await,
        Command::UpdateItinerary { audio, id } => cmd_update_itinerary(&planner, &store, &audio, &id).await,
        Command::AddSubtasks { audio, plan, task } => cmd_add_subtasks(&planner, &store, &audio, &plan, &task).await,
        Command::Insights => cmd_insights(&planner, &store).await,
        Command::List | Command::Show { .. } | Command::Delete { .. } => unreachable!("handled above"),
    }
}

async fn cmd_generate(
    planner: &VoicePlanner,
    store: &Store,
    user: &str,
    audio_path: &Path,
    context: Option<voiceplan::flows::ContextHint>,
) -> Result<()> {
    let audio = read_audio(audio_path)?;
    let response = planner.generate_content_from_voice(&audio, context).await;

    if let (Some(content), Some(transcription)) = (&response.data, &response.transcription) {
        match content {
            voiceplan::actions::GeneratedContent::Plan(plan) => {
                let stored = StoredPlan::new(user, transcription.clone(), plan.clone());
                store.upsert(&stored)?;
                eprintln!("Saved plan {}", stored.id);
            }
            voiceplan::actions::GeneratedContent::Itinerary(itinerary) => {
                let stored = StoredItinerary::new(user, transcription.clone(), itinerary.clone());
                store.upsert(&stored)?;
                eprintln!("Saved itinerary {}", stored.id);
            }
        }
    }

    print_json(&response)?;
    if response.is_success() { Ok(()) } else { Err(eyre!("generation did not succeed")) }
}

async fn cmd_update_plan(
    planner: &VoicePlanner,
    store: &Store,
    audio_path: &Path,
    id: &str,
    template: Option<String>,
) -> Result<()> {
    let stored: StoredPlan = store.get(id).context(format!("No stored plan with id {}", id))?;
    let audio = read_audio(audio_path)?;

    let response = planner.update_plan_from_voice(&audio, stored.plan.clone(), template).await;

    if let (Some(plan), Some(transcription)) = (&response.data, &response.transcription) {
        let updated = stored.with_updated_plan(plan.clone(), transcription.clone());
        store.upsert(&updated)?;
        eprintln!("Updated plan {}", updated.id);
    }

    print_json(&response)?;
    if response.is_success() { Ok(()) } else { Err(eyre!("update did not succeed")) }
}

async fn cmd_update_itinerary(planner: &VoicePlanner, store: &Store, audio_path: &Path, id: &str) -> Result<()> {
    let stored: StoredItinerary = store.get(id).context(format!("No stored itinerary with id {}", id))?;
    let audio = read_audio(audio_path)?;

    let response = planner.update_itinerary_from_voice(&audio, &stored.itinerary).await;

    if let (Some(itinerary), Some(transcription)) = (&response.data, &response.transcription) {
        let updated = stored.with_updated_itinerary(itinerary.clone(), transcription.clone());
        store.upsert(&updated)?;
        eprintln!("Updated itinerary {}", updated.id);
    }

    print_json(&response)?;
    if response.is_success() { Ok(()) } else { Err(eyre!("update did not succeed")) }
}

async fn cmd_add_subtasks(
    planner: &VoicePlanner,
    store: &Store,
    audio_path: &Path,
    plan_id: &str,
    task_id: &str,
) -> Result<()> {
    let stored: StoredPlan = store.get(plan_id).context(format!("No stored plan with id {}", plan_id))?;
    let task = stored
        .plan
        .find_task(task_id)
        .ok_or_else(|| eyre!("No task with id {} in plan {}", task_id, plan_id))?
        .clone();

    let audio = read_audio(audio_path)?;
    let response = planner.add_subtasks_from_voice(&audio, &task).await;

    if let (Some(updated_task), Some(transcription)) = (&response.data, &response.transcription) {
        let mut plan = stored.plan.clone();
        plan.replace_task(updated_task.clone());
        let updated = stored.with_updated_plan(plan, transcription.clone());
        store.upsert(&updated)?;
        eprintln!("Updated plan {}", updated.id);
    }

    print_json(&response)?;
    if response.is_success() { Ok(()) } else { Err(eyre!("subtask update did not succeed")) }
}

async fn cmd_insights(planner: &VoicePlanner, store: &Store) -> Result<()> {
    let plans: Vec<StoredPlan> = store.list()?;
    let itineraries: Vec<StoredItinerary> = store.list()?;

    let response = planner.fetch_user_insights(&plans, &itineraries).await;
    print_json(&response)?;
    if response.is_success() { Ok(()) } else { Err(eyre!("insight generation did not succeed")) }
}

fn cmd_list(store: &Store) -> Result<()> {
    let plans: Vec<StoredPlan> = store.list()?;
    let itineraries: Vec<StoredItinerary> = store.list()?;

    if plans.is_empty() && itineraries.is_empty() {
        println!("No stored plans or itineraries.");
        return Ok(());
    }

    for plan in &plans {
        println!("plan       {}  {}  ({} tasks)", plan.id, plan.plan.title, plan.plan.task_count());
    }
    for itinerary in &itineraries {
        println!(
            "itinerary  {}  {}  ({} - {})",
            itinerary.id, itinerary.itinerary.title, itinerary.itinerary.start_date, itinerary.itinerary.end_date
        );
    }
    Ok(())
}

fn cmd_show(store: &Store, id: &str) -> Result<()> {
    if let Ok(plan) = store.get::<StoredPlan>(id) {
        return print_json(&plan);
    }
    if let Ok(itinerary) = store.get::<StoredItinerary>(id) {
        return print_json(&itinerary);
    }
    Err(eyre!("No stored plan or itinerary with id {}", id))
}

fn cmd_delete(store: &Store, id: &str) -> Result<()> {
    if store.delete::<StoredPlan>(id).is_ok() {
        println!("Deleted plan {}", id);
        return Ok(());
    }
    if store.delete::<StoredItinerary>(id).is_ok() {
        println!("Deleted itinerary {}", id);
        return Ok(());
    }
    Err(eyre!("No stored plan or itinerary with id {}", id))
}
