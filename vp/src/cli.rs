//! CLI command definitions and subcommands

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::flows::ContextHint;

/// VoicePlan - voice-driven planning pipeline
#[derive(Parser)]
#[command(
    name = "vp",
    about = "Turn voice recordings into plans and itineraries",
    version,
    after_help = "Logs are written to: ~/.local/share/voiceplan/logs/voiceplan.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Generate a plan or itinerary from an audio recording
    Generate {
        /// Path to the audio file (wav, mp3, m4a, ogg, webm, flac, aac)
        audio: PathBuf,

        /// Screen context biasing intent routing (plan or itinerary)
        #[arg(long)]
        context: Option<ContextArg>,
    },

    /// Update a stored plan from an audio recording
    UpdatePlan {
        /// Path to the audio file
        audio: PathBuf,

        /// Id of the stored plan to update
        #[arg(long)]
        id: String,

        /// Optional template hint guiding the plan structure
        #[arg(long)]
        template: Option<String>,
    },

    /// Update a stored itinerary from an audio recording
    UpdateItinerary {
        /// Path to the audio file
        audio: PathBuf,

        /// Id of the stored itinerary to update
        #[arg(long)]
        id: String,
    },

    /// Add subtasks to a task within a stored plan from an audio recording
    AddSubtasks {
        /// Path to the audio file
        audio: PathBuf,

        /// Id of the stored plan containing the task
        #[arg(long)]
        plan: String,

        /// Id of the task to augment
        #[arg(long)]
        task: String,
    },

    /// Generate insights from stored history
    Insights,

    /// List stored plans and itineraries
    List,

    /// Show a stored plan or itinerary as JSON
    Show {
        /// Record id
        id: String,
    },

    /// Delete a stored plan or itinerary
    Delete {
        /// Record id
        id: String,
    },
}

/// Context hint argument
#[derive(Clone, Copy, Debug)]
pub struct ContextArg(pub ContextHint);

impl std::str::FromStr for ContextArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "plan" => Ok(Self(ContextHint::Plan)),
            "itinerary" => Ok(Self(ContextHint::Itinerary)),
            _ => Err(format!("Unknown context: {}. Use: plan or itinerary", s)),
        }
    }
}

/// Infer the audio MIME type from a file extension
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "wav" => Some("audio/wav"),
        "mp3" => Some("audio/mp3"),
        "m4a" | "mp4" => Some("audio/mp4"),
        "ogg" | "oga" => Some("audio/ogg"),
        "webm" => Some("audio/webm"),
        "flac" => Some("audio/flac"),
        "aac" => Some("audio/aac"),
        _ => None,
    }
}
