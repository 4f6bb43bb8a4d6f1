//! Command-line arguments.

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "vlmcap",
    version,
    about = "Caption directories of images with a vision-language model service"
)]
pub struct Cli {
    /// Base URL of the caption service (overrides CAPTION_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List the models the service can load.
    Models,

    /// List the named prompts.
    Prompts,

    /// Load a model into the service.
    LoadModel {
        /// Model name as listed by `models`.
        model: Option<String>,
    },

    /// Unload the current model.
    StopModel,

    /// Drop the current directory job on the service.
    StopJob,

    /// Caption a single image.
    CaptionFile {
        /// Path of the image on the service host.
        image_path: String,

        /// Prompt name as listed by `prompts`, or literal prompt text.
        #[arg(long)]
        prompt: String,

        /// Text appended to the prompt.
        #[arg(long)]
        append_prompt: Option<String>,
    },

    /// Caption every image in a directory and follow the job to the end.
    Caption {
        /// Directory on the service host.
        #[arg(long)]
        directory: String,

        /// Model name as listed by `models`.
        #[arg(long)]
        model: String,

        /// Prompt name as listed by `prompts`.
        #[arg(long)]
        prompt: String,

        /// Text appended to the prompt.
        #[arg(long)]
        append_prompt: Option<String>,

        /// Load `--model` before submitting.
        #[arg(long)]
        load: bool,

        /// Seconds between status checks (overrides POLL_INTERVAL_SECS).
        #[arg(long)]
        poll_interval: Option<u64>,
    },
}
