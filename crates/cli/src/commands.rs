//! Subcommand handlers.

use std::io::{IsTerminal, Write};
use std::time::Duration;

use anyhow::{bail, Context};
use indexmap::IndexMap;
use tokio::sync::broadcast::error::RecvError;
use vlmcap_client::{model, CaptionServiceApi, JobEvent, JobPollController};
use vlmcap_core::render::render_view;
use vlmcap_core::state::JobView;
use vlmcap_core::types::{CaptionFileRequest, JobRequest};

use crate::args::{Cli, Command};
use crate::config::{parse_seconds, ClientConfig};

/// Clear screen and home the cursor.
const CLEAR: &str = "\x1b[2J\x1b[H";

/// Run one subcommand to completion.
pub async fn run(cli: Cli, config: ClientConfig) -> anyhow::Result<()> {
    let api_url = cli.api_url.unwrap_or(config.api_url);
    let api = CaptionServiceApi::new(api_url);
    let mut out = std::io::stdout().lock();

    match cli.command {
        Command::Models => {
            let models = api.available_models().await.context("Failed to list models")?;
            write_catalogue(&mut out, &models)?;
        }
        Command::Prompts => {
            let prompts = api
                .available_prompts()
                .await
                .context("Failed to list prompts")?;
            write_catalogue(&mut out, &prompts)?;
        }
        Command::LoadModel { model } => {
            model::load_model(&api, model.as_deref()).await?;
            writeln!(out, "Model loaded")?;
        }
        Command::StopModel => {
            let message = model::stop_model(&api).await?;
            writeln!(out, "{message}")?;
        }
        Command::StopJob => {
            let message = model::stop_job(&api).await?;
            writeln!(out, "{message}")?;
        }
        Command::CaptionFile {
            image_path,
            prompt,
            append_prompt,
        } => {
            let prompts = api
                .available_prompts()
                .await
                .context("Failed to list prompts")?;
            let request = CaptionFileRequest {
                image_path,
                prompt: resolve_prompt(&prompts, &prompt).to_string(),
                append_prompt: append_prompt.filter(|text| !text.trim().is_empty()),
            };
            let caption = api.caption_file(&request).await?;
            writeln!(out, "{caption}")?;
        }
        Command::Caption {
            directory,
            model,
            prompt,
            append_prompt,
            load,
            poll_interval,
        } => {
            let interval = match poll_interval {
                Some(secs) => parse_seconds("--poll-interval", &secs.to_string())?,
                None => config.poll_interval,
            };
            if load {
                model::load_model(&api, Some(&model)).await?;
            }
            let mut request = JobRequest::new(directory, model, prompt);
            if let Some(text) = append_prompt {
                request = request.with_append_prompt(text);
            }
            caption_directory(api, &request, interval, &mut out).await?;
        }
    }

    Ok(())
}

/// Submit a directory job and redraw its view until it settles.
async fn caption_directory(
    api: CaptionServiceApi,
    request: &JobRequest,
    interval: Duration,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let mut controller = JobPollController::with_interval(api, interval);
    let mut events = controller.subscribe();
    let redraw = std::io::stdout().is_terminal();

    let response = controller.submit_job(request).await?;
    tracing::info!(message = %response.message, files = response.files.len(), "Job accepted");

    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                controller.shutdown().await;
                bail!("Interrupted; the job keeps running on the service (use `stop-job` to drop it)");
            }
        };

        match event {
            Ok(JobEvent::Submitted { view, .. }) | Ok(JobEvent::Progress { view, .. }) => {
                write_view(out, &view, redraw)?;
            }
            Ok(JobEvent::Completed { .. }) => {
                controller.shutdown().await;
                return Ok(());
            }
            Ok(JobEvent::PollFailed { error, .. }) => {
                controller.shutdown().await;
                bail!(error);
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Fell behind on job events");
            }
            Err(RecvError::Closed) => bail!("Job event channel closed"),
        }
    }
}

fn write_view(out: &mut impl Write, view: &JobView, redraw: bool) -> std::io::Result<()> {
    if redraw {
        write!(out, "{CLEAR}")?;
    }
    writeln!(out, "{}", render_view(view))?;
    out.flush()
}

fn write_catalogue(out: &mut impl Write, entries: &IndexMap<String, String>) -> std::io::Result<()> {
    let width = entries.keys().map(|k| k.chars().count()).max().unwrap_or(0);
    for (name, description) in entries {
        writeln!(out, "{name:<width$}  {description}")?;
    }
    Ok(())
}

/// A known prompt name maps to its text; anything else is literal text.
fn resolve_prompt<'a>(prompts: &'a IndexMap<String, String>, prompt: &'a str) -> &'a str {
    prompts.get(prompt).map(String::as_str).unwrap_or(prompt)
}
