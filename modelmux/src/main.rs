//! modelmux CLI.
//!
//! Thin front end over [`modelmux::ModelMux`]:
//!
//! ```bash
//! modelmux ask "Explain recursion"
//! modelmux ask "Fix this panic" --provider ollama --model auto
//! modelmux consensus "Summarize X" --model gpt-4o --model llama3.1
//! modelmux models
//! modelmux health
//! ```

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use modelmux::{InvocationResult, InvokeOptions, ModelMux, MuxConfig, MuxError};

#[derive(Parser, Debug)]
#[command(author, version, about = "Multi-provider LLM routing and consensus", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Route a prompt to one provider and print the response
    Ask {
        prompt: String,

        /// Provider id, or "auto" to use the configured default
        #[arg(long, default_value = "auto")]
        provider: String,

        /// Model id, or "auto" to classify the prompt
        #[arg(long, default_value = "auto")]
        model: String,

        #[arg(long)]
        temperature: Option<f32>,

        #[arg(long)]
        max_tokens: Option<u32>,

        /// Per-call deadline in seconds (overrides MODELMUX_TIMEOUT_SECS)
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Fan a prompt out to several models and print the ranked report
    Consensus {
        prompt: String,

        /// Model id to include; repeat for more. Empty uses the top-scored
        /// catalog models.
        #[arg(long = "model")]
        models: Vec<String>,
    },

    /// List the provider and model catalog
    Models,

    /// Probe the sidecar backend and report its health
    Health,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("modelmux=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let mux = ModelMux::new(MuxConfig::from_env())?;

    match args.command {
        Command::Ask {
            prompt,
            provider,
            model,
            temperature,
            max_tokens,
            timeout_secs,
        } => {
            let mut options = InvokeOptions {
                provider,
                model,
                ..InvokeOptions::default()
            };
            if let Some(temperature) = temperature {
                options.temperature = temperature;
            }
            if let Some(max_tokens) = max_tokens {
                options.max_tokens = max_tokens;
            }
            if let Some(secs) = timeout_secs {
                options.timeout = Some(std::time::Duration::from_secs(secs));
            }

            let result = mux.invoke(&prompt, options).await?;
            match &result.outcome {
                Ok(text) => println!("{text}"),
                Err(err) => bail!("{} failed: {err}", result.model_id),
            }
        }

        Command::Consensus { prompt, models } => match mux.consensus(&prompt, &models).await {
            Ok(report) => {
                print_report(&report.results, Some(&report.winner_model_id));
            }
            Err(MuxError::NoSuccessfulResponse { results }) => {
                print_report(&results, None);
                bail!("no model returned a usable response");
            }
            Err(err) => return Err(err.into()),
        },

        Command::Models => {
            let catalog = mux.catalog();
            let mut providers: Vec<_> = catalog.providers().collect();
            providers.sort_by(|a, b| a.id.cmp(&b.id));
            for provider in providers {
                println!("{} [{}] {}", provider.id, provider.family, provider.endpoint);
                let mut models: Vec<_> = catalog
                    .models()
                    .filter(|m| m.provider_id == provider.id)
                    .collect();
                models.sort_by(|a, b| a.id.cmp(&b.id));
                for model in models {
                    println!("  {} (score {:.2})", model.id, model.quality_score);
                }
            }
        }

        Command::Health => {
            let healthy = mux.check_health().await;
            println!("{}", if healthy { "healthy" } else { "unhealthy" });
            if !healthy {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Render the full per-model report, marking the winner when there is one.
fn print_report(results: &[InvocationResult], winner: Option<&str>) {
    for result in results {
        let marker = if Some(result.model_id.as_str()) == winner {
            '*'
        } else {
            ' '
        };
        match &result.outcome {
            Ok(text) => {
                println!("{marker} {} (score {:.2})", result.model_id, result.score);
                for line in text.lines() {
                    println!("    {line}");
                }
            }
            Err(err) => {
                println!(
                    "{marker} {} (score {:.2}) failed: {err}",
                    result.model_id, result.score
                );
            }
        }
    }
}
