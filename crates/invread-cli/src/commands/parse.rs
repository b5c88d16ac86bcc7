//! Parse command - upload one invoice to the relay and show the result.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use invread_core::{InvoiceSummary, ParseResponse};

use super::config::load_config;
use crate::client::RelayClient;

/// Extensions the upload dialog offers.
const ACCEPTED_EXTENSIONS: [&str; 4] = ["pdf", "jpg", "jpeg", "png"];

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Invoice file (PDF, JPG or PNG)
    input: Option<PathBuf>,

    /// Vision Parser API key, overrides the relay's configured key
    #[arg(short = 'k', long)]
    api_key: Option<String>,

    /// Relay endpoint URL
    #[arg(long)]
    relay_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Labeled summary
    Text,
    /// Relay response as received
    Json,
    /// One row per field: field,value,confidence
    Csv,
}

pub async fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let Some(input) = args.input.as_deref() else {
        anyhow::bail!("Please select a file");
    };
    if !input.is_file() {
        anyhow::bail!("File not found: {}", input.display());
    }

    let config = load_config(config_path)?;
    let relay_url = args.relay_url.as_deref().unwrap_or(&config.client.relay_url);

    check_selection(input, config.client.max_upload_bytes)?;

    info!("Uploading {} to {}", input.display(), relay_url);

    let client = RelayClient::new(relay_url)?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message("Processing...");
    pb.enable_steady_tick(Duration::from_millis(100));

    let reply = client.submit(input, args.api_key.as_deref()).await;
    pb.finish_and_clear();
    let reply = reply?;

    let output = match args.format {
        OutputFormat::Json => reply.raw,
        OutputFormat::Csv => format_csv(&reply.response)?,
        OutputFormat::Text => {
            let summary = InvoiceSummary::from_invoice(&reply.response.data);
            if args.output.is_some() {
                summary.to_string()
            } else {
                format_styled(&summary)
            }
        }
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    debug!("Total time: {:?}", start.elapsed());

    Ok(())
}

/// Warn about selections the relay is likely to reject or the provider
/// cannot read. The relay stays the authority on both.
fn check_selection(input: &Path, max_upload_bytes: u64) -> anyhow::Result<()> {
    let extension = input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
        warn!("{} is not a PDF, JPG or PNG file", input.display());
    }

    let size = fs::metadata(input)?.len();
    if size > max_upload_bytes {
        warn!(
            "{} is {} bytes, above the {} byte upload limit",
            input.display(),
            size,
            max_upload_bytes
        );
    }

    Ok(())
}

fn format_styled(summary: &InvoiceSummary) -> String {
    let mut out = format!("{}\n", style("Extracted Information").bold());
    for section in &summary.sections {
        out.push('\n');
        out.push_str(&format!("{}\n", style(section.title).cyan().bold()));
        for line in &section.lines {
            out.push_str(&format!("  {}: {}\n", line.label, line.value));
        }
    }
    if let Some(range) = &summary.confidence {
        out.push('\n');
        out.push_str(&format!("{} {}\n", style("Confidence:").bold(), range));
    }
    out
}

fn format_csv(response: &ParseResponse) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["field", "value", "confidence"])?;
    for entry in response.data.entries() {
        let confidence = entry.confidence.map(|c| c.to_string()).unwrap_or_default();
        wtr.write_record([entry.name, entry.value.as_str(), confidence.as_str()])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}
