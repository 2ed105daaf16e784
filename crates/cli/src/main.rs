//! CLI tool for turning bulk text into a deck built on a PowerPoint template.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use deckgen_core::{mask_credential, Deck};
use deckgen_llm::{OutlineGenerator, ProviderConfig};
use deckgen_pptx::{summarize_template, BuildOptions, PresentationBuilder, TemplateSummary};
use std::fmt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Shortest text worth sending to a provider.
const MIN_TEXT_CHARS: usize = 10;

/// Largest template accepted.
const MAX_TEMPLATE_BYTES: u64 = 20 * 1024 * 1024;

/// Generate slide outlines with an LLM and build them into a PowerPoint template.
#[derive(Parser, Debug)]
#[command(name = "deckgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a deck outline (JSON) from text
    Outline {
        /// Text or Markdown file ("-" reads stdin)
        #[arg(short, long)]
        text: PathBuf,

        /// Template (.pptx or .potx) to summarize alongside the outline
        #[arg(short = 'T', long)]
        template: Option<PathBuf>,

        /// Output file for the deck JSON (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Build a presentation from deck JSON and a template
    Build {
        /// Deck JSON file ("-" reads stdin)
        #[arg(short, long)]
        deck: PathBuf,

        /// Template (.pptx or .potx)
        #[arg(short = 'T', long)]
        template: PathBuf,

        /// Output .pptx file (default: template name with "-deck.pptx")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Provider to record for speaker-notes backfill
        #[arg(long, requires = "api_key")]
        provider: Option<String>,

        /// Model to record for speaker-notes backfill
        #[arg(long, default_value = "")]
        model: String,

        /// API key for speaker-notes backfill (only its masked form is kept)
        #[arg(long, env = "DECKGEN_API_KEY", hide_env_values = true, value_parser = parse_api_key)]
        api_key: Option<String>,
    },

    /// Generate an outline and build it in one go
    Run {
        /// Text or Markdown file ("-" reads stdin)
        #[arg(short, long)]
        text: PathBuf,

        /// Template (.pptx or .potx)
        #[arg(short = 'T', long)]
        template: PathBuf,

        /// Output .pptx file (default: template name with "-deck.pptx")
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also write the generated deck JSON here
        #[arg(long)]
        save_deck: Option<PathBuf>,

        #[command(flatten)]
        llm: LlmArgs,
    },

    /// Show the layouts and reusable images of a template
    Inspect {
        /// Template (.pptx or .potx)
        template: PathBuf,
    },
}

/// Provider selection shared by the subcommands that call a model.
#[derive(Args)]
struct LlmArgs {
    /// Provider: openai, anthropic or gemini
    #[arg(short, long, default_value = "openai")]
    provider: String,

    /// Model name (default: the provider's default model)
    #[arg(short, long, default_value = "")]
    model: String,

    /// API key for the provider
    #[arg(long, env = "DECKGEN_API_KEY", hide_env_values = true, value_parser = parse_api_key)]
    api_key: String,

    /// OpenAI-compatible base URL or full chat-completions URL
    #[arg(long, env = "OPENAI_BASE")]
    openai_base: Option<String>,

    /// Extra guidance for the outline (tone, audience)
    #[arg(short, long, default_value = "")]
    guidance: String,
}

/// API key with surrounding whitespace removed; a blank key is rejected.
fn parse_api_key(value: &str) -> std::result::Result<String, String> {
    let key = value.trim();
    if key.is_empty() {
        return Err("API key is empty".to_string());
    }
    Ok(key.to_string())
}

impl fmt::Debug for LlmArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmArgs")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_key", &mask_credential(&self.api_key))
            .field("openai_base", &self.openai_base)
            .field("guidance", &self.guidance)
            .finish()
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Command::Outline {
            text,
            template,
            output,
            llm,
        } => {
            let raw_text = read_text(&text)?;
            if let Some(template) = template {
                let summary = inspect_template(&template)?;
                eprintln!("{}", serde_json::to_string_pretty(&summary)?);
            }

            let deck = generate_deck(&llm, &raw_text).await?;
            let json = serde_json::to_string_pretty(&deck)?;
            match output {
                Some(path) => {
                    write_output(&path, json.as_bytes())?;
                    if cli.verbose {
                        eprintln!("Written to: {}", path.display());
                    }
                }
                None => println!("{}", json),
            }
        }
        Command::Build {
            deck,
            template,
            output,
            provider,
            model,
            api_key,
        } => {
            let json = read_text(&deck)?;
            let mut deck = Deck::from_json_str(&json)
                .with_context(|| format!("Invalid deck JSON in {}", deck.display()))?;

            if let (Some(provider), Some(api_key)) = (provider.as_deref(), api_key.as_deref()) {
                log::debug!(
                    "Recording notes backfill via {} (key {})",
                    provider,
                    mask_credential(api_key)
                );
                deck.request_notes_backfill(provider, &model, api_key);
            }

            let template_bytes = read_template(&template)?;
            let path = build_deck(&deck, &template_bytes, &template, output.as_ref())?;
            if cli.verbose {
                eprintln!("Written to: {}", path.display());
            }
        }
        Command::Run {
            text,
            template,
            output,
            save_deck,
            llm,
        } => {
            let raw_text = read_text(&text)?;
            let template_bytes = read_template(&template)?;
            let deck = generate_deck(&llm, &raw_text).await?;

            if let Some(path) = save_deck {
                write_output(&path, serde_json::to_string_pretty(&deck)?.as_bytes())?;
            }

            let path = build_deck(&deck, &template_bytes, &template, output.as_ref())?;
            if cli.verbose {
                eprintln!("Written to: {}", path.display());
            }
        }
        Command::Inspect { template } => {
            let summary = inspect_template(&template)?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

/// Ask the configured provider for an outline and validate it.
async fn generate_deck(llm: &LlmArgs, raw_text: &str) -> Result<Deck> {
    if raw_text.trim().chars().count() < MIN_TEXT_CHARS {
        bail!("Input text is too short (need at least {} characters)", MIN_TEXT_CHARS);
    }

    let mut config = ProviderConfig::default();
    if let Some(base) = &llm.openai_base {
        config = config.with_openai_base(base.as_str());
    }

    log::debug!(
        "Generating outline with {} (key {})",
        llm.provider,
        mask_credential(&llm.api_key)
    );

    let generator = OutlineGenerator::new(config)?;
    log::debug!("OpenAI-compatible endpoint: {}", generator.config().openai_base);
    let deck = generator
        .generate_deck(&llm.provider, &llm.model, &llm.api_key, raw_text, &llm.guidance)
        .await
        .with_context(|| {
            format!(
                "Outline generation failed ({} key {})",
                llm.provider,
                mask_credential(&llm.api_key)
            )
        })?;

    log::info!("Outline has {} slides", deck.slides.len());
    Ok(deck)
}

/// Build `deck` on the template read from `template` and write the result.
fn build_deck(
    deck: &Deck,
    template_bytes: &[u8],
    template: &Path,
    output: Option<&PathBuf>,
) -> Result<PathBuf> {
    let missing = deck.slides_missing_notes();
    if deck.fill_missing_notes && !missing.is_empty() {
        log::info!("{} slides have no speaker notes", missing.len());
    }

    let pptx = PresentationBuilder::new(BuildOptions::default())
        .build(template_bytes, deck)
        .with_context(|| format!("Failed to build on {}", template.display()))?;

    let path = get_output_path(template, output);
    write_output(&path, &pptx)?;
    Ok(path)
}

fn inspect_template(template: &Path) -> Result<TemplateSummary> {
    let bytes = read_template(template)?;
    summarize_template(&bytes).with_context(|| format!("Failed to read template {}", template.display()))
}

/// Read a template, checking its extension and size.
fn read_template(path: &Path) -> Result<Vec<u8>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if extension != "pptx" && extension != "potx" {
        bail!("Template must be a .pptx or .potx file: {}", path.display());
    }

    let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let size = file
        .metadata()
        .with_context(|| format!("Failed to stat {}", path.display()))?
        .len();
    if size > MAX_TEMPLATE_BYTES {
        bail!(
            "Template {} is {} bytes (limit {})",
            path.display(),
            size,
            MAX_TEMPLATE_BYTES
        );
    }

    let mut bytes = Vec::with_capacity(size as usize);
    file.read_to_end(&mut bytes)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(bytes)
}

/// Read a UTF-8 text file, or stdin for "-".
fn read_text(path: &Path) -> Result<String> {
    let mut text = String::new();
    if path.as_os_str() == "-" {
        std::io::stdin()
            .read_to_string(&mut text)
            .with_context(|| "Failed to read stdin")?;
    } else {
        File::open(path)
            .with_context(|| format!("Failed to open {}", path.display()))?
            .read_to_string(&mut text)
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    Ok(text)
}

/// Determine the output path for a built deck.
fn get_output_path(template: &Path, output: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = output {
        return path.clone();
    }

    let stem = template
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let output_filename = format!("{}-deck.pptx", stem);

    match template.parent() {
        Some(parent) => parent.join(output_filename),
        None => PathBuf::from(output_filename),
    }
}

/// Write output to a file.
fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let mut file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;

    file.write_all(content)
        .with_context(|| format!("Failed to write to {}", path.display()))?;

    Ok(())
}
