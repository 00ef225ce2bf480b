// ABOUTME: Main entry point for the smart-slides program.
// ABOUTME: Provides the CLI interface and wires providers into the pipeline.

use clap::Parser;
use smart_slides::{
    generate_presentation, Config, GeminiOutlineClient, GenerateOptions, PexelsClient,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The topic of the presentation
    topic: String,

    /// Number of content slides to generate [default: 6]
    #[arg(short = 'n', long)]
    slides: Option<usize>,

    /// Presentation style: dark or light [default: dark]
    #[arg(short, long)]
    style: Option<String>,

    /// Directory for the generated presentation
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Directory for cached images and diagrams
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    if let Some(dir) = cli.cache_dir {
        config.cache_dir = dir;
    }

    match run(&cli.topic, cli.slides, cli.style.as_deref(), &config) {
        Ok(path) => {
            println!("Presentation saved to: {}", path.display());
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(
    topic: &str,
    slides: Option<usize>,
    style: Option<&str>,
    config: &Config,
) -> smart_slides::Result<PathBuf> {
    // Credentials are a fatal precondition, checked before any slide work.
    config.validate()?;

    // CLI flags win; absent flags fall back to the configured defaults.
    let slide_count = config.slide_count_or_default(slides);
    let style = config.style_or_default(style);

    let gemini_key = config.gemini_api_key.as_deref().unwrap_or_default();
    let pexels_key = config.pexels_api_key.as_deref().unwrap_or_default();
    let outline_provider = GeminiOutlineClient::new(gemini_key, config.request_timeout_ms)?;
    let image_provider = PexelsClient::new(pexels_key, config.request_timeout_ms)?;

    let options = GenerateOptions {
        topic: topic.to_string(),
        slide_count,
        style,
    };
    generate_presentation(&options, config, &outline_provider, &image_provider)
}
