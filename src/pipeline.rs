// ABOUTME: Pipeline orchestration for the smart-slides application
// ABOUTME: Chains outline generation, enrichment, and assembly into one run

use crate::cache::AssetCache;
use crate::config::Config;
use crate::enrich::Enricher;
use crate::errors::{Result, SlideError};
use crate::images::ImageProvider;
use crate::outline::{OutlineProvider, SlideRecord};
use crate::pptx::{assemble, Deck};
use crate::theme;
use crate::utils::sanitize_topic;
use log::info;
use std::path::PathBuf;

/// Per-run parameters, as supplied by the CLI.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub topic: String,
    pub slide_count: usize,
    pub style: String,
}

/// Run the whole pipeline: outline, per-slide enrichment in outline order,
/// then document assembly. Returns the path of the written presentation.
///
/// Slides are processed strictly sequentially; each external failure short
/// of a total outline failure degrades a single slide instead of aborting.
pub fn generate_presentation(
    options: &GenerateOptions,
    config: &Config,
    outline_provider: &dyn OutlineProvider,
    image_provider: &dyn ImageProvider,
) -> Result<PathBuf> {
    if options.slide_count == 0 {
        return Err(SlideError::ValidationError(
            "Slide count must be at least 1".to_string(),
        ));
    }
    let safe_topic = sanitize_topic(&options.topic);
    if safe_topic.trim_matches('_').is_empty() {
        return Err(SlideError::ValidationError(format!(
            "Topic '{}' contains no usable characters",
            options.topic
        )));
    }

    let spec = theme::resolve(&options.style);
    let cache = AssetCache::open(&config.cache_dir)?;

    info!(
        "Generating '{}' ({} slides, {} style)",
        options.topic, options.slide_count, spec.name
    );

    let outline = outline_provider.outline(&options.topic, options.slide_count)?;
    if outline.is_empty() {
        return Err(SlideError::OutlineError(
            "Outline provider returned no slides".to_string(),
        ));
    }

    let mut slides = Vec::with_capacity(outline.len() + 1);
    slides.push(SlideRecord::title_slide(&options.topic));
    slides.extend(outline.into_iter().map(SlideRecord::from_outline));

    let enricher = Enricher::new(&cache, image_provider, outline_provider, &spec);
    for (index, slide) in slides.iter_mut().enumerate() {
        enricher.enrich_slide(slide, index);
    }

    let output_file = config
        .output_dir
        .join(format!("{}_{}_presentation.pptx", safe_topic, spec.name));
    let deck = Deck {
        topic: options.topic.clone(),
        slides,
    };
    assemble(&deck, &spec, &output_file)?;

    Ok(output_file)
}
