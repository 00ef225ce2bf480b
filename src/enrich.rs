// ABOUTME: Slide enrichment stage for the smart-slides application
// ABOUTME: Decides layouts and resolves backgrounds, supporting images, and notes

use crate::cache::AssetCache;
use crate::diagram::{classify_archetype, DiagramArchetype, DiagramBackend, DiagramRenderer};
use crate::images::{ImageProvider, SearchConstraints};
use crate::outline::{OutlineProvider, SlideLayout, SlideRecord};
use crate::theme::ThemeSpec;
use crate::utils::first_sentence;
use log::{info, warn};
use std::path::PathBuf;

/// Fixed fallback when note generation fails; never blocks the pipeline.
pub const NOTES_PLACEHOLDER: &str = "Speaker notes are not available for this slide.";

/// Body length beyond which a keyword-free slide is treated as text-heavy.
const TEXT_HEAVY_BODY_LEN: usize = 400;

/// Static layout rule used when the external classifier fails or answers
/// with something unrecognized. Process, comparison, or timeline vocabulary
/// selects a diagram; long bodies read as text; everything else is a photo.
pub fn decide_layout(title: &str, body: &str) -> SlideLayout {
    if classify_archetype(title, body) != DiagramArchetype::Generic {
        SlideLayout::Diagram
    } else if body.len() > TEXT_HEAVY_BODY_LEN {
        SlideLayout::Text
    } else {
        SlideLayout::Photo
    }
}

/// Extensions a cached photo may carry, in lookup order.
const PHOTO_EXTENSIONS: &[&str] = &["jpg", "png"];

/// Cache extension for downloaded photo bytes, sniffed from the content.
/// Unrecognized bytes fall back to `jpg`, the provider's usual format.
fn photo_extension(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => "png",
        _ => "jpg",
    }
}

fn parse_layout_hint(hint: &str) -> Option<SlideLayout> {
    let lowered = hint.to_lowercase();
    if lowered.contains("photo") {
        Some(SlideLayout::Photo)
    } else if lowered.contains("diagram") {
        Some(SlideLayout::Diagram)
    } else if lowered.contains("text") {
        Some(SlideLayout::Text)
    } else {
        None
    }
}

/// Per-slide enrichment: runs the layout decision, background resolution,
/// supporting-image resolution, and note derivation in strict order. Every
/// external failure is caught here and downgrades the slide instead of
/// aborting the run.
pub struct Enricher<'a> {
    cache: &'a AssetCache,
    images: &'a dyn ImageProvider,
    outline: &'a dyn OutlineProvider,
    diagrams: &'a dyn DiagramBackend,
    theme: &'a ThemeSpec,
}

impl<'a> Enricher<'a> {
    pub fn new(
        cache: &'a AssetCache,
        images: &'a dyn ImageProvider,
        outline: &'a dyn OutlineProvider,
        theme: &'a ThemeSpec,
    ) -> Self {
        Self::with_diagram_backend(cache, images, outline, theme, &DiagramRenderer)
    }

    /// Like `new`, but with an explicit diagram backend.
    pub fn with_diagram_backend(
        cache: &'a AssetCache,
        images: &'a dyn ImageProvider,
        outline: &'a dyn OutlineProvider,
        theme: &'a ThemeSpec,
        diagrams: &'a dyn DiagramBackend,
    ) -> Self {
        Self {
            cache,
            images,
            outline,
            diagrams,
            theme,
        }
    }

    /// Enrich one slide in place. `index` is the slide's position in the
    /// deck; index 0 is always the title slide.
    pub fn enrich_slide(&self, slide: &mut SlideRecord, index: usize) {
        // 1. Layout decision
        slide.layout = if index == 0 {
            SlideLayout::Title
        } else {
            match self.outline.layout_hint(&slide.title, &slide.body) {
                Ok(hint) => parse_layout_hint(&hint)
                    .unwrap_or_else(|| decide_layout(&slide.title, &slide.body)),
                Err(e) => {
                    warn!("Layout classification failed for '{}': {}", slide.title, e);
                    decide_layout(&slide.title, &slide.body)
                }
            }
        };
        info!("Slide {} '{}' -> {} layout", index + 1, slide.title, slide.layout.label());

        // 2. Background resolution
        let keyword = slide
            .visual_keyword
            .clone()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| slide.title.clone());

        slide.background_image_path = if slide.layout == SlideLayout::Diagram {
            match self
                .diagrams
                .render(&slide.title, &slide.body, self.theme, self.cache)
            {
                Ok(path) => Some(path),
                Err(e) => {
                    // Render failure downgrades the slide to a photo layout
                    // and retries resolution through the image provider once.
                    warn!("Diagram render failed for '{}': {}", slide.title, e);
                    slide.layout = SlideLayout::Photo;
                    self.fetch_photo(&keyword)
                }
            }
        } else {
            self.fetch_photo(&keyword)
        };

        // 3. Supporting images (non-title slides only)
        if slide.layout != SlideLayout::Title {
            slide.supporting_image_paths = slide
                .supporting_visuals
                .iter()
                .take(3)
                .filter_map(|kw| self.fetch_photo(kw))
                .collect();
        }

        // 4. Speaker notes
        let notes = self
            .outline
            .speaker_notes(&slide.title, &first_sentence(&slide.body))
            .unwrap_or_else(|e| {
                warn!("Note generation failed for '{}': {}", slide.title, e);
                NOTES_PLACEHOLDER.to_string()
            });
        slide.speaker_notes = Some(notes);
    }

    /// Resolve a keyword to a local photo: cache first, then one search and
    /// one download. Any failure is logged and yields `None`; there are no
    /// retries.
    pub fn fetch_photo(&self, keyword: &str) -> Option<PathBuf> {
        let key = AssetCache::keyword_key(keyword);
        for &ext in PHOTO_EXTENSIONS {
            if let Some(path) = self.cache.resolve(&key, ext) {
                return Some(path);
            }
        }

        let candidates = match self.images.search(keyword, &SearchConstraints::default()) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Photo search failed for '{}': {}", keyword, e);
                return None;
            }
        };
        let candidate = match candidates.into_iter().next() {
            Some(candidate) => candidate,
            None => {
                info!("No photo found for '{}'", keyword);
                return None;
            }
        };

        let bytes = match self.images.download(&candidate.url) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Photo download failed for '{}': {}", keyword, e);
                return None;
            }
        };

        match self.cache.store(&key, photo_extension(&bytes), &bytes) {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to cache photo for '{}': {}", keyword, e);
                None
            }
        }
    }
}
