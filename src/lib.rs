// ABOUTME: Library module for the smart-slides program.
// ABOUTME: Contains core functionality for outline enrichment and PPTX assembly.

// Reexport modules
pub mod cache;
pub mod config;
pub mod diagram;
pub mod enrich;
pub mod errors;
pub mod images;
pub mod outline;
pub mod pipeline;
pub mod pptx;
pub mod theme;
pub mod utils;

// Reexport common types and functions
pub use cache::AssetCache;
pub use config::Config;
pub use diagram::{classify_archetype, DiagramArchetype, DiagramBackend, DiagramRenderer};
pub use enrich::Enricher;
pub use errors::{Result, SlideError};
pub use images::{ImageCandidate, ImageProvider, PexelsClient, SearchConstraints};
pub use outline::{GeminiOutlineClient, OutlineProvider, OutlineRecord, SlideLayout, SlideRecord};
pub use pipeline::{generate_presentation, GenerateOptions};
pub use pptx::{assemble, supporting_rects, Deck};
pub use theme::ThemeSpec;
