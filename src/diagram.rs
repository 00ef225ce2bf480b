// ABOUTME: Deterministic diagram renderer for the smart-slides application
// ABOUTME: Classifies slide text into an archetype and rasterizes a fixed SVG drawing

use crate::cache::AssetCache;
use crate::errors::{Result, SlideError};
use crate::theme::ThemeSpec;
use crate::utils::{escape_xml, split_sentences, truncate_label};
use log::info;
use std::path::PathBuf;

/// Character budget for node labels; anything longer gets an ellipsis.
const LABEL_BUDGET: usize = 36;

const DIAGRAM_WIDTH: u32 = 960;
const DIAGRAM_HEIGHT: u32 = 540;

const FLOW_WORDS: &[&str] = &["process", "flow", "step", "stage", "workflow", "cycle", "pipeline"];
const COMPARISON_WORDS: &[&str] = &[
    "comparison", "compare", "versus", " vs ", "vs.", "difference", "pros and cons",
];
const TIMELINE_WORDS: &[&str] = &[
    "timeline", "history", "roadmap", "milestone", "evolution", "decade", "century",
];

/// One of the four fixed diagram drawing templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramArchetype {
    Flow,
    Comparison,
    Timeline,
    Generic,
}

impl DiagramArchetype {
    pub fn label(&self) -> &'static str {
        match self {
            DiagramArchetype::Flow => "flow",
            DiagramArchetype::Comparison => "comparison",
            DiagramArchetype::Timeline => "timeline",
            DiagramArchetype::Generic => "generic",
        }
    }
}

/// Classify slide text into a diagram archetype. Pure function of the text:
/// case-insensitive substring match against fixed vocabularies, first match
/// in flow → comparison → timeline order wins.
pub fn classify_archetype(title: &str, body: &str) -> DiagramArchetype {
    let haystack = format!("{} {}", title, body).to_lowercase();
    if FLOW_WORDS.iter().any(|w| haystack.contains(w)) {
        DiagramArchetype::Flow
    } else if COMPARISON_WORDS.iter().any(|w| haystack.contains(w)) {
        DiagramArchetype::Comparison
    } else if TIMELINE_WORDS.iter().any(|w| haystack.contains(w)) {
        DiagramArchetype::Timeline
    } else {
        DiagramArchetype::Generic
    }
}

/// Turns slide text into a local PNG. The pipeline treats any failure as a
/// signal to downgrade the slide to a photo layout.
pub trait DiagramBackend {
    /// Render (or re-resolve from cache) the diagram for a slide's text.
    fn render(
        &self,
        title: &str,
        body: &str,
        theme: &ThemeSpec,
        cache: &AssetCache,
    ) -> Result<PathBuf>;
}

/// Renders slide text into a cached PNG diagram without any external call.
#[derive(Debug, Default)]
pub struct DiagramRenderer;

impl DiagramRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl DiagramBackend for DiagramRenderer {
    fn render(
        &self,
        title: &str,
        body: &str,
        theme: &ThemeSpec,
        cache: &AssetCache,
    ) -> Result<PathBuf> {
        let archetype = classify_archetype(title, body);
        let key = AssetCache::diagram_key(title, body, archetype.label(), theme.name);
        if let Some(path) = cache.resolve(&key, "png") {
            return Ok(path);
        }

        info!("Rendering {} diagram for '{}'", archetype.label(), title);
        let svg = build_svg(title, body, archetype, theme);
        let png = rasterize(&svg)?;
        cache.store(&key, "png", &png)
    }
}

fn rasterize(svg: &str) -> Result<Vec<u8>> {
    let mut opt = usvg::Options::default();
    opt.font_family = "sans-serif".to_string();
    opt.default_size = usvg::Size::from_wh(DIAGRAM_WIDTH as f32, DIAGRAM_HEIGHT as f32)
        .ok_or_else(|| SlideError::RenderError("Invalid diagram size".to_string()))?;
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt)
        .map_err(|e| SlideError::RenderError(format!("SVG parse failed: {}", e)))?;
    let size = tree.size().to_int_size();
    let mut pixmap = resvg::tiny_skia::Pixmap::new(size.width(), size.height())
        .ok_or_else(|| SlideError::RenderError("Failed to allocate pixmap".to_string()))?;

    let mut pixmap_mut = pixmap.as_mut();
    resvg::render(&tree, resvg::tiny_skia::Transform::default(), &mut pixmap_mut);
    pixmap
        .encode_png()
        .map_err(|e| SlideError::RenderError(format!("PNG encoding failed: {}", e)))
}

fn build_svg(title: &str, body: &str, archetype: DiagramArchetype, theme: &ThemeSpec) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
        w = DIAGRAM_WIDTH,
        h = DIAGRAM_HEIGHT
    ));
    svg.push_str(&format!(
        "<rect width=\"100%\" height=\"100%\" fill=\"#{}\"/>",
        theme.background_color
    ));
    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<marker id=\"arrow\" viewBox=\"0 0 10 10\" refX=\"10\" refY=\"5\" markerWidth=\"6\" markerHeight=\"6\" orient=\"auto-start-reverse\"><path d=\"M 0 0 L 10 5 L 0 10 z\" fill=\"#{}\"/></marker>",
        theme.accent_secondary
    ));
    svg.push_str("</defs>");

    // Slide title across the top of every archetype.
    svg.push_str(&text_el(
        DIAGRAM_WIDTH as f64 / 2.0,
        60.0,
        &truncate_label(title, LABEL_BUDGET),
        24.0,
        theme.text_color,
        theme,
    ));

    match archetype {
        DiagramArchetype::Flow => flow_svg(&mut svg, body, theme),
        DiagramArchetype::Comparison => comparison_svg(&mut svg, body, theme),
        DiagramArchetype::Timeline => timeline_svg(&mut svg, body, theme),
        DiagramArchetype::Generic => generic_svg(&mut svg, title, body, theme),
    }

    svg.push_str("</svg>");
    svg
}

fn segments(body: &str, max: usize) -> Vec<String> {
    split_sentences(body, max)
        .into_iter()
        .map(|s| truncate_label(&s, LABEL_BUDGET))
        .collect()
}

fn text_el(x: f64, y: f64, text: &str, size: f64, color: &str, theme: &ThemeSpec) -> String {
    format!(
        "<text x=\"{x:.1}\" y=\"{y:.1}\" font-family=\"{font}\" font-size=\"{size}\" fill=\"#{color}\" text-anchor=\"middle\">{text}</text>",
        font = theme.font_family,
        text = escape_xml(text)
    )
}

fn node_box(x: f64, y: f64, w: f64, h: f64, label: &str, theme: &ThemeSpec) -> String {
    let mut el = format!(
        "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{w:.1}\" height=\"{h:.1}\" rx=\"8\" ry=\"8\" fill=\"none\" stroke=\"#{}\" stroke-width=\"2\"/>",
        theme.accent_color
    );
    el.push_str(&text_el(
        x + w / 2.0,
        y + h / 2.0 + 5.0,
        label,
        14.0,
        theme.text_color,
        theme,
    ));
    el
}

/// Up to 5 segments as equally spaced boxes left to right with arrows.
fn flow_svg(svg: &mut String, body: &str, theme: &ThemeSpec) {
    let steps = segments(body, 5);
    let n = steps.len().max(1);
    let margin = 50.0;
    let gap = 26.0;
    let box_w = (DIAGRAM_WIDTH as f64 - 2.0 * margin - gap * (n as f64 - 1.0)) / n as f64;
    let box_h = 110.0;
    let y = 220.0;

    for (i, step) in steps.iter().enumerate() {
        let x = margin + i as f64 * (box_w + gap);
        svg.push_str(&node_box(x, y, box_w, box_h, step, theme));
        if i + 1 < steps.len() {
            svg.push_str(&format!(
                "<line x1=\"{:.1}\" y1=\"{:.1}\" x2=\"{:.1}\" y2=\"{:.1}\" stroke=\"#{}\" stroke-width=\"2\" marker-end=\"url(#arrow)\"/>",
                x + box_w,
                y + box_h / 2.0,
                x + box_w + gap - 2.0,
                y + box_h / 2.0,
                theme.accent_secondary
            ));
        }
    }
}

/// Up to 4 segments in a 2x2 grid, no arrows.
fn comparison_svg(svg: &mut String, body: &str, theme: &ThemeSpec) {
    let cells = segments(body, 4);
    let box_w = 380.0;
    let box_h = 140.0;
    let xs = [70.0, 510.0];
    let ys = [140.0, 330.0];

    for (i, cell) in cells.iter().enumerate() {
        let x = xs[i % 2];
        let y = ys[i / 2];
        svg.push_str(&node_box(x, y, box_w, box_h, cell, theme));
    }
}

/// Up to 5 markers on a horizontal axis with captions above.
fn timeline_svg(svg: &mut String, body: &str, theme: &ThemeSpec) {
    let points = segments(body, 5);
    let n = points.len().max(1);
    let axis_y = 340.0;
    let left = 90.0;
    let right = DIAGRAM_WIDTH as f64 - 90.0;

    svg.push_str(&format!(
        "<line x1=\"{left:.1}\" y1=\"{axis_y:.1}\" x2=\"{right:.1}\" y2=\"{axis_y:.1}\" stroke=\"#{}\" stroke-width=\"3\"/>",
        theme.accent_color
    ));

    for (i, caption) in points.iter().enumerate() {
        let x = if n == 1 {
            (left + right) / 2.0
        } else {
            left + (right - left) * i as f64 / (n as f64 - 1.0)
        };
        svg.push_str(&format!(
            "<circle cx=\"{x:.1}\" cy=\"{axis_y:.1}\" r=\"10\" fill=\"#{}\"/>",
            theme.accent_secondary
        ));
        svg.push_str(&text_el(x, axis_y - 40.0, caption, 14.0, theme.text_color, theme));
        svg.push_str(&text_el(
            x,
            axis_y + 36.0,
            &format!("{}", i + 1),
            14.0,
            theme.subtext_color,
            theme,
        ));
    }
}

/// Central title node with up to 4 satellites at equal angular spacing.
fn generic_svg(svg: &mut String, title: &str, body: &str, theme: &ThemeSpec) {
    let satellites = segments(body, 4);
    let cx = DIAGRAM_WIDTH as f64 / 2.0;
    let cy = 300.0;
    let radius = 170.0;
    let sat_w = 230.0;
    let sat_h = 70.0;

    let k = satellites.len();
    for (i, sat) in satellites.iter().enumerate() {
        let angle = (i as f64 / k as f64) * std::f64::consts::TAU - std::f64::consts::FRAC_PI_2;
        let sx = cx + radius * angle.cos();
        let sy = cy + radius * angle.sin();
        svg.push_str(&format!(
            "<line x1=\"{cx:.1}\" y1=\"{cy:.1}\" x2=\"{sx:.1}\" y2=\"{sy:.1}\" stroke=\"#{}\" stroke-width=\"2\"/>",
            theme.subtext_color
        ));
        svg.push_str(&node_box(sx - sat_w / 2.0, sy - sat_h / 2.0, sat_w, sat_h, sat, theme));
    }

    let center_w = 280.0;
    let center_h = 90.0;
    svg.push_str(&format!(
        "<rect x=\"{:.1}\" y=\"{:.1}\" width=\"{center_w:.1}\" height=\"{center_h:.1}\" rx=\"12\" ry=\"12\" fill=\"#{}\"/>",
        cx - center_w / 2.0,
        cy - center_h / 2.0,
        theme.accent_color
    ));
    svg.push_str(&text_el(
        cx,
        cy + 6.0,
        &truncate_label(title, LABEL_BUDGET),
        16.0,
        theme.background_color,
        theme,
    ));
}
