// ABOUTME: Outline provider interface, slide records, and Gemini-backed client
// ABOUTME: Turns a topic into structured slide content via an LLM text service

use crate::errors::{Result, SlideError};
use log::info;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

const GEMINI_MODEL: &str = "gemini-2.5-flash";

/// One outline record as returned by the provider. Older outline schemas
/// used `visual_focus` for the image hint, so both names are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct OutlineRecord {
    #[serde(rename = "slide_title")]
    pub title: String,
    #[serde(rename = "slide_body", default)]
    pub body: String,
    #[serde(rename = "image_keyword", alias = "visual_focus", default)]
    pub visual_keyword: Option<String>,
    #[serde(rename = "supporting_visuals", default)]
    pub supporting_visuals: Vec<String>,
}

/// Visual layout category of a slide. Assigned during enrichment and
/// immutable once the deck is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideLayout {
    Title,
    Photo,
    Diagram,
    Text,
}

impl SlideLayout {
    pub fn label(&self) -> &'static str {
        match self {
            SlideLayout::Title => "title",
            SlideLayout::Photo => "photo",
            SlideLayout::Diagram => "diagram",
            SlideLayout::Text => "text",
        }
    }
}

/// One slide's content and derived state. Created from outline output,
/// mutated in place during enrichment, read-only during assembly.
#[derive(Debug, Clone)]
pub struct SlideRecord {
    pub title: String,
    pub body: String,
    pub visual_keyword: Option<String>,
    pub supporting_visuals: Vec<String>,
    pub layout: SlideLayout,
    pub background_image_path: Option<PathBuf>,
    pub supporting_image_paths: Vec<PathBuf>,
    pub speaker_notes: Option<String>,
}

impl SlideRecord {
    pub fn from_outline(record: OutlineRecord) -> Self {
        Self {
            title: record.title,
            body: record.body,
            visual_keyword: record.visual_keyword,
            supporting_visuals: record.supporting_visuals,
            layout: SlideLayout::Photo,
            background_image_path: None,
            supporting_image_paths: Vec::new(),
            speaker_notes: None,
        }
    }

    /// The synthesized opening slide for a deck; carries the topic itself.
    pub fn title_slide(topic: &str) -> Self {
        Self {
            title: topic.to_string(),
            body: String::new(),
            visual_keyword: Some(topic.to_string()),
            supporting_visuals: Vec::new(),
            layout: SlideLayout::Title,
            background_image_path: None,
            supporting_image_paths: Vec::new(),
            speaker_notes: None,
        }
    }
}

/// External collaborator that produces structured slide content. A total
/// outline failure (empty or malformed result) is the only fatal provider
/// error in the pipeline; the auxiliary calls degrade per slide.
pub trait OutlineProvider {
    /// Generate an ordered outline of roughly `slide_count` records.
    fn outline(&self, topic: &str, slide_count: usize) -> Result<Vec<OutlineRecord>>;

    /// Suggest a layout name for a slide's content. Callers fall back to a
    /// static rule when this fails or answers with something unrecognized.
    fn layout_hint(&self, title: &str, body: &str) -> Result<String>;

    /// Derive short speaker notes for a slide.
    fn speaker_notes(&self, title: &str, body: &str) -> Result<String>;
}

/// Gemini text-generation client used as the outline provider.
pub struct GeminiOutlineClient {
    api_key: String,
    model: String,
    client: Client,
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<RequestContent>,
}

#[derive(Serialize)]
struct RequestContent {
    parts: Vec<RequestPart>,
}

#[derive(Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiOutlineClient {
    pub fn new(api_key: &str, timeout_ms: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .build()
            .map_err(SlideError::FetchError)?;
        Ok(Self {
            api_key: api_key.to_string(),
            model: GEMINI_MODEL.to_string(),
            client,
        })
    }

    fn chat(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .map_err(SlideError::FetchError)?;

        if !response.status().is_success() {
            return Err(SlideError::OutlineError(format!(
                "Text service returned HTTP {}",
                response.status()
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| SlideError::OutlineError(format!("Malformed service response: {}", e)))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SlideError::OutlineError(
                "Text service returned an empty response".to_string(),
            ));
        }
        Ok(text)
    }
}

impl OutlineProvider for GeminiOutlineClient {
    fn outline(&self, topic: &str, slide_count: usize) -> Result<Vec<OutlineRecord>> {
        info!("Generating outline for topic: '{}'", topic);
        let prompt = format!(
            "Generate a professional presentation outline for the topic '{topic}' \
             with {slide_count} slides. Each slide should have a title, body content, \
             and an image keyword. Return the response in JSON format with the \
             following structure:\n\
             [\n  {{\n    \"slide_title\": \"string\",\n    \"slide_body\": \"string\",\n    \
             \"image_keyword\": \"string\",\n    \"supporting_visuals\": [\"string\"]\n  }}\n]\n\
             Make it engaging and include relevant statistics and examples. \
             Return only the JSON array."
        );
        let response = self.chat(&prompt)?;
        let json = strip_code_fence(&response);
        serde_json::from_str(json)
            .map_err(|e| SlideError::OutlineError(format!("Error parsing outline JSON: {}", e)))
    }

    fn layout_hint(&self, title: &str, body: &str) -> Result<String> {
        let prompt = format!(
            "Based on this slide content, suggest the best layout type:\n\
             Title: {title}\nContent: {body}\n\n\
             Choose from these layouts:\n\
             - Photo Layout (for slides with a main image)\n\
             - Diagram Layout (for slides with charts or processes)\n\
             - Text Layout (for text-heavy slides)\n\n\
             Return only the layout name."
        );
        let response = self
            .chat(&prompt)
            .map_err(|e| SlideError::ClassificationError(e.to_string()))?;
        Ok(response.trim().to_string())
    }

    fn speaker_notes(&self, title: &str, body: &str) -> Result<String> {
        let prompt = format!(
            "Write two short sentences of speaker notes for this slide:\n\
             Title: {title}\nContent: {body}\n\n\
             Return only the notes text."
        );
        let response = self.chat(&prompt)?;
        Ok(response.trim().to_string())
    }
}

/// Strip a Markdown code fence (``` or ```json) wrapped around a model
/// response, leaving the payload.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
