use smart_slides::cache::AssetCache;
use smart_slides::config::Config;
use smart_slides::diagram::DiagramBackend;
use smart_slides::enrich::Enricher;
use smart_slides::errors::{Result, SlideError};
use smart_slides::images::{ImageCandidate, ImageProvider, SearchConstraints};
use smart_slides::outline::{OutlineProvider, OutlineRecord, SlideLayout, SlideRecord};
use smart_slides::pipeline::{generate_presentation, GenerateOptions};
use smart_slides::theme::{self, ThemeSpec};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;
use zip::ZipArchive;

fn outline_record(title: &str, body: &str, keyword: Option<&str>) -> OutlineRecord {
    serde_json::from_value(serde_json::json!({
        "slide_title": title,
        "slide_body": body,
        "image_keyword": keyword,
    }))
    .expect("Failed to build outline record")
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_fn(8, 8, |_, _| image::Rgb([30u8, 60u8, 90u8]));
    let mut buf = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, image::ImageOutputFormat::Png)
        .expect("Failed to encode test image");
    buf.into_inner()
}

struct FakeOutline {
    records: Vec<OutlineRecord>,
}

impl OutlineProvider for FakeOutline {
    fn outline(&self, _topic: &str, _slide_count: usize) -> Result<Vec<OutlineRecord>> {
        Ok(self.records.clone())
    }

    fn layout_hint(&self, _title: &str, _body: &str) -> Result<String> {
        Err(SlideError::ClassificationError(
            "no classifier in tests".to_string(),
        ))
    }

    fn speaker_notes(&self, title: &str, _body: &str) -> Result<String> {
        Ok(format!("Talk about {}.", title))
    }
}

struct CountingImages {
    searches: Mutex<usize>,
    downloads: Mutex<usize>,
}

impl CountingImages {
    fn new() -> Self {
        Self {
            searches: Mutex::new(0),
            downloads: Mutex::new(0),
        }
    }

    fn search_count(&self) -> usize {
        *self.searches.lock().unwrap()
    }
}

impl ImageProvider for CountingImages {
    fn search(&self, keyword: &str, _constraints: &SearchConstraints) -> Result<Vec<ImageCandidate>> {
        *self.searches.lock().unwrap() += 1;
        Ok(vec![ImageCandidate {
            id: 1,
            url: format!("fake://{}", keyword),
            alt_text: keyword.to_string(),
        }])
    }

    fn download(&self, _url: &str) -> Result<Vec<u8>> {
        *self.downloads.lock().unwrap() += 1;
        Ok(png_bytes())
    }
}

struct FailingImages;

impl ImageProvider for FailingImages {
    fn search(&self, keyword: &str, _constraints: &SearchConstraints) -> Result<Vec<ImageCandidate>> {
        Err(SlideError::AssetFetchError(format!(
            "search is down for '{}'",
            keyword
        )))
    }

    fn download(&self, url: &str) -> Result<Vec<u8>> {
        Err(SlideError::AssetFetchError(format!(
            "download is down for '{}'",
            url
        )))
    }
}

struct FailingDiagrams;

impl DiagramBackend for FailingDiagrams {
    fn render(
        &self,
        title: &str,
        _body: &str,
        _theme: &ThemeSpec,
        _cache: &AssetCache,
    ) -> Result<PathBuf> {
        Err(SlideError::RenderError(format!(
            "renderer offline for '{}'",
            title
        )))
    }
}

fn test_config(root: &Path) -> Config {
    Config {
        gemini_api_key: Some("test-key".to_string()),
        pexels_api_key: Some("test-key".to_string()),
        output_dir: root.join("output"),
        cache_dir: root.join("cache"),
        default_slide_count: 6,
        default_style: "dark".to_string(),
        request_timeout_ms: 1000,
    }
}

fn count_slides(path: &Path) -> usize {
    let file = fs::File::open(path).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .filter(|name| name.starts_with("ppt/slides/slide") && name.ends_with(".xml"))
        .count()
}

#[test]
fn test_empty_outline_fails_and_writes_no_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let outline = FakeOutline { records: vec![] };
    let images = CountingImages::new();

    let options = GenerateOptions {
        topic: "Doomed Topic".to_string(),
        slide_count: 4,
        style: "dark".to_string(),
    };
    let result = generate_presentation(&options, &config, &outline, &images);
    assert!(matches!(result, Err(SlideError::OutlineError(_))));

    let written: Vec<_> = fs::read_dir(&config.output_dir)
        .map(|entries| entries.filter_map(|e| e.ok()).collect())
        .unwrap_or_default();
    assert!(written.is_empty(), "No output file should exist: {:?}", written);
}

#[test]
fn test_zero_slide_count_is_rejected() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let outline = FakeOutline { records: vec![] };
    let images = CountingImages::new();

    let options = GenerateOptions {
        topic: "Topic".to_string(),
        slide_count: 0,
        style: "dark".to_string(),
    };
    let result = generate_presentation(&options, &config, &outline, &images);
    assert!(matches!(result, Err(SlideError::ValidationError(_))));
}

#[test]
fn test_renewable_energy_scenario() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let outline = FakeOutline {
        records: vec![
            outline_record("Solar power", "Panels are cheap now.", Some("solar panels")),
            outline_record("Wind power", "Turbines keep growing.", Some("wind turbines")),
            outline_record("Hydro power", "Dams store energy.", Some("hydroelectric dam")),
        ],
    };
    let images = CountingImages::new();

    let options = GenerateOptions {
        topic: "Renewable Energy".to_string(),
        slide_count: 3,
        style: "light".to_string(),
    };
    let path = generate_presentation(&options, &config, &outline, &images)
        .expect("Pipeline failed");

    assert_eq!(
        path.file_name().and_then(|n| n.to_str()),
        Some("Renewable_Energy_light_presentation.pptx")
    );
    assert!(path.exists());
    assert_eq!(count_slides(&path), 5);

    // First slide is the title routine over the light palette.
    let file = fs::File::open(&path).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    let mut slide1 = String::new();
    std::io::Read::read_to_string(
        &mut archive.by_name("ppt/slides/slide1.xml").expect("missing slide1"),
        &mut slide1,
    )
    .expect("Failed to read slide1");
    assert!(slide1.contains("Renewable Energy"));
    let spec = theme::resolve("light");
    assert!(slide1.contains(spec.accent_color));
}

#[test]
fn test_failing_image_provider_still_produces_a_deck() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = test_config(temp_dir.path());
    let outline = FakeOutline {
        records: vec![
            outline_record("One", "Body one.", Some("alpha")),
            outline_record("Two", "Body two.", Some("beta")),
        ],
    };

    let options = GenerateOptions {
        topic: "Offline Run".to_string(),
        slide_count: 2,
        style: "dark".to_string(),
    };
    let path = generate_presentation(&options, &config, &outline, &FailingImages)
        .expect("Pipeline should degrade, not fail");
    assert!(path.exists());
    assert_eq!(count_slides(&path), 4);
}

#[test]
fn test_failing_image_provider_leaves_backgrounds_absent() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cache = AssetCache::open(&temp_dir.path().join("cache")).expect("cache open failed");
    let spec = theme::resolve("dark");
    let outline = FakeOutline { records: vec![] };
    let enricher = Enricher::new(&cache, &FailingImages, &outline, &spec);

    let mut slide =
        SlideRecord::from_outline(outline_record("Mountains", "Tall and old.", Some("peaks")));
    enricher.enrich_slide(&mut slide, 1);

    assert_eq!(slide.layout, SlideLayout::Photo);
    assert!(slide.background_image_path.is_none());
    assert!(slide.supporting_image_paths.is_empty());
    assert!(slide.speaker_notes.is_some());
}

#[test]
fn test_warm_cache_triggers_no_second_search() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cache = AssetCache::open(&temp_dir.path().join("cache")).expect("cache open failed");
    let spec = theme::resolve("dark");
    let outline = FakeOutline { records: vec![] };
    let images = CountingImages::new();
    let enricher = Enricher::new(&cache, &images, &outline, &spec);

    let first = enricher.fetch_photo("ocean waves").expect("first fetch failed");
    let second = enricher.fetch_photo("ocean waves").expect("second fetch failed");

    assert_eq!(first, second, "Warm cache must resolve to the same path");
    assert_eq!(images.search_count(), 1, "Second call must not hit the provider");
}

#[test]
fn test_diagram_failure_downgrades_to_photo_layout() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cache = AssetCache::open(&temp_dir.path().join("cache")).expect("cache open failed");
    let spec = theme::resolve("dark");
    let outline = FakeOutline { records: vec![] };
    let images = CountingImages::new();
    let enricher =
        Enricher::with_diagram_backend(&cache, &images, &outline, &spec, &FailingDiagrams);

    // Flow vocabulary routes the slide to a diagram before the backend fails.
    let mut slide = SlideRecord::from_outline(outline_record(
        "The approval workflow",
        "Submit. Review. Approve.",
        Some("paperwork"),
    ));
    enricher.enrich_slide(&mut slide, 1);

    assert_eq!(slide.layout, SlideLayout::Photo);
    assert!(
        slide.background_image_path.is_some(),
        "Downgraded slide should carry the provider's photo"
    );
    assert_eq!(
        images.search_count(),
        1,
        "Downgrade retries through the image provider exactly once"
    );
}

#[test]
fn test_fetched_photo_extension_matches_content() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cache = AssetCache::open(&temp_dir.path().join("cache")).expect("cache open failed");
    let spec = theme::resolve("dark");
    let outline = FakeOutline { records: vec![] };
    let images = CountingImages::new();
    let enricher = Enricher::new(&cache, &images, &outline, &spec);

    // The fake provider serves PNG bytes; the cache entry must say so.
    let path = enricher.fetch_photo("ocean waves").expect("fetch failed");
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));

    let again = enricher.fetch_photo("ocean waves").expect("refetch failed");
    assert_eq!(again, path, "Warm lookup must find the png-labelled entry");
}

#[test]
fn test_supporting_images_resolved_up_to_three() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let cache = AssetCache::open(&temp_dir.path().join("cache")).expect("cache open failed");
    let spec = theme::resolve("dark");
    let outline = FakeOutline { records: vec![] };
    let images = CountingImages::new();
    let enricher = Enricher::new(&cache, &images, &outline, &spec);

    let mut slide: SlideRecord = SlideRecord::from_outline(
        serde_json::from_value(serde_json::json!({
            "slide_title": "Gallery",
            "slide_body": "Lots to see.",
            "image_keyword": "museum",
            "supporting_visuals": ["a", "b", "c", "d", "e"],
        }))
        .expect("Failed to build outline record"),
    );
    enricher.enrich_slide(&mut slide, 2);

    assert_eq!(slide.supporting_image_paths.len(), 3);
}
