use smart_slides::outline::{SlideLayout, SlideRecord};
use smart_slides::pptx::{assemble, Deck};
use smart_slides::theme;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use zip::ZipArchive;

fn write_test_png(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let img = image::RgbImage::from_fn(32, 32, |_, _| image::Rgb([120u8, 160u8, 200u8]));
    img.save(&path).expect("Failed to save test image");
    path
}

fn content_slide(title: &str, body: &str) -> SlideRecord {
    SlideRecord {
        title: title.to_string(),
        body: body.to_string(),
        visual_keyword: None,
        supporting_visuals: Vec::new(),
        layout: SlideLayout::Photo,
        background_image_path: None,
        supporting_image_paths: Vec::new(),
        speaker_notes: None,
    }
}

fn make_deck(topic: &str, content: Vec<SlideRecord>) -> Deck {
    let mut slides = vec![SlideRecord::title_slide(topic)];
    slides.extend(content);
    Deck {
        topic: topic.to_string(),
        slides,
    }
}

fn slide_xml_names(path: &Path) -> Vec<String> {
    let file = fs::File::open(path).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .filter(|name| {
            name.starts_with("ppt/slides/slide") && name.ends_with(".xml")
        })
        .collect()
}

fn read_entry(path: &Path, entry: &str) -> String {
    let file = fs::File::open(path).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    let mut content = String::new();
    archive
        .by_name(entry)
        .expect("Entry not found in archive")
        .read_to_string(&mut content)
        .expect("Failed to read entry");
    content
}

#[test]
fn test_deck_produces_n_plus_two_slides() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.pptx");

    let deck = make_deck(
        "Test Topic",
        vec![
            content_slide("One", "First body."),
            content_slide("Two", "Second body."),
            content_slide("Three", "Third body."),
        ],
    );
    assemble(&deck, &theme::resolve("dark"), &output).expect("Assembly failed");

    assert!(output.exists(), "PPTX file was not created");
    assert_eq!(slide_xml_names(&output).len(), 5, "Expected title + TOC + 3");
}

#[test]
fn test_single_content_slide_still_gets_title_and_toc() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.pptx");

    let deck = make_deck("Tiny", vec![content_slide("Only", "Body.")]);
    assemble(&deck, &theme::resolve("dark"), &output).expect("Assembly failed");
    assert_eq!(slide_xml_names(&output).len(), 3);
}

#[test]
fn test_photo_routine_places_at_most_three_supporting_images() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.pptx");

    let mut slide = content_slide("Gallery", "Images everywhere.");
    slide.supporting_image_paths = (0..4)
        .map(|i| write_test_png(temp_dir.path(), &format!("sup{}.png", i)))
        .collect();

    let deck = make_deck("Gallery Deck", vec![slide]);
    assemble(&deck, &theme::resolve("dark"), &output).expect("Assembly failed");

    // Content slide is slide3; media is per-slide prefixed.
    let file = fs::File::open(&output).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    let media: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .filter(|name| name.starts_with("ppt/media/image3_"))
        .collect();
    assert_eq!(media.len(), 3, "Expected exactly three placed images: {:?}", media);
}

#[test]
fn test_photo_routine_with_zero_images_succeeds() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.pptx");

    let deck = make_deck("Plain", vec![content_slide("No images", "Just text.")]);
    assemble(&deck, &theme::resolve("dark"), &output).expect("Assembly failed");
    assert!(output.exists());
}

#[test]
fn test_missing_supporting_file_is_skipped_silently() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.pptx");

    let mut slide = content_slide("Gaps", "Some images are gone.");
    slide.supporting_image_paths = vec![
        temp_dir.path().join("does_not_exist.png"),
        write_test_png(temp_dir.path(), "present.png"),
    ];

    let deck = make_deck("Gap Deck", vec![slide]);
    assemble(&deck, &theme::resolve("dark"), &output).expect("Assembly failed");

    let file = fs::File::open(&output).expect("Failed to open PPTX file");
    let mut archive = ZipArchive::new(file).expect("Failed to read PPTX as ZIP");
    let media: Vec<String> = (0..archive.len())
        .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
        .filter(|name| name.starts_with("ppt/media/image3_"))
        .collect();
    assert_eq!(media.len(), 1, "Only the readable image should be embedded");
}

#[test]
fn test_light_theme_colors_appear_in_slide_xml() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.pptx");

    let deck = make_deck("Palette", vec![content_slide("Colors", "Body.")]);
    let spec = theme::resolve("light");
    assemble(&deck, &spec, &output).expect("Assembly failed");

    let toc_xml = read_entry(&output, "ppt/slides/slide2.xml");
    assert!(toc_xml.contains(spec.background_color));
    assert!(toc_xml.contains(spec.accent_color));
}

#[test]
fn test_speaker_notes_get_a_notes_part() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.pptx");

    let mut slide = content_slide("Noted", "Body.");
    slide.speaker_notes = Some("Mention the quarterly numbers.".to_string());
    let deck = make_deck("Notes Deck", vec![slide]);
    assemble(&deck, &theme::resolve("dark"), &output).expect("Assembly failed");

    let notes_xml = read_entry(&output, "ppt/notesSlides/notesSlide3.xml");
    assert!(notes_xml.contains("Mention the quarterly numbers."));

    let content_types = read_entry(&output, "[Content_Types].xml");
    assert!(content_types.contains("/ppt/notesSlides/notesSlide3.xml"));
}

#[test]
fn test_diagram_slide_embeds_image_with_relationship() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.pptx");

    let mut slide = content_slide("Process overview", "Collect. Refine. Ship.");
    slide.layout = SlideLayout::Diagram;
    slide.background_image_path = Some(write_test_png(temp_dir.path(), "diagram.png"));
    let deck = make_deck("Diagram Deck", vec![slide]);
    assemble(&deck, &theme::resolve("dark"), &output).expect("Assembly failed");

    let slide_xml = read_entry(&output, "ppt/slides/slide3.xml");
    assert!(slide_xml.contains("r:embed"));
    let rels = read_entry(&output, "ppt/slides/_rels/slide3.xml.rels");
    assert!(rels.contains("../media/image3_1.png"));
}

#[test]
fn test_empty_deck_writes_nothing() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.pptx");

    let deck = Deck {
        topic: "Empty".to_string(),
        slides: Vec::new(),
    };
    let result = assemble(&deck, &theme::resolve("dark"), &output);
    assert!(result.is_err());
    assert!(!output.exists(), "No partial output should exist");

    let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
        .expect("read_dir failed")
        .filter_map(|e| e.ok())
        .collect();
    assert!(leftovers.is_empty(), "Partial files left behind: {:?}", leftovers);
}

#[test]
fn test_title_text_is_xml_escaped() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output = temp_dir.path().join("out.pptx");

    let deck = make_deck(
        "Ampersand & Co",
        vec![content_slide("Q&A <fast>", "Body.")],
    );
    assemble(&deck, &theme::resolve("dark"), &output).expect("Assembly failed");

    let slide_xml = read_entry(&output, "ppt/slides/slide3.xml");
    assert!(slide_xml.contains("Q&amp;A &lt;fast&gt;"));
    assert!(!slide_xml.contains("Q&A <fast>"));
}
