// ABOUTME: PPTX assembly module for the smart-slides application
// ABOUTME: Draws enriched slide records into an OOXML presentation archive

use crate::errors::{Result, SlideError};
use crate::outline::{SlideLayout, SlideRecord};
use crate::theme::ThemeSpec;
use crate::utils::{escape_xml, first_sentence, split_sentences};
use chrono;
use log::{info, warn};
use std::fs;
use std::io::Write;
use std::path::Path;
use zip::{write::FileOptions, ZipWriter};

/// 16:9 slide canvas in EMUs.
pub const SLIDE_CX: i64 = 9144000;
pub const SLIDE_CY: i64 = 5143500;

const IMAGE_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const NOTES_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/notesSlide";
const SLIDE_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide";

/// Sequence vocabulary that switches body formatting to a numbered list.
const SEQUENCE_WORDS: &[&str] = &["first", "second", "then", "next", "finally", "step"];

/// A fully enriched deck ready for assembly.
pub struct Deck {
    pub topic: String,
    pub slides: Vec<SlideRecord>,
}

/// Fixed, hand-tuned placement rectangles (fractions of the canvas) for N
/// supporting images. Counts above 3 are truncated to 3.
pub fn supporting_rects(n: usize) -> &'static [(f64, f64, f64, f64)] {
    match n.min(3) {
        0 => &[],
        1 => &[(0.30, 0.40, 0.40, 0.48)],
        2 => &[(0.09, 0.42, 0.39, 0.44), (0.52, 0.42, 0.39, 0.44)],
        _ => &[
            (0.09, 0.36, 0.39, 0.27),
            (0.52, 0.36, 0.39, 0.27),
            (0.305, 0.67, 0.39, 0.27),
        ],
    }
}

fn ex(frac: f64) -> i64 {
    (frac * SLIDE_CX as f64).round() as i64
}

fn ey(frac: f64) -> i64 {
    (frac * SLIDE_CY as f64).round() as i64
}

/// Assemble the deck into a PPTX file. The archive is written to a temp name
/// and renamed into place so no partial output survives a failure.
pub fn assemble(deck: &Deck, theme: &ThemeSpec, output_file: &Path) -> Result<()> {
    info!("Assembling presentation with {} slides", deck.slides.len() + 1);

    if deck.slides.is_empty() {
        return Err(SlideError::AssemblyError(
            "Deck has no slides to assemble".to_string(),
        ));
    }
    if let Some(parent) = output_file.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).map_err(SlideError::FileReadError)?;
        }
    }

    let parent = output_file.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = parent.join(format!(".{}.pptx.tmp", uuid::Uuid::new_v4()));

    let result = write_archive(deck, theme, &tmp_path);
    match result {
        Ok(()) => {
            fs::rename(&tmp_path, output_file).map_err(SlideError::FileReadError)?;
            info!("PPTX file created at {:?}", output_file);
            Ok(())
        }
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&tmp_path) {
                warn!("Failed to remove partial output {:?}: {}", tmp_path, cleanup);
            }
            Err(e)
        }
    }
}

fn write_archive(deck: &Deck, theme: &ThemeSpec, path: &Path) -> Result<()> {
    // Slide order: title, table of contents, then one per content record.
    let mut parts = Vec::with_capacity(deck.slides.len() + 1);
    parts.push(build_slide_part(&deck.slides[0], theme, 1));
    let content_titles: Vec<&str> = deck.slides[1..].iter().map(|s| s.title.as_str()).collect();
    parts.push(toc_slide_part(&content_titles, theme, 2));
    for (i, slide) in deck.slides[1..].iter().enumerate() {
        parts.push(build_slide_part(slide, theme, i + 3));
    }

    let file = fs::File::create(path).map_err(SlideError::FileReadError)?;
    let mut zip = ZipWriter::new(file);
    let slide_count = parts.len();

    // Add [Content_Types].xml
    info!("Creating PPTX structure: [Content_Types].xml");
    zip.start_file("[Content_Types].xml", FileOptions::default())?;
    let mut overrides = String::new();
    for (i, part) in parts.iter().enumerate() {
        overrides.push_str(&format!(
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            i + 1
        ));
        overrides.push('\n');
        if part.notes.is_some() {
            overrides.push_str(&format!(
                r#"<Override PartName="/ppt/notesSlides/notesSlide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.notesSlide+xml"/>"#,
                i + 1
            ));
            overrides.push('\n');
        }
    }
    let content_types = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="xml" ContentType="application/xml"/>
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="jpeg" ContentType="image/jpeg"/>
    <Default Extension="jpg" ContentType="image/jpeg"/>
    <Default Extension="png" ContentType="image/png"/>
    <Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/>
    <Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/>
    <Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>
    {overrides}
</Types>"#
    );
    zip.write_all(content_types.as_bytes())?;

    // Add _rels/.rels
    zip.start_file("_rels/.rels", FileOptions::default())?;
    let rels = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="ppt/presentation.xml"/>
    <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/>
    <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties" Target="docProps/app.xml"/>
</Relationships>"#;
    zip.write_all(rels.as_bytes())?;

    // Add docProps/app.xml
    zip.start_file("docProps/app.xml", FileOptions::default())?;
    let app_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties" xmlns:vt="http://schemas.openxmlformats.org/officeDocument/2006/docPropsVTypes">
    <Application>smart-slides</Application>
    <Slides>{}</Slides>
</Properties>"#,
        slide_count
    );
    zip.write_all(app_xml.as_bytes())?;

    // Add docProps/core.xml
    zip.start_file("docProps/core.xml", FileOptions::default())?;
    let core_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:dcmitype="http://purl.org/dc/dcmitype/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
    <dc:title>{}</dc:title>
    <dc:creator>smart-slides</dc:creator>
    <dcterms:created xsi:type="dcterms:W3CDTF">{}</dcterms:created>
    <cp:revision>1</cp:revision>
</cp:coreProperties>"#,
        escape_xml(&deck.topic),
        chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    );
    zip.write_all(core_xml.as_bytes())?;

    // Add ppt/_rels/presentation.xml.rels
    zip.start_file("ppt/_rels/presentation.xml.rels", FileOptions::default())?;
    let mut pres_rels = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
    );
    for i in 0..slide_count {
        pres_rels.push_str(&format!(
            r#"    <Relationship Id="rId{}" Type="{}" Target="slides/slide{}.xml"/>"#,
            i + 1,
            SLIDE_REL,
            i + 1
        ));
        pres_rels.push('\n');
    }
    pres_rels.push_str("</Relationships>");
    zip.write_all(pres_rels.as_bytes())?;

    // Add ppt/presentation.xml
    zip.start_file("ppt/presentation.xml", FileOptions::default())?;
    let presentation_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
    <p:sldIdLst>
{slide_ids}
    </p:sldIdLst>
    <p:sldSz cx="{cx}" cy="{cy}" type="screen4x3"/>
    <p:notesSz cx="6858000" cy="9144000"/>
</p:presentation>"#,
        slide_ids = (0..slide_count)
            .map(|i| format!(r#"        <p:sldId id="{}" r:id="rId{}"/>"#, 256 + i, i + 1))
            .collect::<Vec<String>>()
            .join("\n"),
        cx = SLIDE_CX,
        cy = SLIDE_CY
    );
    zip.write_all(presentation_xml.as_bytes())?;

    // Process each slide part
    for (i, part) in parts.iter().enumerate() {
        let slide_num = i + 1;
        info!("Writing slide {}", slide_num);

        for media in &part.media {
            zip.start_file(format!("ppt/media/{}", media.name), FileOptions::default())?;
            zip.write_all(&media.bytes)?;
        }

        zip.start_file(
            format!("ppt/slides/_rels/slide{}.xml.rels", slide_num),
            FileOptions::default(),
        )?;
        let mut slide_rels = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
"#,
        );
        for (rid, rel_type, target) in &part.rels {
            slide_rels.push_str(&format!(
                r#"    <Relationship Id="{}" Type="{}" Target="{}"/>"#,
                rid, rel_type, target
            ));
            slide_rels.push('\n');
        }
        slide_rels.push_str("</Relationships>");
        zip.write_all(slide_rels.as_bytes())?;

        zip.start_file(
            format!("ppt/slides/slide{}.xml", slide_num),
            FileOptions::default(),
        )?;
        zip.write_all(part.xml.as_bytes())?;

        if let Some(notes) = &part.notes {
            zip.start_file(
                format!("ppt/notesSlides/_rels/notesSlide{}.xml.rels", slide_num),
                FileOptions::default(),
            )?;
            let notes_rels = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="{}" Target="../slides/slide{}.xml"/>
</Relationships>"#,
                SLIDE_REL, slide_num
            );
            zip.write_all(notes_rels.as_bytes())?;

            zip.start_file(
                format!("ppt/notesSlides/notesSlide{}.xml", slide_num),
                FileOptions::default(),
            )?;
            zip.write_all(notes_slide_xml(notes).as_bytes())?;
        }
    }

    info!("Finalizing PPTX file");
    zip.finish()?;
    Ok(())
}

struct PendingMedia {
    name: String,
    bytes: Vec<u8>,
}

struct SlidePart {
    xml: String,
    rels: Vec<(String, &'static str, String)>,
    media: Vec<PendingMedia>,
    notes: Option<String>,
}

/// Builds the shape tree of a single slide, tracking shape ids, media
/// relationships, and the pending media payloads.
struct SlideBuilder<'a> {
    theme: &'a ThemeSpec,
    slide_num: usize,
    shapes: String,
    next_shape_id: u32,
    rels: Vec<(String, &'static str, String)>,
    media: Vec<PendingMedia>,
}

impl<'a> SlideBuilder<'a> {
    fn new(theme: &'a ThemeSpec, slide_num: usize) -> Self {
        Self {
            theme,
            slide_num,
            shapes: String::new(),
            next_shape_id: 2,
            rels: Vec::new(),
            media: Vec::new(),
        }
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_shape_id;
        self.next_shape_id += 1;
        id
    }

    /// Place an image file as a stretched picture shape. Unreadable or
    /// undecodable files are skipped with a warning; the slide still renders.
    fn add_image(&mut self, path: &Path, x: f64, y: f64, w: f64, h: f64) {
        let bytes = match fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to read image file {:?}: {}", path, e);
                return;
            }
        };
        if let Err(e) = image::load_from_memory(&bytes) {
            warn!("Failed to decode image {:?}: {}", path, e);
            return;
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("jpg")
            .to_lowercase();
        let name = format!("image{}_{}.{}", self.slide_num, self.media.len() + 1, ext);
        let rid = format!("rId{}", self.rels.len() + 1);
        self.rels
            .push((rid.clone(), IMAGE_REL, format!("../media/{}", name)));
        self.media.push(PendingMedia { name, bytes });

        let id = self.next_id();
        self.shapes.push_str(&format!(
            r#"<p:pic><p:nvPicPr><p:cNvPr id="{id}" name="Image {id}"/><p:cNvPicPr><a:picLocks noChangeAspect="1"/></p:cNvPicPr><p:nvPr/></p:nvPicPr><p:blipFill><a:blip r:embed="{rid}"/><a:stretch><a:fillRect/></a:stretch></p:blipFill><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom></p:spPr></p:pic>"#,
            x = ex(x),
            y = ey(y),
            cx = ex(w),
            cy = ey(h)
        ));
    }

    /// Place a filled rectangle; `fill` is a DrawingML fill fragment.
    fn add_rect(&mut self, fill: &str, x: f64, y: f64, w: f64, h: f64) {
        let id = self.next_id();
        self.shapes.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="Shape {id}"/><p:cNvSpPr/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom>{fill}<a:ln><a:noFill/></a:ln></p:spPr><p:txBody><a:bodyPr/><a:lstStyle/><a:p/></p:txBody></p:sp>"#,
            x = ex(x),
            y = ey(y),
            cx = ex(w),
            cy = ey(h)
        ));
    }

    /// Place a borderless text box; `paragraphs` is a DrawingML `<a:p>` run.
    fn add_text(&mut self, paragraphs: &str, x: f64, y: f64, w: f64, h: f64, anchor: &str) {
        let id = self.next_id();
        self.shapes.push_str(&format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{id}" name="TextBox {id}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{x}" y="{y}"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" anchor="{anchor}"><a:normAutofit/></a:bodyPr><a:lstStyle/>{paragraphs}</p:txBody></p:sp>"#,
            x = ex(x),
            y = ey(y),
            cx = ex(w),
            cy = ey(h)
        ));
    }

    fn paragraph(&self, text: &str, opts: &ParaOpts) -> String {
        let bullet = match opts.list {
            ListKind::None => "<a:buNone/>",
            ListKind::Bullet => r#"<a:buChar char="&#8226;"/>"#,
            ListKind::Numbered => r#"<a:buAutoNum type="arabicPeriod"/>"#,
        };
        format!(
            r#"<a:p><a:pPr algn="{algn}">{bullet}</a:pPr><a:r><a:rPr lang="en-US" sz="{sz}" b="{b}" dirty="0"><a:solidFill><a:srgbClr val="{color}"/></a:solidFill><a:latin typeface="{font}"/></a:rPr><a:t>{text}</a:t></a:r></a:p>"#,
            algn = opts.align,
            sz = opts.size_cpt,
            b = if opts.bold { 1 } else { 0 },
            color = opts.color,
            font = self.theme.font_family,
            text = escape_xml(text)
        )
    }

    fn finish(self, notes: Option<String>) -> SlidePart {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
    <p:cSld>
        <p:spTree>
            <p:nvGrpSpPr>
                <p:cNvPr id="1" name=""/>
                <p:cNvGrpSpPr/>
                <p:nvPr/>
            </p:nvGrpSpPr>
            <p:grpSpPr>
                <a:xfrm>
                    <a:off x="0" y="0"/>
                    <a:ext cx="0" cy="0"/>
                    <a:chOff x="0" y="0"/>
                    <a:chExt cx="0" cy="0"/>
                </a:xfrm>
            </p:grpSpPr>
            {shapes}
        </p:spTree>
    </p:cSld>
    <p:clrMapOvr>
        <a:masterClrMapping/>
    </p:clrMapOvr>
</p:sld>"#,
            shapes = self.shapes
        );
        let mut rels = self.rels;
        if notes.is_some() {
            rels.push((
                format!("rId{}", rels.len() + 1),
                NOTES_REL,
                format!("../notesSlides/notesSlide{}.xml", self.slide_num),
            ));
        }
        SlidePart {
            xml,
            rels,
            media: self.media,
            notes,
        }
    }
}

enum ListKind {
    None,
    Bullet,
    Numbered,
}

struct ParaOpts {
    size_cpt: u32,
    color: String,
    bold: bool,
    align: &'static str,
    list: ListKind,
}

/// Solid fill at full opacity.
fn solid_fill(color: &str) -> String {
    format!(r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)
}

/// The single fill-opacity capability: a solid fill with a requested alpha
/// (percent). The underlying format honors this exactly via `<a:alpha>`.
fn solid_fill_with_opacity(color: &str, alpha_pct: u32) -> String {
    format!(
        r#"<a:solidFill><a:srgbClr val="{}"><a:alpha val="{}"/></a:srgbClr></a:solidFill>"#,
        color,
        alpha_pct * 1000
    )
}

/// Vertical darkening gradient used as the title-slide scrim.
fn gradient_scrim() -> String {
    r#"<a:gradFill><a:gsLst><a:gs pos="0"><a:srgbClr val="000000"><a:alpha val="15000"/></a:srgbClr></a:gs><a:gs pos="100000"><a:srgbClr val="000000"><a:alpha val="80000"/></a:srgbClr></a:gs></a:gsLst><a:lin ang="5400000" scaled="0"/></a:gradFill>"#
        .to_string()
}

fn build_slide_part(slide: &SlideRecord, theme: &ThemeSpec, slide_num: usize) -> SlidePart {
    match slide.layout {
        SlideLayout::Title => title_slide_part(slide, theme, slide_num),
        SlideLayout::Photo => photo_slide_part(slide, theme, slide_num),
        SlideLayout::Diagram | SlideLayout::Text => diagram_slide_part(slide, theme, slide_num),
    }
}

/// Full-bleed background, darkening gradient, centered title, static caption.
fn title_slide_part(slide: &SlideRecord, theme: &ThemeSpec, slide_num: usize) -> SlidePart {
    let mut b = SlideBuilder::new(theme, slide_num);

    match &slide.background_image_path {
        Some(path) => b.add_image(path, 0.0, 0.0, 1.0, 1.0),
        None => b.add_rect(&solid_fill(theme.background_color), 0.0, 0.0, 1.0, 1.0),
    }
    b.add_rect(&gradient_scrim(), 0.0, 0.0, 1.0, 1.0);

    let title = b.paragraph(
        &slide.title,
        &ParaOpts {
            size_cpt: 4400,
            color: "FFFFFF".to_string(),
            bold: true,
            align: "ctr",
            list: ListKind::None,
        },
    );
    b.add_text(&title, 0.08, 0.34, 0.84, 0.22, "ctr");

    let caption = b.paragraph(
        "An AI-generated presentation",
        &ParaOpts {
            size_cpt: 2000,
            color: theme.accent_color.to_string(),
            bold: false,
            align: "ctr",
            list: ListKind::None,
        },
    );
    b.add_text(&caption, 0.08, 0.58, 0.84, 0.08, "ctr");

    b.finish(slide.speaker_notes.clone())
}

/// Numbered listing of every content slide title, drawn once before them.
fn toc_slide_part(titles: &[&str], theme: &ThemeSpec, slide_num: usize) -> SlidePart {
    let mut b = SlideBuilder::new(theme, slide_num);

    b.add_rect(&solid_fill(theme.background_color), 0.0, 0.0, 1.0, 1.0);
    b.add_rect(&solid_fill(theme.accent_color), 0.0, 0.0, 1.0, 0.018);

    let header = b.paragraph(
        "Contents",
        &ParaOpts {
            size_cpt: 3200,
            color: theme.text_color.to_string(),
            bold: true,
            align: "l",
            list: ListKind::None,
        },
    );
    b.add_text(&header, 0.06, 0.06, 0.88, 0.12, "t");

    let mut entries = String::new();
    for (i, title) in titles.iter().enumerate() {
        entries.push_str(&b.paragraph(
            &format!("{}. {}", i + 1, title),
            &ParaOpts {
                size_cpt: 2000,
                color: theme.subtext_color.to_string(),
                bold: false,
                align: "l",
                list: ListKind::None,
            },
        ));
    }
    b.add_text(&entries, 0.08, 0.22, 0.84, 0.7, "t");

    b.finish(None)
}

/// Full-bleed photo, translucent scrim, title, one-sentence excerpt, and up
/// to three supporting images in their fixed rectangles.
fn photo_slide_part(slide: &SlideRecord, theme: &ThemeSpec, slide_num: usize) -> SlidePart {
    let mut b = SlideBuilder::new(theme, slide_num);

    let has_photo = slide.background_image_path.is_some();
    match &slide.background_image_path {
        Some(path) => b.add_image(path, 0.0, 0.0, 1.0, 1.0),
        None => b.add_rect(&solid_fill(theme.background_color), 0.0, 0.0, 1.0, 1.0),
    }
    if has_photo {
        b.add_rect(&solid_fill_with_opacity("000000", 45), 0.0, 0.0, 1.0, 1.0);
    }

    let title_color = if has_photo { "FFFFFF" } else { theme.text_color };
    let body_color = if has_photo { "E8E8E8" } else { theme.subtext_color };

    let title = b.paragraph(
        &slide.title,
        &ParaOpts {
            size_cpt: 3200,
            color: title_color.to_string(),
            bold: true,
            align: "l",
            list: ListKind::None,
        },
    );
    b.add_text(&title, 0.06, 0.06, 0.88, 0.14, "t");

    if !slide.body.trim().is_empty() {
        let excerpt = b.paragraph(
            &first_sentence(&slide.body),
            &ParaOpts {
                size_cpt: 1800,
                color: body_color.to_string(),
                bold: false,
                align: "l",
                list: ListKind::None,
            },
        );
        b.add_text(&excerpt, 0.06, 0.21, 0.88, 0.12, "t");
    }

    let rects = supporting_rects(slide.supporting_image_paths.len());
    for (path, (x, y, w, h)) in slide.supporting_image_paths.iter().zip(rects.iter()) {
        b.add_image(path, *x, *y, *w, *h);
    }

    b.finish(slide.speaker_notes.clone())
}

/// Solid theme background, accent header bar, auto-formatted body, and the
/// rendered diagram in a fixed right-hand region. Also serves text-heavy
/// slides, which simply have no image.
fn diagram_slide_part(slide: &SlideRecord, theme: &ThemeSpec, slide_num: usize) -> SlidePart {
    let mut b = SlideBuilder::new(theme, slide_num);

    b.add_rect(&solid_fill(theme.background_color), 0.0, 0.0, 1.0, 1.0);
    b.add_rect(&solid_fill(theme.accent_color), 0.0, 0.0, 1.0, 0.018);

    let title = b.paragraph(
        &slide.title,
        &ParaOpts {
            size_cpt: 3200,
            color: theme.text_color.to_string(),
            bold: true,
            align: "l",
            list: ListKind::None,
        },
    );
    b.add_text(&title, 0.06, 0.05, 0.88, 0.13, "t");

    let has_image = slide.background_image_path.is_some();
    let body_width = if has_image { 0.44 } else { 0.88 };
    let body = format_body(&slide.body, theme, &b);
    if !body.is_empty() {
        b.add_text(&body, 0.06, 0.22, body_width, 0.68, "t");
    }

    if let Some(path) = &slide.background_image_path {
        b.add_image(path, 0.55, 0.22, 0.40, 0.62);
    }

    b.finish(slide.speaker_notes.clone())
}

/// Infer list formatting from sentence count and sequence vocabulary:
/// three or more sentences with ordering words become a numbered list, two
/// or more become bullets, anything shorter stays a paragraph.
fn format_body(body: &str, theme: &ThemeSpec, b: &SlideBuilder) -> String {
    let sentences = split_sentences(body, 6);
    if sentences.is_empty() {
        return String::new();
    }

    let lowered = body.to_lowercase();
    let sequential = SEQUENCE_WORDS.iter().any(|w| lowered.contains(w));
    let list = if sentences.len() >= 3 && sequential {
        ListKind::Numbered
    } else if sentences.len() >= 2 {
        ListKind::Bullet
    } else {
        ListKind::None
    };

    match list {
        ListKind::None => b.paragraph(
            body.trim(),
            &ParaOpts {
                size_cpt: 1800,
                color: theme.subtext_color.to_string(),
                bold: false,
                align: "l",
                list: ListKind::None,
            },
        ),
        kind => {
            let mut out = String::new();
            for sentence in &sentences {
                out.push_str(&b.paragraph(
                    sentence,
                    &ParaOpts {
                        size_cpt: 1800,
                        color: theme.subtext_color.to_string(),
                        bold: false,
                        align: "l",
                        list: match kind {
                            ListKind::Numbered => ListKind::Numbered,
                            _ => ListKind::Bullet,
                        },
                    },
                ));
            }
            out
        }
    }
}

fn notes_slide_xml(notes: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:notes xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">
    <p:cSld>
        <p:spTree>
            <p:nvGrpSpPr>
                <p:cNvPr id="1" name=""/>
                <p:cNvGrpSpPr/>
                <p:nvPr/>
            </p:nvGrpSpPr>
            <p:grpSpPr/>
            <p:sp>
                <p:nvSpPr>
                    <p:cNvPr id="2" name="Notes"/>
                    <p:cNvSpPr txBox="1"/>
                    <p:nvPr/>
                </p:nvSpPr>
                <p:spPr>
                    <a:xfrm><a:off x="457200" y="4800600"/><a:ext cx="5943600" cy="3886200"/></a:xfrm>
                    <a:prstGeom prst="rect"><a:avLst/></a:prstGeom>
                </p:spPr>
                <p:txBody>
                    <a:bodyPr/>
                    <a:lstStyle/>
                    <a:p><a:r><a:rPr lang="en-US" dirty="0"/><a:t>{}</a:t></a:r></a:p>
                </p:txBody>
            </p:sp>
        </p:spTree>
    </p:cSld>
    <p:clrMapOvr>
        <a:masterClrMapping/>
    </p:clrMapOvr>
</p:notes>"#,
        escape_xml(notes)
    )
}
