//! PDF report: lays out the profile with `layout::PageLayout`, then replays
//! the placed items through printpdf.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use printpdf::image_crate::{self, DynamicImage, GenericImageView};
use printpdf::{BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument};
use tracing::{debug, warn};

use crate::layout::{default_page_config, Align, Page, PageLayout, PdfFont, Placed};
use crate::profile::models::{format_score, PersonalityRecord};
use crate::render::RenderError;

pub const REPORT_FILE_NAME: &str = "personality_report.pdf";
pub const REPORT_TITLE: &str = "Personality Profile Report";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";
const CHART_X_MM: f32 = 30.0;
const CHART_WIDTH_MM: f32 = 150.0;

/// Reduces text to what the built-in PDF fonts can show.
pub fn pdf_safe_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push('\n'),
            '\t' | '\u{a0}' => out.push(' '),
            '\u{2018}' | '\u{2019}' | '\u{201b}' | '\u{2032}' => out.push('\''),
            '\u{201c}' | '\u{201d}' | '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2015}' | '\u{2212}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{2022}' => out.push('*'),
            c if c.is_ascii_control() => {}
            c if c.is_ascii() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Lays out the report. `chart_size` is the chart's pixel size when it
/// should be embedded.
pub fn layout_report(
    record: &PersonalityRecord,
    chart_size: Option<(u32, u32)>,
    generated_at: DateTime<Local>,
) -> Vec<Page> {
    let mut layout = PageLayout::new(default_page_config());

    layout.cell(REPORT_TITLE, PdfFont::HelveticaBold, 16.0, 10.0, Align::Center);
    layout.cell(
        &format!("Generated on {}", generated_at.format(TIMESTAMP_FORMAT)),
        PdfFont::Helvetica,
        12.0,
        10.0,
        Align::Left,
    );
    layout.cell(
        &format!("Predicted MBTI: {}", pdf_safe_text(&record.type_code)),
        PdfFont::Helvetica,
        12.0,
        10.0,
        Align::Left,
    );
    layout.gap(10.0);
    layout.multi_cell(&pdf_safe_text(&record.summary), PdfFont::Helvetica, 12.0, 8.0);
    layout.gap(5.0);
    layout.cell("Trait Scores:", PdfFont::Helvetica, 12.0, 10.0, Align::Left);
    for (trait_name, value) in &record.scores {
        layout.cell(
            &format!("- {}: {}/5", trait_name.label(), format_score(*value)),
            PdfFont::Helvetica,
            12.0,
            8.0,
            Align::Left,
        );
    }
    if let Some((w, h)) = chart_size {
        layout.image(CHART_X_MM, CHART_WIDTH_MM, w, h);
    }

    layout.finish()
}

fn pdf_err<E: std::fmt::Debug>(e: E) -> RenderError {
    RenderError::Pdf(format!("{e:?}"))
}

/// Loads the chart for embedding. A missing file is skipped silently; an
/// unreadable one is skipped with a warning.
fn load_chart(chart_path: &Path) -> Option<DynamicImage> {
    if !chart_path.exists() {
        debug!(chart = %chart_path.display(), "chart missing, report will omit it");
        return None;
    }
    match image_crate::open(chart_path) {
        // Flatten to RGB: the PDF image carries no alpha channel.
        Ok(img) => Some(DynamicImage::ImageRgb8(img.to_rgb8())),
        Err(e) => {
            warn!(chart = %chart_path.display(), "chart unreadable, report will omit it: {e}");
            None
        }
    }
}

/// Writes `out_dir/personality_report.pdf`, replacing any previous file.
pub fn render_report(
    record: &PersonalityRecord,
    chart_path: &Path,
    out_dir: &Path,
) -> Result<PathBuf, RenderError> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(REPORT_FILE_NAME);

    let chart = load_chart(chart_path);
    let pages = layout_report(record, chart.as_ref().map(|img| img.dimensions()), Local::now());
    write_pdf(&pages, chart.as_ref(), &path)?;

    debug!(report = %path.display(), pages = pages.len(), "report written");
    Ok(path)
}

fn write_pdf(
    pages: &[Page],
    chart: Option<&DynamicImage>,
    path: &Path,
) -> Result<(), RenderError> {
    let config = default_page_config();
    let (page_w, page_h) = (Mm(config.width_mm), Mm(config.height_mm));

    let (doc, first_page, first_layer) = PdfDocument::new(REPORT_TITLE, page_w, page_h, "Layer 1");
    let regular = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_err)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_err)?;

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_idx, layer_idx) = doc.add_page(page_w, page_h, "Layer 1");
            doc.get_page(page_idx).get_layer(layer_idx)
        };

        for item in page {
            match item {
                Placed::Text {
                    text,
                    font,
                    size_pt,
                    x_mm,
                    baseline_mm,
                } => {
                    let font_ref: &IndirectFontRef = match font {
                        PdfFont::Helvetica => &regular,
                        PdfFont::HelveticaBold => &bold,
                    };
                    layer.use_text(text.clone(), *size_pt, Mm(*x_mm), Mm(*baseline_mm), font_ref);
                }
                Placed::Image {
                    x_mm,
                    y_mm,
                    width_mm,
                    ..
                } => {
                    let Some(img) = chart else { continue };
                    // dpi chosen so the pixel width maps onto width_mm.
                    let dpi = img.width() as f32 / (*width_mm / 25.4);
                    Image::from_dynamic_image(img).add_to_layer(
                        layer.clone(),
                        ImageTransform {
                            translate_x: Some(Mm(*x_mm)),
                            translate_y: Some(Mm(*y_mm)),
                            dpi: Some(dpi),
                            ..Default::default()
                        },
                    );
                }
            }
        }
    }

    let mut writer = BufWriter::new(File::create(path)?);
    doc.save(&mut writer).map_err(pdf_err)?;
    Ok(())
}
