//! Radar chart of trait scores, written as a PNG with plotters.
//!
//! Spokes follow `TraitScores` iteration order (canonical trait order),
//! starting at 12 o'clock and running clockwise. Radial axis runs 0 to 5.
//!
//! Labels need a TrueType font registered with plotters' ab_glyph backend.
//! Without one the chart is still drawn, just without text.

use std::f64::consts::PI;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontStyle;
use tracing::{debug, warn};

use crate::profile::models::{TraitScores, MAX_SCORE};
use crate::render::RenderError;

pub const CHART_FILE_NAME: &str = "chart.png";
pub const CHART_TITLE: &str = "Personality Trait Radar";

pub const CHART_SIZE: (u32, u32) = (600, 600);
const CENTER: (i32, i32) = (300, 320);
const RADIUS: f64 = 200.0;
const LABEL_OFFSET: f64 = 24.0;
const FONT_FAMILY: &str = "sans-serif";

const FILL: RGBAColor = RGBAColor(135, 206, 235, 0.5);
const OUTLINE: RGBColor = RGBColor(0, 0, 255);
const GRID: RGBColor = RGBColor(210, 210, 210);

/// Probed in order when no font path is configured.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static LABEL_FONT: OnceLock<bool> = OnceLock::new();

/// Registers the label font once per process. The first call decides;
/// later calls with a different path are ignored.
fn ensure_label_font(configured: Option<&Path>) -> bool {
    *LABEL_FONT.get_or_init(|| {
        let candidates: Vec<PathBuf> = match configured {
            Some(path) => vec![path.to_path_buf()],
            None => SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from).collect(),
        };
        if candidates.iter().any(|path| register_label_font(path)) {
            return true;
        }
        warn!("no chart label font found; radar chart will be drawn without labels");
        false
    })
}

/// Registers the TTF at `path` as the label family. Unreadable or unparsable
/// files return false.
fn register_label_font(path: &Path) -> bool {
    let Ok(bytes) = std::fs::read(path) else {
        return false;
    };
    // plotters keeps a 'static reference; this happens once per candidate.
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
        Ok(()) => {
            debug!(font = %path.display(), "registered chart label font");
            true
        }
        Err(_) => {
            warn!(font = %path.display(), "unusable chart font");
            false
        }
    }
}

fn spoke_angle(index: usize, count: usize) -> f64 {
    -PI / 2.0 + 2.0 * PI * index as f64 / count as f64
}

fn polar_to_pixel(angle: f64, radius: f64) -> (i32, i32) {
    (
        CENTER.0 + (radius * angle.cos()).round() as i32,
        CENTER.1 + (radius * angle.sin()).round() as i32,
    )
}

/// Pixel vertices of the score polygon, one per entry, in iteration order.
pub fn radar_vertices(scores: &TraitScores) -> Vec<(i32, i32)> {
    let count = scores.len();
    scores
        .values()
        .enumerate()
        .map(|(i, &score)| polar_to_pixel(spoke_angle(i, count), score / MAX_SCORE * RADIUS))
        .collect()
}

fn label_anchor(x: i32) -> Pos {
    let h = match x.cmp(&CENTER.0) {
        std::cmp::Ordering::Less => HPos::Right,
        std::cmp::Ordering::Equal => HPos::Center,
        std::cmp::Ordering::Greater => HPos::Left,
    };
    Pos::new(h, VPos::Center)
}

fn chart_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Chart(e.to_string())
}

/// Draws the radar chart into `out_dir/chart.png`, replacing any previous file.
///
/// An empty mapping is valid and produces the grid with no spokes.
pub fn render_chart(
    scores: &TraitScores,
    out_dir: &Path,
    font_path: Option<&Path>,
) -> Result<PathBuf, RenderError> {
    std::fs::create_dir_all(out_dir)?;
    let path = out_dir.join(CHART_FILE_NAME);
    let with_labels = ensure_label_font(font_path);

    let root = BitMapBackend::new(&path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    // Grid: a ring per whole score.
    for ring in 1..=MAX_SCORE as i32 {
        let r = (ring as f64 / MAX_SCORE * RADIUS).round() as i32;
        root.draw(&Circle::new(CENTER, r, GRID.stroke_width(1)))
            .map_err(chart_err)?;
    }

    let count = scores.len();
    for i in 0..count {
        let end = polar_to_pixel(spoke_angle(i, count), RADIUS);
        root.draw(&PathElement::new(vec![CENTER, end], GRID.stroke_width(1)))
            .map_err(chart_err)?;
    }

    let vertices = radar_vertices(scores);
    if vertices.len() >= 3 {
        root.draw(&Polygon::new(vertices.clone(), FILL.filled()))
            .map_err(chart_err)?;
    }
    if vertices.len() >= 2 {
        let mut outline = vertices.clone();
        outline.push(vertices[0]);
        root.draw(&PathElement::new(outline, OUTLINE.stroke_width(2)))
            .map_err(chart_err)?;
    }
    for &vertex in &vertices {
        root.draw(&Circle::new(vertex, 3, OUTLINE.filled()))
            .map_err(chart_err)?;
    }

    if with_labels {
        draw_labels(&root, scores);
    }

    root.present().map_err(chart_err)?;
    drop(root);
    Ok(path)
}

/// Labels are decoration: a failed text draw is logged and skipped.
fn draw_labels<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    scores: &TraitScores,
) {
    let title_style = (FONT_FAMILY, 22)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    if let Err(e) = root.draw(&Text::new(CHART_TITLE, (CENTER.0, 40), title_style)) {
        warn!("chart title not drawn: {e:?}");
    }

    let count = scores.len();
    for (i, trait_name) in scores.keys().enumerate() {
        let at = polar_to_pixel(spoke_angle(i, count), RADIUS + LABEL_OFFSET);
        let style = (FONT_FAMILY, 13)
            .into_font()
            .color(&BLACK)
            .pos(label_anchor(at.0));
        if let Err(e) = root.draw(&Text::new(trait_name.label(), at, style)) {
            warn!(label = trait_name.label(), "chart label not drawn: {e:?}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::models::PersonalityTrait;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

    fn scores(entries: &[(PersonalityTrait, f64)]) -> TraitScores {
        entries.iter().copied().collect()
    }

    #[test]
    fn test_first_vertex_points_up() {
        let v = radar_vertices(&scores(&[
            (PersonalityTrait::Openness, 5.0),
            (PersonalityTrait::Empathy, 5.0),
        ]));
        assert_eq!(v[0], (CENTER.0, CENTER.1 - RADIUS as i32));
    }

    #[test]
    fn test_vertex_distance_scales_with_score() {
        let v = radar_vertices(&scores(&[
            (PersonalityTrait::Openness, 2.5),
            (PersonalityTrait::Creativity, 0.0),
            (PersonalityTrait::Empathy, 5.0),
        ]));
        assert_eq!(v[0], (CENTER.0, CENTER.1 - 100));
        assert_eq!(v[1], CENTER);
        let dx = (v[2].0 - CENTER.0) as f64;
        let dy = (v[2].1 - CENTER.1) as f64;
        assert!(((dx * dx + dy * dy).sqrt() - RADIUS).abs() < 1.5);
    }

    #[test]
    fn test_empty_scores_have_no_vertices() {
        assert!(radar_vertices(&TraitScores::new()).is_empty());
    }

    #[test]
    fn test_invalid_font_file_is_not_registered() {
        let dir = tempfile::tempdir().unwrap();
        let bogus = dir.path().join("bogus.ttf");
        std::fs::write(&bogus, b"definitely not a font").unwrap();
        assert!(!register_label_font(&bogus));
        assert!(!register_label_font(&dir.path().join("missing.ttf")));
    }

    #[test]
    fn test_empty_scores_still_write_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = render_chart(&TraitScores::new(), dir.path(), None).unwrap();
        assert_eq!(path, dir.path().join(CHART_FILE_NAME));
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(PNG_MAGIC));
    }

    #[test]
    fn test_full_chart_overwrites_previous_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CHART_FILE_NAME), b"stale").unwrap();

        let all: TraitScores = PersonalityTrait::ALL.iter().map(|&t| (t, 3.0)).collect();
        let path = render_chart(&all, dir.path(), None).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(PNG_MAGIC));
    }

    #[test]
    fn test_one_and_two_trait_charts_render() {
        let dir = tempfile::tempdir().unwrap();
        render_chart(&scores(&[(PersonalityTrait::Openness, 4.0)]), dir.path(), None).unwrap();
        render_chart(
            &scores(&[
                (PersonalityTrait::Openness, 4.0),
                (PersonalityTrait::Empathy, 1.0),
            ]),
            dir.path(),
            None,
        )
        .unwrap();
    }
}
