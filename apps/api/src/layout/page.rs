//! Page layout: places report text and images on A4 pages with a top-down cursor.
//!
//! Layout is pure: it produces positioned items only. `render::report` replays
//! them into a PDF. Coordinates on `Placed` items are PDF user space in
//! millimetres (origin bottom-left), ready for the writer.

use crate::layout::font_metrics::{get_metrics, PdfFont, MM_PER_PT};

/// Page geometry. All values in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageConfig {
    pub width_mm: f32,
    pub height_mm: f32,
    pub margin_mm: f32,
    /// Horizontal inset of text inside a cell.
    pub cell_padding_mm: f32,
}

impl PageConfig {
    pub fn content_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    fn bottom_limit_mm(&self) -> f32 {
        self.height_mm - self.margin_mm
    }
}

/// A4 portrait, 10 mm margins, 1 mm cell padding.
pub fn default_page_config() -> PageConfig {
    PageConfig {
        width_mm: 210.0,
        height_mm: 297.0,
        margin_mm: 10.0,
        cell_padding_mm: 1.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Placed {
    Text {
        text: String,
        font: PdfFont,
        size_pt: f32,
        x_mm: f32,
        /// Baseline, measured from the bottom edge.
        baseline_mm: f32,
    },
    Image {
        x_mm: f32,
        /// Bottom edge, measured from the bottom edge of the page.
        y_mm: f32,
        width_mm: f32,
        height_mm: f32,
    },
}

pub type Page = Vec<Placed>;

/// Top-down layout cursor. The first page exists from the start.
pub struct PageLayout {
    config: PageConfig,
    pages: Vec<Page>,
    /// Distance from the top edge to the next free line.
    cursor_mm: f32,
}

impl PageLayout {
    pub fn new(config: PageConfig) -> Self {
        Self {
            config,
            pages: vec![Vec::new()],
            cursor_mm: config.margin_mm,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(Vec::new());
        self.cursor_mm = self.config.margin_mm;
    }

    fn at_page_top(&self) -> bool {
        (self.cursor_mm - self.config.margin_mm).abs() < f32::EPSILON
    }

    /// Starts a new page unless `height_mm` still fits above the bottom margin.
    /// An item taller than a whole page goes on the current page if it is empty.
    fn reserve(&mut self, height_mm: f32) {
        if self.cursor_mm + height_mm > self.config.bottom_limit_mm() && !self.at_page_top() {
            self.new_page();
        }
    }

    fn push(&mut self, item: Placed) {
        if let Some(page) = self.pages.last_mut() {
            page.push(item);
        }
    }

    /// One line of text in a full-width cell of `height_mm`.
    pub fn cell(&mut self, text: &str, font: PdfFont, size_pt: f32, height_mm: f32, align: Align) {
        self.reserve(height_mm);

        let text_width = get_metrics(font).width_mm(text, size_pt);
        let x_mm = match align {
            Align::Left => self.config.margin_mm + self.config.cell_padding_mm,
            Align::Center => {
                self.config.margin_mm + (self.config.content_width_mm() - text_width) / 2.0
            }
        };
        // Vertically centred in the cell: half the cell plus ~0.3 em.
        let baseline_from_top = self.cursor_mm + height_mm / 2.0 + 0.3 * size_pt * MM_PER_PT;

        if !text.is_empty() {
            self.push(Placed::Text {
                text: text.to_string(),
                font,
                size_pt,
                x_mm,
                baseline_mm: self.config.height_mm - baseline_from_top,
            });
        }
        self.cursor_mm += height_mm;
    }

    /// Word-wrapped text, one cell of `line_height_mm` per line.
    pub fn multi_cell(&mut self, text: &str, font: PdfFont, size_pt: f32, line_height_mm: f32) {
        let max_width = self.config.content_width_mm() - 2.0 * self.config.cell_padding_mm;
        let lines = get_metrics(font).wrap_lines(text, size_pt, max_width);
        for line in lines {
            self.cell(&line, font, size_pt, line_height_mm, Align::Left);
        }
    }

    /// Vertical space. Never starts a page on its own.
    pub fn gap(&mut self, height_mm: f32) {
        self.cursor_mm += height_mm;
    }

    /// Places an image at `x_mm` from the left edge, `width_mm` wide,
    /// preserving the pixel aspect ratio.
    pub fn image(&mut self, x_mm: f32, width_mm: f32, pixel_width: u32, pixel_height: u32) {
        if pixel_width == 0 || pixel_height == 0 {
            return;
        }
        let height_mm = width_mm * pixel_height as f32 / pixel_width as f32;
        self.reserve(height_mm);
        let top = self.cursor_mm;
        self.push(Placed::Image {
            x_mm,
            y_mm: self.config.height_mm - top - height_mm,
            width_mm,
            height_mm,
        });
        self.cursor_mm += height_mm;
    }

    pub fn finish(self) -> Vec<Page> {
        self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(page: &Page) -> Vec<&str> {
        page.iter()
            .filter_map(|p| match p {
                Placed::Text { text, .. } => Some(text.as_str()),
                Placed::Image { .. } => None,
            })
            .collect()
    }

    #[test]
    fn test_cells_stack_downwards() {
        let mut layout = PageLayout::new(default_page_config());
        layout.cell("first", PdfFont::Helvetica, 12.0, 10.0, Align::Left);
        layout.cell("second", PdfFont::Helvetica, 12.0, 10.0, Align::Left);
        let pages = layout.finish();

        let baselines: Vec<f32> = pages[0]
            .iter()
            .filter_map(|p| match p {
                Placed::Text { baseline_mm, .. } => Some(*baseline_mm),
                _ => None,
            })
            .collect();
        assert_eq!(baselines.len(), 2);
        assert!((baselines[0] - baselines[1] - 10.0).abs() < 1e-3);
        assert!(baselines[0] < 297.0 - 10.0);
    }

    #[test]
    fn test_left_cell_is_inset_by_margin_and_padding() {
        let mut layout = PageLayout::new(default_page_config());
        layout.cell("x", PdfFont::Helvetica, 12.0, 10.0, Align::Left);
        match &layout.finish()[0][0] {
            Placed::Text { x_mm, .. } => assert!((x_mm - 11.0).abs() < 1e-4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_centered_cell_is_symmetric() {
        let config = default_page_config();
        let mut layout = PageLayout::new(config);
        let title = "Personality Profile Report";
        layout.cell(title, PdfFont::HelveticaBold, 16.0, 10.0, Align::Center);
        let width = get_metrics(PdfFont::HelveticaBold).width_mm(title, 16.0);
        match &layout.finish()[0][0] {
            Placed::Text { x_mm, .. } => {
                let right_gap = config.width_mm - (x_mm + width);
                assert!((x_mm - right_gap).abs() < 1e-3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let mut layout = PageLayout::new(default_page_config());
        // 277 mm usable → 34 cells of 8 mm fit, the 35th breaks.
        for i in 0..35 {
            layout.cell(&format!("line {i}"), PdfFont::Helvetica, 12.0, 8.0, Align::Left);
        }
        let pages = layout.finish();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].len(), 34);
        assert_eq!(texts(&pages[1]), vec!["line 34"]);
    }

    #[test]
    fn test_multi_cell_wraps_into_several_cells() {
        let mut layout = PageLayout::new(default_page_config());
        layout.multi_cell(&"insightful ".repeat(60), PdfFont::Helvetica, 12.0, 8.0);
        let pages = layout.finish();
        assert!(texts(&pages[0]).len() > 1);
    }

    #[test]
    fn test_empty_cell_advances_without_placing() {
        let mut layout = PageLayout::new(default_page_config());
        layout.cell("", PdfFont::Helvetica, 12.0, 10.0, Align::Left);
        layout.cell("after", PdfFont::Helvetica, 12.0, 10.0, Align::Left);
        let pages = layout.finish();
        assert_eq!(texts(&pages[0]), vec!["after"]);
    }

    #[test]
    fn test_image_preserves_aspect_ratio() {
        let mut layout = PageLayout::new(default_page_config());
        layout.image(30.0, 150.0, 600, 300);
        match &layout.finish()[0][0] {
            Placed::Image {
                x_mm,
                y_mm,
                width_mm,
                height_mm,
            } => {
                assert_eq!(*x_mm, 30.0);
                assert_eq!(*width_mm, 150.0);
                assert!((height_mm - 75.0).abs() < 1e-4);
                assert!((y_mm - (297.0 - 10.0 - 75.0)).abs() < 1e-3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_image_that_does_not_fit_moves_to_next_page() {
        let mut layout = PageLayout::new(default_page_config());
        layout.gap(200.0);
        layout.image(30.0, 150.0, 600, 600);
        let pages = layout.finish();
        assert_eq!(pages.len(), 2);
        assert!(pages[0].is_empty());
        assert!(matches!(pages[1][0], Placed::Image { .. }));
    }

    #[test]
    fn test_zero_sized_image_is_ignored() {
        let mut layout = PageLayout::new(default_page_config());
        layout.image(30.0, 150.0, 0, 0);
        assert!(layout.finish()[0].is_empty());
    }
}
