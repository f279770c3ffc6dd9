// Report layout: font metrics and the page cursor that positions report content.
// Pure and CPU-bound; the PDF writer in render::report only replays the result.

pub mod font_metrics;
pub mod page;

pub use font_metrics::PdfFont;
pub use page::{default_page_config, Align, Page, PageLayout, Placed};
