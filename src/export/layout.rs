//! Page model for the PDF report.
//!
//! Layout runs in two passes. Sections append draw operations to the current
//! page and break to a new page when the remaining height is insufficient.
//! Once all content is placed the page count is known, and [`PageLayout::finish`]
//! stamps the `"n / total"` footers. Coordinates are millimetres measured from
//! the top-left corner of an A4 page.

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN: f32 = 20.0;
pub const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Content must end above this line.
pub const CONTENT_BOTTOM: f32 = PAGE_HEIGHT - 20.0;
pub const FOOTER_Y: f32 = PAGE_HEIGHT - 10.0;
pub const FOOTER_SIZE: f32 = 8.0;

const PT_TO_MM: f32 = 0.352_778;
/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_GLYPH_EM: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb8(pub u8, pub u8, pub u8);

pub const WHITE: Rgb8 = Rgb8(255, 255, 255);
pub const TEXT_DARK: Rgb8 = Rgb8(31, 41, 55);
pub const TEXT_MEDIUM: Rgb8 = Rgb8(75, 85, 99);
pub const FOOTER_GRAY: Rgb8 = Rgb8(107, 114, 128);
pub const BORDER: Rgb8 = Rgb8(229, 231, 235);
pub const BG_LIGHT: Rgb8 = Rgb8(249, 250, 251);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Text {
        text: String,
        x: f32,
        y: f32,
        size: f32,
        face: Face,
        color: Rgb8,
        align: Align,
    },
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb8>,
        stroke: Option<(Rgb8, f32)>,
    },
    Line {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        color: Rgb8,
        width: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub ops: Vec<DrawOp>,
    /// Filled in by the finalization pass.
    pub footer: Option<String>,
}

impl Page {
    /// All text drawn on the page, footer excluded.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// Text style shorthand for section code.
#[derive(Debug, Clone, Copy)]
pub struct Style {
    pub size: f32,
    pub face: Face,
    pub color: Rgb8,
}

impl Style {
    pub const fn new(size: f32, face: Face, color: Rgb8) -> Self {
        Self { size, face, color }
    }
}

/// First pass: pages of draw operations plus a vertical cursor.
#[derive(Debug)]
pub struct PageLayout {
    pages: Vec<Page>,
    cursor: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl PageLayout {
    pub fn new() -> Self {
        Self {
            pages: vec![Page::default()],
            cursor: MARGIN,
        }
    }

    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    pub fn set_cursor(&mut self, y: f32) {
        self.cursor = y;
    }

    pub fn advance(&mut self, dy: f32) {
        self.cursor += dy;
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Start a fresh page with the cursor at the top margin.
    pub fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.cursor = MARGIN;
    }

    /// Break to a new page if `required` mm do not fit below the cursor.
    /// Returns true when a break happened.
    pub fn ensure_space(&mut self, required: f32) -> bool {
        if self.cursor + required > CONTENT_BOTTOM {
            self.new_page();
            true
        } else {
            false
        }
    }

    pub fn push(&mut self, op: DrawOp) {
        // pages is never empty
        if let Some(page) = self.pages.last_mut() {
            page.ops.push(op);
        }
    }

    pub fn text(&mut self, text: impl Into<String>, x: f32, y: f32, style: Style, align: Align) {
        self.push(DrawOp::Text {
            text: text.into(),
            x,
            y,
            size: style.size,
            face: style.face,
            color: style.color,
            align,
        });
    }

    pub fn rect(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb8>,
        stroke: Option<(Rgb8, f32)>,
    ) {
        self.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            fill,
            stroke,
        });
    }

    pub fn hline(&mut self, x1: f32, x2: f32, y: f32, color: Rgb8, width: f32) {
        self.push(DrawOp::Line {
            x1,
            y1: y,
            x2,
            y2: y,
            color,
            width,
        });
    }

    /// Word-wrapped paragraph starting at the cursor. Breaks pages between
    /// lines as needed and leaves the cursor below the last line.
    pub fn paragraph(&mut self, text: &str, x: f32, width: f32, style: Style, line_height: f32) {
        for line in wrap_text(text, max_chars_for(width, style.size)) {
            self.ensure_space(line_height);
            self.text(line, x, self.cursor, style, Align::Left);
            self.cursor += line_height;
        }
    }

    /// Second pass: stamp `"n / total"` on every page except the cover.
    pub fn finish(mut self) -> Vec<Page> {
        let total = self.pages.len();
        for (index, page) in self.pages.iter_mut().enumerate().skip(1) {
            page.footer = Some(format!("{} / {}", index + 1, total));
        }
        self.pages
    }
}

/// Approximate rendered width of `text` in mm at `size` pt.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_EM * PT_TO_MM
}

/// How many characters fit on one line of `width` mm at `size` pt.
pub fn max_chars_for(width: f32, size: f32) -> usize {
    let per_char = size * AVG_GLYPH_EM * PT_TO_MM;
    ((width / per_char).floor() as usize).max(1)
}

/// Simple word-wrap helper for PDF text rendering.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let current_len = current.chars().count();
        if current_len + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Cut `text` to at most `max_chars`, marking the cut with "...".
pub fn truncate_to(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: Style = Style::new(10.0, Face::Regular, TEXT_DARK);

    #[test]
    fn ensure_space_breaks_only_when_needed() {
        let mut layout = PageLayout::new();
        assert!(!layout.ensure_space(100.0));
        assert_eq!(layout.page_count(), 1);

        layout.set_cursor(CONTENT_BOTTOM - 5.0);
        assert!(layout.ensure_space(10.0));
        assert_eq!(layout.page_count(), 2);
        assert_eq!(layout.cursor(), MARGIN);
    }

    #[test]
    fn exact_fit_does_not_break() {
        let mut layout = PageLayout::new();
        layout.set_cursor(CONTENT_BOTTOM - 10.0);
        assert!(!layout.ensure_space(10.0));
    }

    #[test]
    fn finish_stamps_footers_after_cover() {
        let mut layout = PageLayout::new();
        layout.new_page();
        layout.new_page();
        let pages = layout.finish();
        assert_eq!(pages[0].footer, None);
        assert_eq!(pages[1].footer.as_deref(), Some("2 / 3"));
        assert_eq!(pages[2].footer.as_deref(), Some("3 / 3"));
    }

    #[test]
    fn paragraph_breaks_across_pages() {
        let mut layout = PageLayout::new();
        layout.set_cursor(CONTENT_BOTTOM - 6.0);
        let long = "word ".repeat(200);
        layout.paragraph(&long, MARGIN, CONTENT_WIDTH, BODY, 5.0);
        assert_eq!(layout.page_count(), 2);
        let pages = layout.finish();
        assert_eq!(pages[0].texts().count(), 1);
        assert!(pages[1].texts().count() > 1);
    }

    #[test]
    fn wrap_respects_limit() {
        let lines = wrap_text("the quick brown fox jumps over the lazy dog", 10);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines.join(" "), "the quick brown fox jumps over the lazy dog");
    }

    #[test]
    fn wrap_empty_yields_one_line() {
        assert_eq!(wrap_text("", 20), vec![String::new()]);
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate_to("Pneumonia", 20), "Pneumonia");
        assert_eq!(truncate_to("Enlarged Cardiomediastinum", 10), "Enlarge...");
        assert_eq!(truncate_to("Enlarged Cardiomediastinum", 10).chars().count(), 10);
    }

    #[test]
    fn width_estimates_scale_with_size() {
        assert!(text_width("abc", 20.0) > text_width("abc", 10.0));
        assert!(max_chars_for(CONTENT_WIDTH, 10.0) > max_chars_for(CONTENT_WIDTH, 20.0));
    }
}
