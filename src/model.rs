//! Data structures describing a laid out invoice document.
//!
//! The layout engine produces these values and the renderer consumes them.  They
//! intentionally avoid referencing the rendering crate directly so a document
//! can be inspected in tests, or handed to another backend, without touching
//! PDF serialization.
//!
//! All coordinates are millimetres measured from the top-left corner of the
//! page.  Text positions refer to the baseline of the first glyph row.

/// Metadata that controls how a text run is anchored on its x coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HorizontalAlignment {
    /// The run starts at `x`.
    #[default]
    Left,
    /// The run is centered on `x`.
    Center,
    /// The run ends at `x`.
    Right,
}

/// Font weight of a text run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

/// An sRGB color with 8-bit channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);
}

impl Default for Rgb {
    fn default() -> Self {
        Self::BLACK
    }
}

/// A single line of text placed on a page.
#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    text: String,
    x: f64,
    baseline: f64,
    font_size_pt: f64,
    weight: FontWeight,
    color: Rgb,
    alignment: HorizontalAlignment,
}

impl TextRun {
    /// Creates a left aligned, regular, black run.
    pub fn new(text: impl Into<String>, x: f64, baseline: f64, font_size_pt: f64) -> Self {
        Self {
            text: text.into(),
            x,
            baseline,
            font_size_pt,
            weight: FontWeight::Regular,
            color: Rgb::BLACK,
            alignment: HorizontalAlignment::Left,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Anchor x coordinate; its meaning depends on [`TextRun::alignment`].
    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn baseline(&self) -> f64 {
        self.baseline
    }

    pub fn font_size_pt(&self) -> f64 {
        self.font_size_pt
    }

    pub fn weight(&self) -> FontWeight {
        self.weight
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn alignment(&self) -> HorizontalAlignment {
        self.alignment
    }

    /// Sets the weight and returns the updated run.
    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    /// Convenience shorthand that marks the run as bold.
    pub fn bold(self) -> Self {
        self.with_weight(FontWeight::Bold)
    }

    /// Sets the color and returns the updated run.
    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    /// Sets the alignment and returns the updated run.
    pub fn with_alignment(mut self, alignment: HorizontalAlignment) -> Self {
        self.alignment = alignment;
        self
    }
}

/// A straight stroke between two points. `thickness` is in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rule {
    pub from: (f64, f64),
    pub to: (f64, f64),
    pub thickness: f64,
    pub color: Rgb,
}

/// An axis-aligned rectangle, optionally filled and/or outlined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: Option<Rgb>,
    pub stroke: Option<Rgb>,
    /// Outline thickness in millimetres; ignored without `stroke`.
    pub stroke_thickness: f64,
}

impl Rect {
    /// Bottom edge of the rectangle.
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

/// Drawing primitives a page is made of.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Text(TextRun),
    Rule(Rule),
    Rect(Rect),
}

/// One page of the document, painted in order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    primitives: Vec<Primitive>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the primitives in paint order.
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// Iterates over the text runs of the page.
    pub fn text_runs(&self) -> impl Iterator<Item = &TextRun> {
        self.primitives.iter().filter_map(|primitive| match primitive {
            Primitive::Text(run) => Some(run),
            _ => None,
        })
    }

    /// Finds the first text run whose content equals `text`.
    pub fn find_text(&self, text: &str) -> Option<&TextRun> {
        self.text_runs().find(|run| run.text() == text)
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn push_text(&mut self, run: TextRun) {
        self.push(Primitive::Text(run));
    }
}

/// A vertical position on a specific page (zero-based page index).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PagePosition {
    pub page: usize,
    pub y: f64,
}

impl PagePosition {
    pub fn new(page: usize, y: f64) -> Self {
        Self { page, y }
    }

    /// Whether `self` lies strictly below `other` in reading order.
    pub fn is_below(&self, other: &PagePosition) -> bool {
        self.page > other.page || (self.page == other.page && self.y > other.y)
    }
}

/// Where each block of the invoice ended up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockAnchors {
    /// Bottom edge of the last table row (or of the header row when there are no items).
    pub table_end: PagePosition,
    /// Baseline of the `Subtotal:` line.
    pub totals_start: PagePosition,
    /// Baseline of the last footer line.
    pub footer_end: PagePosition,
}

/// Page format of the document in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO 216 A4 portrait.
    pub const A4: PageSize = PageSize {
        width: 210.0,
        height: 297.0,
    };
}

/// A fully laid out document.
#[derive(Clone, Debug, PartialEq)]
pub struct InvoiceDocument {
    title: String,
    page_size: PageSize,
    pages: Vec<Page>,
    anchors: BlockAnchors,
}

impl InvoiceDocument {
    /// Assembles a document from its laid out pages.
    pub fn new(
        title: impl Into<String>,
        page_size: PageSize,
        pages: Vec<Page>,
        anchors: BlockAnchors,
    ) -> Self {
        Self {
            title: title.into(),
            page_size,
            pages,
            anchors,
        }
    }

    /// Document title written into the PDF metadata.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn anchors(&self) -> BlockAnchors {
        self.anchors
    }
}
