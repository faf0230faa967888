use log::debug;

use crate::model::{Page, PagePosition, PageSize};

/// Vertical page cursor shared by the blocks of a document.
///
/// Blocks draw onto the current page and ask the flow for a fresh one when the
/// content would cross the bottom margin.  Content on continuation pages starts
/// at the top margin.
#[derive(Debug)]
pub struct PageFlow {
    page_size: PageSize,
    top_margin: f64,
    bottom_margin: f64,
    pages: Vec<Page>,
}

impl PageFlow {
    pub fn new(page_size: PageSize, top_margin: f64, bottom_margin: f64) -> Self {
        Self {
            page_size,
            top_margin,
            bottom_margin,
            pages: vec![Page::new()],
        }
    }

    /// Zero-based index of the page currently being filled.
    pub fn page_index(&self) -> usize {
        self.pages.len() - 1
    }

    /// Lowest y coordinate content may reach on any page.
    pub fn limit(&self) -> f64 {
        self.page_size.height - self.bottom_margin
    }

    /// First usable y coordinate on continuation pages.
    pub fn top(&self) -> f64 {
        self.top_margin
    }

    /// Whether content spanning `height` starting at `y` fits on the current page.
    pub fn fits(&self, y: f64, height: f64) -> bool {
        y + height <= self.limit()
    }

    pub fn position(&self, y: f64) -> PagePosition {
        PagePosition::new(self.page_index(), y)
    }

    pub fn current(&mut self) -> &mut Page {
        let index = self.page_index();
        &mut self.pages[index]
    }

    /// Starts a new page and returns the y coordinate content resumes at.
    pub fn break_page(&mut self) -> f64 {
        self.pages.push(Page::new());
        debug!("page break, continuing on page {}", self.pages.len());
        self.top_margin
    }

    pub fn into_pages(self) -> Vec<Page> {
        self.pages
    }
}
