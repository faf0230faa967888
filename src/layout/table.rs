//! Grid table with automatic pagination.
//!
//! Rows are measured first (cells wrap inside their column), then placed one by
//! one.  A row that would cross the bottom margin moves to a new page, and the
//! header row is repeated at the top of every continuation page.

use crate::metrics::{ascent_mm, pt_to_mm, wrap_text};
use crate::model::{FontWeight, PagePosition, Primitive, Rect, Rgb, TextRun};

use super::flow::PageFlow;

/// A table column: header caption and width in millimetres.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub title: String,
    pub width: f64,
}

impl Column {
    pub fn new(title: impl Into<String>, width: f64) -> Self {
        Self {
            title: title.into(),
            width,
        }
    }
}

/// Visual parameters of the grid theme.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableStyle {
    pub font_size_pt: f64,
    pub cell_padding: f64,
    pub line_height_factor: f64,
    pub header_fill: Rgb,
    pub header_text: Rgb,
    pub body_text: Rgb,
    pub grid_color: Rgb,
    pub grid_thickness: f64,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size_pt: 11.0,
            cell_padding: 1.76,
            line_height_factor: 1.15,
            header_fill: Rgb(34, 139, 34),
            header_text: Rgb::WHITE,
            body_text: Rgb::BLACK,
            grid_color: Rgb(200, 200, 200),
            grid_thickness: 0.1,
        }
    }
}

impl TableStyle {
    fn line_height(&self) -> f64 {
        pt_to_mm(self.font_size_pt) * self.line_height_factor
    }
}

struct MeasuredRow {
    cells: Vec<Vec<String>>,
    height: f64,
}

/// A table ready to be placed into a [`PageFlow`].
pub struct GridTable {
    x: f64,
    columns: Vec<Column>,
    rows: Vec<Vec<String>>,
    style: TableStyle,
}

impl GridTable {
    pub fn new(x: f64, columns: Vec<Column>, style: TableStyle) -> Self {
        Self {
            x,
            columns,
            rows: Vec::new(),
            style,
        }
    }

    /// Appends a body row. Missing cells render empty, extra cells are dropped.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn measure(&self, cells: &[String], weight: FontWeight) -> MeasuredRow {
        let style = &self.style;
        let wrapped: Vec<Vec<String>> = self
            .columns
            .iter()
            .enumerate()
            .map(|(index, column)| {
                let text = cells.get(index).map(String::as_str).unwrap_or("");
                let available = (column.width - 2.0 * style.cell_padding).max(0.0);
                wrap_text(text, available, style.font_size_pt, weight)
            })
            .collect();
        let lines = wrapped.iter().map(Vec::len).max().unwrap_or(1).max(1);
        MeasuredRow {
            cells: wrapped,
            height: lines as f64 * style.line_height() + 2.0 * style.cell_padding,
        }
    }

    fn draw_row(&self, flow: &mut PageFlow, row: &MeasuredRow, y: f64, header: bool) -> f64 {
        let style = &self.style;
        let (fill, text_color, weight) = if header {
            (Some(style.header_fill), style.header_text, FontWeight::Bold)
        } else {
            (None, style.body_text, FontWeight::Regular)
        };
        let line_height = style.line_height();
        let font_height = pt_to_mm(style.font_size_pt);
        let first_baseline = y
            + style.cell_padding
            + (line_height - font_height) / 2.0
            + ascent_mm(style.font_size_pt);

        let page = flow.current();
        let mut x = self.x;
        for (column, lines) in self.columns.iter().zip(&row.cells) {
            page.push(Primitive::Rect(Rect {
                x,
                y,
                width: column.width,
                height: row.height,
                fill,
                stroke: Some(style.grid_color),
                stroke_thickness: style.grid_thickness,
            }));
            for (line_index, line) in lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let baseline = first_baseline + line_index as f64 * line_height;
                page.push_text(
                    TextRun::new(line.clone(), x + style.cell_padding, baseline, style.font_size_pt)
                        .with_weight(weight)
                        .with_color(text_color),
                );
            }
            x += column.width;
        }
        y + row.height
    }

    /// Number of text lines a row can hold within `available` millimetres.
    fn lines_fitting(&self, available: f64) -> usize {
        let style = &self.style;
        let lines = (available - 2.0 * style.cell_padding) / style.line_height();
        if lines < 0.0 {
            0
        } else {
            (lines + 1e-9).floor() as usize
        }
    }

    /// Moves the first `lines` lines of every cell of `row` into a new row.
    fn split_row(&self, row: &mut MeasuredRow, lines: usize) -> MeasuredRow {
        let head: Vec<Vec<String>> = row
            .cells
            .iter_mut()
            .map(|cell| cell.drain(..lines.min(cell.len())).collect())
            .collect();
        let height_of = |cells: &[Vec<String>]| {
            let count = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
            count as f64 * self.style.line_height() + 2.0 * self.style.cell_padding
        };
        row.height = height_of(&row.cells);
        MeasuredRow {
            height: height_of(&head),
            cells: head,
        }
    }

    fn continue_on_new_page(&self, flow: &mut PageFlow, header: &MeasuredRow) -> f64 {
        let y = flow.break_page();
        self.draw_row(flow, header, y, true)
    }

    /// Places the table starting at `start_y` on the current page and returns
    /// the bottom edge of its last row.
    ///
    /// A row that does not fit below the previous one moves to the next page.
    /// A row taller than a whole page is split line by line across pages.
    pub fn place(&self, flow: &mut PageFlow, start_y: f64) -> PagePosition {
        let titles: Vec<String> = self.columns.iter().map(|c| c.title.clone()).collect();
        let header = self.measure(&titles, FontWeight::Bold);

        let mut y = start_y;
        if !flow.fits(y, header.height) {
            y = flow.break_page();
        }
        y = self.draw_row(flow, &header, y, true);

        let page_top = flow.top() + header.height;
        let capacity = flow.limit() - page_top;

        for cells in &self.rows {
            let mut row = self.measure(cells, FontWeight::Regular);
            if !flow.fits(y, row.height) && row.height <= capacity {
                y = self.continue_on_new_page(flow, &header);
            }

            while !flow.fits(y, row.height) {
                let fresh_page = (y - page_top).abs() < 1e-9;
                let lines = match self.lines_fitting(flow.limit() - y) {
                    0 if fresh_page => 1,
                    0 => {
                        y = self.continue_on_new_page(flow, &header);
                        continue;
                    }
                    lines => lines,
                };
                let head = self.split_row(&mut row, lines);
                y = self.draw_row(flow, &head, y, false);
                y = self.continue_on_new_page(flow, &header);
            }
            y = self.draw_row(flow, &row, y, false);
        }

        flow.position(y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PageSize;

    fn table(rows: usize) -> GridTable {
        let columns = vec![Column::new("Item", 82.0), Column::new("Qty", 20.0)];
        let mut table = GridTable::new(14.0, columns, TableStyle::default());
        for index in 0..rows {
            table.push_row(vec![format!("Row {index}"), "1".to_owned()]);
        }
        table
    }

    fn row_height() -> f64 {
        let style = TableStyle::default();
        style.line_height() + 2.0 * style.cell_padding
    }

    #[test]
    fn header_only_when_no_rows() {
        let mut flow = PageFlow::new(PageSize::A4, 14.0, 14.0);
        let end = table(0).place(&mut flow, 70.0);
        assert_eq!(end.page, 0);
        assert!((end.y - (70.0 + row_height())).abs() < 1e-9);
        assert_eq!(flow.current().text_runs().count(), 2);
    }

    #[test]
    fn rows_stack_below_header() {
        let mut flow = PageFlow::new(PageSize::A4, 14.0, 14.0);
        let end = table(3).place(&mut flow, 70.0);
        assert!((end.y - (70.0 + 4.0 * row_height())).abs() < 1e-9);
    }

    #[test]
    fn overflowing_rows_continue_with_repeated_header() {
        let mut flow = PageFlow::new(PageSize::A4, 14.0, 14.0);
        let end = table(50).place(&mut flow, 70.0);
        assert_eq!(end.page, 1);
        let pages = flow.into_pages();
        assert_eq!(pages.len(), 2);
        let headers = pages[1]
            .text_runs()
            .filter(|run| run.text() == "Item" && run.weight() == FontWeight::Bold)
            .count();
        assert_eq!(headers, 1);
        for page in &pages {
            for primitive in page.primitives() {
                if let Primitive::Rect(rect) = primitive {
                    assert!(rect.bottom() <= 283.0 + 1e-9);
                }
            }
        }
    }

    #[test]
    fn row_taller_than_a_page_is_split_across_pages() {
        let text = "word ".repeat(1500);
        let mut tall = GridTable::new(
            14.0,
            vec![Column::new("Item", 82.0), Column::new("Qty", 20.0)],
            TableStyle::default(),
        );
        tall.push_row(vec![text.clone(), "1".to_owned()]);
        tall.push_row(vec!["After".to_owned(), "2".to_owned()]);

        let mut flow = PageFlow::new(PageSize::A4, 14.0, 14.0);
        let end = tall.place(&mut flow, 70.0);
        assert!(end.page >= 2);
        assert!(end.y <= 283.0 + 1e-9);

        let pages = flow.into_pages();
        let mut words = 0;
        for page in &pages {
            let headers = page
                .text_runs()
                .filter(|run| run.text() == "Item" && run.weight() == FontWeight::Bold)
                .count();
            assert_eq!(headers, 1);
            for primitive in page.primitives() {
                match primitive {
                    Primitive::Rect(rect) => assert!(rect.bottom() <= 283.0 + 1e-9),
                    Primitive::Text(run) => {
                        assert!(run.baseline() <= 283.0);
                        words += run.text().split_whitespace().filter(|w| *w == "word").count();
                    }
                    Primitive::Rule(_) => {}
                }
            }
        }
        assert_eq!(words, 1500);
        assert!(pages[end.page].find_text("After").is_some());
    }

    #[test]
    fn wrapped_cell_grows_the_row() {
        let mut narrow = GridTable::new(
            14.0,
            vec![Column::new("Item", 30.0)],
            TableStyle::default(),
        );
        narrow.push_row(vec!["A rather long description that wraps".to_owned()]);
        let mut flow = PageFlow::new(PageSize::A4, 14.0, 14.0);
        let end = narrow.place(&mut flow, 70.0);
        assert!(end.y - 70.0 > 2.0 * row_height());
    }
}
