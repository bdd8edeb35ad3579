use polars::prelude::*;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Widget},
};
use std::borrow::Cow;

const CELL_PADDING: u16 = 2;

/// Read-only view of a frame, starting at `offset`. Columns that do not fit are dropped
/// from the right.
pub struct DataTable<'a> {
    df: &'a DataFrame,
    offset: usize,
    title: Option<String>,
    header_fg: Color,
    border_fg: Color,
}

impl<'a> DataTable<'a> {
    pub fn new(df: &'a DataFrame) -> Self {
        Self {
            df,
            offset: 0,
            title: None,
            header_fg: Color::Reset,
            border_fg: Color::Reset,
        }
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn colors(mut self, header_fg: Color, border_fg: Color) -> Self {
        self.header_fg = header_fg;
        self.border_fg = border_fg;
        self
    }
}

/// Largest valid scroll offset for `rows` rows in a viewport of `visible` rows.
pub fn max_offset(rows: usize, visible: usize) -> usize {
    rows.saturating_sub(visible.max(1))
}

fn cell_text(value: AnyValue<'_>) -> Cow<'_, str> {
    match value {
        AnyValue::Null => Cow::Borrowed(""),
        AnyValue::Float64(v) => Cow::Owned(format!("{}", v)),
        AnyValue::Float32(v) => Cow::Owned(format!("{}", v)),
        other => Cow::Owned(other.str_value().into_owned()),
    }
}

impl Widget for DataTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (height, cols) = self.df.shape();
        let title = match &self.title {
            Some(t) => format!(" {} ({} rows) ", t, height),
            None => format!(" {} rows ", height),
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.border_fg))
            .title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        if cols == 0 || height == 0 {
            Paragraph::new("No rows")
                .style(Style::default().fg(Color::DarkGray))
                .centered()
                .render(inner, buf);
            return;
        }

        let visible_rows = (inner.height as usize).saturating_sub(1);
        let start = self.offset.min(max_offset(height, visible_rows));
        let end = (start + visible_rows).min(height);

        let names = self.df.get_column_names();
        let mut widths: Vec<u16> = Vec::with_capacity(cols);
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); end - start];
        let mut used_width = 0u16;

        for (col_index, column) in self.df.get_columns().iter().enumerate() {
            let mut max_len = names[col_index].chars().count() as u16;
            let mut cells = Vec::with_capacity(end - start);
            for row_index in start..end {
                let text = column
                    .get(row_index)
                    .map(|v| cell_text(v).into_owned())
                    .unwrap_or_default();
                max_len = max_len.max(text.chars().count() as u16);
                cells.push(Cell::from(Line::from(text)));
            }
            if used_width + max_len > inner.width && !widths.is_empty() {
                break;
            }
            used_width += max_len + CELL_PADDING;
            widths.push(max_len);
            for (row, cell) in rows.iter_mut().zip(cells) {
                row.push(cell);
            }
        }

        let headers: Vec<Span> = names
            .iter()
            .take(widths.len())
            .map(|name| Span::raw(name.to_string()))
            .collect();

        Table::new(rows.into_iter().map(Row::new), widths)
            .column_spacing(CELL_PADDING)
            .header(Row::new(headers).style(Style::default().fg(self.header_fg).bold()))
            .render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_clamped_to_last_page() {
        assert_eq!(max_offset(10, 4), 6);
        assert_eq!(max_offset(3, 10), 0);
        assert_eq!(max_offset(5, 0), 4);
    }

    #[test]
    fn renders_header_and_first_rows() {
        let df = df!("variable" => &[1.5_f64, 2.0], "site" => &["a", "b"]).unwrap();
        let area = Rect::new(0, 0, 30, 6);
        let mut buf = Buffer::empty(area);
        DataTable::new(&df).render(area, &mut buf);

        let text: String = (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n");
        assert!(text.contains("variable"));
        assert!(text.contains("1.5"));
        assert!(text.contains("2 rows"));
    }
}
