use ratatui::{
    layout::{Constraint, Rect},
    text::{Line, Span},
    widgets::{Block, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use greenid_core::{ListTable, ListView, Tab};

use crate::app::{App, ListPage};
use crate::ui::styles;

/// Render a list page: a table of the fetched rows, or its loading/failure
/// state.
pub fn render_list_page(
    frame: &mut Frame,
    app: &App,
    view: ListView,
    tab: &Tab,
    block: Block,
    area: Rect,
) {
    match app.lists.get(&view) {
        Some(ListPage::Loaded(table)) => render_table(frame, app, table, tab, block, area),
        Some(ListPage::Failed(error)) => {
            let lines = vec![
                Line::from(Span::styled(format!(" {}", tab.title), styles::title_style())),
                Line::from(""),
                Line::from(Span::styled(format!(" Could not load: {}", error), styles::error_style())),
                Line::from(Span::styled(" Press r to retry", styles::muted_style())),
            ];
            frame.render_widget(Paragraph::new(lines).block(block), area);
        }
        Some(ListPage::Loading) | None => {
            let lines = vec![
                Line::from(Span::styled(format!(" {}", tab.title), styles::title_style())),
                Line::from(""),
                Line::from(Span::styled(" Loading...", styles::muted_style())),
            ];
            frame.render_widget(Paragraph::new(lines).block(block), area);
        }
    }
}

fn render_table(frame: &mut Frame, app: &App, table: &ListTable, tab: &Tab, block: Block, area: Rect) {
    let count = if table.is_truncated() {
        format!("{} of {}", table.len(), table.total)
    } else {
        table.len().to_string()
    };
    let block = block
        .title(format!(" {} ({}) - [r]eload ", tab.title, count))
        .title_style(styles::muted_style());

    if table.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(" No records", styles::muted_style())))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let header = Row::new(table.columns.iter().map(|column| Cell::from(*column)))
        .style(styles::table_header_style())
        .height(1);

    let rows: Vec<Row> = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, cells)| {
            Row::new(cells.iter().map(|cell| Cell::from(cell.as_str())))
                .style(styles::table_row_style(i))
        })
        .collect();

    let widths = column_widths(table);

    let widget = Table::new(rows, widths)
        .header(header)
        .block(block)
        .column_spacing(2)
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    state.select(Some(app.content_scroll.min(table.len() - 1)));
    frame.render_stateful_widget(widget, area, &mut state);
}

/// Widest cell per column (header included), capped so one long message
/// does not push every other column off screen.
fn column_widths(table: &ListTable) -> Vec<Constraint> {
    const MAX_COLUMN_WIDTH: usize = 40;

    table
        .columns
        .iter()
        .enumerate()
        .map(|(col, header)| {
            let widest = table
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.chars().count())
                .min(MAX_COLUMN_WIDTH);
            Constraint::Length(widest as u16)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use greenid_core::models::Role;

    use super::*;

    #[test]
    fn test_column_widths_fit_content_with_cap() {
        let roles: Vec<Role> = serde_json::from_value(serde_json::json!([
            {"id": 1, "name": "Administrator", "description": "x".repeat(80)},
            {"id": 2, "name": "Ops"}
        ]))
        .unwrap();
        let table = ListTable::from_rows(ListView::Roles, &roles, 2);
        let widths = column_widths(&table);
        assert_eq!(widths[0], Constraint::Length(13));
        assert_eq!(widths[1], Constraint::Length(40));
        assert_eq!(widths[2], Constraint::Length("Permissions".len() as u16));
    }
}
