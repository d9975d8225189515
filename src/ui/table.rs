// ============================================================================
// Tableaux : série brute et statistiques descriptives
// ============================================================================
// CONCEPTS RATATUI :
// 1. Table widget : lignes + largeurs de colonnes
// 2. Row / Cell : contenu et style de chaque case
// ============================================================================

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{
        block::{Position, Title},
        Block, Borders, Cell, Row, Table,
    },
    Frame,
};

use crate::models::{Column, ColumnStats, PriceSeries, SeriesStats};

/// Style des en-têtes de colonnes
fn header_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
}

/// Formate une statistique : NaN explicite, 6 décimales
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{value:.6}")
    }
}

/// Dessine la série brute, à partir de la ligne `offset`
///
/// Pas de tri ni de filtre : les lignes restent dans l'ordre des dates.
pub fn render_price_table(frame: &mut Frame, series: &PriceSeries, offset: usize, block: Block, area: Rect) {
    // Bordures (2) + en-tête (1)
    let visible = area.height.saturating_sub(3) as usize;
    let offset = offset.min(series.len().saturating_sub(1));

    let header = Row::new(
        std::iter::once("Date")
            .chain(Column::ALL.iter().map(|c| c.label()))
            .map(Cell::from),
    )
    .style(header_style());

    let rows: Vec<Row> = series
        .records()
        .iter()
        .skip(offset)
        .take(visible)
        .map(|r| {
            Row::new(vec![
                Cell::from(r.date.format("%Y-%m-%d").to_string()),
                Cell::from(format!("{:.2}", r.open)),
                Cell::from(format!("{:.2}", r.high)),
                Cell::from(format!("{:.2}", r.low)),
                Cell::from(format!("{:.2}", r.close)),
                Cell::from(format!("{:.2}", r.adj_close)),
                Cell::from(r.volume.to_string()),
            ])
        })
        .collect();

    let end = (offset + rows.len()).min(series.len());
    let block = block.title(
        Title::from(format!(" lignes {}-{} / {}  [PgUp/PgDn] ", offset + 1, end, series.len()))
            .position(Position::Bottom),
    );

    let widths = [
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Length(12),
        Constraint::Min(12),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

/// Dessine le résumé statistique : une ligne par mesure, une colonne par champ
pub fn render_stats_table(frame: &mut Frame, stats: &SeriesStats, block: Block, area: Rect) {
    let header = Row::new(
        std::iter::once("")
            .chain(stats.columns.iter().map(|(column, _)| column.label()))
            .map(Cell::from),
    )
    .style(header_style());

    let rows: Vec<Row> = ColumnStats::MEASURES
        .iter()
        .enumerate()
        .map(|(i, &measure)| {
            let cells = std::iter::once(
                Cell::from(measure).style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .chain(
                stats
                    .columns
                    .iter()
                    .map(|(_, s)| Cell::from(format_value(s.values()[i]))),
            );
            Row::new(cells.collect::<Vec<_>>())
        })
        .collect();

    let widths = std::iter::once(Constraint::Length(7))
        .chain(stats.columns.iter().map(|_| Constraint::Length(18)))
        .collect::<Vec<_>>();

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

/// Bloc standard d'une section (sous-titre en haut)
pub fn section_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Black))
        .title(format!(" {title} "))
        .title_style(Style::default().fg(Color::Black).add_modifier(Modifier::BOLD))
}
