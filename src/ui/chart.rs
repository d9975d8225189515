// ============================================================================
// Graphiques : clôture ajustée (ligne) et volume (barres)
// ============================================================================
// CONCEPTS RUST :
// 1. Iterator chaining : transformer (date, valeur) en points (x, y)
// 2. chunks() : regrouper des séances consécutives
//
// CONCEPTS RATATUI :
// 1. Chart widget : graphique ligne, axes X et Y
// 2. BarChart widget : une barre par colonne du terminal
// ============================================================================

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, BarChart, Block, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

/// Couleur de la courbe et des barres
const SERIES_COLOR: Color = Color::Rgb(31, 119, 180);

/// Format des dates sous les axes
const AXIS_DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// Graphique ligne
// ============================================================================

/// Dessine la clôture ajustée en fonction de la date
///
/// L'axe X compte les jours calendaires depuis la première séance : les
/// week-ends et jours fériés laissent un trou au lieu d'être comprimés.
pub fn render_line_chart(frame: &mut Frame, points: &[(NaiveDate, f64)], block: Block, area: Rect) {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => {
            frame.render_widget(block, area);
            return;
        }
    };

    let data: Vec<(f64, f64)> = points
        .iter()
        .map(|(date, value)| ((*date - first).num_days() as f64, *value))
        .collect();

    let (min_price, max_price) = data.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(min, max), &(_x, y)| (min.min(y), max.max(y)),
    );

    // Marge de 5% ; une série plate reçoit une marge fixe
    let margin = if max_price > min_price {
        (max_price - min_price) * 0.05
    } else {
        1.0
    };
    let y_min = min_price - margin;
    let y_max = max_price + margin;

    let span_days = (last - first).num_days().max(1) as f64;
    let middle = first + chrono::Duration::days((last - first).num_days() / 2);

    let datasets = vec![Dataset::default()
        .name("Adj Close")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(SERIES_COLOR))
        .data(&data)];

    let axis_style = Style::default().fg(Color::Black);

    let x_axis = Axis::default()
        .title("Date")
        .style(axis_style)
        .bounds([0.0, span_days])
        .labels(vec![
            Span::raw(first.format(AXIS_DATE_FORMAT).to_string()),
            Span::raw(middle.format(AXIS_DATE_FORMAT).to_string()),
            Span::raw(last.format(AXIS_DATE_FORMAT).to_string()),
        ]);

    let y_axis = Axis::default()
        .title("Adj Close")
        .style(axis_style)
        .bounds([y_min, y_max])
        .labels(vec![
            Span::raw(format!("{y_min:.2}")),
            Span::raw(format!("{:.2}", (y_min + y_max) / 2.0)),
            Span::raw(format!("{y_max:.2}")),
        ]);

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(x_axis)
        .y_axis(y_axis);

    frame.render_widget(chart, area);
}

// ============================================================================
// Graphique en barres
// ============================================================================

/// Regroupe les volumes pour qu'ils tiennent sur `columns` barres
///
/// Retourne les moyennes par groupe et le nombre de séances par groupe.
/// Tant que la série tient dans la largeur, chaque séance garde sa barre.
pub fn bucket_volumes(points: &[(NaiveDate, u64)], columns: usize) -> (Vec<u64>, usize) {
    let columns = columns.max(1);
    let per_bucket = points.len().div_ceil(columns).max(1);

    let buckets = points
        .chunks(per_bucket)
        .map(|chunk| {
            let total: u64 = chunk.iter().map(|(_, volume)| volume).sum();
            total / chunk.len() as u64
        })
        .collect();

    (buckets, per_bucket)
}

/// Dessine le volume échangé par séance
pub fn render_bar_chart(frame: &mut Frame, points: &[(NaiveDate, u64)], block: Block, area: Rect) {
    let (first, last) = match (points.first(), points.last()) {
        (Some(first), Some(last)) => (first.0, last.0),
        _ => {
            frame.render_widget(block, area);
            return;
        }
    };

    let (buckets, per_bucket) = bucket_volumes(points, block.inner(area).width as usize);
    let block = if per_bucket > 1 {
        block.title(format!("(moyenne par {per_bucket} séances) "))
    } else {
        block
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Barres
            Constraint::Length(1), // Dates
        ])
        .split(inner);

    // Barres sans étiquette : les dates sont sur la ligne du dessous
    let data: Vec<(&str, u64)> = buckets.iter().map(|volume| ("", *volume)).collect();
    let bar_width = (inner.width as usize / buckets.len().max(1)).clamp(1, 3) as u16;

    let chart = BarChart::default()
        .data(data.as_slice())
        .bar_width(bar_width)
        .bar_gap(0)
        .bar_style(Style::default().fg(SERIES_COLOR))
        .value_style(Style::default().fg(SERIES_COLOR).bg(SERIES_COLOR));

    frame.render_widget(chart, chunks[0]);
    frame.render_widget(Paragraph::new(date_axis(first, last, inner.width)), chunks[1]);
}

/// Ligne de dates : première séance à gauche, dernière à droite
fn date_axis(first: NaiveDate, last: NaiveDate, width: u16) -> Line<'static> {
    let left = first.format(AXIS_DATE_FORMAT).to_string();
    let right = last.format(AXIS_DATE_FORMAT).to_string();
    let gap = (width as usize).saturating_sub(left.len() + right.len());

    Line::from(vec![
        Span::styled(left, Style::default().fg(Color::Black)),
        Span::raw(" ".repeat(gap)),
        Span::styled(right, Style::default().fg(Color::Black)),
    ])
}
