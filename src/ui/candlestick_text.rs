// ============================================================================
// Candlestick Chart - Rendu texte ligne par ligne
// ============================================================================
// Utilise des caractères Unicode pour dessiner les chandeliers japonais,
// une colonne par chandelier.
//
// Quand la série compte plus de séances que de colonnes, les séances
// consécutives sont regroupées : ouverture de la première, plus haut et
// plus bas du groupe, clôture de la dernière. Toute la plage reste visible.
//
// ALGORITHME :
// - Rendu vertical : ligne par ligne de haut en bas
// - Pour chaque ligne, on détermine quel caractère Unicode afficher
// - Logique des 3 zones : mèche supérieure, corps, mèche inférieure
// - Seuils fractionnaires (0.25, 0.75) pour précision sub-caractère
//
// CARACTÈRES UNICODE :
// ┃ Corps plein          │ Mèche pleine
// ╻ Demi-corps (bas)     ╹ Demi-corps (haut)
// ╽ Transition top       ╿ Transition bottom
// ╷ Demi-mèche sup       ╵ Demi-mèche inf
// ============================================================================

use chrono::Datelike;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use crate::models::PriceRecord;

// ============================================================================
// Constantes
// ============================================================================

const UNICODE_VOID: char = ' ';
const UNICODE_BODY: char = '┃';
const UNICODE_HALF_BODY_BOTTOM: char = '╻';
const UNICODE_HALF_BODY_TOP: char = '╹';
const UNICODE_WICK: char = '│';
const UNICODE_TOP: char = '╽';
const UNICODE_BOTTOM: char = '╿';
const UNICODE_UPPER_WICK: char = '╷';
const UNICODE_LOWER_WICK: char = '╵';

/// Couleurs des séances en hausse et en baisse
pub const INCREASING_COLOR: Color = Color::Rgb(0, 160, 0);
pub const DECREASING_COLOR: Color = Color::Rgb(200, 0, 0);

/// Couleur des axes (lisible sur le fond bleu ciel)
const AXIS_COLOR: Color = Color::Black;

/// Largeur de l'axe Y (pour les prix)
const Y_AXIS_WIDTH: u16 = 12;

/// Design réactif
/// - MIN_CHART_WIDTH : largeur minimale absolue pour afficher le graphique
/// - ADAPTIVE_Y_AXIS_THRESHOLD : en dessous, on réduit la largeur de l'axe Y
const MIN_CHART_WIDTH: u16 = 40;
const ADAPTIVE_Y_AXIS_THRESHOLD: u16 = 80;
const NARROW_Y_AXIS_WIDTH: u16 = 9;

/// Lignes réservées à l'axe X : ticks, dates, années
const X_AXIS_LINES: u16 = 3;

/// Format des étiquettes de l'axe X
const X_LABEL_FORMAT: &str = "%d/%m";
const X_LABEL_WIDTH: usize = 5;

// ============================================================================
// Structure principale
// ============================================================================

/// Renderer de chandeliers japonais en mode texte
pub struct CandlestickRenderer {
    candles: Vec<PriceRecord>,
    sessions_per_candle: usize,
    min_price: f64,
    max_price: f64,
    height: u16,
    width: u16,
    y_axis_width: u16,
}

/// Position d'un chandelier dans le graphique
///
/// Chandeliers, ticks et dates utilisent les mêmes positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CandlePosition {
    /// Colonne (0-based depuis le début de la zone graphique)
    column: usize,
}

impl CandlestickRenderer {
    /// Crée un renderer pour la zone intérieure `area`
    ///
    /// CONCEPT : Responsive design
    /// - Largeur < 80 cols : axe Y réduit
    /// - Largeur >= 80 cols : axe Y normal
    /// - Plus de séances que de colonnes : regroupement des séances
    pub fn new(records: &[PriceRecord], area: Rect) -> Self {
        let y_axis_width = if area.width < ADAPTIVE_Y_AXIS_THRESHOLD {
            NARROW_Y_AXIS_WIDTH
        } else {
            Y_AXIS_WIDTH
        };
        let width = area.width.saturating_sub(y_axis_width);

        let (candles, sessions_per_candle) = group_sessions(records, width as usize);
        let (min_price, max_price) = Self::compute_price_bounds(&candles);

        Self {
            candles,
            sessions_per_candle,
            min_price,
            max_price,
            height: area.height.saturating_sub(X_AXIS_LINES),
            width,
            y_axis_width,
        }
    }

    /// Nombre de séances représentées par chaque chandelier (1 sans regroupement)
    pub fn sessions_per_candle(&self) -> usize {
        self.sessions_per_candle
    }

    /// Calcule les prix min et max sur toutes les séances, marge de 2%
    fn compute_price_bounds(records: &[PriceRecord]) -> (f64, f64) {
        let max_price = records
            .iter()
            .fold(f64::NEG_INFINITY, |max, r| max.max(r.high));

        let min_price = records
            .iter()
            .fold(f64::INFINITY, |min, r| min.min(r.low));

        let margin = (max_price - min_price) * 0.02;
        ((min_price - margin).max(0.0), max_price + margin)
    }

    /// Convertit un prix en coordonnée de hauteur
    fn price_to_height(&self, price: f64) -> f64 {
        if self.max_price == self.min_price {
            return self.height as f64 / 2.0;
        }

        (price - self.min_price) / (self.max_price - self.min_price) * self.height as f64
    }

    /// Vert si la séance clôture au-dessus (ou au niveau) de l'ouverture, rouge sinon
    pub fn candle_color(record: &PriceRecord) -> Color {
        if record.is_increasing() {
            INCREASING_COLOR
        } else {
            DECREASING_COLOR
        }
    }

    /// Caractère d'un chandelier à une hauteur donnée
    fn render_candle(&self, record: &PriceRecord, y: u16) -> char {
        let height_unit = y as f64;

        let high_y = self.price_to_height(record.high);
        let low_y = self.price_to_height(record.low);
        let max_y = self.price_to_height(record.open.max(record.close));
        let min_y = self.price_to_height(record.close.min(record.open));

        let mut output = UNICODE_VOID;

        // ZONE 1 : Mèche supérieure (high → max)
        if high_y.ceil() >= height_unit && height_unit >= max_y.floor() {
            if max_y - height_unit > 0.75 {
                output = UNICODE_BODY;
            } else if (max_y - height_unit) > 0.25 {
                if (high_y - height_unit) > 0.75 {
                    output = UNICODE_TOP;
                } else {
                    output = UNICODE_HALF_BODY_BOTTOM;
                }
            } else if (high_y - height_unit) > 0.75 {
                output = UNICODE_WICK;
            } else if (high_y - height_unit) > 0.25 {
                output = UNICODE_UPPER_WICK;
            }
        }
        // ZONE 2 : Corps (min → max)
        else if max_y.floor() >= height_unit && height_unit >= min_y.ceil() {
            output = UNICODE_BODY;
        }
        // ZONE 3 : Mèche inférieure (min → low)
        else if min_y.ceil() >= height_unit && height_unit >= low_y.floor() {
            if (min_y - height_unit) < 0.25 {
                output = UNICODE_BODY;
            } else if (min_y - height_unit) < 0.75 {
                if (low_y - height_unit) < 0.25 {
                    output = UNICODE_BOTTOM;
                } else {
                    output = UNICODE_HALF_BODY_TOP;
                }
            } else if low_y - height_unit < 0.25 {
                output = UNICODE_WICK;
            } else if low_y - height_unit < 0.75 {
                output = UNICODE_LOWER_WICK;
            }
        }

        output
    }

    /// Graduation de l'axe Y, un prix toutes les 4 lignes
    fn render_y_axis(&self, y: u16) -> String {
        let label_width = (self.y_axis_width as usize).saturating_sub(3);
        if y % 4 == 0 {
            let price = self.min_price
                + (y as f64 * (self.max_price - self.min_price) / self.height as f64);
            format!("{:>label_width$.2} │ ", price)
        } else {
            format!("{:>label_width$} │ ", "")
        }
    }

    /// Pré-calcule la colonne de chaque chandelier
    ///
    /// CONCEPT : Accumulator pattern pour éviter le drift
    /// - Chaque position = index × spacing (pas position_précédente + spacing)
    /// - Chandelier unique : centré dans la largeur disponible
    fn compute_candle_positions(chart_width: usize, count: usize) -> Vec<CandlePosition> {
        if count == 0 {
            return Vec::new();
        }

        if count == 1 {
            return vec![CandlePosition {
                column: chart_width / 2,
            }];
        }

        let spacing = chart_width as f64 / count as f64;
        (0..count)
            .map(|i| {
                let column = (i as f64 * spacing).round() as usize;
                CandlePosition {
                    column: column.min(chart_width.saturating_sub(1)),
                }
            })
            .collect()
    }

    /// Génère toutes les lignes du graphique (chandeliers + axe X)
    pub fn render_lines(&self) -> Vec<Line<'static>> {
        let visible = self.candles.as_slice();
        if visible.is_empty() || self.height == 0 {
            return Vec::new();
        }

        let positions = Self::compute_candle_positions(self.width as usize, visible.len());
        let mut lines = Vec::with_capacity(self.height as usize + X_AXIS_LINES as usize);

        // De haut en bas
        for y in (1..=self.height).rev() {
            let mut spans = vec![Span::styled(
                self.render_y_axis(y),
                Style::default().fg(AXIS_COLOR),
            )];

            let mut cursor = 0;
            for (position, record) in positions.iter().zip(visible) {
                if position.column < cursor {
                    continue;
                }
                if position.column > cursor {
                    spans.push(Span::raw(" ".repeat(position.column - cursor)));
                }
                spans.push(Span::styled(
                    self.render_candle(record, y).to_string(),
                    Style::default().fg(Self::candle_color(record)),
                ));
                cursor = position.column + 1;
            }

            lines.push(Line::from(spans));
        }

        lines.extend(self.render_x_axis(visible, &positions));
        lines
    }

    /// Lignes de l'axe X
    ///
    /// - Ligne 1 : Tick marks (│)
    /// - Ligne 2 : Dates JJ/MM
    /// - Ligne 3 : Année, au premier label et à chaque changement d'année
    fn render_x_axis(&self, visible: &[PriceRecord], positions: &[CandlePosition]) -> Vec<Line<'static>> {
        let axis_style = Style::default().fg(AXIS_COLOR);
        let padding = " ".repeat(self.y_axis_width as usize);

        // +2 pour garder au moins 2 caractères entre deux labels
        let max_labels = (self.width as usize / (X_LABEL_WIDTH + 2)).clamp(2, 10);
        let label_interval = visible.len().div_ceil(max_labels).max(1);

        let mut ticks = vec![Span::raw(padding.clone())];
        let mut labels = vec![Span::raw(padding.clone())];
        let mut years = vec![Span::raw(padding)];

        let (mut tick_cursor, mut label_cursor, mut year_cursor) = (0, 0, 0);
        let mut last_year = None;

        for (i, (position, record)) in positions.iter().zip(visible).enumerate() {
            if i % label_interval != 0 {
                continue;
            }
            let column = position.column;

            if column >= tick_cursor {
                ticks.push(Span::raw(" ".repeat(column - tick_cursor)));
                ticks.push(Span::styled("│", axis_style));
                tick_cursor = column + 1;
            }

            if column >= label_cursor {
                let label = record.date.format(X_LABEL_FORMAT).to_string();
                labels.push(Span::raw(" ".repeat(column - label_cursor)));
                label_cursor = column + label.len();
                labels.push(Span::styled(label, axis_style));

                let year = record.date.year();
                if last_year != Some(year) && column >= year_cursor {
                    let text = year.to_string();
                    years.push(Span::raw(" ".repeat(column - year_cursor)));
                    year_cursor = column + text.len();
                    years.push(Span::styled(text, Style::default().fg(Color::DarkGray)));
                    last_year = Some(year);
                }
            }
        }

        vec![Line::from(ticks), Line::from(labels), Line::from(years)]
    }
}

// ============================================================================
// Regroupement des séances
// ============================================================================

/// Regroupe les séances consécutives pour tenir dans `columns` colonnes
///
/// Chaque groupe devient un chandelier : date et ouverture de la première
/// séance, plus haut et plus bas du groupe, clôtures de la dernière, volume
/// cumulé. Retourne aussi le nombre de séances par groupe.
///
/// CONCEPT RUST : chunks()
/// - Découpe la slice en sous-slices consécutives sans copie
/// - Le dernier chunk peut être plus court
pub fn group_sessions(records: &[PriceRecord], columns: usize) -> (Vec<PriceRecord>, usize) {
    if records.len() <= columns || columns == 0 {
        return (records.to_vec(), 1);
    }

    let per_candle = records.len().div_ceil(columns);
    let candles = records
        .chunks(per_candle)
        .filter_map(|chunk| {
            let (first, last) = (chunk.first()?, chunk.last()?);
            Some(PriceRecord::new(
                first.date,
                first.open,
                chunk.iter().fold(f64::NEG_INFINITY, |max, r| max.max(r.high)),
                chunk.iter().fold(f64::INFINITY, |min, r| min.min(r.low)),
                last.close,
                last.adj_close,
                chunk.iter().map(|r| r.volume).sum(),
            ))
        })
        .collect();

    (candles, per_candle)
}

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine les chandeliers des séances dans `area`
pub fn render_candlestick_chart(frame: &mut Frame, records: &[PriceRecord], block: Block, area: Rect) {
    let inner = block.inner(area);

    // CONCEPT : Graceful degradation pour terminaux étroits
    if inner.width < MIN_CHART_WIDTH {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Zone trop étroite : {MIN_CHART_WIDTH} colonnes minimum"),
                Style::default().fg(Color::Black),
            )),
        ];
        let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let renderer = CandlestickRenderer::new(records, inner);

    // Même convention que le graphique des volumes
    let per_candle = renderer.sessions_per_candle();
    let block = if per_candle > 1 {
        block.title(format!("({per_candle} séances par chandelier) "))
    } else {
        block
    };

    let paragraph = Paragraph::new(renderer.render_lines()).block(block);
    frame.render_widget(paragraph, area);
}
