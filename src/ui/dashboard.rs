// ============================================================================
// Dashboard - Rendu de l'interface principale
// ============================================================================
// Dessine la page complète :
// - header : icône + titre de la page
// - sidebar : formulaire "User Input"
// - zone principale : messages puis sections de la vue
// - footer : raccourcis, chargement, confirmation de sortie
//
// CONCEPTS RATATUI :
// 1. Frame : surface de dessin
// 2. Layout : découpage de l'espace en zones
// 3. Style : couleurs et attributs de texte
// ============================================================================

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::App;
use crate::input::Field;
use crate::presenter::{DashboardView, Notice, NoticeLevel, Section};
use crate::ui::{candlestick_text, chart, table};

/// Largeur de la sidebar
pub const SIDEBAR_WIDTH: u16 = 30;

/// Texte principal sur fond bleu ciel
const TEXT_COLOR: Color = Color::Black;

// ============================================================================
// Fonction principale de rendu
// ============================================================================

/// Dessine l'interface complète
///
/// CONCEPT RUST : &App
/// - Le rendu lit l'état sans le modifier
pub fn render(frame: &mut Frame, app: &App) {
    let size = frame.size();

    // Fond de page
    let page = Block::default().style(Style::default().bg(app.config.background).fg(TEXT_COLOR));
    frame.render_widget(page, size);

    let chunks = create_layout(size);
    render_header(frame, app, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(chunks[1]);

    render_sidebar(frame, app, body[0]);
    render_main_content(frame, app, body[1]);
    render_footer(frame, app, chunks[2]);
}

/// Crée le layout principal (header, content, footer)
fn create_layout(area: Rect) -> Vec<Rect> {
    Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Contenu
            Constraint::Length(3), // Footer
        ])
        .split(area)
        .to_vec()
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(TEXT_COLOR))
        .title(title)
        .title_style(Style::default().fg(TEXT_COLOR).add_modifier(Modifier::BOLD))
}

// ============================================================================
// Header
// ============================================================================

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let text = Line::from(Span::styled(
        app.config.window_title(),
        Style::default().fg(TEXT_COLOR).add_modifier(Modifier::BOLD),
    ));

    let paragraph = Paragraph::new(text)
        .block(bordered(""))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Sidebar : formulaire
// ============================================================================

fn render_sidebar(frame: &mut Frame, app: &App, area: Rect) {
    let form = &app.form;
    let mut lines = Vec::new();

    for (field, label) in [
        (Field::Symbol, "Stock Symbol"),
        (Field::Start, "Start Date"),
        (Field::End, "End Date"),
    ] {
        let focused = form.focus == field;
        let label_style = if focused {
            Style::default().fg(TEXT_COLOR).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(TEXT_COLOR)
        };

        lines.push(Line::from(Span::styled(label, label_style)));

        let mut value = vec![Span::styled(
            format!(" {} ", form.display(field)),
            if focused {
                Style::default().fg(Color::White).bg(Color::Black)
            } else {
                Style::default().fg(TEXT_COLOR).bg(Color::White)
            },
        )];
        if focused {
            value.push(Span::styled(
                "█",
                Style::default().fg(Color::Black).add_modifier(Modifier::SLOW_BLINK),
            ));
        }
        lines.push(Line::from(value));
        lines.push(Line::from(""));
    }

    if let Some(error) = &form.field_error {
        lines.push(notice_line(&Notice::error(error.clone())));
        lines.push(Line::from(""));
    }

    // Plage inversée : recalculée à chaque dessin, avant même le fetch
    if let Some(warning) = form.collect().warning {
        lines.push(notice_line(&Notice::error(warning)));
        lines.push(Line::from(""));
    }

    let hint = Style::default().fg(Color::DarkGray);
    let hints = match form.focus {
        Field::Symbol => vec!["Please use .NS extension", "for Indian stocks", "[Enter] valider"],
        Field::Start | Field::End => vec!["[←/→] ±1 jour", "[Shift+←/→] ±1 mois", "AAAA/MM/JJ + [Enter]"],
    };
    lines.extend(hints.into_iter().map(|h| Line::from(Span::styled(h, hint))));
    lines.push(Line::from(Span::styled("[Tab] champ suivant", hint)));

    let paragraph = Paragraph::new(lines)
        .block(bordered(" User Input "))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Ligne colorée selon le niveau du message
fn notice_line(notice: &Notice) -> Line<'static> {
    let (icon, color) = match notice.level {
        NoticeLevel::Warning => ("⚠ ", Color::Rgb(153, 102, 0)),
        NoticeLevel::Error => ("✖ ", Color::Rgb(180, 0, 0)),
    };
    Line::from(vec![
        Span::styled(icon, Style::default().fg(color)),
        Span::styled(
            notice.text.clone(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
    ])
}

// ============================================================================
// Zone principale
// ============================================================================

/// Hauteur de chaque section dans la zone principale
fn section_height(section: &Section) -> u16 {
    match section {
        Section::Table(_) => 14,
        Section::Statistics(_) => 12,
        Section::LineChart(_) => 16,
        Section::BarChart(_) => 14,
        Section::Candlestick(_) => 22,
    }
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(message) = &app.failure {
        render_failure(frame, message, area);
        return;
    }

    match &app.view {
        Some(view) => render_view(frame, app, view, area),
        None => {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                "Chargement...",
                Style::default().fg(TEXT_COLOR),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(paragraph, area);
        }
    }
}

fn render_view(frame: &mut Frame, app: &App, view: &DashboardView, area: Rect) {
    let mut area = area;

    // Messages de la zone principale, dans l'ordre d'émission
    if !view.notices.is_empty() {
        let height = (view.notices.len() as u16 + 2).min(area.height);
        let lines: Vec<Line> = view.notices.iter().map(notice_line).collect();
        let paragraph = Paragraph::new(lines).block(bordered(""));
        frame.render_widget(paragraph, Rect { height, ..area });
        area.y += height;
        area.height -= height;
    }

    // Sections empilées à partir de la section défilée
    for section in view.sections.iter().skip(app.scroll) {
        if area.height == 0 {
            break;
        }
        let height = section_height(section).min(area.height);
        let slot = Rect { height, ..area };
        render_section(frame, app, view, section, slot);
        area.y += height;
        area.height -= height;
    }
}

fn render_section(frame: &mut Frame, app: &App, view: &DashboardView, section: &Section, area: Rect) {
    let block = table::section_block(section.title(&view.query.symbol));

    match section {
        Section::Table(series) => table::render_price_table(frame, series, app.table_offset, block, area),
        Section::Statistics(stats) => table::render_stats_table(frame, stats, block, area),
        Section::LineChart(points) => chart::render_line_chart(frame, points, block, area),
        Section::BarChart(points) => chart::render_bar_chart(frame, points, block, area),
        Section::Candlestick(records) => {
            candlestick_text::render_candlestick_chart(frame, records, block, area)
        }
    }
}

/// Erreur du fournisseur : remplace toute la zone principale
fn render_failure(frame: &mut Frame, message: &str, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" ⚠ Erreur ");

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Rgb(180, 0, 0)).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "[F5] Réessayer",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

// ============================================================================
// Footer : Instructions
// ============================================================================

/// Dessine le footer avec les raccourcis clavier
fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let key_style = Style::default().fg(Color::Rgb(0, 0, 139)).add_modifier(Modifier::BOLD);
    let alert = Style::default().fg(Color::Rgb(153, 102, 0)).add_modifier(Modifier::BOLD);

    let shortcuts = if app.is_awaiting_quit_confirmation() {
        Line::from(vec![
            Span::styled("⚠  Appuyez sur ", alert),
            Span::styled(
                "[q]",
                Style::default()
                    .fg(Color::Red)
                    .add_modifier(Modifier::BOLD)
                    .add_modifier(Modifier::SLOW_BLINK),
            ),
            Span::styled(
                " à nouveau pour quitter, ou n'importe quelle autre touche pour annuler ⚠",
                alert,
            ),
        ])
    } else if app.is_loading {
        let message = app
            .loading_message
            .clone()
            .unwrap_or_else(|| "Chargement en cours...".to_string());
        Line::from(vec![
            Span::styled("⏳ ", alert),
            Span::styled(message, alert),
        ])
    } else {
        let mut spans = vec![
            Span::styled("[q]", key_style),
            Span::raw(" Quit  "),
            Span::styled("[Tab]", key_style),
            Span::raw(" Champ  "),
            Span::styled("[↑↓ / j k]", key_style),
            Span::raw(" Sections  "),
            Span::styled("[PgUp/PgDn]", key_style),
            Span::raw(" Tableau  "),
            Span::styled("[F5]", key_style),
            Span::raw(" Recharger"),
        ];
        if app.view.as_ref().is_some_and(|v| v.from_cache) {
            spans.push(Span::styled("  (cache)", Style::default().fg(Color::DarkGray)));
        }
        Line::from(spans)
    };

    let paragraph = Paragraph::new(vec![shortcuts])
        .block(bordered(""))
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ratatui::{backend::TestBackend, Terminal};

    use crate::api::FetchOutcome;
    use crate::cache::CacheLookup;
    use crate::config::DashboardConfig;
    use crate::models::{PriceRecord, PriceSeries};
    use crate::presenter::NO_DATA_TO_DISPLAY;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
    }

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(140, 60)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_empty_view_shows_both_messages() {
        let mut app = App::new(DashboardConfig::default(), today());
        let input = app.form.collect();
        app.show_view(DashboardView::build(&input, FetchOutcome::Empty, CacheLookup::Miss));

        let text = screen(&app);
        assert!(text.contains("Market Dashboard Application"));
        assert!(text.contains("User Input"));
        assert!(text.contains("No data found for symbol: INFY.NS"));
        assert!(text.contains(NO_DATA_TO_DISPLAY));
        assert!(!text.contains("Data Statistics"));
    }

    #[test]
    fn test_populated_view_shows_section_titles() {
        let mut app = App::new(DashboardConfig::default(), today());
        let input = app.form.collect();
        let records = (0..5)
            .map(|i| {
                let date = input.query.start + chrono::Days::new(i);
                PriceRecord::new(date, 10.0, 12.0, 9.0, 11.0, 11.0, 1_000)
            })
            .collect();
        let series = PriceSeries::from_records("INFY.NS", records);
        app.show_view(DashboardView::build(&input, FetchOutcome::from(series), CacheLookup::Miss));

        let text = screen(&app);
        assert!(text.contains("Historical Prices for INFY.NS"));
        assert!(text.contains("Data Statistics"));
        assert!(text.contains("Adjusted Close Price"));
        assert!(!text.contains(NO_DATA_TO_DISPLAY));
    }

    #[test]
    fn test_failure_panel() {
        let mut app = App::new(DashboardConfig::default(), today());
        let query = app.form.collect().query;
        app.show_failure(query, "HTTP status 500".to_string());

        let text = screen(&app);
        assert!(text.contains("HTTP status 500"));
    }
}
