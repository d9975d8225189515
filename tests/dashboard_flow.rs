// ============================================================================
// Tests d'intégration : formulaire → cache → présentateur → rendu
// ============================================================================
// Un faux fournisseur compte les appels et sert des fixtures :
// - "TEST" : trois séances (clôtures 100, 105, 98)
// - "YEAR" : 250 séances quotidiennes à partir du 15/06/2023
// - "FAIL" : erreur HTTP 500
// - tout autre symbole : aucune donnée
// ============================================================================

use std::cell::{Cell, RefCell};

use chrono::{Days, NaiveDate};
use ratatui::{backend::TestBackend, Terminal};

use marketdash::api::{FetchOutcome, MarketDataProvider, ProviderError};
use marketdash::app::App;
use marketdash::cache::SeriesCache;
use marketdash::config::DashboardConfig;
use marketdash::models::{Column, PriceRecord, PriceSeries, Query, DATE_RANGE_ERROR};
use marketdash::presenter::{present, Notice, Section, ViewState, NO_DATA_TO_DISPLAY};
use marketdash::ui::render;

fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 14).unwrap()
}

#[derive(Default)]
struct FixtureProvider {
    calls: Cell<usize>,
    queries: RefCell<Vec<Query>>,
}

impl MarketDataProvider for FixtureProvider {
    fn fetch(&self, query: &Query) -> Result<FetchOutcome, ProviderError> {
        self.calls.set(self.calls.get() + 1);
        self.queries.borrow_mut().push(query.clone());

        match query.symbol.as_str() {
            "TEST" => Ok(FetchOutcome::from(PriceSeries::from_records(
                "TEST",
                vec![
                    PriceRecord::new(d(2), 99.0, 101.0, 97.0, 100.0, 100.0, 1_000),
                    PriceRecord::new(d(3), 100.0, 106.0, 99.0, 105.0, 105.0, 2_000),
                    PriceRecord::new(d(4), 105.0, 105.0, 96.0, 98.0, 98.0, 3_000),
                ],
            ))),
            "YEAR" => {
                let start = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
                let records = (0..250u64)
                    .map(|i| {
                        let close = 100.0 + (i % 30) as f64;
                        PriceRecord::new(start + Days::new(i), close - 1.0, close + 2.0, close - 3.0, close, close, 1_000 + i)
                    })
                    .collect();
                Ok(FetchOutcome::from(PriceSeries::from_records("YEAR", records)))
            }
            "FAIL" => Err(ProviderError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR)),
            _ => Ok(FetchOutcome::Empty),
        }
    }
}

fn app_for(symbol: &str) -> App {
    let config = DashboardConfig {
        default_symbol: symbol.to_string(),
        ..DashboardConfig::default()
    };
    App::new(config, today())
}

/// Un tour de la boucle principale, sans terminal
fn refresh(app: &mut App, cache: &mut SeriesCache<FixtureProvider>) {
    if let Some(input) = app.pending_input() {
        match present(&input, cache) {
            Ok(view) => app.show_view(view),
            Err(e) => app.show_failure(input.query, e.to_string()),
        }
    }
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
fn test_defaults_cover_the_last_year() {
    let app = App::new(DashboardConfig::default(), today());
    let query = app.form.collect().query;
    assert_eq!(query.symbol, "INFY.NS");
    assert_eq!(query.end, today());
    assert_eq!(query.start, NaiveDate::from_ymd_opt(2023, 6, 15).unwrap());
}

#[test]
fn test_fixture_series_renders_five_sections() {
    let mut app = app_for("TEST");
    let mut cache = SeriesCache::new(FixtureProvider::default());
    refresh(&mut app, &mut cache);

    let view = app.view.as_ref().unwrap();
    assert_eq!(view.state, ViewState::Populated);
    assert!(view.notices.is_empty());
    assert_eq!(view.sections.len(), 5);

    assert!(matches!(view.sections[0], Section::Table(_)));
    match &view.sections[1] {
        Section::Statistics(stats) => {
            let close = stats.column(Column::Close).unwrap();
            assert_eq!(close.count, 3);
            assert_eq!(close.min, 98.0);
            assert_eq!(close.max, 105.0);
        }
        other => panic!("section inattendue : {other:?}"),
    }
    match &view.sections[2] {
        Section::LineChart(points) => {
            assert_eq!(points, &vec![(d(2), 100.0), (d(3), 105.0), (d(4), 98.0)]);
        }
        other => panic!("section inattendue : {other:?}"),
    }
    assert!(matches!(view.sections[3], Section::BarChart(_)));
    assert!(matches!(view.sections[4], Section::Candlestick(_)));

    let text = screen(&app);
    assert!(text.contains("Historical Prices for TEST"));
    assert!(!text.contains(NO_DATA_TO_DISPLAY));
    // Le tableau affiche les séances telles quelles, sans indicateur ajouté
    assert!(!text.contains('▲') && !text.contains('▼'));
}

#[test]
fn test_unknown_symbol_shows_both_messages_and_no_section() {
    let mut app = app_for("NOPE");
    let mut cache = SeriesCache::new(FixtureProvider::default());
    refresh(&mut app, &mut cache);

    let view = app.view.as_ref().unwrap();
    assert!(view.sections.is_empty());
    assert_eq!(
        view.notices,
        vec![
            Notice::warning("No data found for symbol: NOPE"),
            Notice::error(NO_DATA_TO_DISPLAY),
        ]
    );

    let text = screen(&app);
    assert!(text.contains("No data found for symbol: NOPE"));
    assert!(text.contains(NO_DATA_TO_DISPLAY));
    assert!(!text.contains("Data Statistics"));
}

#[test]
fn test_identical_triplet_hits_the_cache() {
    let mut app = app_for("TEST");
    let mut cache = SeriesCache::new(FixtureProvider::default());
    refresh(&mut app, &mut cache);
    assert_eq!(cache.provider().calls.get(), 1);

    // Même triplet : pas de nouveau cycle
    refresh(&mut app, &mut cache);
    assert_eq!(cache.provider().calls.get(), 1);

    // Aller-retour sur la date de fin : le retour est servi par le cache
    app.form.focus_next();
    app.form.focus_next();
    app.form.shift_days(-1);
    refresh(&mut app, &mut cache);
    assert_eq!(cache.provider().calls.get(), 2);

    app.form.shift_days(1);
    refresh(&mut app, &mut cache);
    assert_eq!(cache.provider().calls.get(), 2);
    assert!(app.view.as_ref().unwrap().from_cache);

    // Rejouer explicitement le même triplet reste un hit
    app.request_rerun();
    refresh(&mut app, &mut cache);
    assert_eq!(cache.provider().calls.get(), 2);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_symbol_case_shares_the_cache_entry() {
    let mut cache = SeriesCache::new(FixtureProvider::default());
    let lower = Query::new("test", d(1), d(5));
    let upper = Query::new("TEST", d(1), d(5));

    cache.get_or_fetch(&lower).unwrap();
    cache.get_or_fetch(&upper).unwrap();
    assert_eq!(cache.provider().calls.get(), 1);
}

#[test]
fn test_inverted_range_warns_but_still_fetches() {
    let mut app = app_for("TEST");
    let mut cache = SeriesCache::new(FixtureProvider::default());

    // Début après la fin : début = aujourd'hui + 1 mois
    app.form.focus_next();
    app.form.shift_months(13);
    let input = app.form.collect();
    assert_eq!(input.warning, Some(DATE_RANGE_ERROR));

    refresh(&mut app, &mut cache);
    assert_eq!(cache.provider().calls.get(), 1);

    let sent = cache.provider().queries.borrow()[0].clone();
    assert!(sent.start > sent.end);

    let view = app.view.as_ref().unwrap();
    assert_eq!(view.sidebar_notice, Some(Notice::error(DATE_RANGE_ERROR)));
    assert_eq!(view.sections.len(), 5);

    let text = screen(&app);
    assert!(text.contains("Error: End date must"));
}

#[test]
fn test_provider_errors_surface_and_are_not_cached() {
    let mut app = app_for("FAIL");
    let mut cache = SeriesCache::new(FixtureProvider::default());
    refresh(&mut app, &mut cache);

    assert!(app.view.is_none());
    let failure = app.failure.clone().unwrap();
    assert!(failure.contains("500"));
    assert!(cache.is_empty());

    app.request_rerun();
    refresh(&mut app, &mut cache);
    assert_eq!(cache.provider().calls.get(), 2);

    let text = screen(&app);
    assert!(text.contains("500"));
}

#[test]
fn test_candlestick_covers_the_whole_range() {
    let mut app = app_for("YEAR");
    let mut cache = SeriesCache::new(FixtureProvider::default());
    refresh(&mut app, &mut cache);

    // Défile jusqu'à la section des chandeliers
    for _ in 0..4 {
        app.scroll_down();
    }
    assert_eq!(app.scroll, 4);

    let text = screen(&app);
    assert!(text.contains("séances par chandelier"));
    // Première séance de la série sur l'axe X
    assert!(text.contains("15/06"));
}
