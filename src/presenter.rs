// ============================================================================
// Présentateur
// ============================================================================
// Transforme un triplet collecté en vue immuable (DashboardView) :
// - récupère la série via le cache
// - série vide  → deux messages ("no data" au fetch, "no data to display"
//   au rendu), aucune section
// - série non vide → cinq sections dans un ordre fixe
//
// La vue est reconstruite à chaque interaction puis passée telle quelle à
// la couche de rendu.
// ============================================================================

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::api::{FetchOutcome, MarketDataProvider, ProviderError};
use crate::cache::{CacheLookup, SeriesCache};
use crate::input::CollectedInput;
use crate::models::{PriceRecord, PriceSeries, Query, SeriesStats};

/// Message d'erreur affiché au rendu quand la série est vide
pub const NO_DATA_TO_DISPLAY: &str = "No data to display for the selected date range and symbol.";

/// Niveau d'un message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// Message affiché à l'utilisateur
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

/// Message d'avertissement émis au fetch quand la série est vide
pub fn no_data_found(symbol: &str) -> String {
    format!("No data found for symbol: {symbol}")
}

/// Les deux états possibles de la zone principale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    /// Pas de série exploitable
    Empty,
    /// Série non vide, sections affichées
    Populated,
}

/// Une section de la zone principale
#[derive(Debug, Clone, PartialEq)]
pub enum Section {
    /// Série brute sous forme de tableau
    Table(PriceSeries),
    /// Statistiques descriptives par colonne
    Statistics(SeriesStats),
    /// Clôture ajustée par date (graphique ligne)
    LineChart(Vec<(NaiveDate, f64)>),
    /// Volume par date (graphique en barres)
    BarChart(Vec<(NaiveDate, u64)>),
    /// Open/High/Low/Close par date (chandeliers)
    Candlestick(Vec<PriceRecord>),
}

impl Section {
    /// Sous-titre de la section
    pub fn title(&self, symbol: &str) -> String {
        match self {
            Section::Table(_) => format!("Historical Prices for {symbol}"),
            Section::Statistics(_) => "Data Statistics".to_string(),
            Section::LineChart(_) => "Historical Price Chart - Adjusted Close Price".to_string(),
            Section::BarChart(_) => "Trading Volume Over Time".to_string(),
            Section::Candlestick(_) => "Candlestick Chart".to_string(),
        }
    }
}

/// Vue complète pour un cycle de rendu
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Triplet demandé (dates éventuellement inversées)
    pub query: Query,

    /// Message de la sidebar (plage de dates inversée)
    pub sidebar_notice: Option<Notice>,

    /// Messages de la zone principale, dans l'ordre d'émission
    pub notices: Vec<Notice>,

    pub state: ViewState,

    /// Sections dans l'ordre d'affichage
    pub sections: Vec<Section>,

    /// Le résultat venait du cache
    pub from_cache: bool,
}

impl DashboardView {
    /// Vue pour un résultat donné (sans passer par le fournisseur)
    pub fn build(input: &CollectedInput, outcome: FetchOutcome, lookup: CacheLookup) -> Self {
        let mut view = Self {
            query: input.query.clone(),
            sidebar_notice: input.warning.map(Notice::error),
            notices: Vec::new(),
            state: ViewState::Empty,
            sections: Vec::new(),
            from_cache: lookup == CacheLookup::Hit,
        };

        // describe() échoue seulement sur une série sans séance
        let populated = outcome
            .series()
            .and_then(|series| SeriesStats::describe(series).map(|stats| (series, stats)));

        match populated {
            Some((series, stats)) => {
                view.state = ViewState::Populated;
                view.sections = vec![
                    Section::Table(series.clone()),
                    Section::Statistics(stats),
                    Section::LineChart(series.adj_close_column()),
                    Section::BarChart(series.volume_column()),
                    Section::Candlestick(series.records().to_vec()),
                ];
            }
            None => {
                view.notices = vec![
                    Notice::warning(no_data_found(&view.query.symbol)),
                    Notice::error(NO_DATA_TO_DISPLAY),
                ];
            }
        }

        view
    }

    pub fn is_empty(&self) -> bool {
        self.state == ViewState::Empty
    }
}

/// Construit la vue pour un triplet : cache puis fournisseur
///
/// Les erreurs du fournisseur ne sont pas rattrapées ici.
#[instrument(skip(input, cache), fields(symbol = %input.query.symbol, start = %input.query.start, end = %input.query.end))]
pub fn present<P: MarketDataProvider>(
    input: &CollectedInput,
    cache: &mut SeriesCache<P>,
) -> Result<DashboardView, ProviderError> {
    if let Some(warning) = input.warning {
        // Pas bloquant : la requête part avec les dates telles quelles
        warn!(warning, "Inverted date range, fetching anyway");
    }

    let (outcome, lookup) = cache.get_or_fetch(&input.query)?;
    let view = DashboardView::build(input, outcome, lookup);

    info!(
        state = ?view.state,
        sections = view.sections.len(),
        cached = view.from_cache,
        "Dashboard view built"
    );
    Ok(view)
}
