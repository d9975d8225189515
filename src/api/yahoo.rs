// ============================================================================
// API Client : Yahoo Finance
// ============================================================================
// Récupère l'historique journalier d'un symbole depuis l'API "chart" de
// Yahoo Finance.
//
// CONCEPTS RUST :
// 1. async/await dans du code sync : runtime tokio + block_on
// 2. Serde : désérialisation JSON automatique
// 3. Result<T, E> : erreurs typées (ProviderError) à la frontière
// ============================================================================

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tokio::runtime::Runtime;
use tracing::{debug, error, info, instrument, warn};

use crate::api::{FetchOutcome, MarketDataProvider, ProviderError};
use crate::models::{PriceRecord, PriceSeries, Query};

/// Point d'entrée de l'API chart
pub const YAHOO_CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// User-Agent navigateur pour éviter le blocage par Yahoo
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Structures pour parser la réponse JSON de Yahoo Finance
// ============================================================================
// Yahoo retourne un JSON complexe, on définit des structures qui matchent
// exactement la structure JSON pour que serde puisse désérialiser
// automatiquement. Les champs inconnus sont ignorés.
// ============================================================================

/// Réponse complète de l'API Yahoo Finance
#[derive(Debug, Deserialize)]
struct YahooResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

/// Erreur métier renvoyée dans le corps (symbole inconnu, plage refusée...)
#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

/// Métadonnées du ticker
#[derive(Debug, Deserialize)]
struct Meta {
    /// Décalage en secondes de la place de cotation par rapport à UTC
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

/// Données OHLCV (Open, High, Low, Close, Volume)
#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<u64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

// ============================================================================
// Fournisseur Yahoo
// ============================================================================

/// Fournisseur de données Yahoo Finance
///
/// CONCEPT : Async dans sync
/// - reqwest est async, l'application est synchrone (un fetch bloquant
///   par interaction)
/// - Le fournisseur possède un runtime tokio mono-thread et fait block_on
pub struct YahooProvider {
    client: reqwest::Client,
    runtime: Runtime,
    base_url: Url,
}

impl YahooProvider {
    /// Crée un fournisseur pointant sur l'API publique
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_base_url(YAHOO_CHART_URL)
    }

    /// Crée un fournisseur pointant sur une autre URL (miroir, proxy)
    pub fn with_base_url(base_url: &str) -> Result<Self, ProviderError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ProviderError::Runtime(format!("URL invalide {base_url} : {e}")))?;

        debug!("Creating HTTP client");
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Runtime(e.to_string()))?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ProviderError::Runtime(e.to_string()))?;

        Ok(Self {
            client,
            runtime,
            base_url,
        })
    }

    /// Envoie la requête et décode la réponse
    async fn fetch_chart(&self, url: Url, symbol: &str) -> Result<FetchOutcome, ProviderError> {
        debug!("Sending HTTP request to Yahoo Finance");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        debug!(status = %status, "Received HTTP response");

        let body = response.text().await?;
        decode_response(status, &body, symbol)
    }
}

/// Décide du résultat à partir du statut HTTP et du corps
///
/// Yahoo renvoie un corps "chart" même en 404 (symbole inconnu) : on tente
/// toujours le décodage avant de regarder le statut.
/// - corps décodé + statut 2xx → lignes de la série
/// - corps décodé avec un objet `error` (tout statut) → `Empty`
/// - statut d'erreur sans corps exploitable → `Status`
/// - statut 2xx avec un corps illisible → `Decode`
fn decode_response(status: StatusCode, body: &str, symbol: &str) -> Result<FetchOutcome, ProviderError> {
    match serde_json::from_str::<YahooResponse>(body) {
        Ok(parsed) if status.is_success() || parsed.chart.error.is_some() => {
            parse_chart(parsed, symbol)
        }
        Ok(_) => {
            error!(status = %status, "Yahoo Finance returned error status");
            Err(ProviderError::Status(status))
        }
        Err(e) if !status.is_success() => {
            error!(status = %status, error = %e, "Yahoo Finance returned error status");
            Err(ProviderError::Status(status))
        }
        Err(e) => {
            error!(error = %e, "Failed to decode Yahoo response");
            Err(ProviderError::Decode(e.to_string()))
        }
    }
}

impl MarketDataProvider for YahooProvider {
    /// Récupère la série journalière pour le triplet
    ///
    /// CONCEPT RUST : #[instrument]
    /// - Ajoute automatiquement un span avec le symbole et les dates
    /// - Tous les logs à l'intérieur auront ce contexte
    #[instrument(skip(self, query), fields(symbol = %query.symbol, start = %query.start, end = %query.end))]
    fn fetch(&self, query: &Query) -> Result<FetchOutcome, ProviderError> {
        if query.symbol.trim().is_empty() {
            warn!("Blank symbol, nothing to fetch");
            return Ok(FetchOutcome::Empty);
        }

        let url = build_chart_url(&self.base_url, query);
        debug!(url = %url, "Built Yahoo Finance API URL");

        let outcome = self.runtime.block_on(self.fetch_chart(url, &query.symbol))?;

        match &outcome {
            FetchOutcome::Series(series) => info!(rows = series.len(), "Fetched price series"),
            FetchOutcome::Empty => info!("Provider returned no rows"),
        }
        Ok(outcome)
    }
}

/// Construit l'URL de l'API chart pour une requête
///
/// - interval=1d : une ligne par séance
/// - period1 / period2 : minuit UTC des dates de début et de fin
///   (la date de fin est exclue)
/// - events + includeAdjustedClose : pour obtenir la colonne Adj Close
fn build_chart_url(base_url: &Url, query: &Query) -> Url {
    let mut url = base_url.clone();

    // push() encode le symbole (ex: "^GSPC" → "%5EGSPC")
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(&query.symbol);
    }

    url.query_pairs_mut()
        .append_pair("interval", "1d")
        .append_pair("period1", &midnight_utc(query.start).to_string())
        .append_pair("period2", &midnight_utc(query.end).to_string())
        .append_pair("events", "div,splits")
        .append_pair("includeAdjustedClose", "true");

    url
}

/// Timestamp Unix de minuit UTC pour une date
fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive).timestamp())
        .unwrap_or_default()
}

/// Convertit la réponse Yahoo en FetchOutcome
///
/// CONCEPT RUST : Ownership
/// - `response` est "moved" : on consomme les Vec sans les copier
/// - `symbol` est emprunté
fn parse_chart(response: YahooResponse, symbol: &str) -> Result<FetchOutcome, ProviderError> {
    if let Some(chart_error) = response.chart.error {
        warn!(
            code = chart_error.code.as_deref().unwrap_or("?"),
            description = chart_error.description.as_deref().unwrap_or(""),
            "Yahoo Finance reported no data"
        );
        return Ok(FetchOutcome::Empty);
    }

    let result = match response.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => return Ok(FetchOutcome::Empty),
    };

    let gmtoffset = result.meta.gmtoffset.unwrap_or(0);
    let timestamps = result.timestamp.unwrap_or_default();
    debug!(timestamp_count = timestamps.len(), gmtoffset, "Received timestamps from Yahoo");

    let quote = match result.indicators.quote.into_iter().next() {
        Some(quote) => quote,
        None => return Ok(FetchOutcome::Empty),
    };

    let opens = quote.open.unwrap_or_default();
    let highs = quote.high.unwrap_or_default();
    let lows = quote.low.unwrap_or_default();
    let closes = quote.close.unwrap_or_default();
    let volumes = quote.volume.unwrap_or_default();
    let adj_closes = result
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .and_then(|a| a.adjclose)
        .unwrap_or_default();

    let mut series = PriceSeries::new(symbol);
    let mut skipped = 0;
    let mut duplicates = 0;

    for (i, &timestamp) in timestamps.iter().enumerate() {
        let value = |column: &[Option<f64>]| column.get(i).copied().flatten();

        // Une séance sans prix complet (jour férié partiel, suspension) est ignorée
        let (open, high, low, close) =
            match (value(&opens), value(&highs), value(&lows), value(&closes)) {
                (Some(o), Some(h), Some(l), Some(c)) => (o, h, l, c),
                _ => {
                    skipped += 1;
                    continue;
                }
            };

        let adj_close = value(&adj_closes).unwrap_or(close);
        let volume = volumes.get(i).copied().flatten().unwrap_or(0);

        // Date de la séance dans le fuseau de la place de cotation
        let date = DateTime::from_timestamp(timestamp + gmtoffset, 0)
            .ok_or_else(|| ProviderError::Decode(format!("timestamp invalide : {timestamp}")))?
            .date_naive();

        if !series.push(PriceRecord::new(date, open, high, low, close, adj_close, volume)) {
            duplicates += 1;
        }
    }

    if skipped > 0 || duplicates > 0 {
        warn!(
            skipped,
            duplicates,
            total = timestamps.len(),
            "Dropped rows from Yahoo response"
        );
    }

    debug!(parsed = series.len(), total = timestamps.len(), "Finished parsing price rows");
    Ok(FetchOutcome::from(series))
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> FetchOutcome {
        let response: YahooResponse = serde_json::from_str(json).unwrap();
        parse_chart(response, "INFY.NS").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_build_chart_url() {
        let base = Url::parse(YAHOO_CHART_URL).unwrap();
        let query = Query::new("infy.ns", date(2024, 1, 1), date(2024, 1, 2));
        let url = build_chart_url(&base, &query).to_string();

        assert!(url.starts_with("https://query1.finance.yahoo.com/v8/finance/chart/INFY.NS?"));
        assert!(url.contains("interval=1d"));
        assert!(url.contains("period1=1704067200"));
        assert!(url.contains("period2=1704153600"));
        assert!(url.contains("includeAdjustedClose=true"));
    }

    #[test]
    fn test_build_chart_url_encodes_index_symbol() {
        let base = Url::parse("https://example.test/chart/").unwrap();
        let query = Query::new("^gspc", date(2024, 1, 1), date(2024, 2, 1));
        let url = build_chart_url(&base, &query).to_string();

        assert!(url.starts_with("https://example.test/chart/%5EGSPC?"));
    }

    #[test]
    fn test_parse_chart_rows() {
        // 2024-01-02 03:45 UTC = 09:15 IST, gmtoffset = 19800 (UTC+5:30)
        let json = r#"{
          "chart": {
            "result": [{
              "meta": { "symbol": "INFY.NS", "gmtoffset": 19800, "currency": "INR" },
              "timestamp": [1704167100, 1704253500, 1704339900],
              "indicators": {
                "quote": [{
                  "open":   [1540.0, null, 1530.0],
                  "high":   [1550.0, 1545.0, 1560.0],
                  "low":    [1530.0, 1520.0, 1525.0],
                  "close":  [1545.0, 1525.0, 1555.0],
                  "volume": [100, 200, null]
                }],
                "adjclose": [{ "adjclose": [1500.5, 1490.0, 1510.0] }]
              }
            }],
            "error": null
          }
        }"#;

        let outcome = parse(json);
        let series = outcome.series().expect("series attendue");

        // La ligne du milieu (open manquant) est ignorée
        assert_eq!(series.len(), 2);
        assert_eq!(series.symbol, "INFY.NS");

        let first = &series.records()[0];
        assert_eq!(first.date, date(2024, 1, 2));
        assert_eq!(first.open, 1540.0);
        assert_eq!(first.adj_close, 1500.5);
        assert_eq!(first.volume, 100);

        let last = &series.records()[1];
        assert_eq!(last.date, date(2024, 1, 4));
        assert_eq!(last.volume, 0); // volume manquant
    }

    #[test]
    fn test_parse_chart_without_adjclose_falls_back_to_close() {
        let json = r#"{
          "chart": {
            "result": [{
              "meta": {},
              "timestamp": [1704204000],
              "indicators": {
                "quote": [{
                  "open": [10.0], "high": [12.0], "low": [9.0], "close": [11.0], "volume": [5]
                }]
              }
            }],
            "error": null
          }
        }"#;

        let outcome = parse(json);
        let series = outcome.series().unwrap();
        assert_eq!(series.records()[0].adj_close, 11.0);
    }

    #[test]
    fn test_parse_chart_error_is_empty() {
        let json = r#"{
          "chart": {
            "result": null,
            "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
          }
        }"#;

        assert_eq!(parse(json), FetchOutcome::Empty);
    }

    #[test]
    fn test_parse_chart_without_timestamps_is_empty() {
        let json = r#"{
          "chart": {
            "result": [{
              "meta": { "gmtoffset": -18000 },
              "indicators": { "quote": [{}] }
            }],
            "error": null
          }
        }"#;

        assert_eq!(parse(json), FetchOutcome::Empty);
    }

    const NOT_FOUND_BODY: &str = r#"{
      "chart": {
        "result": null,
        "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
      }
    }"#;

    #[test]
    fn test_decode_response_success() {
        let json = r#"{
          "chart": {
            "result": [{
              "meta": { "gmtoffset": 0 },
              "timestamp": [1704204000],
              "indicators": {
                "quote": [{
                  "open": [10.0], "high": [12.0], "low": [9.0], "close": [11.0], "volume": [5]
                }]
              }
            }],
            "error": null
          }
        }"#;

        let outcome = decode_response(StatusCode::OK, json, "INFY.NS").unwrap();
        let series = outcome.series().unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.records()[0].date, date(2024, 1, 2));
    }

    #[test]
    fn test_decode_response_chart_error_is_empty_for_any_status() {
        let outcome = decode_response(StatusCode::NOT_FOUND, NOT_FOUND_BODY, "NOPE").unwrap();
        assert_eq!(outcome, FetchOutcome::Empty);

        let outcome = decode_response(StatusCode::OK, NOT_FOUND_BODY, "NOPE").unwrap();
        assert_eq!(outcome, FetchOutcome::Empty);
    }

    #[test]
    fn test_decode_response_error_status_without_chart_body() {
        let result = decode_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error", "AAPL");
        assert!(matches!(
            result,
            Err(ProviderError::Status(status)) if status == StatusCode::INTERNAL_SERVER_ERROR
        ));

        // Corps "chart" décodable mais sans objet error : le statut l'emporte
        let empty_chart = r#"{ "chart": { "result": null, "error": null } }"#;
        let result = decode_response(StatusCode::BAD_GATEWAY, empty_chart, "AAPL");
        assert!(matches!(result, Err(ProviderError::Status(StatusCode::BAD_GATEWAY))));
    }

    #[test]
    fn test_decode_response_garbage_body_is_decode_error() {
        let result = decode_response(StatusCode::OK, "{", "AAPL");
        assert!(matches!(result, Err(ProviderError::Decode(_))));
    }

    #[test]
    fn test_blank_symbol_is_empty_without_network() {
        let provider = YahooProvider::with_base_url("http://127.0.0.1:9/chart").unwrap();
        let query = Query::new("  ", date(2024, 1, 1), date(2024, 2, 1));
        assert_eq!(provider.fetch(&query).unwrap(), FetchOutcome::Empty);
    }

    #[test]
    fn test_fetch_live() {
        // Vrai appel API (peut échouer si pas de connexion)
        let provider = YahooProvider::new().unwrap();
        let query = Query::new("AAPL", date(2024, 1, 1), date(2024, 2, 1));

        match provider.fetch(&query) {
            Ok(FetchOutcome::Series(series)) => {
                assert_eq!(series.symbol, "AAPL");
                assert!(series.records().iter().all(|r| r.date >= query.start && r.date < query.end));
                println!("✓ Récupéré {} séances pour AAPL", series.len());
            }
            Ok(FetchOutcome::Empty) => println!("⚠ Réponse vide pour AAPL"),
            Err(e) => println!("⚠ Test skippé (pas de connexion?) : {}", e),
        }
    }
}
