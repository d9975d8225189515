// ============================================================================
// Structure : PriceRecord / PriceSeries
// ============================================================================
// Une série de prix journaliers (OHLCV + clôture ajustée) pour un symbole
// sur une plage de dates.
//
// CONCEPTS RUST :
// 1. NaiveDate : date calendaire sans fuseau (une séance = un jour)
// 2. f64 : floating point 64 bits pour les prix
// 3. u64 : unsigned 64 bits pour le volume (toujours positif)
// ============================================================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Une séance de cotation (une ligne du tableau)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Date de la séance (heure locale de la place de cotation)
    pub date: NaiveDate,

    /// Prix d'ouverture (Open)
    pub open: f64,

    /// Prix le plus haut (High)
    pub high: f64,

    /// Prix le plus bas (Low)
    pub low: f64,

    /// Prix de clôture (Close)
    pub close: f64,

    /// Clôture ajustée des dividendes et splits (Adj Close)
    pub adj_close: f64,

    /// Volume échangé
    pub volume: u64,
}

impl PriceRecord {
    /// Constructeur : crée une nouvelle séance
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        adj_close: f64,
        volume: u64,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            adj_close,
            volume,
        }
    }

    /// Séance haussière (ou neutre) : affichée en vert sur les chandeliers
    pub fn is_increasing(&self) -> bool {
        self.close >= self.open
    }
}

/// Série de prix pour un symbole, triée par date strictement croissante
///
/// CONCEPT RUST : Ownership
/// - PriceSeries possède le Vec, le Vec possède les PriceRecord
/// - La série n'est jamais modifiée après le fetch : on ne l'expose
///   qu'en lecture (slice)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// Symbole du ticker (ex: "INFY.NS")
    pub symbol: String,

    records: Vec<PriceRecord>,
}

impl PriceSeries {
    /// Crée une série vide pour un symbole
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            records: Vec::new(),
        }
    }

    /// Construit une série à partir de lignes déjà ordonnées
    ///
    /// Les lignes qui ne respectent pas l'ordre strictement croissant
    /// des dates sont ignorées (doublons renvoyés par l'API).
    pub fn from_records(symbol: impl Into<String>, records: Vec<PriceRecord>) -> Self {
        let mut series = Self::new(symbol);
        for record in records {
            series.push(record);
        }
        series
    }

    /// Ajoute une séance à la fin de la série
    ///
    /// Retourne false si la date n'est pas postérieure à la dernière.
    pub fn push(&mut self, record: PriceRecord) -> bool {
        if let Some(last) = self.records.last() {
            if record.date <= last.date {
                return false;
            }
        }
        self.records.push(record);
        true
    }

    /// Toutes les séances, dans l'ordre des dates
    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }

    /// Nombre de séances
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Vérifie si la série est vide
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Séance la plus récente
    pub fn last(&self) -> Option<&PriceRecord> {
        self.records.last()
    }

    /// Colonne "Adj Close" indexée par date (entrée du graphique ligne)
    pub fn adj_close_column(&self) -> Vec<(NaiveDate, f64)> {
        self.records.iter().map(|r| (r.date, r.adj_close)).collect()
    }

    /// Colonne "Volume" indexée par date (entrée du graphique en barres)
    pub fn volume_column(&self) -> Vec<(NaiveDate, u64)> {
        self.records.iter().map(|r| (r.date, r.volume)).collect()
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn test_record_direction() {
        let up = PriceRecord::new(day(1), 100.0, 110.0, 95.0, 105.0, 104.0, 1000);
        let down = PriceRecord::new(day(1), 100.0, 105.0, 90.0, 95.0, 94.0, 1000);
        let flat = PriceRecord::new(day(1), 100.0, 101.0, 99.0, 100.0, 100.0, 1000);

        assert!(up.is_increasing());
        assert!(!down.is_increasing());
        assert!(flat.is_increasing());
    }

    #[test]
    fn test_series_keeps_strictly_increasing_dates() {
        let mut series = PriceSeries::new("AAPL");
        assert!(series.is_empty());

        assert!(series.push(PriceRecord::new(day(4), 1.0, 1.0, 1.0, 1.0, 1.0, 1)));
        assert!(series.push(PriceRecord::new(day(5), 2.0, 2.0, 2.0, 2.0, 2.0, 2)));
        // Doublon et date antérieure : rejetés
        assert!(!series.push(PriceRecord::new(day(5), 3.0, 3.0, 3.0, 3.0, 3.0, 3)));
        assert!(!series.push(PriceRecord::new(day(1), 4.0, 4.0, 4.0, 4.0, 4.0, 4)));

        assert_eq!(series.len(), 2);
        assert_eq!(series.last().unwrap().date, day(5));
    }

    #[test]
    fn test_columns_follow_date_order() {
        let series = PriceSeries::from_records(
            "AAPL",
            vec![
                PriceRecord::new(day(4), 99.0, 101.0, 98.0, 100.0, 99.5, 10),
                PriceRecord::new(day(5), 100.0, 106.0, 99.0, 105.0, 104.5, 20),
                PriceRecord::new(day(6), 105.0, 105.0, 97.0, 98.0, 97.5, 30),
            ],
        );

        assert_eq!(
            series.adj_close_column(),
            vec![(day(4), 99.5), (day(5), 104.5), (day(6), 97.5)]
        );
        assert_eq!(
            series.volume_column(),
            vec![(day(4), 10), (day(5), 20), (day(6), 30)]
        );
    }
}
