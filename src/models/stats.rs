// ============================================================================
// Statistiques descriptives
// ============================================================================
// Résumé par colonne numérique de la série : count, mean, std, min,
// quartiles (25%, 50%, 75%) et max.
//
// Conventions :
// - std : écart-type d'échantillon (diviseur n - 1), NaN si n < 2
// - quartiles : interpolation linéaire entre les deux rangs encadrants
// ============================================================================

use serde::{Deserialize, Serialize};

use crate::models::{PriceRecord, PriceSeries};

/// Colonnes numériques d'une série, dans l'ordre d'affichage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Column {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl Column {
    /// Toutes les colonnes, dans l'ordre du tableau
    pub const ALL: [Column; 6] = [
        Column::Open,
        Column::High,
        Column::Low,
        Column::Close,
        Column::AdjClose,
        Column::Volume,
    ];

    /// En-tête de colonne
    pub fn label(&self) -> &'static str {
        match self {
            Column::Open => "Open",
            Column::High => "High",
            Column::Low => "Low",
            Column::Close => "Close",
            Column::AdjClose => "Adj Close",
            Column::Volume => "Volume",
        }
    }

    /// Extrait la valeur de la colonne pour une séance
    pub fn value(&self, record: &PriceRecord) -> f64 {
        match self {
            Column::Open => record.open,
            Column::High => record.high,
            Column::Low => record.low,
            Column::Close => record.close,
            Column::AdjClose => record.adj_close,
            Column::Volume => record.volume as f64,
        }
    }
}

/// Résumé d'une colonne
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Calcule le résumé d'un ensemble de valeurs
    ///
    /// Retourne None si `values` est vide.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count < 2 {
            f64::NAN
        } else {
            let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
                / (count - 1) as f64;
            variance.sqrt()
        };

        Some(Self {
            count,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.50),
            q75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        })
    }

    /// Libellés des mesures, dans l'ordre d'affichage
    pub const MEASURES: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Valeurs des mesures, dans l'ordre de `MEASURES`
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }
}

/// Quantile par interpolation linéaire sur des valeurs triées
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Statistiques de toutes les colonnes d'une série
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub columns: Vec<(Column, ColumnStats)>,
}

impl SeriesStats {
    /// Décrit une série ; None si elle est vide
    pub fn describe(series: &PriceSeries) -> Option<Self> {
        let columns = Column::ALL
            .iter()
            .map(|&column| {
                let values: Vec<f64> = series.records().iter().map(|r| column.value(r)).collect();
                ColumnStats::from_values(&values).map(|stats| (column, stats))
            })
            .collect::<Option<Vec<_>>>()?;

        Some(Self { columns })
    }

    /// Résumé d'une colonne précise
    pub fn column(&self, column: Column) -> Option<&ColumnStats> {
        self.columns
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, stats)| stats)
    }
}
