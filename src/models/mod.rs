// ============================================================================
// Module : models
// ============================================================================
// Ce module contient toutes les structures de données de l'application
// ============================================================================

pub mod price;  // Séances et série de prix
pub mod query;  // Triplet (symbole, début, fin)
pub mod stats;  // Statistiques descriptives

// Re-export des structures principales pour simplifier les imports
// Au lieu de : use marketdash::models::price::PriceSeries;
// On peut faire : use marketdash::models::PriceSeries;
pub use price::{PriceRecord, PriceSeries};
pub use query::{Query, DATE_RANGE_ERROR};
pub use stats::{Column, ColumnStats, SeriesStats};
