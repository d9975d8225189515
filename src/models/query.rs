// ============================================================================
// Structure : Query
// ============================================================================
// Le triplet (symbole, date de début, date de fin) qui identifie une
// requête auprès du fournisseur de données. C'est aussi la clé du cache.
// ============================================================================

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Message affiché dans la sidebar quand la plage de dates est inversée
pub const DATE_RANGE_ERROR: &str = "Error: End date must fall after the start date.";

/// Triplet de requête
///
/// CONCEPT RUST : Hash + Eq
/// - Permet d'utiliser Query comme clé de HashMap (cache)
/// - Deux requêtes identiques champ par champ = même entrée de cache
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    /// Symbole en majuscules (ex: "INFY.NS")
    pub symbol: String,

    /// Première date demandée (incluse)
    pub start: NaiveDate,

    /// Dernière date demandée
    pub end: NaiveDate,
}

impl Query {
    /// Crée une requête ; le symbole est mis en majuscules
    pub fn new(symbol: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            start,
            end,
        }
    }

    /// Vérifie que la date de début ne dépasse pas la date de fin
    pub fn has_valid_range(&self) -> bool {
        self.start <= self.end
    }

    /// Message d'avertissement pour une plage inversée
    ///
    /// L'avertissement n'est pas bloquant : la requête part quand même
    /// avec les dates telles quelles.
    pub fn range_warning(&self) -> Option<&'static str> {
        if self.has_valid_range() {
            None
        } else {
            Some(DATE_RANGE_ERROR)
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{} → {}]", self.symbol, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_symbol_is_uppercased() {
        let query = Query::new("infy.ns", date(2024, 1, 1), date(2024, 6, 1));
        assert_eq!(query.symbol, "INFY.NS");
    }

    #[test]
    fn test_range_warning() {
        let ok = Query::new("AAPL", date(2024, 1, 1), date(2024, 6, 1));
        assert!(ok.has_valid_range());
        assert_eq!(ok.range_warning(), None);

        // Même jour : plage valide
        let same = Query::new("AAPL", date(2024, 1, 1), date(2024, 1, 1));
        assert_eq!(same.range_warning(), None);

        let inverted = Query::new("AAPL", date(2024, 6, 1), date(2024, 1, 1));
        assert_eq!(inverted.range_warning(), Some(DATE_RANGE_ERROR));
        // Les dates invalides sont conservées telles quelles
        assert_eq!(inverted.start, date(2024, 6, 1));
        assert_eq!(inverted.end, date(2024, 1, 1));
    }
}
