// ============================================================================
// Module : api
// ============================================================================
// Frontière avec le fournisseur de données de marché.
//
// La réponse brute (JSON non typé) ne dépasse jamais ce module : le reste
// de l'application ne voit qu'un FetchOutcome (série non vide ou "vide")
// ou une ProviderError.
// ============================================================================

pub mod yahoo;  // Client API Yahoo Finance

use thiserror::Error;

use crate::models::{PriceSeries, Query};

pub use yahoo::YahooProvider;

/// Résultat d'une requête auprès du fournisseur
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Aucune séance pour ce triplet (symbole inconnu, plage vide, etc.)
    Empty,

    /// Au moins une séance, triées par date
    Series(PriceSeries),
}

impl FetchOutcome {
    /// Vérifie si le résultat est vide
    pub fn is_empty(&self) -> bool {
        matches!(self, FetchOutcome::Empty)
    }

    /// Retourne la série si elle existe
    pub fn series(&self) -> Option<&PriceSeries> {
        match self {
            FetchOutcome::Empty => None,
            FetchOutcome::Series(series) => Some(series),
        }
    }
}

impl From<PriceSeries> for FetchOutcome {
    /// Une série vide devient `Empty` : `Series` contient toujours au moins
    /// une séance.
    fn from(series: PriceSeries) -> Self {
        if series.is_empty() {
            FetchOutcome::Empty
        } else {
            FetchOutcome::Series(series)
        }
    }
}

/// Erreurs d'un fournisseur de données
///
/// Elles ne sont pas rattrapées par le présentateur : la boucle principale
/// les affiche telles quelles.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Échec réseau (DNS, connexion, timeout côté OS...)
    #[error("requête HTTP échouée : {0}")]
    Request(#[from] reqwest::Error),

    /// Statut HTTP d'erreur sans réponse exploitable
    #[error("le fournisseur a retourné HTTP {0}")]
    Status(reqwest::StatusCode),

    /// Réponse impossible à décoder
    #[error("réponse illisible : {0}")]
    Decode(String),

    /// Impossible de créer le runtime ou le client HTTP
    #[error("initialisation du fournisseur impossible : {0}")]
    Runtime(String),
}

/// Fournisseur de séries de prix
///
/// CONCEPT RUST : Trait à la frontière
/// - L'application dépend du trait, pas de Yahoo
/// - Les tests branchent un faux fournisseur (compteur d'appels, fixtures)
///
/// L'appel est synchrone : il bloque le thread de l'interface jusqu'à la
/// réponse.
pub trait MarketDataProvider {
    /// Récupère la série pour un triplet (symbole, début, fin)
    fn fetch(&self, query: &Query) -> Result<FetchOutcome, ProviderError>;
}
