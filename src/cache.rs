// ============================================================================
// Cache des requêtes
// ============================================================================
// Mémorise le résultat de chaque triplet (symbole, début, fin) pour ne pas
// rappeler le fournisseur quand l'utilisateur revient sur les mêmes
// entrées.
//
// Politique de rétention :
// - clé = triplet exact (symbole en majuscules, dates telles quelles)
// - aucune éviction, aucune expiration : le cache vit autant que la session
// - les résultats vides sont mémorisés, les erreurs ne le sont pas
// ============================================================================

use std::collections::HashMap;

use tracing::debug;

use crate::api::{FetchOutcome, MarketDataProvider, ProviderError};
use crate::models::Query;

/// Origine d'un résultat
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheLookup {
    /// Déjà en cache, pas d'appel réseau
    Hit,
    /// Appel au fournisseur puis mise en cache
    Miss,
}

/// Cache explicite devant un fournisseur
///
/// CONCEPT RUST : Générique sur le trait
/// - SeriesCache<YahooProvider> en production
/// - SeriesCache<FakeProvider> dans les tests
pub struct SeriesCache<P> {
    provider: P,
    entries: HashMap<Query, FetchOutcome>,
}

impl<P: MarketDataProvider> SeriesCache<P> {
    /// Crée un cache vide devant `provider`
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            entries: HashMap::new(),
        }
    }

    /// Retourne le résultat pour `query`, en appelant le fournisseur au
    /// premier passage seulement
    pub fn get_or_fetch(
        &mut self,
        query: &Query,
    ) -> Result<(FetchOutcome, CacheLookup), ProviderError> {
        if let Some(outcome) = self.entries.get(query) {
            debug!(query = %query, "Cache hit");
            return Ok((outcome.clone(), CacheLookup::Hit));
        }

        debug!(query = %query, "Cache miss");
        let outcome = self.provider.fetch(query)?;
        self.entries.insert(query.clone(), outcome.clone());
        Ok((outcome, CacheLookup::Miss))
    }

    /// Vérifie si un triplet est déjà en cache
    pub fn contains(&self, query: &Query) -> bool {
        self.entries.contains_key(query)
    }

    /// Nombre de triplets mémorisés
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Vérifie si le cache est vide
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Accès au fournisseur sous-jacent
    pub fn provider(&self) -> &P {
        &self.provider
    }
}
