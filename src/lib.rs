// ============================================================================
// MarketDash - Library
// ============================================================================
// Expose les modules publics pour le binaire et les tests d'intégration
// ============================================================================

pub mod api;       // Fournisseur de données (Yahoo Finance)
pub mod models;    // Structures de données
pub mod cache;     // Mémoïsation des séries par triplet
pub mod config;    // Constantes de la page
pub mod input;     // Formulaire de la sidebar
pub mod presenter; // Construction de la vue
pub mod app;       // État de l'application
pub mod ui;        // Interface utilisateur
