// ============================================================================
// Structure : App
// ============================================================================
// Gère l'état de la session TUI
//
// CONCEPTS RUST :
// 1. State Management : centraliser l'état dans une seule structure
// 2. Mutabilité contrôlée : &mut self pour modifier l'état
//
// PATTERN : La vue (DashboardView) est immuable ; App ne fait que la
// remplacer à chaque nouveau triplet. Le rendu lit App sans la modifier.
// ============================================================================

use chrono::NaiveDate;

use crate::config::DashboardConfig;
use crate::input::{CollectedInput, InputForm};
use crate::models::Query;
use crate::presenter::DashboardView;

/// Nombre de lignes du tableau de prix déplacées par PgUp/PgDn
pub const TABLE_PAGE: usize = 10;

/// État principal de l'application
pub struct App {
    /// Indique si l'application doit continuer à tourner
    pub running: bool,

    /// Configuration de la page (titre, icône, couleurs)
    pub config: DashboardConfig,

    /// Formulaire de la sidebar
    pub form: InputForm,

    /// Dernière vue construite
    pub view: Option<DashboardView>,

    /// Erreur du fournisseur pour le dernier triplet (réseau, HTTP...)
    pub failure: Option<String>,

    /// Dernier triplet envoyé au présentateur (succès ou échec)
    presented: Option<Query>,

    /// Index de la première section visible
    pub scroll: usize,

    /// Première ligne visible du tableau de prix
    pub table_offset: usize,

    /// Two-step quit : première pression = confirmation demandée
    pub confirm_quit: bool,

    /// Un fetch est en cours
    pub is_loading: bool,

    /// Message affiché pendant le chargement
    pub loading_message: Option<String>,
}

impl App {
    /// Crée l'application avec le formulaire par défaut
    pub fn new(config: DashboardConfig, today: NaiveDate) -> Self {
        let form = InputForm::with_defaults(&config, today);
        Self {
            running: true,
            config,
            form,
            view: None,
            failure: None,
            presented: None,
            scroll: 0,
            table_offset: 0,
            confirm_quit: false,
            is_loading: false,
            loading_message: None,
        }
    }

    /// Quitte l'application
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Vérifie si l'application doit continuer
    pub fn is_running(&self) -> bool {
        self.running
    }

    // ========================================================================
    // Cycle de rafraîchissement
    // ========================================================================

    /// Triplet à présenter s'il diffère du dernier présenté
    ///
    /// Un changement d'entrée qui redonne le même triplet ne déclenche rien.
    pub fn pending_input(&self) -> Option<CollectedInput> {
        let collected = self.form.collect();
        match &self.presented {
            Some(query) if *query == collected.query => None,
            _ => Some(collected),
        }
    }

    /// Oublie le dernier triplet présenté : le prochain cycle le redemande
    pub fn request_rerun(&mut self) {
        self.presented = None;
    }

    /// Remplace la vue courante
    pub fn show_view(&mut self, view: DashboardView) {
        let same_query = self.presented.as_ref() == Some(&view.query);
        if !same_query {
            self.scroll = 0;
            self.table_offset = 0;
        }
        self.presented = Some(view.query.clone());
        self.failure = None;
        self.view = Some(view);
    }

    /// Affiche l'erreur du fournisseur à la place de la vue
    pub fn show_failure(&mut self, query: Query, message: String) {
        self.presented = Some(query);
        self.view = None;
        self.failure = Some(message);
        self.scroll = 0;
        self.table_offset = 0;
    }

    /// Démarre le chargement avec un message optionnel
    pub fn start_loading(&mut self, message: Option<String>) {
        self.is_loading = true;
        self.loading_message = message;
    }

    /// Termine le chargement
    pub fn stop_loading(&mut self) {
        self.is_loading = false;
        self.loading_message = None;
    }

    // ========================================================================
    // Navigation dans la zone principale
    // ========================================================================

    fn section_count(&self) -> usize {
        self.view.as_ref().map_or(0, |v| v.sections.len())
    }

    fn table_rows(&self) -> usize {
        self.view
            .as_ref()
            .and_then(|v| v.sections.first())
            .map_or(0, |section| match section {
                crate::presenter::Section::Table(series) => series.len(),
                _ => 0,
            })
    }

    /// Section suivante
    pub fn scroll_down(&mut self) {
        let max_index = self.section_count().saturating_sub(1);
        self.scroll = (self.scroll + 1).min(max_index);
    }

    /// Section précédente
    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Page suivante du tableau de prix
    pub fn table_page_down(&mut self) {
        let max_offset = self.table_rows().saturating_sub(1);
        self.table_offset = (self.table_offset + TABLE_PAGE).min(max_offset);
    }

    /// Page précédente du tableau de prix
    pub fn table_page_up(&mut self) {
        self.table_offset = self.table_offset.saturating_sub(TABLE_PAGE);
    }

    // ========================================================================
    // Quit Confirmation Management
    // ========================================================================

    /// Demande la confirmation de quitter
    pub fn request_quit(&mut self) {
        self.confirm_quit = true;
    }

    /// Annule la demande de quit
    pub fn cancel_quit(&mut self) {
        self.confirm_quit = false;
    }

    /// Vérifie si on attend la confirmation de quit
    pub fn is_awaiting_quit_confirmation(&self) -> bool {
        self.confirm_quit
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
