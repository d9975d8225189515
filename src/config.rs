// ============================================================================
// Configuration de la page
// ============================================================================
// Tout est statique : titre, icône, couleur de fond, symbole et plage par
// défaut. Pas de fichier de configuration ni d'option en ligne de commande.
// ============================================================================

use ratatui::style::Color;

/// Titre de la page
pub const PAGE_TITLE: &str = "Market Dashboard Application";

/// Icône affichée devant le titre
pub const PAGE_ICON: &str = "📊";

/// Couleur de fond de la page (bleu ciel, #87CEEB)
pub const BACKGROUND_COLOR: Color = Color::Rgb(135, 206, 235);

/// Symbole proposé au démarrage
pub const DEFAULT_SYMBOL: &str = "INFY.NS";

/// Profondeur d'historique par défaut, en jours
pub const DEFAULT_LOOKBACK_DAYS: i64 = 365;

/// Configuration de la page
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub page_title: String,
    pub page_icon: String,
    pub background: Color,
    pub default_symbol: String,
    pub default_lookback_days: i64,
}

impl DashboardConfig {
    /// Titre complet, icône comprise (barre de titre du terminal)
    pub fn window_title(&self) -> String {
        format!("{} {}", self.page_icon, self.page_title)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_title: PAGE_TITLE.to_string(),
            page_icon: PAGE_ICON.to_string(),
            background: BACKGROUND_COLOR,
            default_symbol: DEFAULT_SYMBOL.to_string(),
            default_lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}
