// ============================================================================
// Formulaire de saisie (sidebar)
// ============================================================================
// Collecte le triplet (symbole, date de début, date de fin).
//
// - Symbole : champ texte, validé par Entrée (ou en quittant le champ)
// - Dates : ←/→ = ±1 jour, Shift+←/→ = ±1 mois, ou saisie AAAA/MM/JJ + Entrée
// - Une plage inversée produit un avertissement mais le triplet est quand
//   même retourné tel quel
// ============================================================================

use chrono::{Days, Months, NaiveDate};

use crate::config::DashboardConfig;
use crate::models::Query;

/// Format d'affichage et de saisie des dates
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Champ qui a le focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Symbol,
    Start,
    End,
}

impl Field {
    /// Champ suivant (cycle)
    pub fn next(&self) -> Field {
        match self {
            Field::Symbol => Field::Start,
            Field::Start => Field::End,
            Field::End => Field::Symbol, // Boucle
        }
    }

    /// Champ précédent (cycle)
    pub fn previous(&self) -> Field {
        match self {
            Field::Symbol => Field::End, // Boucle
            Field::Start => Field::Symbol,
            Field::End => Field::Start,
        }
    }
}

/// Triplet collecté + avertissement éventuel
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedInput {
    pub query: Query,
    pub warning: Option<&'static str>,
}

/// État du formulaire
#[derive(Debug, Clone)]
pub struct InputForm {
    /// Symbole validé (tel que tapé, mis en majuscules à la collecte)
    symbol: String,

    /// Dates validées
    start: NaiveDate,
    end: NaiveDate,

    /// Champ actif
    pub focus: Field,

    /// Texte en cours de saisie dans le champ actif
    pub draft: String,

    /// Erreur de saisie (date illisible)
    pub field_error: Option<String>,
}

impl InputForm {
    /// Formulaire initial : symbole par défaut, un an d'historique
    pub fn with_defaults(config: &DashboardConfig, today: NaiveDate) -> Self {
        let start = today
            .checked_sub_days(Days::new(config.default_lookback_days.unsigned_abs()))
            .unwrap_or(today);

        Self {
            symbol: config.default_symbol.clone(),
            start,
            end: today,
            focus: Field::Symbol,
            draft: config.default_symbol.clone(),
            field_error: None,
        }
    }

    /// Produit le triplet courant
    ///
    /// Le triplet n'est jamais bloqué : une plage inversée donne seulement
    /// un avertissement.
    pub fn collect(&self) -> CollectedInput {
        let query = Query::new(&self.symbol, self.start, self.end);
        let warning = query.range_warning();
        CollectedInput { query, warning }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Texte affiché dans un champ
    pub fn display(&self, field: Field) -> String {
        if field == self.focus && (field == Field::Symbol || !self.draft.is_empty()) {
            return self.draft.clone();
        }
        match field {
            Field::Symbol => self.symbol.to_uppercase(),
            Field::Start => self.start.format(DATE_FORMAT).to_string(),
            Field::End => self.end.format(DATE_FORMAT).to_string(),
        }
    }

    /// Passe au champ suivant ; retourne true si une valeur a changé
    pub fn focus_next(&mut self) -> bool {
        self.move_focus(self.focus.next())
    }

    /// Passe au champ précédent ; retourne true si une valeur a changé
    pub fn focus_previous(&mut self) -> bool {
        self.move_focus(self.focus.previous())
    }

    fn move_focus(&mut self, target: Field) -> bool {
        // Quitter un champ valide la saisie ; une date illisible laisse
        // son message d'erreur affiché après le changement de champ
        self.field_error = None;
        let changed = match self.focus {
            Field::Symbol => self.commit_symbol(),
            Field::Start | Field::End => self.commit_date_draft(),
        };
        self.focus = target;
        self.draft = match target {
            Field::Symbol => self.symbol.clone(),
            Field::Start | Field::End => String::new(),
        };
        changed
    }

    /// Ajoute un caractère à la saisie du champ actif
    pub fn push_char(&mut self, c: char) {
        let accepted = match self.focus {
            Field::Symbol => c.is_alphanumeric() || matches!(c, '.' | '-' | '^' | '='),
            Field::Start | Field::End => c.is_ascii_digit() || matches!(c, '/' | '-'),
        };
        if accepted {
            self.draft.push(c);
        }
    }

    /// Supprime le dernier caractère saisi
    pub fn backspace(&mut self) {
        self.draft.pop();
    }

    /// Valide la saisie du champ actif ; retourne true si une valeur a changé
    pub fn submit(&mut self) -> bool {
        match self.focus {
            Field::Symbol => self.commit_symbol(),
            Field::Start | Field::End => self.commit_date_draft(),
        }
    }

    /// Décale la date active d'un nombre de jours ; retourne true si elle a changé
    pub fn shift_days(&mut self, days: i64) -> bool {
        self.update_date(|date| {
            if days >= 0 {
                date.checked_add_days(Days::new(days.unsigned_abs()))
            } else {
                date.checked_sub_days(Days::new(days.unsigned_abs()))
            }
        })
    }

    /// Décale la date active d'un nombre de mois (bornée à la fin du mois)
    pub fn shift_months(&mut self, months: i32) -> bool {
        self.update_date(|date| {
            if months >= 0 {
                date.checked_add_months(Months::new(months.unsigned_abs()))
            } else {
                date.checked_sub_months(Months::new(months.unsigned_abs()))
            }
        })
    }

    fn commit_symbol(&mut self) -> bool {
        let draft = self.draft.trim().to_string();
        if draft.to_uppercase() == self.symbol.to_uppercase() {
            return false;
        }
        self.symbol = draft;
        true
    }

    fn commit_date_draft(&mut self) -> bool {
        if self.draft.is_empty() {
            return false;
        }
        match parse_date(&self.draft) {
            Some(date) => self.update_date(|_| Some(date)),
            None => {
                self.field_error = Some(format!("Date invalide : {} (AAAA/MM/JJ)", self.draft));
                false
            }
        }
    }

    fn update_date(&mut self, f: impl FnOnce(NaiveDate) -> Option<NaiveDate>) -> bool {
        let slot = match self.focus {
            Field::Start => &mut self.start,
            Field::End => &mut self.end,
            Field::Symbol => return false,
        };

        self.draft.clear();
        self.field_error = None;

        match f(*slot) {
            Some(date) if date != *slot => {
                *slot = date;
                true
            }
            _ => false,
        }
    }
}

/// Accepte AAAA/MM/JJ et AAAA-MM-JJ
fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(text, "%Y-%m-%d"))
        .ok()
}
