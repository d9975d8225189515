// ============================================================================
// Gestion des événements
// ============================================================================
// Gère les événements clavier et les ticks de l'application
//
// CONCEPTS RUST :
// 1. Enums avec variants : représenter différents types d'événements
// 2. Pattern matching avec matches! : classer les touches
// ============================================================================

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Événements de l'application
#[derive(Debug, Clone)]
pub enum Event {
    /// Touche pressée
    Key(KeyEvent),

    /// Tick régulier (pas d'entrée pendant le timeout)
    Tick,
}

/// Gestionnaire d'événements
pub struct EventHandler {
    tick_rate: Duration,
}

impl EventHandler {
    /// Crée un gestionnaire avec un tick de 250ms
    pub fn new() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
        }
    }

    /// Lit le prochain événement (bloquant avec timeout)
    ///
    /// CONCEPT : Non-blocking I/O avec timeout
    /// - poll(timeout) attend max tick_rate
    /// - Si pas d'événement, retourne Ok(Event::Tick)
    pub fn next(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            match event::read()? {
                // Sur certains OS, on reçoit Press ET Release : on ne garde que Press
                CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Ok(Event::Key(key)),
                // Resize, souris, release... : un simple redraw suffit
                _ => Ok(Event::Tick),
            }
        } else {
            Ok(Event::Tick)
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Helpers : Convertir KeyEvent en action
// ============================================================================

fn key(event: &Event) -> Option<&KeyEvent> {
    match event {
        Event::Key(key) => Some(key),
        Event::Tick => None,
    }
}

/// Ctrl+C : sortie immédiate
pub fn is_interrupt_event(event: &Event) -> bool {
    key(event).is_some_and(|k| {
        k.modifiers.contains(KeyModifiers::CONTROL) && matches!(k.code, KeyCode::Char('c'))
    })
}

/// Échap : demande de sortie (two-step)
pub fn is_escape_event(event: &Event) -> bool {
    key(event).is_some_and(|k| matches!(k.code, KeyCode::Esc))
}

/// 'q' : demande de sortie quand on n'est pas en train de taper un symbole
pub fn is_quit_event(event: &Event) -> bool {
    key(event).is_some_and(|k| matches!(k.code, KeyCode::Char('q') | KeyCode::Char('Q')))
}

/// Tab : champ suivant
pub fn is_next_field_event(event: &Event) -> bool {
    key(event).is_some_and(|k| matches!(k.code, KeyCode::Tab))
}

/// Shift+Tab : champ précédent
pub fn is_previous_field_event(event: &Event) -> bool {
    key(event).is_some_and(|k| matches!(k.code, KeyCode::BackTab))
}

/// Entrée : valide la saisie
pub fn is_enter_event(event: &Event) -> bool {
    key(event).is_some_and(|k| matches!(k.code, KeyCode::Enter))
}

/// Backspace
pub fn is_backspace_event(event: &Event) -> bool {
    key(event).is_some_and(|k| matches!(k.code, KeyCode::Backspace))
}

/// F5 : relance le cycle sur le triplet courant
pub fn is_rerun_event(event: &Event) -> bool {
    key(event).is_some_and(|k| matches!(k.code, KeyCode::F(5)))
}

/// Décalage de date demandé par ←/→ : (sens, en mois ?)
///
/// CONCEPT : Shift pour changer d'échelle
/// - ← / → : ±1 jour
/// - Shift+← / Shift+→ : ±1 mois
pub fn date_step(event: &Event) -> Option<(i32, bool)> {
    let k = key(event)?;
    let monthly = k.modifiers.contains(KeyModifiers::SHIFT);
    match k.code {
        KeyCode::Left => Some((-1, monthly)),
        KeyCode::Right => Some((1, monthly)),
        _ => None,
    }
}

/// Flèche vers le haut ou 'k' (vim)
///
/// `typing` : le champ symbole a le focus, 'k' est alors une lettre
pub fn is_up_event(event: &Event, typing: bool) -> bool {
    key(event).is_some_and(|k| match k.code {
        KeyCode::Up => true,
        KeyCode::Char('k') | KeyCode::Char('K') => !typing,
        _ => false,
    })
}

/// Flèche vers le bas ou 'j' (vim)
pub fn is_down_event(event: &Event, typing: bool) -> bool {
    key(event).is_some_and(|k| match k.code {
        KeyCode::Down => true,
        KeyCode::Char('j') | KeyCode::Char('J') => !typing,
        _ => false,
    })
}

/// PgUp : page précédente du tableau
pub fn is_page_up_event(event: &Event) -> bool {
    key(event).is_some_and(|k| matches!(k.code, KeyCode::PageUp))
}

/// PgDn : page suivante du tableau
pub fn is_page_down_event(event: &Event) -> bool {
    key(event).is_some_and(|k| matches!(k.code, KeyCode::PageDown))
}

/// Extrait le caractère d'un événement clavier si c'est un caractère
pub fn get_char_from_event(event: &Event) -> Option<char> {
    match key(event)?.code {
        KeyCode::Char(c) => Some(c),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_is_quit_event() {
        assert!(is_quit_event(&press(KeyCode::Char('q'))));
        assert!(!is_quit_event(&press(KeyCode::Char('a'))));
        assert!(!is_quit_event(&Event::Tick));
    }

    #[test]
    fn test_interrupt_requires_control() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(is_interrupt_event(&ctrl_c));
        assert!(!is_interrupt_event(&press(KeyCode::Char('c'))));
    }

    #[test]
    fn test_date_step() {
        assert_eq!(date_step(&press(KeyCode::Left)), Some((-1, false)));
        let shift_right = Event::Key(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT));
        assert_eq!(date_step(&shift_right), Some((1, true)));
        assert_eq!(date_step(&press(KeyCode::Up)), None);
    }

    #[test]
    fn test_vim_keys_are_letters_while_typing() {
        let k = press(KeyCode::Char('k'));
        assert!(is_up_event(&k, false));
        assert!(!is_up_event(&k, true));
        assert!(is_down_event(&press(KeyCode::Down), true));
    }
}
