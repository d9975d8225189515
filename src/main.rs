// ============================================================================
// MarketDash - Dashboard boursier en terminal
// ============================================================================
// Une page : symbole + plage de dates dans la sidebar, historique des prix
// dans la zone principale (tableau, statistiques, trois graphiques).
//
// CONCEPTS RUST CLÉS :
// 1. Terminal raw mode : contrôle total du terminal
// 2. Event loop : boucle qui gère événements et rendering
// 3. Async dans sync : le fournisseur bloque sur son propre runtime tokio
// ============================================================================

use std::io;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use marketdash::api::{MarketDataProvider, YahooProvider};
use marketdash::app::App;
use marketdash::cache::SeriesCache;
use marketdash::config::DashboardConfig;
use marketdash::input::Field;
use marketdash::presenter::present;
use marketdash::ui::{events::EventHandler, render, Event};

type Tui = Terminal<CrosstermBackend<io::Stdout>>;

// ============================================================================
// Logging
// ============================================================================
// stdout appartient au TUI : les logs partent dans un fichier
// - Rotation quotidienne automatique des logs
// ============================================================================

/// Répertoire des logs : données locales de l'utilisateur, sinon ./logs
///
/// - Linux : ~/.local/share/marketdash/logs
/// - macOS : ~/Library/Application Support/marketdash/logs
/// - Windows : C:\Users\<user>\AppData\Local\marketdash\logs
fn log_directory() -> std::path::PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("marketdash").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("./logs"))
}

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// tail -f ~/.local/share/marketdash/logs/marketdash.log.*
/// RUST_LOG=marketdash=trace cargo run
/// ```
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = log_directory();
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "marketdash.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false) // Pas de codes couleur dans le fichier
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            // Par défaut : debug pour marketdash, info pour les dépendances
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "marketdash=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    // Logging avant tout le reste ; un échec n'empêche pas de continuer
    init_logging().unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!("MarketDash starting up");

    let config = DashboardConfig::default();
    let provider = YahooProvider::new().context("Impossible de créer le client Yahoo Finance")?;
    let mut cache = SeriesCache::new(provider);

    let today = chrono::Local::now().date_naive();
    let mut app = App::new(config, today);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal(&app.config.window_title())?;

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &mut cache, &events);

    // Restaure le terminal (même en cas d'erreur)
    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!(cached = cache.len(), "Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

// ============================================================================
// Event loop
// ============================================================================
// Chaque tour :
// 1. REFRESH : si le triplet a changé, fetch bloquant puis nouvelle vue
// 2. RENDER : dessine l'état courant
// 3. EVENTS : attend une touche (ou un tick)
// ============================================================================

fn run<P: MarketDataProvider>(
    terminal: &mut Tui,
    app: &mut App,
    cache: &mut SeriesCache<P>,
    events: &EventHandler,
) -> Result<()> {
    while app.is_running() {
        // 1. REFRESH
        if let Some(input) = app.pending_input() {
            app.start_loading(Some(format!("Loading {}…", input.query.symbol)));
            terminal.draw(|frame| render(frame, app))?;

            match present(&input, cache) {
                Ok(view) => app.show_view(view),
                Err(e) => {
                    error!(query = %input.query, error = %e, "Provider failed");
                    app.show_failure(input.query, e.to_string());
                }
            }
            app.stop_loading();
        }

        // 2. RENDER
        terminal.draw(|frame| render(frame, app))?;

        // 3. EVENTS
        let event = events.next()?;
        handle_event(app, event);
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
///
/// Les modifications du formulaire ne déclenchent rien ici : le tour suivant
/// compare le triplet au dernier présenté.
fn handle_event(app: &mut App, event: Event) {
    use marketdash::ui::events::{
        date_step, get_char_from_event, is_backspace_event, is_down_event, is_enter_event,
        is_escape_event, is_interrupt_event, is_next_field_event, is_page_down_event,
        is_page_up_event, is_previous_field_event, is_quit_event, is_rerun_event, is_up_event,
    };

    if matches!(event, Event::Tick) {
        return;
    }

    if is_interrupt_event(&event) {
        info!("User interrupted (Ctrl+C)");
        app.quit();
        return;
    }

    // 'q' est une lettre quand on tape un symbole
    let typing = app.form.focus == Field::Symbol;
    let quit_requested = is_escape_event(&event) || (!typing && is_quit_event(&event));

    // Two-step quit : la deuxième pression quitte, toute autre touche annule
    if app.is_awaiting_quit_confirmation() {
        if quit_requested {
            info!("User confirmed quit");
            app.quit();
        } else {
            app.cancel_quit();
        }
        return;
    }

    if quit_requested {
        info!("User requested quit (awaiting confirmation)");
        app.request_quit();
        return;
    }

    if is_next_field_event(&event) {
        app.form.focus_next();
    } else if is_previous_field_event(&event) {
        app.form.focus_previous();
    } else if is_enter_event(&event) {
        app.form.submit();
    } else if is_backspace_event(&event) {
        app.form.backspace();
    } else if is_rerun_event(&event) {
        info!("User requested rerun");
        app.request_rerun();
    } else if is_page_up_event(&event) {
        app.table_page_up();
    } else if is_page_down_event(&event) {
        app.table_page_down();
    } else if is_up_event(&event, typing) {
        app.scroll_up();
    } else if is_down_event(&event, typing) {
        app.scroll_down();
    } else if let Some((sign, monthly)) = date_step(&event).filter(|_| !typing) {
        if monthly {
            app.form.shift_months(sign);
        } else {
            app.form.shift_days(i64::from(sign));
        }
    } else if let Some(c) = get_char_from_event(&event) {
        app.form.push_char(c);
    }
}

// ============================================================================
// Terminal
// ============================================================================

/// Configure le terminal en mode TUI
fn setup_terminal(title: &str) -> Result<Tui> {
    enable_raw_mode().context("Impossible d'activer le raw mode")?;

    // Écran secondaire : l'écran précédent est restauré à la sortie
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, SetTitle(title))?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Impossible de créer le terminal")
}

/// Restaure le terminal à son état normal
fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
