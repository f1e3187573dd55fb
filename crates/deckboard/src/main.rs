mod bootstrap;

use anyhow::Result;
use board_core::settings::Settings;
use board_data::aggregator::{LeagueAggregator, PlayerFilter, SortKey};
use board_data::analysis::analyze_source;
use board_runtime::enrichment::ArtCache;
use board_runtime::orchestrator::DashboardOrchestrator;
use board_ui::app::{App, ViewMode};
use board_ui::table_view::{DeckRowData, DeckTableTotals};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Deckboard v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Sort: {}, Theme: {}",
        settings.view,
        settings.sort,
        settings.theme
    );

    let source_path = match settings.source.clone() {
        Some(path) => path,
        None => bootstrap::discover_source_path().unwrap_or_else(|| {
            tracing::warn!("No league source file found; the dashboard will show an empty state");
            bootstrap::default_source_path()
        }),
    };
    tracing::info!("League source: {}", source_path.display());

    let sort_key = SortKey::from_name(&settings.sort);

    match settings.view.as_str() {
        "dashboard" => {
            tracing::info!("Starting live dashboard...");

            let orchestrator = DashboardOrchestrator::new(
                u64::from(settings.refresh_rate),
                source_path,
                !settings.no_enrich,
            );

            let (rx, refresh_tx, handle) = orchestrator.start();

            let app = App::new(
                &settings.theme,
                ViewMode::Dashboard,
                sort_key,
                settings.include_unplayed,
            );

            // Run the TUI event loop. The loop exits on 'q' / Ctrl+C inside the TUI.
            // We also listen for Ctrl+C at the OS level so that signals received
            // while the terminal is in raw mode are handled cleanly.
            tokio::select! {
                result = app.run_dashboard(rx, refresh_tx) => {
                    handle.abort();
                    result?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down dashboard task");
                    handle.abort();
                }
            }
        }

        "table" => {
            tracing::info!("Running static table view...");

            // One-shot pipeline run; no enrichment in the static view.
            let report = analyze_source(&source_path);

            let decks = LeagueAggregator::filter_and_sort(
                &report.league.decks,
                &PlayerFilter::All,
                settings.include_unplayed,
                sort_key,
            );

            let art = ArtCache::new();
            let rows: Vec<DeckRowData> = decks
                .iter()
                .map(|deck| DeckRowData::from_deck(deck, &art))
                .collect();
            let totals = DeckTableTotals::from_rows(&rows);

            let app = App::new(
                &settings.theme,
                ViewMode::Table,
                sort_key,
                settings.include_unplayed,
            );

            app.run_table(rows, totals).await?;
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}
