use ex33_core::{Extraction, LogLevel};
use ex33_host::{FileSandbox, FileStore, GeminiAnalyzer, HostConfig, Playground};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// How often the snippet file is checked for edits.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ex33=info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: ex33 <snippet.html> [--analyze]");
        eprintln!();
        eprintln!("Watches the snippet and rewrites the preview document after every edit.");
        eprintln!("  EX33_CONFIG        YAML config file");
        eprintln!("  EX33_DATA_DIR      store and screenshots (default .ex33)");
        eprintln!("  EX33_PREVIEW_PATH  sandbox document (default .ex33/preview.html)");
        eprintln!("  GEMINI_API_KEY     enables --analyze");
        process::exit(1);
    }
    let snippet_path = PathBuf::from(&args[1]);
    let analyze = args[2..].iter().any(|a| a == "--analyze");

    let config = match HostConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            process::exit(1);
        }
    };
    let store = match FileStore::open(config.store_path()) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("✗ {}", e);
            process::exit(1);
        }
    };

    let mut pg = Playground::open(Arc::new(store), FileSandbox::new(&config.preview_path));
    pg.set_zoom(config.zoom);
    pg.set_viewport(config.viewport);
    pg.set_grid(config.grid);
    pg.select_device(config.device);

    // The file on disk wins; a missing file is seeded with the restored snippet.
    let mut last_seen = match fs::read_to_string(&snippet_path) {
        Ok(content) => {
            pg.set_text(content.clone(), Instant::now());
            pg.run();
            content
        }
        Err(_) => {
            if let Err(e) = fs::write(&snippet_path, pg.code()) {
                eprintln!("✗ {}: {}", snippet_path.display(), e);
                process::exit(1);
            }
            pg.code().to_string()
        }
    };

    let profile = pg.profile();
    println!(
        "▶ {} → {} ({} {}×{}, scale {:.2})",
        snippet_path.display(),
        config.preview_path.display(),
        profile.label,
        profile.width,
        profile.height,
        pg.scale()
    );
    let grid = pg.grid();
    if grid.active {
        println!(
            "  grid:   {} px, {} columns of {:.1} px",
            grid.size,
            ex33_core::GridOverlay::COLUMNS,
            grid.column_width()
        );
    }
    print_hints(&pg.extraction());

    if analyze {
        match GeminiAnalyzer::new(&config.analysis) {
            Ok(analyzer) => {
                if let Some(report) = pg.run_analysis(&analyzer).await {
                    println!("Performance score: {}", report.score);
                    println!(
                        "  FCP {}  LCP {}  CLS {}  TBT {}",
                        report.metrics.fcp,
                        report.metrics.lcp,
                        report.metrics.cls,
                        report.metrics.tbt
                    );
                    for tip in &report.suggestions {
                        println!("  • {}", tip);
                    }
                }
            }
            Err(e) => pg.log(LogLevel::Error, e.to_string()),
        }
    }

    let mut printed = print_new_logs(&pg, 0);

    let mut ticker = tokio::time::interval(POLL_INTERVAL);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                let now = Instant::now();
                if let Some(content) = read_if_changed(&snippet_path, &last_seen) {
                    let before = pg.extraction();
                    pg.set_text(content.clone(), now);
                    last_seen = content;
                    let after = pg.extraction();
                    if after != before {
                        print_hints(&after);
                    }
                }
                if pg.tick(now) {
                    tracing::info!(reloads = pg.reload_count(), "preview updated");
                }
                printed = print_new_logs(&pg, printed);
            }
        }
    }
}

fn read_if_changed(path: &Path, last_seen: &str) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(content) if content != last_seen => Some(content),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "snippet not readable");
            None
        }
    }
}

fn print_hints(hints: &Extraction) {
    println!("  media:  {}", join_or_none(&hints.media));
    println!("  emoji:  {}", join_or_none(&hints.emoji));
    println!("  colors: {}", join_or_none(&hints.colors));
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(" ")
    }
}

fn print_new_logs<S: ex33_core::Sandbox>(pg: &Playground<S>, printed: u64) -> u64 {
    for entry in pg.logs().since(printed) {
        println!(
            "[{}] {:<5} {}",
            entry.time.format("%H:%M:%S"),
            entry.level,
            entry.message
        );
    }
    pg.logs().total_pushed()
}
