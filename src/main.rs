use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use log::{debug, info};
use mimalloc::MiMalloc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;

use weekender_lib::config;
use weekender_lib::provider::HttpSearchProvider;
use weekender_lib::search::selection::{global_search_path, Key, KeyAction};
use weekender_lib::search::SearchController;
use weekender_lib::state::SearchState;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Drive the creator search modal from the terminal.
///
/// Every input line replaces the query text. Lines starting with ':' are keys:
/// :down :up :enter :esc :retry :pick N :quit
#[derive(Parser, Debug)]
#[command(name = "weekender-search", version)]
struct Args {
    /// Config file (created with defaults when missing)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Creator search endpoint, overrides the config file
    #[arg(long, env = "WEEKENDER_ENDPOINT")]
    endpoint: Option<String>,

    /// Debounce delay in milliseconds, overrides the config file
    #[arg(long)]
    debounce_ms: Option<u64>,
}

enum Input {
    Query(String),
    Key(Key),
    Pick(usize),
    Retry,
    Quit,
    Unknown(String),
}

fn parse_input(line: &str) -> Input {
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line.to_string());
    };
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("down"), None) => Input::Key(Key::ArrowDown),
        (Some("up"), None) => Input::Key(Key::ArrowUp),
        (Some("enter"), None) => Input::Key(Key::Enter),
        (Some("esc"), None) => Input::Key(Key::Escape),
        (Some("retry"), None) => Input::Retry,
        (Some("quit"), None) => Input::Quit,
        (Some("pick"), Some(n)) => match n.parse() {
            Ok(n) => Input::Pick(n),
            Err(_) => Input::Unknown(line.to_string()),
        },
        // "::foo" searches for ":foo"
        _ if command.starts_with(':') => Input::Query(command.to_string()),
        _ => Input::Unknown(line.to_string()),
    }
}

fn get_config_dir() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .or_else(|_| std::env::var("APPDATA"))
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            format!("{}/.config", home)
        });
    PathBuf::from(base).join("lagos-weekender")
}

fn render(ctrl: &SearchController) {
    match ctrl.state() {
        SearchState::Idle => println!("  (type to search creators)"),
        SearchState::Loading { query } => println!("  searching \"{}\"...", query),
        SearchState::Error { message, .. } => println!("  {}  [:retry]", message),
        SearchState::Success { query, page } => {
            if page.creators.is_empty() {
                println!("  no creators found for \"{}\"", query);
            }
            for (i, creator) in page.creators.iter().enumerate() {
                let marker = if ctrl.selected_index() == i as isize { '>' } else { ' ' };
                let badge = if creator.verified == Some(true) { " [verified]" } else { "" };
                let followers = creator
                    .follower_count
                    .map(|n| format!(" ({} followers)", n))
                    .unwrap_or_default();
                println!("{} {}{}{} - {}", marker, creator.name, badge, followers, creator.description);
            }
            if page.has_more {
                println!("    ... {} creators in total", page.total_count);
            }
        }
    }
    if !ctrl.query().is_empty() {
        let marker = if ctrl.selected_index() == ctrl.results().len() as isize { '>' } else { ' ' };
        println!("{} search everywhere for \"{}\"", marker, ctrl.query());
    }
}

/// Carries out a key action. Returns false when the modal closes.
fn perform(action: KeyAction, site_url: &str) -> bool {
    match action {
        KeyAction::None => true,
        KeyAction::SelectCreator(creator) => {
            println!("selected creator {} ({})", creator.name, creator.id);
            false
        }
        KeyAction::GlobalSearch { query } => {
            println!("{}{}", site_url.trim_end_matches('/'), global_search_path(&query));
            false
        }
        KeyAction::Close => false,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn,weekender_lib=info"),
    )
    .init();

    let args = Args::parse();

    // ── Config ──
    let config_path = match args.config {
        Some(path) => path,
        None => {
            let dir = get_config_dir();
            std::fs::create_dir_all(&dir).ok();
            dir.join("config.json")
        }
    };
    let mut config = config::load_config(&config_path);
    if let Some(endpoint) = args.endpoint {
        config.provider.endpoint = endpoint;
    }
    if let Some(ms) = args.debounce_ms {
        config.debounce_ms = ms;
    }
    info!("Searching creators via {}", config.provider.endpoint);

    // ── Tokio runtime ──
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        let provider = Arc::new(HttpSearchProvider::new(config.provider.clone()));
        let mut ctrl = SearchController::new(provider, config.debounce(), Handle::current());
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        render(&ctrl);
        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match parse_input(&line) {
                        Input::Query(text) => ctrl.submit_query_change(text),
                        Input::Key(key) => {
                            if !perform(ctrl.handle_key(key), &config.site_url) {
                                break;
                            }
                        }
                        Input::Pick(n) => {
                            if !perform(ctrl.select(n), &config.site_url) {
                                break;
                            }
                        }
                        Input::Retry => ctrl.retry(),
                        Input::Quit => break,
                        Input::Unknown(cmd) => {
                            println!("unknown command: {}", cmd);
                            continue;
                        }
                    }
                    render(&ctrl);
                }
                applied = ctrl.tick(), if ctrl.is_pending() => {
                    if applied {
                        render(&ctrl);
                    }
                }
            }
        }

        ctrl.dispose();
        debug!("Search modal closed");
        Ok::<(), anyhow::Error>(())
    })
}
