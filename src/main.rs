use actix_web::{web, App, HttpServer};
use clap::{value_parser, Arg, Command};
use log::info;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

mod handlers;
mod models;
mod services;
mod utils;

use handlers::challenge::daily_challenge;
use handlers::config::{get_config, health};
use handlers::game::{game_state, hint, last_result, presentation_complete, start_game, submit_word};
use handlers::leaderboard::{
    get_leaderboard, leaderboard_rank, leaderboard_stats, player_stats, submit_result,
};
use handlers::stats::{list_words, word_stats};
use handlers::validation::check_keyword;
use models::AppState;
use services::challenge::ChallengeBoard;
use services::leaderboard::{LeaderboardStore, MemoryLeaderboard};
use services::round::ROUND_DURATION_SECS;
use services::sessions::{HubConfig, SessionHub};
use services::word_loader::load_catalog_or_builtin;
use services::word_tracker::{MemoryWordTracker, UsedWordStore};

// Log to the given file in append mode, or to stderr
fn init_logging(log_file: Option<&String>) -> std::io::Result<()> {
    if let Some(file) = log_file {
        let log_output = OpenOptions::new().create(true).append(true).open(file)?;

        env_logger::Builder::from_default_env()
            .target(env_logger::Target::Pipe(Box::new(log_output)))
            .init();
    } else {
        env_logger::init();
    }
    Ok(())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let matches = Command::new("typeabout")
        .version("0.1")
        .about("Word association game service for Type About")
        .arg(
            Arg::new("listen-host")
                .long("listen-host")
                .num_args(1)
                .default_value("0.0.0.0:2345")
                .help("Specify the listen address (e.g., 0.0.0.0:2345)"),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .num_args(1)
                .help("Specify a log file path (if omitted, logs to stderr)"),
        )
        .arg(
            Arg::new("catalog")
                .long("catalog")
                .num_args(1)
                .help("JSON keyword catalog (if omitted, the built-in catalog is used)"),
        )
        .arg(
            Arg::new("round-seconds")
                .long("round-seconds")
                .num_args(1)
                .value_parser(value_parser!(u32).range(1..))
                .default_value("20")
                .help("Length of one level in seconds"),
        )
        .arg(
            Arg::new("leaderboard-file")
                .long("leaderboard-file")
                .num_args(1)
                .help("Mirror the leaderboard to this JSON file"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .num_args(1)
                .value_parser(value_parser!(u64))
                .help("Seed word selection for reproducible sessions"),
        )
        .get_matches();

    let listen_host = matches
        .get_one::<String>("listen-host")
        .cloned()
        .unwrap_or_else(|| "0.0.0.0:2345".to_string());
    let log_file = matches.get_one::<String>("log-file");
    let catalog_path = matches.get_one::<String>("catalog");
    let round_secs = matches
        .get_one::<u32>("round-seconds")
        .copied()
        .unwrap_or(ROUND_DURATION_SECS);
    let leaderboard_file = matches.get_one::<String>("leaderboard-file");
    let seed = matches.get_one::<u64>("seed").copied();

    init_logging(log_file)?;

    let catalog = Arc::new(load_catalog_or_builtin(catalog_path.map(String::as_str)));
    let tracker: Arc<dyn UsedWordStore> = Arc::new(MemoryWordTracker::new());
    let leaderboard: Arc<dyn LeaderboardStore> = match leaderboard_file {
        Some(path) => Arc::new(MemoryLeaderboard::with_snapshot(PathBuf::from(path))),
        None => Arc::new(MemoryLeaderboard::new()),
    };
    let hub = Arc::new(SessionHub::new(
        catalog.clone(),
        tracker.clone(),
        leaderboard.clone(),
        HubConfig { round_secs, seed, ..HubConfig::default() },
    ));

    let state = AppState {
        catalog,
        tracker,
        leaderboard,
        hub,
        challenges: ChallengeBoard::new(seed),
    };
    let shared_state = web::Data::new(state);

    info!("Listening on {} with {}s rounds", listen_host, round_secs);

    HttpServer::new(move || {
        App::new()
            .app_data(shared_state.clone())
            .service(start_game)
            .service(game_state)
            .service(submit_word)
            .service(presentation_complete)
            .service(hint)
            .service(last_result)
            .service(check_keyword)
            .service(daily_challenge)
            .service(get_leaderboard)
            .service(leaderboard_stats)
            .service(leaderboard_rank)
            .service(submit_result)
            .service(player_stats)
            .service(word_stats)
            .service(list_words)
            .service(get_config)
            .service(health)
    })
    .bind(&listen_host)?
    .run()
    .await
}
