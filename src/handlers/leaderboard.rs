use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::Utc;
use log::{info, warn};

use crate::models::{
    AppState, ErrorResponse, LeaderboardQuery, RankQuery, RankResponse, SubmitResultRequest,
    SubmitResultResponse,
};
use crate::services::leaderboard::TimeFilter;
use crate::services::recorder::LeaderboardEntry;

const DEFAULT_LIMIT: usize = 50;

fn bad_request(error: String) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse { error })
}

#[get("/api/leaderboard")]
pub async fn get_leaderboard(
    data: web::Data<AppState>,
    query: web::Query<LeaderboardQuery>,
) -> impl Responder {
    let filter = match query.time_filter.as_deref() {
        Some(raw) => match raw.parse::<TimeFilter>() {
            Ok(f) => f,
            Err(e) => return bad_request(e),
        },
        None => TimeFilter::default(),
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);

    HttpResponse::Ok().json(data.leaderboard.list(filter, Utc::now(), limit))
}

#[get("/api/leaderboard/stats")]
pub async fn leaderboard_stats(data: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(data.leaderboard.stats())
}

#[get("/api/leaderboard/rank")]
pub async fn leaderboard_rank(
    data: web::Data<AppState>,
    query: web::Query<RankQuery>,
) -> impl Responder {
    let rank = data.leaderboard.rank(query.score, query.level);
    HttpResponse::Ok().json(RankResponse { rank })
}

#[post("/api/submit-result")]
pub async fn submit_result(
    data: web::Data<AppState>,
    body: web::Json<SubmitResultRequest>,
) -> impl Responder {
    let request = body.into_inner();
    let username = request.username.trim();
    let target_word = request.target_word.trim();
    if username.is_empty() || target_word.is_empty() {
        return bad_request("Missing required fields: username, targetWord".to_string());
    }

    let level = request.level.unwrap_or(1);
    let entry = LeaderboardEntry {
        username: username.to_string(),
        score: request.score,
        level,
        target_word: target_word.to_string(),
        timestamp: Utc::now(),
    };

    // A failed snapshot write still leaves the entry on the in-memory board.
    if let Err(e) = data.leaderboard.record(entry) {
        warn!("Failed to persist result for {}: {}", username, e);
    }

    let rank = data.leaderboard.rank(request.score, level);
    info!("{} scored {} on level {} ({}), rank {}", username, request.score, level, target_word, rank);
    HttpResponse::Ok().json(SubmitResultResponse { success: true, rank })
}

#[get("/api/user/{username}")]
pub async fn player_stats(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let username = path.into_inner();
    match data.leaderboard.player_stats(&username) {
        Some(stats) => HttpResponse::Ok().json(stats),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: format!("No games recorded for '{}'", username),
        }),
    }
}
