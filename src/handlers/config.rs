use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use log::info;
use std::collections::HashMap;

use crate::models::{AppState, ConfigResponse, HealthResponse};
use crate::services::catalog::Difficulty;
use crate::services::validator::MIN_WORD_LEN;

#[get("/api/config")]
pub async fn get_config(data: web::Data<AppState>) -> impl Responder {
    let timings = data.hub.timings();
    let difficulties: HashMap<String, usize> = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        .into_iter()
        .map(|d| (d.to_string(), data.catalog.count_by_difficulty(d)))
        .collect();

    info!(
        "Serving config: {}s rounds over {} target words",
        data.hub.round_secs(),
        data.catalog.len()
    );

    HttpResponse::Ok().json(ConfigResponse {
        round_seconds: data.hub.round_secs(),
        word_display_millis: timings.word_display.as_millis() as u64,
        countdown_millis: timings.countdown.as_millis() as u64,
        tick_millis: timings.tick.as_millis() as u64,
        min_word_length: MIN_WORD_LEN,
        target_words: data.catalog.len(),
        difficulties,
    })
}

#[get("/api/health")]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
    })
}
