use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;

use crate::models::{AppState, WordStatsQuery, WordStatsResponse, WordsResponse};
use crate::services::selection::available;

const WORD_LIST_LIMIT: usize = 100;

#[get("/api/word-stats")]
pub async fn word_stats(
    data: web::Data<AppState>,
    query: web::Query<WordStatsQuery>,
) -> impl Responder {
    let user_id = query.user_id.as_deref().unwrap_or("");
    let used = data.tracker.used_words(user_id);
    let today = Utc::now().date_naive();

    HttpResponse::Ok().json(WordStatsResponse {
        total_words: data.catalog.len(),
        available_for_user: available(&data.catalog, &used).len(),
        usage: data.tracker.usage_stats(user_id, today),
    })
}

#[get("/api/words")]
pub async fn list_words(data: web::Data<AppState>) -> impl Responder {
    let entries = data.catalog.all_entries();
    let words = entries
        .iter()
        .take(WORD_LIST_LIMIT)
        .map(|set| set.target_word.clone())
        .collect();

    HttpResponse::Ok().json(WordsResponse { total: entries.len(), words })
}
