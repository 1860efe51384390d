use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;

use crate::models::AppState;

#[get("/api/daily-challenge")]
pub async fn daily_challenge(data: web::Data<AppState>) -> impl Responder {
    let today = Utc::now().date_naive();
    let challenge = data.challenges.challenge_for(today, &data.catalog);
    HttpResponse::Ok().json(challenge)
}
