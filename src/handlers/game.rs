use actix_web::{get, post, web, HttpResponse, Responder};
use log::info;

use crate::models::{AppState, HintResponse, StartRequest, WordRequest};
use crate::services::scheduler::{run_presentation, run_round_clock};

fn no_session(user_id: &str) -> HttpResponse {
    HttpResponse::NotFound().body(format!("No game session for '{}'", user_id))
}

#[post("/api/game/start")]
pub async fn start_game(
    data: web::Data<AppState>,
    body: Option<web::Json<StartRequest>>,
) -> impl Responder {
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    let state = data
        .hub
        .start(request.user_id.as_deref(), request.username.as_deref());

    run_presentation(data.hub.clone(), state.user_id.clone(), state.epoch);
    HttpResponse::Ok().json(state)
}

#[get("/api/game/{user_id}")]
pub async fn game_state(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let user_id = path.into_inner();
    match data.hub.snapshot(&user_id) {
        Some(state) => HttpResponse::Ok().json(state),
        None => no_session(&user_id),
    }
}

#[post("/api/game/{user_id}/word")]
pub async fn submit_word(
    data: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<WordRequest>,
) -> impl Responder {
    let user_id = path.into_inner();
    let Some(outcome) = data.hub.submit(&user_id, &body.word) else {
        return no_session(&user_id);
    };

    if outcome.level_complete {
        info!("{} completed a level, now on level {}", user_id, outcome.state.level);
        run_presentation(data.hub.clone(), user_id, outcome.state.epoch);
    }
    HttpResponse::Ok().json(outcome)
}

#[post("/api/game/{user_id}/ready")]
pub async fn presentation_complete(
    data: web::Data<AppState>,
    path: web::Path<String>,
) -> impl Responder {
    let user_id = path.into_inner();
    let Some((started, state)) = data.hub.ready(&user_id) else {
        return no_session(&user_id);
    };

    if started {
        run_round_clock(data.hub.clone(), user_id, state.epoch);
    }
    HttpResponse::Ok().json(state)
}

#[get("/api/game/{user_id}/hint")]
pub async fn hint(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let user_id = path.into_inner();
    match data.hub.hint(&user_id) {
        Some(hint) => HttpResponse::Ok().json(HintResponse { hint }),
        None => no_session(&user_id),
    }
}

#[get("/api/game/{user_id}/result")]
pub async fn last_result(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let user_id = path.into_inner();
    match data.hub.last_result(&user_id) {
        Some(result) => HttpResponse::Ok().json(result),
        None => HttpResponse::NotFound().finish(),
    }
}
