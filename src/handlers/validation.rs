use actix_web::{get, web, HttpResponse, Responder};
use crate::models::AppState;
use crate::utils::normalize_word;
use log::info;

fn check_keyword_logic(data: &web::Data<AppState>, target: &str, word: &str) -> HttpResponse {
    let set = match data.catalog.lookup(target) {
        Some(s) => s,
        None => return HttpResponse::BadRequest().body(format!("Target word '{}' not known", target)),
    };

    let word = normalize_word(word);
    if !data.catalog.is_keyword_match(target, &word) {
        info!("Non-keyword queried ({}): {}", set.target_word, word);
        return HttpResponse::NotFound().finish();
    }

    info!("Keyword queried ({}): {}", set.target_word, word);
    HttpResponse::Ok().body(format!("Keyword of {}: {}", set.target_word, word))
}

#[get("/api/keyword/{target}/{word}")]
pub async fn check_keyword(
    data: web::Data<AppState>,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let (target, word) = path.into_inner();
    check_keyword_logic(&data, &target, &word)
}
