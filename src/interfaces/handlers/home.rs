use actix_web::{get, web, HttpResponse, Responder};
use std::env;

use crate::AppState;

#[get("/")]
pub async fn home(state: web::Data<AppState>) -> impl Responder {
    let brand = &state.config.brand;

    HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Welcome to the {} API!", state.config.name),
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION"),
        "brand": brand.name,
        "tagline": brand.tagline,
        "location": brand.location,
        "site": state.config.site_base(),
    }))
}
