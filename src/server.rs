use crate::tile;
use actix_web::middleware::DefaultHeaders;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use log::{error, info};
use std::fs;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        // Anything under /tile that is not three integer segments gets the
        // malformed-tile response rather than a plain 404.
        web::scope("/tile")
            .service(tile::get_tile)
            .default_service(web::route().to(tile::malformed_tile)),
    )
    .service(frontpage)
    .default_service(web::route().to(not_found));
}

/// Permissive CORS on every response, whichever route produced it.
pub fn default_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Request-Method", "*"))
        .add(("Access-Control-Allow-Methods", "OPTIONS, GET"))
        .add(("Access-Control-Allow-Headers", "*"))
}

#[actix_web::get("/")]
async fn frontpage() -> impl Responder {
    match fs::read("static/index.html") {
        Ok(bytes) => {
            info!("Serving the frontpage");

            HttpResponse::Ok()
                .insert_header(("Content-Type", "text/html"))
                .body(bytes)
        }
        Err(err) => {
            error!("could not read static/index.html: {}", err);

            HttpResponse::InternalServerError()
                .insert_header(("Content-Type", "text/plain"))
                .body("Front page unavailable")
        }
    }
}

async fn not_found(req: HttpRequest) -> impl Responder {
    error!("page does not exist: {}", req.uri());

    HttpResponse::NotFound()
        .insert_header(("Content-Type", "text/plain"))
        .body("Page does not exist")
}
