//! A stand-in search backend served by actix-web on an ephemeral port.
#![allow(dead_code)]

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};

pub const CAT_IMAGE: &[u8] = b"\x89PNG\r\n\x1a\ncat";

async fn search_text(body: web::Json<Value>) -> HttpResponse {
    let query = body["query"].as_str().unwrap_or_default();
    let top_k = body["top_k"].as_u64().unwrap_or_default();
    match query {
        "cat" => HttpResponse::Ok().json(json!({
            "results": [{"image_url": "img/1.png", "caption": "cat", "score": 0.98}],
            "query_time": 12.3
        })),
        "bad" => HttpResponse::BadRequest().json(json!({"error": "bad request"})),
        "silent" => HttpResponse::InternalServerError().json(json!({"detail": "no error field"})),
        "html" => HttpResponse::BadGateway()
            .content_type("text/html")
            .body("<html>bad gateway</html>"),
        "garbled" => HttpResponse::Ok().content_type("application/json").body("{\"results\": ["),
        other => HttpResponse::Ok().json(json!({
            "results": [{"caption": format!("{}|{}", other, top_k)}],
            "query_time": 0.5
        })),
    }
}

/// Checks the upload by hand so the mock needs no multipart crate.
async fn search_image(req: HttpRequest, body: web::Bytes) -> HttpResponse {
    let content_type = req
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !content_type.starts_with("multipart/form-data") {
        return HttpResponse::BadRequest().json(json!({"error": "expected multipart"}));
    }

    let raw = String::from_utf8_lossy(&body);
    if !raw.contains("name=\"file\"") {
        return HttpResponse::BadRequest().json(json!({"error": "missing file field"}));
    }
    let filename = raw
        .split("filename=\"")
        .nth(1)
        .and_then(|rest| rest.split('"').next())
        .unwrap_or_default()
        .to_string();
    let part_type = if raw.contains("image/png") {
        "image/png"
    } else if raw.contains("image/jpeg") {
        "image/jpeg"
    } else {
        "unknown"
    };

    HttpResponse::Ok().json(json!({
        "results": [
            {"image_url": "img/1.png", "caption": format!("{} as {}", filename, part_type), "score": 0.5},
            {"caption": "second"}
        ],
        "query_time": 3.0
    }))
}

async fn image(path: web::Path<String>) -> HttpResponse {
    match path.as_str() {
        "1.png" => HttpResponse::Ok().content_type("image/png").body(CAT_IMAGE),
        _ => HttpResponse::NotFound().finish(),
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({"status": "ok", "model": "clip-vit"}))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/search-text", web::post().to(search_text))
        .route("/search-image", web::post().to(search_image))
        .route("/img/{name}", web::get().to(image))
        .route("/health", web::get().to(health));
}

/// Starts the mock inside the current actix runtime.
pub async fn start() -> String {
    let server = HttpServer::new(|| App::new().configure(configure))
        .workers(1)
        .bind(("127.0.0.1", 0))
        .unwrap();
    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());
    format!("http://{}", addr)
}

/// Starts the mock on its own thread, for tests that drive the binary.
pub fn start_in_thread() -> String {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        actix_web::rt::System::new().block_on(async move {
            let server = HttpServer::new(|| App::new().configure(configure))
                .workers(1)
                .bind(("127.0.0.1", 0))
                .unwrap();
            tx.send(server.addrs()[0]).unwrap();
            server.run().await
        })
    });
    format!("http://{}", rx.recv().unwrap())
}

/// A base URL nothing listens on.
pub const DEAD_BACKEND: &str = "http://127.0.0.1:1";
