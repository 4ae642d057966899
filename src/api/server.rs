//! HTTP server for the reconciliation API.
//!
//! Thin serving layer around the synchronous pipeline: it collects the three
//! uploads, runs the pipeline once per request, and streams nothing across
//! requests. All table state is request-local.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                              |
//! |--------|-------------------|------------------------------------------|
//! | GET    | `/health`         | Health check                             |
//! | POST   | `/api/process`    | Upload Dock + Matera + Depara, get xlsx  |
//! | GET    | `/api/logs`       | SSE stream for real-time logs            |

use axum::{
    extract::Multipart,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{bad_request, error_response, summary_header, XLSX_CONTENT_TYPE};
use crate::pipeline::{self, OUTPUT_FILE_NAME};

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_DISPOSITION]);

    let app = Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/process", post(process_uploads))
        .route("/api/logs", get(sse_logs))
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Conciliator server running on http://localhost:{}", port);
    println!("   POST /api/process - Upload Dock, Matera and Depara files");
    println!("   GET  /api/logs    - SSE log stream");
    println!("   GET  /health      - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "conciliator",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "process": "POST /api/process",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: three multipart files in, one workbook out.
async fn process_uploads(
    mut multipart: Multipart,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let mut dock: Option<Vec<u8>> = None;
    let mut matera: Option<Vec<u8>> = None;
    let mut depara: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(bad_request(&format!("Multipart error: {}", e))),
        )
    })? {
        let name = field.name().unwrap_or("").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    Json(bad_request(&format!("Read error: {}", e))),
                )
            })?
            .to_vec();

        match name.as_str() {
            "dock_file" => dock = Some(bytes),
            "matera_file" => matera = Some(bytes),
            "depara_file" => depara = Some(bytes),
            _ => {}
        }
    }

    let dock = dock.ok_or_else(|| missing_field("dock_file"))?;
    let matera = matera.ok_or_else(|| missing_field("matera_file"))?;
    let depara = depara.ok_or_else(|| missing_field("depara_file"))?;

    println!("\n📄 NEW UPLOAD: dock {}B, matera {}B, depara {}B", dock.len(), matera.len(), depara.len());

    let output = pipeline::run(&dock, &matera, &depara).map_err(|e| {
        log_error(format!("Pipeline error: {}", e));
        (StatusCode::UNPROCESSABLE_ENTITY, Json(error_response(&e)))
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE));
    if let Ok(value) = HeaderValue::from_str(&summary_header(&output.summary)) {
        headers.insert("x-row-summary", value);
    }
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", OUTPUT_FILE_NAME))
            .map_err(|e| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(bad_request(&e.to_string())),
                )
            })?,
    );

    Ok((headers, output.workbook).into_response())
}

fn missing_field(name: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(bad_request(&format!("Missing file field: {}", name))),
    )
}
