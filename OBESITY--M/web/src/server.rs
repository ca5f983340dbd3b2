//! axum routes for the patient form.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use obesity_inference::{
    record::export::{EXPORT_CONTENT_TYPE, EXPORT_FILE_NAME},
    AppConfig, ArtifactStore, PredictionPipeline, PredictorError, PredictorTelemetry, RawInputs,
};
use serde_json::json;
use shared_logging::LogLevel;

use crate::render::{render_page, Outcome};

/// State shared by every request. The pipeline holds the read-only store.
#[derive(Debug, Clone)]
pub struct AppState {
    pipeline: PredictionPipeline,
    telemetry: PredictorTelemetry,
}

impl AppState {
    /// Wraps a loaded store.
    #[must_use]
    pub fn new(store: Arc<ArtifactStore>, telemetry: PredictorTelemetry) -> Self {
        Self {
            pipeline: PredictionPipeline::new(store).with_telemetry(telemetry.clone()),
            telemetry,
        }
    }

    fn store(&self) -> &ArtifactStore {
        self.pipeline.store()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict))
        .route("/export", post(export))
        .route("/health", get(health))
        .with_state(state)
}

/// Loads artifacts, binds the listener and serves until interrupted.
/// Artifact load failures abort start-up.
pub async fn serve(config: &AppConfig) -> Result<()> {
    let telemetry = build_telemetry(config)?;
    let paths = config.artifacts.paths();
    let store = match ArtifactStore::load(&paths).map_err(PredictorError::from) {
        Ok(store) => Arc::new(store),
        Err(err) => {
            let _ = telemetry.log(
                LogLevel::Error,
                "artifacts.load_failed",
                json!({
                    "kind": err.kind(),
                    "recoverable": err.is_recoverable(),
                    "error": err.to_string(),
                }),
            );
            return Err(err).context("Erro ao carregar arquivos");
        }
    };
    let _ = telemetry.log(
        LogLevel::Info,
        "artifacts.loaded",
        json!({
            "dir": config.artifacts.dir,
            "classes": store.label_encoder().classes(),
        }),
    );

    let app = router(AppState::new(store, telemetry.clone()));
    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("binding {}", config.server.bind))?;
    println!("obesity predictor listening on http://{}", config.server.bind);
    let _ = telemetry.log(
        LogLevel::Info,
        "server.started",
        json!({ "bind": config.server.bind }),
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving http")?;
    let _ = telemetry.log(LogLevel::Info, "server.stopped", json!({}));
    Ok(())
}

/// Telemetry handle from the logging section of the config.
pub fn build_telemetry(config: &AppConfig) -> Result<PredictorTelemetry> {
    match &config.logging.path {
        Some(path) => PredictorTelemetry::builder("web")
            .log_path(path)
            .build()
            .with_context(|| format!("opening log {}", path.display())),
        None => Ok(PredictorTelemetry::disabled("web")),
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        eprintln!("failed to listen for shutdown signal: {err}");
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(state.store(), &RawInputs::new(), &Outcome::Empty))
}

async fn predict(State(state): State<AppState>, Form(raw): Form<RawInputs>) -> Response {
    match state.pipeline.run(&raw) {
        Ok(report) => {
            println!("{}", report.summary());
            Html(render_page(state.store(), &raw, &Outcome::Report(&report))).into_response()
        }
        Err(err) => {
            let page = render_page(state.store(), &raw, &Outcome::Failure(err.to_string()));
            (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response()
        }
    }
}

async fn export(State(state): State<AppState>, Form(raw): Form<RawInputs>) -> Response {
    let record = match state.pipeline.assemble(&raw) {
        Ok(record) => record,
        Err(err) => return (StatusCode::UNPROCESSABLE_ENTITY, err.to_string()).into_response(),
    };
    match record.to_csv() {
        Ok(body) => {
            let _ = state.telemetry.log(
                LogLevel::Info,
                "record.exported",
                json!({ "columns": record.len() }),
            );
            (
                [
                    (header::CONTENT_TYPE, format!("{EXPORT_CONTENT_TYPE}; charset=utf-8")),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{EXPORT_FILE_NAME}\""),
                    ),
                ],
                body,
            )
                .into_response()
        }
        Err(err) => {
            let _ = state.telemetry.log(
                LogLevel::Error,
                "record.export_failed",
                json!({ "error": format!("{err:#}") }),
            );
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use obesity_inference::record::assembler::default_inputs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn state() -> AppState {
        let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../inference/dataset");
        let store = Arc::new(ArtifactStore::load_dir(dir).unwrap());
        AppState::new(store, PredictorTelemetry::disabled("web"))
    }

    async fn body_text(body: Body) -> String {
        let bytes = to_bytes(body, usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn index_renders_form() {
        let Html(page) = index(State(state())).await;
        assert!(page.contains("action=\"/predict\""));
        assert!(!page.contains("Predição concluída"));
    }

    #[tokio::test]
    async fn predict_renders_report() {
        let state = state();
        let raw = default_inputs(state.store().vocabulary())
            .with("Height", "1.60")
            .with("Weight", "100");
        let response = predict(State(state), Form(raw)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page = body_text(response.into_body()).await;
        assert!(page.contains("<b>39.06</b>"));
        assert!(page.contains("Obesidade Tipo II"));
    }

    #[tokio::test]
    async fn invalid_submission_keeps_the_form_usable() {
        let state = state();
        let raw = default_inputs(state.store().vocabulary()).with("CALC", "Daily");
        let response = predict(State(state.clone()), Form(raw)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let page = body_text(response.into_body()).await;
        assert!(page.contains("Erro ao processar predição"));
        assert!(page.contains("action=\"/predict\""));

        let retry = default_inputs(state.store().vocabulary());
        let response = predict(State(state), Form(retry)).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn export_returns_csv_attachment() {
        let state = state();
        let raw = default_inputs(state.store().vocabulary());
        let response = export(State(state), Form(raw)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert_eq!(disposition, "attachment; filename=\"dados_paciente.csv\"");
        let csv = body_text(response.into_body()).await;
        assert!(csv.starts_with("Gender,Age,Height,Weight,"));
        assert_eq!(csv.lines().count(), 2);
    }

    #[tokio::test]
    async fn export_rejects_incomplete_records() {
        let mut raw = default_inputs(state().store().vocabulary());
        raw.remove("Age");
        let response = export(State(state()), Form(raw)).await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn serve_fails_fast_without_artifacts() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::default();
        config.artifacts.dir = dir.path().to_path_buf();
        config.logging.path = Some(dir.path().join("web.log.jsonl"));
        let err = serve(&config).await.unwrap_err();
        assert!(err.to_string().contains("Erro ao carregar arquivos"));
        let records = shared_logging::read_records(dir.path().join("web.log.jsonl")).unwrap();
        assert_eq!(records[0].message, "artifacts.load_failed");
        assert_eq!(records[0].metadata["kind"], "artifact_load");
        assert_eq!(records[0].metadata["recoverable"], false);
    }
}
