use std::{path::Path, sync::Arc};

use ai_llm_service::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    service_profiles::LlmServiceProfiles,
};
use api::core::app_state::AppState;
use axum::{Json, Router, http::StatusCode, routing::post};
use med_qa::{MedQa, MedQaConfig};
use rag_store::{
    EmbedFuture, EmbeddingsProvider, IndexEntry, IndexFuture, RagConfig, RagHit, RagStore,
    VectorIndex,
};
use serde_json::{Value, json};

struct ConstEmbedder;

impl EmbeddingsProvider for ConstEmbedder {
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>> {
        let out = texts.iter().map(|_| vec![1.0; 4]).collect();
        Box::pin(async move { Ok(out) })
    }

    fn dimension(&self) -> usize {
        4
    }
}

struct OneChunkIndex;

impl VectorIndex for OneChunkIndex {
    fn name(&self) -> &str {
        "fake"
    }

    fn ensure_index<'a>(&'a self, _dimension: usize) -> IndexFuture<'a, ()> {
        Box::pin(async { Ok(()) })
    }

    fn upsert<'a>(&'a self, entries: Vec<IndexEntry>) -> IndexFuture<'a, u64> {
        let n = entries.len() as u64;
        Box::pin(async move { Ok(n) })
    }

    fn query<'a>(&'a self, _vector: Vec<f32>, _top_k: u64) -> IndexFuture<'a, Vec<RagHit>> {
        let hit = RagHit::from_metadata(
            "c0".into(),
            0.8,
            json!({"text": "Fever is a raised body temperature.", "source": "gale.pdf", "page": 3}),
        );
        Box::pin(async move { Ok(vec![hit]) })
    }
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });
    format!("http://{addr}")
}

/// Chat-completions stand-in that always answers with `status` and `reply`.
async fn spawn_llm(status: StatusCode, reply: Value) -> String {
    let app = Router::new().route(
        "/openai/v1/chat/completions",
        post(move |Json(_body): Json<Value>| {
            let reply = reply.clone();
            async move { (status, Json(reply)) }
        }),
    );
    format!("{}/openai/v1", serve(app).await)
}

async fn spawn_api(llm_status: StatusCode, pdf_dir: &Path) -> String {
    let endpoint = spawn_llm(
        llm_status,
        json!({"choices": [{"message": {"content": "fever"}}]}),
    )
    .await;

    let mut rag_cfg = RagConfig::new_default("medical-chatbot");
    rag_cfg.dimension = 4;
    let llm_text = LlmModelConfig {
        provider: LlmProvider::Groq,
        model: "meta-llama/llama-4-maverick-17b-128e-instruct".into(),
        endpoint,
        api_key: Some("gsk_test".into()),
        max_tokens: Some(512),
        temperature: Some(0.2),
        top_p: None,
        timeout_secs: Some(10),
    };
    let cfg = MedQaConfig {
        rag: rag_cfg.clone(),
        llm_text: llm_text.clone(),
        llm_vision: None,
        pdf_dir: pdf_dir.to_path_buf(),
        top_k: 5,
    };
    let rag = RagStore::new(rag_cfg, Arc::new(ConstEmbedder), Arc::new(OneChunkIndex)).unwrap();
    let llm = Arc::new(LlmServiceProfiles::new(llm_text, None).unwrap());
    let qa = Arc::new(MedQa::with_parts(cfg, rag, llm));

    serve(api::router(Arc::new(AppState::new(qa)))).await
}

#[tokio::test]
async fn health_reports_not_ingested_before_first_run() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::OK, dir.path()).await;

    let res = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["ingested"], false);
}

#[tokio::test]
async fn blank_question_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::OK, dir.path()).await;

    let res = reqwest::Client::new()
        .post(format!("{base}/ask"))
        .json(&json!({"question": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
    assert_eq!(body["error"]["details"][0]["path"], "question");
}

#[tokio::test]
async fn zero_k_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::OK, dir.path()).await;

    let res = reqwest::Client::new()
        .post(format!("{base}/ask"))
        .json(&json!({"question": "What is fever?", "k": 0}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn ask_with_reference_returns_answer_scores_and_context() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::OK, dir.path()).await;

    let res = reqwest::Client::new()
        .post(format!("{base}/ask"))
        .json(&json!({"question": "What is fever?", "reference": "fever"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    let data = &body["data"];
    assert_eq!(data["answer"], "fever");
    assert_eq!(data["scores"]["rouge1"]["fmeasure"], 1.0);
    assert_eq!(data["scores"]["rougeL"]["fmeasure"], 1.0);
    assert_eq!(data["context"][0]["source"], "gale.pdf");
    assert_eq!(data["context"][0]["page"], 3);
}

#[tokio::test]
async fn ask_without_reference_omits_scores() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::OK, dir.path()).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/ask"))
        .json(&json!({"question": "What is fever?"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["answer"], "fever");
    assert!(body["data"].get("scores").is_none());
}

#[tokio::test]
async fn empty_reference_omits_scores() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::OK, dir.path()).await;

    let body: Value = reqwest::Client::new()
        .post(format!("{base}/ask"))
        .json(&json!({"question": "What is fever?", "reference": ""}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["answer"], "fever");
    assert!(body["data"].get("scores").is_none());
}

#[tokio::test]
async fn llm_rejection_maps_to_bad_gateway() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::UNAUTHORIZED, dir.path()).await;

    let res = reqwest::Client::new()
        .post(format!("{base}/ask"))
        .json(&json!({"question": "What is fever?"}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 502);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn undecodable_image_is_unprocessable() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::OK, dir.path()).await;

    let part = reqwest::multipart::Part::bytes(b"definitely not a png".to_vec())
        .file_name("scan.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("image", part);

    let res = reqwest::Client::new()
        .post(format!("{base}/analyze_image"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 422);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INVALID_IMAGE");
    assert_eq!(body["error"]["details"][0]["path"], "image");
    assert_eq!(
        body["error"]["details"][0]["hint"],
        api::error_handler::IMAGE_FORMATS_HINT
    );
}

#[tokio::test]
async fn unsupported_image_type_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::OK, dir.path()).await;

    let part = reqwest::multipart::Part::bytes(b"%PDF-1.4".to_vec())
        .file_name("notes.pdf")
        .mime_str("application/pdf")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("image", part);

    let res = reqwest::Client::new()
        .post(format!("{base}/analyze_image"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"]["details"][0]["hint"].as_str().is_some());
}

#[tokio::test]
async fn ingest_runs_once_per_process() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::OK, dir.path()).await;
    let client = reqwest::Client::new();

    let first: Value = client
        .post(format!("{base}/ingest"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["data"]["already_loaded"], false);
    assert_eq!(first["data"]["chunks"], 0);

    let second: Value = client
        .post(format!("{base}/ingest"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["data"]["already_loaded"], true);

    let health: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["data"]["ingested"], true);
}

#[tokio::test]
async fn unknown_route_gets_json_envelope() {
    let dir = tempfile::tempdir().unwrap();
    let base = spawn_api(StatusCode::OK, dir.path()).await;

    let res = reqwest::get(format!("{base}/nope")).await.unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
