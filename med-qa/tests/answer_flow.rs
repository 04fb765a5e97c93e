use std::{
    io::Cursor,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use ai_llm_service::{
    AiLlmError,
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{ProviderError, ProviderErrorKind},
    service_profiles::LlmServiceProfiles,
};
use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use med_qa::{MedQa, MedQaConfig, MedQaError};
use rag_store::{
    EmbedFuture, EmbeddingsProvider, IndexEntry, IndexFuture, RagConfig, RagHit, RagStore,
    VectorIndex,
};
use serde_json::{Value, json};

const CHUNKS: [&str; 5] = [
    "Anemia is a condition with too few healthy red blood cells.",
    "Iron deficiency is the most common cause of anemia.",
    "Symptoms include fatigue and pale skin.",
    "Treatment depends on the underlying cause.",
    "Iron supplements are often prescribed.",
];

struct ConstEmbedder;

impl EmbeddingsProvider for ConstEmbedder {
    fn embed_batch<'a>(&'a self, texts: &'a [String]) -> EmbedFuture<'a, Vec<Vec<f32>>> {
        let out = texts.iter().map(|_| vec![0.5; 4]).collect();
        Box::pin(async move { Ok(out) })
    }

    fn dimension(&self) -> usize {
        4
    }
}

#[derive(Default)]
struct FiveChunkIndex {
    upserts: Mutex<usize>,
}

impl VectorIndex for FiveChunkIndex {
    fn name(&self) -> &str {
        "fake"
    }

    fn ensure_index<'a>(&'a self, _dimension: usize) -> IndexFuture<'a, ()> {
        Box::pin(async { Ok(()) })
    }

    fn upsert<'a>(&'a self, entries: Vec<IndexEntry>) -> IndexFuture<'a, u64> {
        *self.upserts.lock().unwrap() += 1;
        let n = entries.len() as u64;
        Box::pin(async move { Ok(n) })
    }

    fn query<'a>(&'a self, _vector: Vec<f32>, top_k: u64) -> IndexFuture<'a, Vec<RagHit>> {
        let hits = CHUNKS
            .iter()
            .enumerate()
            .take(top_k as usize)
            .map(|(i, t)| {
                RagHit::from_metadata(
                    format!("c{i}"),
                    0.9 - i as f32 * 0.1,
                    json!({"text": t, "source": "encyclopedia.pdf", "page": i}),
                )
            })
            .collect();
        Box::pin(async move { Ok(hits) })
    }
}

async fn spawn_llm(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let seen: Arc<Mutex<Vec<Value>>> = Arc::default();
    let app = Router::new()
        .route(
            "/openai/v1/chat/completions",
            post(
                move |State(seen): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| {
                    let reply = reply.clone();
                    async move {
                        seen.lock().unwrap().push(body);
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });
    (format!("http://{addr}/openai/v1"), seen)
}

fn service(endpoint: String, pdf_dir: PathBuf) -> (MedQa, Arc<FiveChunkIndex>) {
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
        pdf_dir,
        top_k: 5,
    };

    let index = Arc::new(FiveChunkIndex::default());
    let rag = RagStore::new(rag_cfg, Arc::new(ConstEmbedder), index.clone()).unwrap();
    let llm = Arc::new(LlmServiceProfiles::new(llm_text, None).unwrap());
    (MedQa::with_parts(cfg, rag, llm), index)
}

fn ok_reply() -> Value {
    json!({"choices": [{"message": {"content": "X"}}]})
}

#[tokio::test]
async fn answer_sends_ranked_context_then_question() {
    let (endpoint, seen) = spawn_llm(StatusCode::OK, ok_reply()).await;
    let (qa, _) = service(endpoint, PathBuf::from("unused"));

    let answer = qa.answer("What is anemia?", 5).await.unwrap();
    assert_eq!(answer, "X");

    let bodies = seen.lock().unwrap();
    let body = &bodies[0];
    assert_eq!(body["model"], "meta-llama/llama-4-maverick-17b-128e-instruct");
    assert_eq!(body["max_tokens"], 512);
    assert!((body["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);

    assert_eq!(body["messages"][0]["role"], "system");
    assert_eq!(
        body["messages"][0]["content"],
        "You are a medical assistant. Answer using the given context only."
    );
    let expected = format!("Context:\n{}\n\nQuestion: What is anemia?", CHUNKS.join("\n\n"));
    assert_eq!(body["messages"][1]["role"], "user");
    assert_eq!(body["messages"][1]["content"], expected);
}

#[tokio::test]
async fn k_limits_the_context() {
    let (endpoint, seen) = spawn_llm(StatusCode::OK, ok_reply()).await;
    let (qa, _) = service(endpoint, PathBuf::from("unused"));

    qa.answer("What is anemia?", 2).await.unwrap();

    let user = seen.lock().unwrap()[0]["messages"][1]["content"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(user.contains(CHUNKS[1]));
    assert!(!user.contains(CHUNKS[2]));
}

#[tokio::test]
async fn scored_answer_includes_rouge_and_context() {
    let (endpoint, _) = spawn_llm(StatusCode::OK, ok_reply()).await;
    let (qa, _) = service(endpoint, PathBuf::from("unused"));

    let scored = qa
        .answer_with_score("What is anemia?", Some("x"), 5)
        .await
        .unwrap();
    assert_eq!(scored.answer, "X");
    assert_eq!(scored.context.len(), 5);
    assert_eq!(scored.context[0].text, CHUNKS[0]);
    let scores = scored.scores.unwrap();
    assert_eq!(scores.rouge1.fmeasure, 1.0);
    assert_eq!(scores.rouge_l.fmeasure, 1.0);

    let unscored = qa.answer_with_score("What is anemia?", None, 5).await.unwrap();
    assert!(unscored.scores.is_none());
}

#[tokio::test]
async fn blank_reference_is_treated_as_missing() {
    let (endpoint, seen) = spawn_llm(StatusCode::OK, ok_reply()).await;
    let (qa, _) = service(endpoint, PathBuf::from("unused"));

    for reference in ["", "   \n"] {
        let scored = qa
            .answer_with_score("What is anemia?", Some(reference), 5)
            .await
            .unwrap();
        assert_eq!(scored.answer, "X");
        assert!(scored.scores.is_none());
    }
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn blank_question_is_rejected_before_any_call() {
    let (endpoint, seen) = spawn_llm(StatusCode::OK, ok_reply()).await;
    let (qa, _) = service(endpoint, PathBuf::from("unused"));

    let err = qa.answer("   ", 5).await.unwrap_err();
    assert!(matches!(err, MedQaError::InvalidInput(_)));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn llm_failure_is_surfaced() {
    let (endpoint, _) = spawn_llm(
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({"error": {"message": "boom"}}),
    )
    .await;
    let (qa, _) = service(endpoint, PathBuf::from("unused"));

    let err = qa.answer("What is anemia?", 5).await.unwrap_err();
    assert!(matches!(
        err,
        MedQaError::Llm(AiLlmError::Provider(ProviderError {
            kind: ProviderErrorKind::HttpStatus(_),
            ..
        }))
    ));
}

#[tokio::test]
async fn image_is_sent_as_jpeg_data_uri_without_temperature() {
    let (endpoint, seen) = spawn_llm(StatusCode::OK, ok_reply()).await;
    let (qa, _) = service(endpoint, PathBuf::from("unused"));

    let mut png = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(8, 8, image::Rgb([10, 120, 200])))
        .write_to(&mut png, image::ImageFormat::Png)
        .unwrap();

    let analysis = qa.analyze_image(png.into_inner()).await.unwrap();
    assert_eq!(analysis, "X");

    let body = &seen.lock().unwrap()[0];
    assert!(body.get("temperature").is_none());
    assert_eq!(body["max_tokens"], 512);
    assert_eq!(body["messages"][0]["content"], "Analyze the image medically.");
    let url = body["messages"][1]["content"][0]["image_url"]["url"]
        .as_str()
        .unwrap();
    assert!(url.starts_with("data:image/jpeg;base64,"));
}

#[tokio::test]
async fn undecodable_image_is_rejected() {
    let (endpoint, seen) = spawn_llm(StatusCode::OK, ok_reply()).await;
    let (qa, _) = service(endpoint, PathBuf::from("unused"));

    let err = qa.analyze_image(b"GIF89a-but-not-really".to_vec()).await.unwrap_err();
    assert!(matches!(err, MedQaError::Image(_)));
    assert!(seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn ingesting_empty_directory_writes_nothing() {
    let (endpoint, _) = spawn_llm(StatusCode::OK, ok_reply()).await;
    let dir = tempfile::tempdir().unwrap();
    let (qa, index) = service(endpoint, dir.path().to_path_buf());

    let stats = qa.ingest().await.unwrap();
    assert_eq!(stats.upserted, 0);
    assert_eq!(stats.files, 0);
    assert_eq!(*index.upserts.lock().unwrap(), 0);
}
