//! Runtime and index configuration.

use std::time::Duration;

use crate::errors::RagError;

/// Distance function used for the vector space.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DistanceKind {
    /// Cosine distance (what sentence-transformer embeddings are trained for).
    Cosine,
    /// Dot product (useful for normalized vectors).
    Dot,
    /// Euclidean distance (L2).
    Euclid,
}

impl DistanceKind {
    /// Pinecone's `metric` spelling.
    pub fn pinecone_metric(self) -> &'static str {
        match self {
            DistanceKind::Cosine => "cosine",
            DistanceKind::Dot => "dotproduct",
            DistanceKind::Euclid => "euclidean",
        }
    }
}

/// Which hosted vector database backs the index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VectorBackend {
    Pinecone,
    Qdrant,
}

/// Pinecone connectivity and index parameters.
#[derive(Clone, Debug)]
pub struct PineconeConfig {
    /// Control-plane base URL, e.g. `https://api.pinecone.io`.
    pub control_url: String,
    /// API key; `None` lets Pinecone reject the first call.
    pub api_key: Option<String>,
    /// Serverless cloud (`aws`).
    pub cloud: String,
    /// Serverless region (`us-east-1`).
    pub region: String,
    /// Namespace for upserts and queries (empty = default namespace).
    pub namespace: String,
    /// How long to wait for a freshly created index to report `ready`.
    pub ready_timeout: Duration,
    /// Request timeout; `None` keeps the client default.
    pub timeout: Option<Duration>,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            control_url: "https://api.pinecone.io".into(),
            api_key: None,
            cloud: "aws".into(),
            region: "us-east-1".into(),
            namespace: String::new(),
            ready_timeout: Duration::from_secs(120),
            timeout: None,
        }
    }
}

/// Qdrant connectivity parameters.
#[derive(Clone, Debug)]
pub struct QdrantConfig {
    /// gRPC URL, e.g. `http://localhost:6334`.
    pub url: String,
    /// Optional API key for Qdrant Cloud.
    pub api_key: Option<String>,
}

impl Default for QdrantConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:6334".into(),
            api_key: None,
        }
    }
}

/// Configuration for ingestion and retrieval.
#[derive(Clone, Debug)]
pub struct RagConfig {
    /// Vector database backing the index.
    pub backend: VectorBackend,
    /// Index (Pinecone) or collection (Qdrant) name.
    pub index_name: String,
    /// Embedding dimensionality; must match the embedding model.
    pub dimension: usize,
    /// Distance function (Cosine by default).
    pub distance: DistanceKind,
    /// Embedding model name (fastembed).
    pub embedding_model: String,
    /// Texts per embedding call.
    pub embedding_batch: usize,
    /// Vectors per upsert request.
    pub upsert_batch: usize,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Characters shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// File-name glob for the PDF loader.
    pub pdf_glob: String,
    pub pinecone: PineconeConfig,
    pub qdrant: QdrantConfig,
}

impl RagConfig {
    /// Creates a sane default config for a given index name.
    pub fn new_default(index_name: impl Into<String>) -> Self {
        Self {
            backend: VectorBackend::Pinecone,
            index_name: index_name.into(),
            dimension: 384,
            distance: DistanceKind::Cosine,
            embedding_model: "all-MiniLM-L6-v2".into(),
            embedding_batch: 32,
            upsert_batch: 100,
            chunk_size: 500,
            chunk_overlap: 50,
            pdf_glob: "*.pdf".into(),
            pinecone: PineconeConfig::default(),
            qdrant: QdrantConfig::default(),
        }
    }

    /// Builds a config from environment variables on top of [`RagConfig::new_default`].
    ///
    /// API keys are read but never required here.
    ///
    /// # Errors
    /// `RagError::Config` for unknown backends or unparsable numbers.
    pub fn from_env() -> Result<Self, RagError> {
        let mut cfg = Self::new_default(env("PINECONE_INDEX", "medical-chatbot"));

        cfg.backend = match env("VECTOR_BACKEND", "pinecone").to_lowercase().as_str() {
            "pinecone" => VectorBackend::Pinecone,
            "qdrant" => VectorBackend::Qdrant,
            other => {
                return Err(RagError::Config(format!(
                    "VECTOR_BACKEND must be `pinecone` or `qdrant`, got `{other}`"
                )));
            }
        };
        if cfg.backend == VectorBackend::Qdrant {
            cfg.index_name = env("QDRANT_COLLECTION", &cfg.index_name);
        }

        cfg.dimension = parse("EMBEDDING_DIM", cfg.dimension)?;
        cfg.embedding_model = env("EMBEDDING_MODEL", &cfg.embedding_model);
        cfg.embedding_batch = parse("EMBEDDING_BATCH", cfg.embedding_batch)?;
        cfg.upsert_batch = parse("UPSERT_BATCH", cfg.upsert_batch)?;
        cfg.chunk_size = parse("CHUNK_SIZE", cfg.chunk_size)?;
        cfg.chunk_overlap = parse("CHUNK_OVERLAP", cfg.chunk_overlap)?;
        cfg.pdf_glob = env("PDF_GLOB", &cfg.pdf_glob);

        cfg.pinecone = PineconeConfig {
            control_url: env("PINECONE_CONTROL_URL", &cfg.pinecone.control_url),
            api_key: opt_env("PINECONE_API_KEY"),
            cloud: env("PINECONE_CLOUD", &cfg.pinecone.cloud),
            region: env("PINECONE_REGION", &cfg.pinecone.region),
            namespace: env("PINECONE_NAMESPACE", ""),
            ready_timeout: Duration::from_secs(parse("PINECONE_READY_TIMEOUT_SECS", 120u64)?),
            timeout: opt_parse::<u64>("VECTOR_TIMEOUT_SECS")?.map(Duration::from_secs),
        };
        cfg.qdrant = QdrantConfig {
            url: env("QDRANT_URL", &cfg.qdrant.url),
            api_key: opt_env("QDRANT_API_KEY"),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    /// Validates config values.
    pub fn validate(&self) -> Result<(), RagError> {
        if self.index_name.trim().is_empty() {
            return Err(RagError::Config("index name is empty".into()));
        }
        if self.dimension == 0 {
            return Err(RagError::Config("dimension must be > 0".into()));
        }
        if self.upsert_batch == 0 || self.embedding_batch == 0 {
            return Err(RagError::Config("batch sizes must be > 0".into()));
        }
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be > 0".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

fn env(k: &str, dflt: &str) -> String {
    opt_env(k).unwrap_or_else(|| dflt.to_string())
}

fn opt_env(k: &str) -> Option<String> {
    std::env::var(k)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> Result<T, RagError> {
    Ok(opt_parse(k)?.unwrap_or(dflt))
}

fn opt_parse<T: std::str::FromStr>(k: &str) -> Result<Option<T>, RagError> {
    match opt_env(k) {
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|_| RagError::Config(format!("{k} has an invalid value: `{v}`"))),
        None => Ok(None),
    }
}
