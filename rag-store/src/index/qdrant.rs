//! Thin adapter around `qdrant-client` implementing [`VectorIndex`].
//!
//! Selected with `VECTOR_BACKEND=qdrant`. Keeps the verbose builder API of
//! `qdrant-client` out of the rest of the crate.

use std::collections::HashMap;

use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointId, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QValue, VectorParamsBuilder, point_id::PointIdOptions,
};
use qdrant_client::{Payload, Qdrant};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{IndexFuture, VectorIndex};
use crate::config::{DistanceKind, RagConfig};
use crate::errors::RagError;
use crate::record::{IndexEntry, RagHit};

/// A Qdrant collection used as the vector index.
pub struct QdrantIndex {
    client: Qdrant,
    collection: String,
    distance: DistanceKind,
}

impl QdrantIndex {
    /// Creates the client; no network traffic happens until the first call.
    pub fn new(cfg: &RagConfig) -> Result<Self, RagError> {
        let mut builder = Qdrant::from_url(&cfg.qdrant.url);
        if let Some(key) = &cfg.qdrant.api_key {
            builder = builder.api_key(key.clone());
        }
        let client = builder
            .build()
            .map_err(|e| RagError::Qdrant(e.to_string()))?;

        Ok(Self {
            client,
            collection: cfg.index_name.clone(),
            distance: cfg.distance,
        })
    }
}

impl VectorIndex for QdrantIndex {
    fn name(&self) -> &str {
        &self.collection
    }

    fn ensure_index<'a>(&'a self, dimension: usize) -> IndexFuture<'a, ()> {
        Box::pin(async move {
            match self.client.collection_info(&self.collection).await {
                Ok(_) => {
                    debug!(collection = %self.collection, "collection already exists");
                    return Ok(());
                }
                Err(err) => {
                    warn!(collection = %self.collection, error = %err, "collection not found, creating");
                }
            }

            let distance = match self.distance {
                DistanceKind::Cosine => Distance::Cosine,
                DistanceKind::Dot => Distance::Dot,
                DistanceKind::Euclid => Distance::Euclid,
            };

            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection)
                        .vectors_config(VectorParamsBuilder::new(dimension as u64, distance)),
                )
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;

            info!(collection = %self.collection, dimension, "collection created");
            Ok(())
        })
    }

    fn upsert<'a>(&'a self, entries: Vec<IndexEntry>) -> IndexFuture<'a, u64> {
        Box::pin(async move {
            if entries.is_empty() {
                return Ok(0);
            }
            let count = entries.len() as u64;

            let mut points = Vec::with_capacity(entries.len());
            for e in entries {
                let payload =
                    Payload::try_from(e.metadata).map_err(|err| RagError::Qdrant(err.to_string()))?;
                points.push(PointStruct::new(e.id, e.values, payload));
            }

            self.client
                .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;

            debug!(collection = %self.collection, count, "upserted points");
            Ok(count)
        })
    }

    fn query<'a>(&'a self, vector: Vec<f32>, top_k: u64) -> IndexFuture<'a, Vec<RagHit>> {
        Box::pin(async move {
            let res = self
                .client
                .search_points(
                    SearchPointsBuilder::new(&self.collection, vector, top_k).with_payload(true),
                )
                .await
                .map_err(|e| RagError::Qdrant(e.to_string()))?;

            Ok(res
                .result
                .into_iter()
                .map(|p| RagHit::from_metadata(point_id_string(p.id), p.score, qpayload_to_json(p.payload)))
                .collect())
        })
    }
}

fn point_id_string(id: Option<PointId>) -> String {
    match id.and_then(|p| p.point_id_options) {
        Some(PointIdOptions::Uuid(s)) => s,
        Some(PointIdOptions::Num(n)) => n.to_string(),
        None => String::new(),
    }
}

/// Converts a Qdrant payload (`HashMap<String, qdrant::Value>`) into JSON.
fn qpayload_to_json(p: HashMap<String, QValue>) -> Value {
    Value::Object(p.into_iter().map(|(k, v)| (k, qvalue_to_json(v))).collect())
}

fn qvalue_to_json(v: QValue) -> Value {
    use qdrant_client::qdrant::value::Kind as K;
    match v.kind {
        Some(K::StringValue(s)) => Value::String(s),
        Some(K::IntegerValue(i)) => Value::Number(i.into()),
        Some(K::DoubleValue(f)) => serde_json::json!(f),
        Some(K::BoolValue(b)) => Value::Bool(b),
        Some(K::ListValue(l)) => Value::Array(l.values.into_iter().map(qvalue_to_json).collect()),
        Some(K::StructValue(s)) => qpayload_to_json(s.fields),
        Some(K::NullValue(_)) | None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qdrant_client::qdrant::value::Kind;

    fn s(v: &str) -> QValue {
        QValue {
            kind: Some(Kind::StringValue(v.into())),
        }
    }

    #[test]
    fn payload_converts_to_json() {
        let mut p = HashMap::new();
        p.insert("text".to_string(), s("Anemia is..."));
        p.insert(
            "page".to_string(),
            QValue {
                kind: Some(Kind::IntegerValue(4)),
            },
        );
        let json = qpayload_to_json(p);
        assert_eq!(json["text"], "Anemia is...");
        assert_eq!(json["page"], 4);
    }

    #[test]
    fn uuid_point_ids_are_stringified() {
        let id = PointId {
            point_id_options: Some(PointIdOptions::Uuid("abc".into())),
        };
        assert_eq!(point_id_string(Some(id)), "abc");
        assert_eq!(point_id_string(None), "");
    }
}
