use uuid::Uuid;

/// Deterministic UUIDv5 for a chunk, so re-ingesting a file overwrites its vectors.
pub fn chunk_id(source: &str, page: usize, ordinal: usize) -> String {
    stable_uuid(&format!("{source}#p{page}#c{ordinal}")).to_string()
}

/// Deterministic UUIDv5 from an arbitrary string id.
pub fn stable_uuid(id: &str) -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, id.as_bytes())
}
