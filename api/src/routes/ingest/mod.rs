pub mod ingest_route;
