pub mod analyze_image;
pub mod ask;
pub mod health_route;
pub mod ingest;
