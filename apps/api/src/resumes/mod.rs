pub mod backfill;
pub mod handlers;
pub mod ingest;
pub mod validation;
