pub mod conversation;
pub mod ingest;
pub mod record;
pub mod resolve;
pub mod status;
