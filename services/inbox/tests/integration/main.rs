
mod conversation_test;
mod handler_test;
mod ingest_test;
mod record_test;
mod status_test;
