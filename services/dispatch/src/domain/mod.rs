pub mod repository;
pub mod retry;
pub mod types;
