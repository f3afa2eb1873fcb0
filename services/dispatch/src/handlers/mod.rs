pub mod log;
pub mod subscription;
