pub mod deliver;
pub mod publish;
pub mod subscription;
pub mod sweep;
