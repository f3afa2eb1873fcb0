pub mod conversation;
pub mod realtime;
pub mod webhook;
