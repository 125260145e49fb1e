pub mod chat;
pub mod common;
pub mod model;
pub mod thread;
