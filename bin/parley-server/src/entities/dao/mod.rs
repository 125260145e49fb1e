pub mod model;
pub mod thread;

pub use model::ModelConfig;
pub use thread::ThreadDocument;
