pub mod content_client;
pub mod model;

pub use content_client::*;
pub use model::*;
