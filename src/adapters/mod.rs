// Adapters layer: concrete implementations of the domain ports (http, in-memory doubles).

pub mod http;
pub mod memory;
pub mod roster_client;
pub mod score_poster;
pub mod wire;
