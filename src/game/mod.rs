pub mod content;
pub mod difficulty;
pub mod round_engine;
pub mod scoring;
pub mod session;
pub mod stats_store;

pub use round_engine::RoundEngine;
pub use session::GameSession;
