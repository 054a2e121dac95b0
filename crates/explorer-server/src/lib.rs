//! Bundestag explorer HTTP server: proxies DIP and Gemini for the browser
//! console and serves the stored settings.

pub mod error;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
