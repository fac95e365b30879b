pub mod query_server;
pub mod state;
mod query_handler;
mod http;

pub use query_server::QueryServer;
pub use query_handler::query_handler;
pub use state::AppState;
pub use http::{error_response, json_response, success_response};
