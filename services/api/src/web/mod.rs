pub mod activity;
pub mod books;
pub mod middleware;
pub mod rest;
pub mod state;

// Re-export the router builder to make it easily accessible
// to the binary that will start the web server.
pub use rest::{app_router, ApiDoc};
pub use state::AppState;
