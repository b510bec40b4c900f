//! Application route handlers
//!
//! Registers the gateway's routes on the dispatch engine.

pub mod gen;
pub mod index;

use crate::config::AppState;
use crate::router::Router;

/// Register every application route.
pub fn register_routes(router: Router<AppState>) -> Router<AppState> {
    router
        .post("/gen/", gen::handle_generate)
        .get("/", index::homepage)
}
