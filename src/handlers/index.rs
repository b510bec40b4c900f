//! Landing page

use crate::config::AppState;
use crate::http;
use crate::router::{Context, HandlerResult, Outcome};

const HOMEPAGE: &str = include_str!("../../static/index.html");

pub async fn homepage(_ctx: Context<AppState>) -> HandlerResult {
    Ok(Outcome::Respond(http::build_html_response(HOMEPAGE)))
}
