//! Save generation endpoint
//!
//! `POST /gen/` — verifies the captcha when enabled, validates the
//! submitted stats bundle, deduplicates by player name through the store
//! collaborator, and answers a `{code, ...}` JSON envelope.

use serde_json::json;

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::router::{Context, HandlerResult, Outcome, RouterError};
use crate::save::store::{now_millis, GenRecord};
use crate::save::SavePayload;

fn reject(detail: &str) -> Outcome {
    Outcome::Respond(http::build_json_response(&json!({
        "code": -1,
        "detail": detail,
    })))
}

fn accept(generated: &str) -> Outcome {
    Outcome::Respond(http::build_json_response(&json!({
        "code": 0,
        "generated": generated,
    })))
}

fn client_ip(ctx: &Context<AppState>) -> Option<String> {
    // Prefer the edge-supplied header; fall back to the socket peer.
    ctx.req
        .header("CF-Connecting-IP")
        .map(str::to_string)
        .or_else(|| ctx.req.peer_addr().map(|a| a.ip().to_string()))
}

pub async fn handle_generate(ctx: Context<AppState>) -> HandlerResult {
    let state = &ctx.env;

    let body = match ctx.req.json().await {
        Ok(body) => body,
        Err(RouterError::Json(_)) => return Ok(reject("No valid body specified")),
        Err(other) => return Err(other),
    };

    if state.config.captcha.enabled {
        let token = body
            .get("turnstile")
            .and_then(|v| v.as_str())
            .unwrap_or_default();
        let ip = client_ip(&ctx);
        let passed = state
            .captcha
            .verify(token, ip.as_deref())
            .await
            .map_err(RouterError::fault)?;
        if !passed {
            return Ok(reject("No valid captcha passed"));
        }
    }

    let payload: SavePayload = match serde_json::from_value(body) {
        Ok(payload) => payload,
        Err(_) => return Ok(reject("No valid parameters provided")),
    };
    if !payload.is_valid() {
        return Ok(reject("No valid parameters provided"));
    }

    // Repeat submission: hand back the previously generated artifact.
    if let Some(mut record) = state
        .store
        .get(&payload.player_name)
        .await
        .map_err(RouterError::fault)?
    {
        record.last_seen = now_millis();
        let generated = record.last_generated.clone();
        state
            .store
            .put(&payload.player_name, record)
            .await
            .map_err(RouterError::fault)?;
        logger::log_save_repeat(&payload.player_name);
        return Ok(accept(&generated));
    }

    let generated = state
        .generator
        .make_save(&payload.player_name, &payload)
        .map_err(RouterError::fault)?;

    let ip = client_ip(&ctx);
    let now = now_millis();
    let record = GenRecord {
        gen_time: now,
        last_generated: generated.clone(),
        last_seen: now,
        ip: ip.clone(),
    };
    state
        .store
        .put(&payload.player_name, record)
        .await
        .map_err(RouterError::fault)?;
    state
        .notifier
        .notify(&payload.player_name, ip.as_deref())
        .await
        .map_err(RouterError::fault)?;
    logger::log_save_generated(&payload.player_name);

    Ok(accept(&generated))
}
