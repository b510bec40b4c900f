//! Logger module
//!
//! Plain stdout/stderr logging for server lifecycle, access log, and
//! application events.

use std::net::SocketAddr;

use hyper::{Method, Uri, Version};

use crate::config::Config;

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    println!("======================================");
    println!("Save generation gateway started");
    println!("Listening on: http://{addr}");
    println!("Log level: {}", config.logging.level);
    if let Some(workers) = config.server.workers {
        println!("Worker threads: {workers}");
    }
    println!("CORS enabled: {}", config.cors.enabled);
    println!("Captcha enabled: {}", config.captcha.enabled);
    println!("Debug mode: {}", config.http.debug);
    println!("======================================\n");
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    println!("[Request] {method} {uri} {version:?}");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    println!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    eprintln!("[ERROR] Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    eprintln!("[ERROR] {message}");
}

pub fn log_warning(message: &str) {
    eprintln!("[WARN] {message}");
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        println!("[Headers] Count: {count}");
    }
}

pub fn log_save_generated(player_name: &str) {
    println!("[Save] Generated for player: {player_name}");
}

pub fn log_save_repeat(player_name: &str) {
    println!("[Save] Repeat submission for player: {player_name}");
}

pub fn log_usage_notified(player_name: &str, ip: Option<&str>) {
    println!(
        "[Notify] Save issued to {player_name} (ip: {})",
        ip.unwrap_or("unknown")
    );
}
