//! Client IP extraction for rate limiting
//!
//! Anonymous report submissions and unauthenticated registration attempts are
//! rate limited by address, so the address must survive reverse proxies.

use actix_web::HttpRequest;
use std::net::IpAddr;

fn header_ip(req: &HttpRequest, name: &str) -> Option<String> {
    let value = req.headers().get(name)?.to_str().ok()?;
    // Proxy chains list the original client first.
    let candidate = value.split(',').next()?.trim();
    candidate.parse::<IpAddr>().ok().map(|ip| ip.to_string())
}

/// Best available client address: X-Forwarded-For, then X-Real-IP, then the
/// peer socket. Header values that do not parse as an IP are ignored.
pub fn extract_client_ip(req: &HttpRequest) -> Option<String> {
    header_ip(req, "x-forwarded-for")
        .or_else(|| header_ip(req, "x-real-ip"))
        .or_else(|| req.peer_addr().map(|addr| addr.ip().to_string()))
}
