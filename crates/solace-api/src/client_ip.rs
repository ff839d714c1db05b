use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::error::ApiError;

/// Address of the caller: first `x-forwarded-for` hop, then `x-real-ip`,
/// else `"unknown"`. Used as the rate-limit key and audit actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub String);

impl ClientIp {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
        };

        let forwarded = header("x-forwarded-for")
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        let ip = forwarded
            .or_else(|| header("x-real-ip"))
            .unwrap_or("unknown");
        ClientIp(ip.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(ClientIp::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn prefers_first_forwarded_hop() {
        let ip = ClientIp::from_headers(&headers(&[
            ("x-forwarded-for", " 203.0.113.7, 10.0.0.1"),
            ("x-real-ip", "10.0.0.2"),
        ]));
        assert_eq!(ip.as_str(), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_real_ip_then_unknown() {
        assert_eq!(
            ClientIp::from_headers(&headers(&[("x-real-ip", "10.0.0.2")])).as_str(),
            "10.0.0.2"
        );
        assert_eq!(ClientIp::from_headers(&HeaderMap::new()).as_str(), "unknown");
    }
}
