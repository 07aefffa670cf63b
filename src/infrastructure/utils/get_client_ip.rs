use actix_web::HttpRequest;

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
    req.headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Extract the client's address, used as the rate-limit source identifier.
///
/// With `trust_forwarded_headers`, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Otherwise, and when neither is present, the peer address is used.
pub fn get_client_ip(req: &HttpRequest, trust_forwarded_headers: bool) -> String {
    if trust_forwarded_headers {
        let forwarded = header_value(req, "x-forwarded-for")
            .and_then(|chain| chain.split(',').next())
            .map(str::trim)
            .filter(|first| !first.is_empty());

        if let Some(ip) = forwarded.or_else(|| header_value(req, "x-real-ip")) {
            return ip.to_string();
        }
    }

    req.peer_addr()
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn first_forwarded_entry_wins() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "198.51.100.4, 10.0.0.1"))
            .insert_header(("X-Real-IP", "192.0.2.9"))
            .peer_addr("127.0.0.1:5000".parse().unwrap())
            .to_http_request();

        assert_eq!(get_client_ip(&req, true), "198.51.100.4");
    }

    #[test]
    fn real_ip_then_peer() {
        let req = TestRequest::default()
            .insert_header(("X-Real-IP", "192.0.2.9"))
            .peer_addr("127.0.0.1:5000".parse().unwrap())
            .to_http_request();
        assert_eq!(get_client_ip(&req, true), "192.0.2.9");

        let req = TestRequest::default()
            .peer_addr("127.0.0.1:5000".parse().unwrap())
            .to_http_request();
        assert_eq!(get_client_ip(&req, true), "127.0.0.1");
    }

    #[test]
    fn untrusted_headers_are_ignored() {
        let req = TestRequest::default()
            .insert_header(("X-Forwarded-For", "198.51.100.4"))
            .peer_addr("127.0.0.1:5000".parse().unwrap())
            .to_http_request();

        assert_eq!(get_client_ip(&req, false), "127.0.0.1");
    }

    #[test]
    fn unknown_without_any_source() {
        let req = TestRequest::default().to_http_request();
        assert_eq!(get_client_ip(&req, true), "unknown");
    }
}
