//! Request dispatch module
//!
//! Entry point for HTTP request processing: method validation, negotiation,
//! resolution and the fault boundary that turns unexpected errors into a 500.

use hyper::body::Body;
use hyper::header::{HeaderMap, ACCEPT, CONTENT_TYPE, REFERER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::error::Error as _;
use std::net::SocketAddr;
use std::time::Instant;

use super::path::map_request_path;
use crate::config::Settings;
use crate::error::ServeError;
use crate::http::{self, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use crate::negotiation;
use crate::resolver::{self, RequestMethod, ResolvedOutcome};

/// Request context encapsulating information needed for request processing
pub struct RequestContext<'a> {
    pub remote_addr: SocketAddr,
    pub method: &'a Method,
    pub path: &'a str,
    pub query: Option<&'a str>,
    pub version: Version,
    /// All Accept values joined, decoded lossily so bad bytes only spoil
    /// their own segment
    pub accept: Option<String>,
    pub headers: &'a HeaderMap,
    pub started: Instant,
}

impl<'a> RequestContext<'a> {
    pub fn new<B>(req: &'a Request<B>, remote_addr: SocketAddr) -> Self {
        Self {
            remote_addr,
            method: req.method(),
            path: req.uri().path(),
            query: req.uri().query(),
            version: req.version(),
            accept: accept_header(req.headers()),
            headers: req.headers(),
            started: Instant::now(),
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &hyper::header::HeaderName) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// `None` only when the request has no Accept header at all
fn accept_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<_> = headers
        .get_all(ACCEPT)
        .iter()
        .map(|value| String::from_utf8_lossy(value.as_bytes()))
        .collect();
    (!values.is_empty()).then(|| values.join(", "))
}

/// Main entry point for HTTP request handling
///
/// Blocking: checks the filesystem and opens the chosen file. The request body
/// is never read.
pub fn handle_request<B>(
    req: &Request<B>,
    settings: &Settings,
    remote_addr: SocketAddr,
) -> Response<ResponseBody> {
    let ctx = RequestContext::new(req, remote_addr);

    let response = match dispatch(&ctx, settings) {
        Ok(response) => response,
        Err(err) => fault_response(&ctx, &err, settings),
    };

    if settings.access_log {
        log_access(&ctx, &response, &settings.access_log_format);
    }
    response
}

/// Report a fault raised outside [`handle_request`], e.g. a failed blocking task
pub fn handle_fault<B>(
    req: &Request<B>,
    settings: &Settings,
    remote_addr: SocketAddr,
    err: &ServeError,
) -> Response<ResponseBody> {
    let ctx = RequestContext::new(req, remote_addr);
    let response = fault_response(&ctx, err, settings);
    if settings.access_log {
        log_access(&ctx, &response, &settings.access_log_format);
    }
    response
}

/// Check HTTP method and return 405 for anything but GET/HEAD
fn check_http_method(method: &Method) -> Result<RequestMethod, Response<ResponseBody>> {
    RequestMethod::from_http(method).ok_or_else(|| {
        logger::log_warning(&format!("Method not allowed: {method}"));
        http::build_405_response()
    })
}

fn dispatch(
    ctx: &RequestContext<'_>,
    settings: &Settings,
) -> Result<Response<ResponseBody>, ServeError> {
    let method = match check_http_method(ctx.method) {
        Ok(method) => method,
        Err(response) => return Ok(response),
    };
    let is_head = method == RequestMethod::Head;

    let Some(base) = map_request_path(ctx.path, settings) else {
        logger::log_warning(&format!(
            "{} {} {}: path rejected",
            ctx.remote_addr, ctx.method, ctx.path
        ));
        return Ok(http::build_404_response(is_head));
    };

    let candidates = negotiation::negotiate(
        &settings.representations,
        ctx.accept.as_deref(),
        settings.strict,
    );
    match resolver::resolve(&base, method, candidates)? {
        ResolvedOutcome::Served(mut variant) => {
            logger::log_debug(&format!(
                "{} {} {} -> {} ({})",
                ctx.remote_addr,
                method.as_str(),
                ctx.path,
                variant.filename(),
                variant.content_type
            ));
            let body = variant
                .take_body()
                .map(|chunks| http::chunked(chunks, variant.size));
            Ok(http::build_served_response(&variant, body)?)
        }
        ResolvedOutcome::Unacceptable { alternates } => {
            logger::log_warning(&format!(
                "{} {} {}: not acceptable (Accept: {}), alternates: {}",
                ctx.remote_addr,
                method.as_str(),
                ctx.path,
                ctx.accept.as_deref().unwrap_or(negotiation::DEFAULT_ACCEPT),
                alternates.join(", ")
            ));
            Ok(http::build_406_response(&alternates, is_head))
        }
        ResolvedOutcome::NotFound => Ok(http::build_404_response(is_head)),
    }
}

/// Log `err` with request context and build the 500 response
fn fault_response(
    ctx: &RequestContext<'_>,
    err: &ServeError,
    settings: &Settings,
) -> Response<ResponseBody> {
    let chain = error_chain(err);
    logger::log_error(&format!(
        "{} {} {} (Accept: {}) exception:\n{chain}",
        ctx.remote_addr,
        ctx.method,
        ctx.path,
        ctx.accept.as_deref().unwrap_or("-"),
    ));
    if logger::debug_enabled() {
        let headers: Vec<String> = ctx
            .headers
            .iter()
            .map(|(name, value)| format!("  {name}: {}", String::from_utf8_lossy(value.as_bytes())))
            .collect();
        logger::log_debug(&format!(
            "{} {} {} headers:\n{}",
            ctx.remote_addr,
            ctx.method,
            ctx.path,
            headers.join("\n")
        ));
    }

    http::build_500_response(settings.debug.then_some(chain.as_str()))
}

/// `err` followed by each of its sources, one per line
fn error_chain(err: &ServeError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        chain.push_str(&format!("\ncaused by: {cause}"));
        source = cause.source();
    }
    chain
}

fn log_access(ctx: &RequestContext<'_>, response: &Response<ResponseBody>, format: &str) {
    let mut entry = AccessLogEntry::new(
        ctx.remote_addr.to_string(),
        ctx.method.to_string(),
        ctx.path.to_string(),
    );
    entry.query = ctx.query.map(ToString::to_string);
    entry.http_version = match ctx.version {
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        _ => "1.1",
    }
    .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response.body().size_hint().upper().unwrap_or(0);
    entry.accept.clone_from(&ctx.accept);
    if response.status() == StatusCode::OK {
        entry.content_type = header_str(response.headers(), &CONTENT_TYPE).map(ToString::to_string);
    }
    entry.referer = header_str(ctx.headers, &REFERER).map(ToString::to_string);
    entry.user_agent = header_str(ctx.headers, &USER_AGENT).map(ToString::to_string);
    entry.request_time_us = u64::try_from(ctx.started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, format);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiation::Representation;
    use http_body_util::BodyExt;
    use hyper::header::{
        HeaderValue, ALLOW, CONTENT_LENGTH, CONTENT_LOCATION, ETAG, LAST_MODIFIED, VARY,
    };
    use std::path::Path;

    const REMOTE: &str = "127.0.0.1:50000";

    fn settings(base: &Path) -> Settings {
        Settings {
            representations: vec![
                Representation::new("text", "html", ["html"]),
                Representation::new("text", "plain", ["txt"]),
            ],
            base: base.to_path_buf(),
            script: String::new(),
            index: "index".to_string(),
            strict: false,
            debug: false,
            access_log: false,
            access_log_format: "combined".to_string(),
        }
    }

    fn store(files: &[(&str, &str)]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in files {
            std::fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }

    fn request(method: Method, path: &str, accept: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(accept) = accept {
            builder = builder.header(ACCEPT, accept);
        }
        builder.body(()).unwrap()
    }

    fn handle(req: &Request<()>, settings: &Settings) -> Response<ResponseBody> {
        handle_request(req, settings, REMOTE.parse().unwrap())
    }

    async fn body_text(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_serves_preferred_variant() {
        let dir = store(&[("a.html", "<p>hi</p>"), ("a.txt", "hi")]);
        let settings = settings(dir.path());

        let response = handle(&request(Method::GET, "/a", Some("text/plain")), &settings);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(response.headers()[CONTENT_LENGTH], "2");
        assert_eq!(response.headers()[CONTENT_LOCATION], "a.txt");
        assert_eq!(response.headers()[VARY], "Accept");
        assert!(response.headers().contains_key(LAST_MODIFIED));
        assert!(response.headers().contains_key(ETAG));
        assert_eq!(body_text(response).await, "hi");
    }

    #[tokio::test]
    async fn test_server_order_breaks_ties() {
        let dir = store(&[("a.html", "<p>hi</p>"), ("a.txt", "hi")]);
        let settings = settings(dir.path());

        let response = handle(&request(Method::GET, "/a", None), &settings);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
        assert_eq!(body_text(response).await, "<p>hi</p>");
    }

    #[tokio::test]
    async fn test_head_matches_get_without_body() {
        let dir = store(&[("a.txt", "hello")]);
        let settings = settings(dir.path());

        let get = handle(&request(Method::GET, "/a", None), &settings);
        let head = handle(&request(Method::HEAD, "/a", None), &settings);
        assert_eq!(get.status(), head.status());
        assert_eq!(get.headers(), head.headers());
        assert_eq!(body_text(head).await, "");
    }

    #[tokio::test]
    async fn test_not_acceptable_lists_alternates() {
        let dir = store(&[("a.foo", "x"), ("a.bar", "y")]);
        let settings = settings(dir.path());

        let response = handle(&request(Method::GET, "/a", None), &settings);
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        let page = body_text(response).await;
        assert!(page.contains("a.bar"));
        assert!(page.contains("a.foo"));
    }

    #[test]
    fn test_not_found() {
        let dir = store(&[("b.txt", "x")]);
        let settings = settings(dir.path());

        let response = handle(&request(Method::GET, "/a", None), &settings);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let response = handle(&request(Method::GET, "/../a", None), &settings);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_strict_ignores_wildcards() {
        let dir = store(&[("a.txt", "x")]);
        let mut settings = settings(dir.path());
        settings.strict = true;

        let response = handle(&request(Method::GET, "/a", Some("text/*")), &settings);
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        let response = handle(&request(Method::GET, "/a", Some("text/plain")), &settings);
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_non_ascii_accept_keeps_valid_segments() {
        let dir = store(&[("a.html", "<p>hi</p>")]);
        let settings = settings(dir.path());
        let req = Request::builder()
            .uri("/a")
            .header(ACCEPT, HeaderValue::from_bytes(b"text/plain, t\xe9xt/html").unwrap())
            .body(())
            .unwrap();

        let response = handle(&req, &settings);
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    }

    #[test]
    fn test_repeated_accept_headers_combined() {
        let dir = store(&[("a.html", "<p>hi</p>"), ("a.txt", "hi")]);
        let settings = settings(dir.path());
        let req = Request::builder()
            .uri("/a")
            .header(ACCEPT, "text/html;q=0.5")
            .header(ACCEPT, "text/plain")
            .body(())
            .unwrap();

        assert_eq!(
            RequestContext::new(&req, REMOTE.parse().unwrap()).accept.as_deref(),
            Some("text/html;q=0.5, text/plain")
        );
        let response = handle(&req, &settings);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
    }

    #[test]
    fn test_method_not_allowed() {
        let dir = store(&[("a.txt", "x")]);
        let settings = settings(dir.path());

        let response = handle(&request(Method::POST, "/a", None), &settings);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD");
    }

    #[test]
    fn test_directory_uses_index() {
        let dir = store(&[("index.txt", "home")]);
        let settings = settings(dir.path());

        let response = handle(&request(Method::HEAD, "/", None), &settings);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_LOCATION], "index.txt");
    }

    #[tokio::test]
    async fn test_fault_detail_only_in_debug() {
        let dir = store(&[]);
        let mut settings = settings(dir.path());
        let req = request(Method::GET, "/a", Some("text/plain"));
        let err = ServeError::Io {
            path: dir.path().join("a.txt"),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        let response = handle_fault(&req, &settings, REMOTE.parse().unwrap(), &err);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_text(response).await,
            "Oops. The admin should look at the logs\n"
        );

        settings.debug = true;
        let response = handle_fault(&req, &settings, REMOTE.parse().unwrap(), &err);
        let text = body_text(response).await;
        assert!(text.starts_with("I/O error on"));
        assert!(text.contains("caused by: permission denied"));
    }
}
