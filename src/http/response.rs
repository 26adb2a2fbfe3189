//! HTTP response building module
//!
//! Builders for every status the negotiation server produces.

use hyper::header::{
    ALLOW, CONTENT_LENGTH, CONTENT_LOCATION, CONTENT_TYPE, ETAG, LAST_MODIFIED, VARY,
};
use hyper::{Response, StatusCode};

use super::body::{self, ResponseBody};
use super::cache;
use crate::resolver::Variant;

/// Methods the server answers
pub const ALLOWED_METHODS: &str = "GET, HEAD";

const NOT_FOUND_PAGE: &str = "\
<html>
  <head><title>404 Not Found</title></head>
  <body>
    <h1>404 Not Found</h1>
    <p>Sorry, couldn't find what you were looking for</p>
  </body>
</html>
";

const GENERIC_FAULT: &str = "Oops. The admin should look at the logs\n";

/// Build 200 response for a resolved variant
///
/// Headers are the same for HEAD and GET; only GET passes a body. Fails when a
/// header value cannot be encoded, e.g. a non-ASCII filename.
pub fn build_served_response(
    variant: &Variant,
    body: Option<ResponseBody>,
) -> Result<Response<ResponseBody>, hyper::http::Error> {
    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, variant.content_type.as_str())
        .header(CONTENT_LENGTH, variant.size)
        .header(CONTENT_LOCATION, variant.filename())
        .header(LAST_MODIFIED, cache::http_date(variant.modified))
        .header(VARY, "Accept")
        .header(ETAG, cache::mtime_token(variant.modified))
        .body(body.unwrap_or_else(body::empty))
}

/// Build 404 Not Found response
pub fn build_404_response(is_head: bool) -> Response<ResponseBody> {
    build_page(StatusCode::NOT_FOUND, NOT_FOUND_PAGE.to_string(), is_head)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ResponseBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header(CONTENT_TYPE, "text/plain")
        .header(ALLOW, ALLOWED_METHODS)
        .body(body::full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(body::full("405 Method Not Allowed"))
        })
}

/// Build 406 Not Acceptable response listing the variants that do exist
pub fn build_406_response(alternates: &[String], is_head: bool) -> Response<ResponseBody> {
    build_page(StatusCode::NOT_ACCEPTABLE, render_alternates(alternates), is_head)
}

/// Build 500 response; `detail` is only passed when debugging is enabled
pub fn build_500_response(detail: Option<&str>) -> Response<ResponseBody> {
    let text = detail.map_or_else(|| GENERIC_FAULT.to_string(), |d| format!("{d}\n"));
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, text.len())
        .body(body::full(text))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            let mut response = Response::new(body::full(GENERIC_FAULT));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}

/// HTML listing of alternates, filenames escaped
pub fn render_alternates(alternates: &[String]) -> String {
    let mut page = String::from(
        "\
<html>
  <head><title>406 Not Acceptable</title></head>
  <body>
    <h1>406 Not Acceptable</h1>
    <p>The requested resource could not be found in an acceptable form.
       Possible alternatives:</p>
    <ul>
",
    );
    for name in alternates {
        let name = escape_html(name);
        page.push_str(&format!("      <li><a href=\"{name}\">{name}</a></li>\n"));
    }
    page.push_str(
        "    </ul>
  </body>
</html>
",
    );
    page
}

fn build_page(status: StatusCode, html: String, is_head: bool) -> Response<ResponseBody> {
    let content_length = html.len();
    let body = if is_head { body::empty() } else { body::full(html) };

    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/html")
        .header(CONTENT_LENGTH, content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            let mut response = Response::new(body::empty());
            *response.status_mut() = status;
            response
        })
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response<ResponseBody>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_405_has_allow_header() {
        let response = build_405_response();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD");
    }

    #[tokio::test]
    async fn test_406_lists_alternates() {
        let response = build_406_response(&["a.foo".to_string(), "a.bar".to_string()], false);
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(response.headers()[CONTENT_TYPE], "text/html");
        let text = body_text(response).await;
        assert!(text.contains(r#"<li><a href="a.foo">a.foo</a></li>"#));
        assert!(text.contains(r#"<li><a href="a.bar">a.bar</a></li>"#));
    }

    #[tokio::test]
    async fn test_head_pages_have_no_body() {
        let response = build_404_response(true);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[CONTENT_LENGTH],
            NOT_FOUND_PAGE.len().to_string().as_str()
        );
        assert!(body_text(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_500_hides_detail_by_default() {
        let text = body_text(build_500_response(None)).await;
        assert_eq!(text, GENERIC_FAULT);

        let text = body_text(build_500_response(Some("I/O error on '/x': denied"))).await;
        assert_eq!(text, "I/O error on '/x': denied\n");
    }

    #[test]
    fn test_alternates_are_escaped() {
        let page = render_alternates(&["<b>.txt".to_string()]);
        assert!(page.contains("&lt;b&gt;.txt"));
        assert!(!page.contains("<b>"));
    }
}
