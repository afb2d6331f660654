//! The HTTP front end.

mod page;

pub use page::Page;

use crate::riddle::RiddleSolver;
use serde::Serialize;
use std::{
    io::Read,
    time::{Instant, SystemTime, UNIX_EPOCH},
};
use tiny_http::{Header, Method, Request, Response, Server};
use tracing::{info, warn};

/// Form submissions bigger than this are truncated.
const MAX_BODY_BYTES: u64 = 64 * 1024;

/// A response, before it gets turned into something [`tiny_http`] can send.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Reply {
    fn html(body: String) -> Self {
        Reply {
            status: 200,
            content_type: "text/html; charset=utf-8",
            body,
        }
    }

    fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Reply {
                status: 200,
                content_type: "application/json",
                body,
            },
            Err(e) => Reply::plain(500, e.to_string()),
        }
    }

    fn plain(status: u16, body: String) -> Self {
        Reply {
            status,
            content_type: "text/plain; charset=utf-8",
            body,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Health {
    status: &'static str,
    timestamp: f64,
}

impl Health {
    fn now() -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or_default();

        Health {
            status: "healthy",
            timestamp,
        }
    }
}

/// Work out how to respond to a single request.
pub fn route(
    method: &Method,
    url: &str,
    body: &[u8],
    riddles: &dyn RiddleSolver,
) -> Reply {
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        (Method::Get, "/") => Reply::html(Page::default().render()),
        (Method::Post, "/") => {
            Reply::html(Page::from_form(body, riddles).render())
        },
        (Method::Get, "/health") => Reply::json(&Health::now()),
        (_, "/") | (_, "/health") => {
            Reply::plain(405, String::from("Method Not Allowed"))
        },
        _ => Reply::plain(404, String::from("Not Found")),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("unable to listen on {address}: {reason}")]
    Bind { address: String, reason: String },
}

/// Listen on `address`, handling one request at a time until the process is
/// killed.
pub fn serve(
    address: &str,
    riddles: &dyn RiddleSolver,
) -> Result<(), ServerError> {
    let server = Server::http(address).map_err(|e| ServerError::Bind {
        address: address.to_string(),
        reason: e.to_string(),
    })?;

    info!(%address, "Listening");

    for request in server.incoming_requests() {
        handle(request, riddles);
    }

    Ok(())
}

fn handle(mut request: Request, riddles: &dyn RiddleSolver) {
    let start = Instant::now();
    let method = request.method().clone();
    let url = request.url().to_string();

    let mut body = Vec::new();
    if let Err(e) = request
        .as_reader()
        .take(MAX_BODY_BYTES)
        .read_to_end(&mut body)
    {
        warn!(error = %e, %url, "Unable to read the request body");
    }

    let reply = route(&method, &url, &body, riddles);
    let status = reply.status;

    let mut response =
        Response::from_string(reply.body).with_status_code(status);
    if let Ok(header) =
        Header::from_bytes(&b"Content-Type"[..], reply.content_type.as_bytes())
    {
        response = response.with_header(header);
    }

    if let Err(e) = request.respond(response) {
        warn!(error = %e, %url, "Unable to send the response");
    }

    info!(
        %method,
        %url,
        status,
        elapsed = ?start.elapsed(),
        "Handled a request"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl RiddleSolver for Unreachable {
        fn answer(&self, _riddle: &str) -> String {
            panic!("The riddle solver shouldn't have been called")
        }
    }

    #[test]
    fn the_index_page_is_a_form() {
        let got = route(&Method::Get, "/", b"", &Unreachable);

        assert_eq!(got.status, 200);
        assert_eq!(got.content_type, "text/html; charset=utf-8");
        assert!(got.body.contains("<form"));
    }

    #[test]
    fn submitting_an_equation() {
        let got = route(&Method::Post, "/", b"equation=x%3D1", &Unreachable);

        assert_eq!(got.status, 200);
        assert!(got.body.contains("x = 1"), "{}", got.body);
    }

    #[test]
    fn query_strings_are_ignored() {
        let got = route(&Method::Get, "/?equation=x%3D1", b"", &Unreachable);

        assert_eq!(got.status, 200);
        assert!(!got.body.contains(r#"class="answer""#));
    }

    #[test]
    fn health_check() {
        let got = route(&Method::Get, "/health", b"", &Unreachable);

        assert_eq!(got.status, 200);
        assert_eq!(got.content_type, "application/json");
        let body: serde_json::Value = serde_json::from_str(&got.body).unwrap();
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].as_f64().unwrap() > 0.0);
    }

    #[test]
    fn unknown_routes() {
        let inputs = vec![
            (Method::Get, "/missing", 404),
            (Method::Post, "/health", 405),
            (Method::Delete, "/", 405),
            (Method::Post, "/solve", 404),
        ];

        for (method, url, should_be) in inputs {
            let got = route(&method, url, b"", &Unreachable);
            assert_eq!(got.status, should_be, "{} {}", method, url);
        }
    }
}
