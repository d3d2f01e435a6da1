//! Serves a `TextProvider` over HTTP/1.1 with the routes `HttpTextProvider`
//! consumes: `GET /api/texts` and `GET /api/text/:id`.

use std::io::{self, BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::provider::{ProviderError, TextProvider};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    fn json(status: u16, body: serde_json::Value) -> Self {
        Self {
            status,
            body: body.to_string(),
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, json!({ "error": message }))
    }

    fn reason(&self) -> &'static str {
        match self.status {
            200 => "OK",
            404 => "Not Found",
            405 => "Method Not Allowed",
            _ => "Internal Server Error",
        }
    }

    fn write_to(&self, out: &mut impl Write) -> io::Result<()> {
        write!(
            out,
            "HTTP/1.1 {} {}\r\n\
             Content-Type: application/json\r\n\
             Content-Length: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Connection: close\r\n\r\n{}",
            self.status,
            self.reason(),
            self.body.len(),
            self.body
        )?;
        out.flush()
    }
}

/// Answer one request. Ids that are not a number are treated as unknown.
pub fn route(provider: &dyn TextProvider, method: &str, path: &str) -> Response {
    let path = path.split('?').next().unwrap_or_default();
    if path == "/api/texts" || path.starts_with("/api/text/") {
        if method != "GET" {
            return Response::error(405, "Method not allowed");
        }
    } else {
        return Response::error(404, "Not found");
    }

    if path == "/api/texts" {
        return match provider.texts() {
            Ok(texts) => Response::json(200, json!(texts)),
            Err(err) => {
                warn!(%err, "text_listing_failed");
                Response::error(500, "Texts unavailable")
            }
        };
    }

    let Ok(id) = path["/api/text/".len()..].parse::<usize>() else {
        return Response::error(404, "Text not found");
    };
    match provider.text(id) {
        Ok(text) => Response::json(200, json!({ "text": text })),
        Err(ProviderError::NotFound(_)) => Response::error(404, "Text not found"),
        Err(err) => {
            warn!(id, %err, "text_lookup_failed");
            Response::error(500, "Text unavailable")
        }
    }
}

/// Accept connections forever, one short-lived thread per request.
pub fn serve<P>(listener: TcpListener, provider: P) -> io::Result<()>
where
    P: TextProvider + Send + Sync + 'static,
{
    info!(addr = %listener.local_addr()?, "text_service_listening");
    let provider = Arc::new(provider);
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let provider = Arc::clone(&provider);
                thread::spawn(move || {
                    if let Err(err) = handle_connection(stream, provider.as_ref()) {
                        debug!(%err, "text_request_failed");
                    }
                });
            }
            Err(err) => warn!(%err, "text_accept_failed"),
        }
    }
    Ok(())
}

fn handle_connection(stream: TcpStream, provider: &dyn TextProvider) -> io::Result<()> {
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    // Drain headers; request bodies are never needed.
    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header)? == 0 || header.trim().is_empty() {
            break;
        }
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let path = parts.next().unwrap_or_default();
    let response = route(provider, method, path);
    debug!(method, path, status = response.status, "text_request");

    let mut writer = stream;
    response.write_to(&mut writer)
}
