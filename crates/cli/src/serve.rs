//! `idnb serve` — serve exported boundaries over HTTP.
//!
//! Minimal blocking HTTP/1.1 listener over the export directory. Only
//! `GET /<table>/<code>.geojson` is valid; everything else is a 400 so the
//! data directory can never be traversed.

use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::Path;
use std::sync::atomic::Ordering;
use std::thread;
use std::time::Duration;

use idnb_core::Level;
use idnb_sync::CancelToken;

use crate::CliError;

struct Response {
    status: u16,
    reason: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
}

impl Response {
    fn json_error(status: u16, reason: &'static str, message: &str) -> Self {
        Self {
            status,
            reason,
            content_type: "application/json",
            body: serde_json::json!({ "error": message }).to_string().into_bytes(),
        }
    }
}

pub fn cmd_serve(data_dir: &Path, addr: &str, cancel: &CancelToken) -> Result<(), CliError> {
    let listener = TcpListener::bind(addr)
        .map_err(|e| CliError::general(format!("cannot bind {addr}: {e}")))?;
    // Non-blocking accept so the loop can observe SIGINT
    listener
        .set_nonblocking(true)
        .map_err(|e| CliError::general(format!("cannot configure listener: {e}")))?;

    let local = listener
        .local_addr()
        .map_err(|e| CliError::general(format!("cannot read bound address: {e}")))?;
    println!("Serving {} at http://{local}/", data_dir.display());

    loop {
        if cancel.load(Ordering::Relaxed) {
            println!("Server stopped");
            return Ok(());
        }
        match listener.accept() {
            Ok((stream, _peer)) => {
                let data_dir = data_dir.to_path_buf();
                thread::spawn(move || {
                    if let Err(e) = handle_client(stream, &data_dir) {
                        eprintln!("warning: request failed: {e}");
                    }
                });
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => return Err(CliError::general(format!("accept failed: {e}"))),
        }
    }
}

fn handle_client(stream: TcpStream, data_dir: &Path) -> std::io::Result<()> {
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    let mut reader = BufReader::new(stream);
    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    let response = route(&request_line, data_dir);
    let mut stream = reader.into_inner();
    write!(
        stream,
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        response.reason,
        response.content_type,
        response.body.len()
    )?;
    stream.write_all(&response.body)?;
    stream.flush()
}

/// Map one request line to a response. Split out from the socket handling
/// so the routing rules are testable without a listener.
fn route(request_line: &str, data_dir: &Path) -> Response {
    let mut parts = request_line.split_whitespace();
    let (method, target) = match (parts.next(), parts.next()) {
        (Some(method), Some(target)) => (method, target),
        _ => return Response::json_error(400, "Bad Request", "Invalid request"),
    };
    if method != "GET" {
        return Response::json_error(405, "Method Not Allowed", "Only GET is supported");
    }

    let Some((table, file)) = validate_path(target) else {
        return Response::json_error(400, "Bad Request", "Invalid path");
    };

    let path = data_dir.join(table).join(file);
    match std::fs::read(&path) {
        Ok(body) => Response {
            status: 200,
            reason: "OK",
            content_type: "application/geo+json",
            body,
        },
        Err(_) => Response::json_error(404, "Not Found", "File not found"),
    }
}

/// Accept exactly `/<table>/<code>.geojson` where `<table>` is one of the
/// four level tables and `<code>` is a single path segment. Returns the
/// validated components so callers never join the raw target into a path.
fn validate_path(target: &str) -> Option<(&str, &str)> {
    let target = target.trim_start_matches('/');
    let (table, file) = target.split_once('/')?;
    // Table names double as level names, so reuse the level parser
    let level = table.parse::<Level>().ok()?;
    if level.table() != table {
        return None;
    }
    let code = file.strip_suffix(".geojson")?;
    if code.is_empty() || code.contains('/') || code.contains("..") {
        return None;
    }
    Some((table, file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_only_level_tables_and_geojson_files() {
        assert_eq!(
            validate_path("/regencies/31.75.geojson"),
            Some(("regencies", "31.75.geojson"))
        );
        assert_eq!(
            validate_path("/provinces/31.geojson"),
            Some(("provinces", "31.geojson"))
        );
        assert!(validate_path("/regency/31.75.geojson").is_none());
        assert!(validate_path("/counties/31.geojson").is_none());
        assert!(validate_path("/regencies/31.75.json").is_none());
        assert!(validate_path("/regencies/.geojson").is_none());
        assert!(validate_path("/regencies").is_none());
    }

    #[test]
    fn traversal_segments_are_rejected() {
        assert!(validate_path("/regencies/../secrets.geojson").is_none());
        assert!(validate_path("/regencies/a/b.geojson").is_none());
        assert!(validate_path("/../regencies/31.geojson").is_none());
    }

    #[test]
    fn route_serves_existing_exports() {
        let dir = tempfile::tempdir().unwrap();
        let table = dir.path().join("regencies");
        std::fs::create_dir_all(&table).unwrap();
        std::fs::write(table.join("31.75.geojson"), b"{\"type\":\"Feature\"}").unwrap();

        let ok = route("GET /regencies/31.75.geojson HTTP/1.1\r\n", dir.path());
        assert_eq!(ok.status, 200);
        assert_eq!(ok.body, b"{\"type\":\"Feature\"}");

        let missing = route("GET /regencies/31.71.geojson HTTP/1.1\r\n", dir.path());
        assert_eq!(missing.status, 404);

        let invalid = route("GET /nope HTTP/1.1\r\n", dir.path());
        assert_eq!(invalid.status, 400);

        let post = route("POST /regencies/31.75.geojson HTTP/1.1\r\n", dir.path());
        assert_eq!(post.status, 405);
    }
}
