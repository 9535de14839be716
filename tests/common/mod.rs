//! Shared fixtures for the integration suites.
//!
//! `TestEnv` runs a throwaway in-process store on a loopback port. Tests
//! mount canned JSON routes, run the binary against it, then assert on
//! the requests the store saw. One request per connection keeps the
//! server trivial; the client is told `Connection: close` so it never
//! tries to reuse a socket.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;

/// A canned response, served when method, path and the listed query
/// pairs all match the incoming request.
pub struct Route {
    method: &'static str,
    path: String,
    query_contains: Vec<(String, String)>,
    status: u16,
    body: String,
}

impl Route {
    pub fn new(method: &'static str, path: &str, status: u16, body: Value) -> Self {
        Self {
            method,
            path: path.to_string(),
            query_contains: Vec::new(),
            status,
            body: body.to_string(),
        }
    }

    /// Narrow the route to requests carrying this query pair.
    pub fn when(mut self, key: &str, value: &str) -> Self {
        self.query_contains
            .push((key.to_string(), value.to_string()));
        self
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> &str {
        self.query.get(key).map(String::as_str).unwrap_or_default()
    }

    /// Header lookup by case-insensitive name; empty string when absent.
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct TestEnv {
    addr: SocketAddr,
    routes: Arc<Mutex<Vec<Route>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl TestEnv {
    pub fn new() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind fixture store");
        let addr = listener.local_addr().expect("fixture store addr");
        let routes: Arc<Mutex<Vec<Route>>> = Arc::new(Mutex::new(Vec::new()));
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));

        let served_routes = Arc::clone(&routes);
        let seen_requests = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                serve_one(stream, &served_routes, &seen_requests);
            }
        });

        Self {
            addr,
            routes,
            requests,
        }
    }

    /// Store URL handed to the binary as its positional argument.
    pub fn storeurl(&self) -> String {
        format!("http://{}/api/v1/", self.addr)
    }

    pub fn mount(&self, route: Route) {
        self.routes.lock().expect("routes lock").push(route);
    }

    /// Every request the store has seen so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    /// Command pre-loaded with the store URL; callers append the rest.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("chrisstoreclient");
        cmd.arg(self.storeurl());
        cmd
    }

    /// Run a subcommand with `--json` and parse what it printed.
    pub fn run_json(&self, args: &[&str]) -> Value {
        let stdout = self
            .cmd()
            .arg("--json")
            .args(args)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();
        serde_json::from_slice(&stdout).expect("json output")
    }
}

/// A loopback URL nothing is listening on, for connection-failure tests.
pub fn unreachable_storeurl() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind probe");
    let addr = listener.local_addr().expect("probe addr");
    drop(listener);
    format!("http://{addr}/api/v1/")
}

fn serve_one(
    stream: TcpStream,
    routes: &Arc<Mutex<Vec<Route>>>,
    requests: &Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let mut reader = BufReader::new(stream);
    let Some(request) = read_request(&mut reader) else {
        return;
    };

    let matched = {
        let routes = routes.lock().expect("routes lock");
        routes
            .iter()
            .find(|route| matches(route, &request))
            .map(|route| (route.status, route.body.clone()))
    };
    let (status, body) =
        matched.unwrap_or_else(|| (404, r#"{"detail":"Not found."}"#.to_string()));

    requests.lock().expect("requests lock").push(request);

    let reply = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason(status),
        body.len(),
        body
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(reply.as_bytes());
    let _ = stream.flush();
}

fn matches(route: &Route, request: &RecordedRequest) -> bool {
    route.method == request.method
        && route.path == request.path
        && route
            .query_contains
            .iter()
            .all(|(key, value)| request.query.get(key).map(String::as_str) == Some(value.as_str()))
}

fn read_request(reader: &mut BufReader<TcpStream>) -> Option<RecordedRequest> {
    let mut start_line = String::new();
    reader.read_line(&mut start_line).ok()?;
    let mut pieces = start_line.split_whitespace();
    let method = pieces.next()?.to_string();
    let target = pieces.next()?.to_string();

    let mut headers = HashMap::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line).ok()?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    let body = read_body(reader, &headers)?;

    let (path, raw_query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), query),
        None => (target.clone(), ""),
    };
    let mut query = HashMap::new();
    for pair in raw_query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        query.insert(percent_decode(key), percent_decode(value));
    }

    Some(RecordedRequest {
        method,
        path,
        query,
        headers,
        body,
    })
}

fn read_body(
    reader: &mut BufReader<TcpStream>,
    headers: &HashMap<String, String>,
) -> Option<Vec<u8>> {
    if let Some(length) = headers.get("content-length") {
        let length: usize = length.parse().ok()?;
        let mut body = vec![0u8; length];
        reader.read_exact(&mut body).ok()?;
        return Some(body);
    }

    let chunked = headers
        .get("transfer-encoding")
        .is_some_and(|value| value.contains("chunked"));
    if chunked {
        let mut body = Vec::new();
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).ok()?;
            let size = usize::from_str_radix(size_line.trim(), 16).ok()?;
            if size == 0 {
                let mut trailer = String::new();
                let _ = reader.read_line(&mut trailer);
                break;
            }
            let mut chunk = vec![0u8; size];
            reader.read_exact(&mut chunk).ok()?;
            body.extend_from_slice(&chunk);
            let mut crlf = String::new();
            reader.read_line(&mut crlf).ok()?;
        }
        return Some(body);
    }

    Some(Vec::new())
}

fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'+' {
            out.push(b' ');
            i += 1;
        } else if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            match decoded {
                Some(byte) => {
                    out.push(byte);
                    i += 3;
                }
                None => {
                    out.push(bytes[i]);
                    i += 1;
                }
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "OK",
    }
}
