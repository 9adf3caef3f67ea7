#![allow(dead_code)]

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread;
use tiny_http::{Header, Response, Server};

/// One request the mock backend saw.
#[derive(Debug, Clone)]
pub struct Seen {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
    pub body: String,
}

impl Seen {
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or_default()
    }
}

struct Route {
    method: &'static str,
    path: String,
    status: u16,
    body: String,
}

/// Canned backend on an ephemeral loopback port.
pub struct MockBackend {
    routes: Vec<Route>,
}

pub struct Running {
    pub base_url: String,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    pub fn route(mut self, method: &'static str, path: &str, status: u16, body: &str) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            status,
            body: body.to_string(),
        });
        self
    }

    pub fn start(self) -> Running {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let routes = self.routes;

        thread::spawn(move || {
            for mut request in server.incoming_requests() {
                let mut body = String::new();
                let _ = request.as_reader().read_to_string(&mut body);
                let entry = Seen {
                    method: request.method().to_string(),
                    url: request.url().to_string(),
                    authorization: request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv("Authorization"))
                        .map(|h| h.value.to_string()),
                    body,
                };
                let path = entry.path().to_string();
                let method = entry.method.clone();
                log.lock().unwrap().push(entry);

                let (status, body) = routes
                    .iter()
                    .find(|r| r.method == method && r.path == path)
                    .map(|r| (r.status, r.body.clone()))
                    .unwrap_or((404, r#"{"detail":"Not Found"}"#.to_string()));
                let header = Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap();
                let _ = request.respond(
                    Response::from_string(body)
                        .with_status_code(status)
                        .with_header(header),
                );
            }
        });

        Running {
            base_url: format!("http://{addr}"),
            seen,
        }
    }
}

impl Running {
    pub fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn seen_path(&self, path: &str) -> Vec<Seen> {
        self.seen().into_iter().filter(|s| s.path() == path).collect()
    }
}

pub const EMAILS: &str = r#"{"emails":[
  {"id":"m1","message_id":"m1","thread_id":"t1","subject":"Quarterly report","from_address":"boss@example.com","date":"Tue, 14 Oct 2025 09:30:00 +0000","snippet":"Numbers attached","labels":["INBOX"]},
  {"id":"m2","message_id":"m2","thread_id":"t2","subject":"","from_address":"=?UTF-8?B?U2hvcA==?= <shop@example.com>","date":"","snippet":"Sale &amp; more","labels":[]}
],"moved_count":3}"#;

pub const STATS: &str =
    r#"{"total_moved_to_gator":7,"total_emails_processed":42,"email":"me@example.com"}"#;

pub const ANALYSIS: &str = r#"{"category":"promotional","topic":"Sale","sentiment":"neutral","priority":"low","key_points":["50% off"],"action_items":[],"should_trash":true}"#;
