use anyhow::{Result, anyhow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::{Duration, Instant};
use tiny_http::{Header, Request, Response, Server};
use url::Url;

/// Query parameters the provider hands back on the redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub token: Option<String>,
    pub code: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    pub fn from_url(url: &Url) -> Self {
        let mut params = Self::default();
        for (k, v) in url.query_pairs() {
            if v.is_empty() {
                continue;
            }
            match k.as_ref() {
                "token" => params.token = Some(v.into_owned()),
                "code" => params.code = Some(v.into_owned()),
                "error" => params.error = Some(v.into_owned()),
                _ => {}
            }
        }
        params
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.code.is_none() && self.error.is_none()
    }
}

const DONE_PAGE: &str = "<html><body><p>Signed in. You can close this tab and return to the terminal.</p></body></html>";
const WAITING_PAGE: &str = "<html><body><p>Waiting for sign-in to complete...</p></body></html>";

/// One-shot loopback server standing in for the application root the
/// provider redirects to.
pub struct CallbackListener {
    server: Server,
    addr: SocketAddr,
    host: String,
    timeout: Duration,
}

impl CallbackListener {
    /// Binds the host/port of `redirect_uri`. Bind before opening the browser
    /// so the redirect cannot race the listener.
    pub fn bind(redirect_uri: &str, timeout: Duration) -> Result<Self> {
        let redirect = Url::parse(redirect_uri)
            .map_err(|e| anyhow!("Invalid redirect_uri '{redirect_uri}': {e}"))?;

        let host = redirect
            .host_str()
            .ok_or_else(|| anyhow!("redirect_uri missing host: {redirect_uri}"))?;

        let port = redirect
            .port_or_known_default()
            .ok_or_else(|| anyhow!("redirect_uri missing/unknown port: {redirect_uri}"))?;

        let bind_ip: IpAddr = match host {
            "localhost" | "127.0.0.1" => IpAddr::V4(Ipv4Addr::LOCALHOST),
            other => other.parse::<IpAddr>().map_err(|_| {
                anyhow!("redirect_uri host must be localhost/127.0.0.1 or an IP: {other}")
            })?,
        };

        let bind_addr = SocketAddr::new(bind_ip, port);
        let server = Server::http(bind_addr)
            .map_err(|e| anyhow!("Failed to bind OAuth callback server on {bind_addr}: {e:?}"))?;
        let addr = server.server_addr();

        Ok(Self {
            server,
            addr,
            host: host.to_string(),
            timeout,
        })
    }

    /// The bound address; differs from `redirect_uri` only when it asked
    /// for port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Blocks until a request carrying `token`, `code` or `error` arrives, or
    /// the timeout elapses. The browser is sent on to the same path without
    /// the query so the credential does not linger in its history.
    pub fn wait(&self) -> Result<CallbackParams> {
        let deadline = Instant::now() + self.timeout;

        while Instant::now() < deadline {
            let Ok(maybe_request) = self.server.recv_timeout(Duration::from_millis(500)) else {
                continue;
            };
            let Some(request) = maybe_request else {
                continue;
            };

            let full = format!("http://{}{}", self.host, request.url());
            let Ok(parsed) = Url::parse(&full) else {
                let _ = request.respond(Response::from_string("Bad redirect").with_status_code(400));
                continue;
            };

            let params = CallbackParams::from_url(&parsed);
            if params.is_empty() {
                respond_html(request, WAITING_PAGE);
                continue;
            }

            log::debug!("OAuth redirect received on {}", parsed.path());
            strip_query(request, parsed.path());
            self.serve_follow_up();
            return Ok(params);
        }

        Err(anyhow!("No sign-in callback received within {:?}", self.timeout))
    }

    fn serve_follow_up(&self) {
        if let Ok(Some(request)) = self.server.recv_timeout(Duration::from_secs(2)) {
            respond_html(request, DONE_PAGE);
        }
    }
}

fn strip_query(request: Request, path: &str) {
    let mut response = Response::from_string(DONE_PAGE).with_status_code(303);
    if let Ok(h) = Header::from_bytes(&b"Location"[..], path.as_bytes()) {
        response = response.with_header(h);
    }
    if let Ok(h) = Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..]) {
        response = response.with_header(h);
    }
    let _ = request.respond(response);
}

fn respond_html(request: Request, body: &str) {
    let mut response = Response::from_string(body);
    if let Ok(h) = Header::from_bytes(&b"Content-Type"[..], &b"text/html; charset=utf-8"[..]) {
        response = response.with_header(h);
    }
    let _ = request.respond(response);
}
