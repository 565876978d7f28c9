//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a single body that can be swapped between requests. HEAD may carry
//! `Content-MD5` and/or an MD5 `ETag`, may be blocked (405), and GET may be
//! forced to fail with a status, and GET bodies may be trickled out slowly.
//! Requests and body bytes sent are counted.

#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use assetsync_core::checksum::hash_bytes;

#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
    /// Send `Content-MD5` (base64 of the body's MD5) on HEAD.
    pub content_md5: bool,
    /// Send the body's MD5 hex as a quoted `ETag` on HEAD.
    pub md5_etag: bool,
    /// Send this `ETag` verbatim instead (takes precedence over `md5_etag`).
    pub etag_override: Option<String>,
    /// Status for GET; anything but 200 is sent with a short error body.
    pub get_status: u16,
    /// Send a successful GET body in 64 KiB chunks with this pause between them.
    pub chunk_delay: Option<Duration>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            content_md5: false,
            md5_etag: false,
            etag_override: None,
            get_status: 200,
            chunk_delay: None,
        }
    }
}

struct State {
    body: Mutex<Vec<u8>>,
    opts: Mutex<ServerOptions>,
    heads: AtomicUsize,
    gets: AtomicUsize,
    body_bytes: AtomicU64,
}

pub struct AssetServer {
    url: String,
    state: Arc<State>,
}

impl AssetServer {
    pub fn start(body: &[u8]) -> Self {
        Self::start_with_options(body, ServerOptions::default())
    }

    /// Starts a server in a background thread. It runs until the process exits.
    pub fn start_with_options(body: &[u8], opts: ServerOptions) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().unwrap().port();
        let state = Arc::new(State {
            body: Mutex::new(body.to_vec()),
            opts: Mutex::new(opts),
            heads: AtomicUsize::new(0),
            gets: AtomicUsize::new(0),
            body_bytes: AtomicU64::new(0),
        });
        let server_state = Arc::clone(&state);
        thread::spawn(move || {
            for stream in listener.incoming().flatten() {
                let state = Arc::clone(&server_state);
                thread::spawn(move || handle(stream, &state));
            }
        });
        Self {
            url: format!("http://127.0.0.1:{}/resource/205.mp4", port),
            state,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Replace the served content (the "remote changed" case).
    pub fn set_body(&self, body: &[u8]) {
        *self.state.body.lock().unwrap() = body.to_vec();
    }

    pub fn set_options(&self, opts: ServerOptions) {
        *self.state.opts.lock().unwrap() = opts;
    }

    pub fn head_requests(&self) -> usize {
        self.state.heads.load(Ordering::SeqCst)
    }

    pub fn get_requests(&self) -> usize {
        self.state.gets.load(Ordering::SeqCst)
    }

    /// Total response body bytes sent for successful GETs.
    pub fn body_bytes_sent(&self) -> u64 {
        self.state.body_bytes.load(Ordering::SeqCst)
    }
}

/// A URL on a port with no listener, so connections are refused.
pub fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}/resource/205.mp4", port)
}

fn handle(mut stream: TcpStream, state: &State) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) => return,
        Ok(n) => n,
        Err(_) => return,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let method = request.split_whitespace().next().unwrap_or("");
    let body = state.body.lock().unwrap().clone();
    let opts = state.opts.lock().unwrap().clone();

    if method.eq_ignore_ascii_case("HEAD") {
        state.heads.fetch_add(1, Ordering::SeqCst);
        if !opts.head_allowed {
            let _ = stream.write_all(
                b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            );
            return;
        }
        let digest = hash_bytes(&body);
        let mut extra = String::new();
        if opts.content_md5 {
            extra.push_str(&format!("Content-MD5: {}\r\n", STANDARD.encode(digest.as_bytes())));
        }
        if let Some(tag) = &opts.etag_override {
            extra.push_str(&format!("ETag: {}\r\n", tag));
        } else if opts.md5_etag {
            extra.push_str(&format!("ETag: \"{}\"\r\n", digest));
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\n{}Connection: close\r\n\r\n",
            body.len(),
            extra
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }

    if method.eq_ignore_ascii_case("GET") {
        state.gets.fetch_add(1, Ordering::SeqCst);
        if opts.get_status != 200 {
            let msg = b"error";
            let response = format!(
                "HTTP/1.1 {} Error\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                opts.get_status,
                msg.len()
            );
            let _ = stream.write_all(response.as_bytes());
            let _ = stream.write_all(msg);
            return;
        }
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        let sent = match opts.chunk_delay {
            Some(delay) => write_slowly(&mut stream, &body, delay),
            None => stream.write_all(&body),
        };
        if sent.is_ok() {
            state
                .body_bytes
                .fetch_add(body.len() as u64, Ordering::SeqCst);
        }
        return;
    }

    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
}

fn write_slowly(stream: &mut TcpStream, body: &[u8], delay: Duration) -> std::io::Result<()> {
    for chunk in body.chunks(64 * 1024) {
        stream.write_all(chunk)?;
        stream.flush()?;
        thread::sleep(delay);
    }
    Ok(())
}
