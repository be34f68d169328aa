#![allow(dead_code)]

use dhokla_cli::api::ApiClient;
use dhokla_cli::config::Config;
use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc::{self, Receiver};
use std::thread;

/// Answer one connection per entry of `responses` with the raw bytes
/// given, and report each request line (e.g. `GET /api/d/ HTTP/1.1`) on
/// the returned channel.
pub fn serve_raw(responses: Vec<Vec<u8>>) -> (String, Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for response in responses {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let head = String::from_utf8_lossy(&head).to_string();
            let _ = tx.send(head.lines().next().unwrap_or_default().to_string());
            let _ = stream.write_all(&response);
        }
    });
    (format!("http://127.0.0.1:{}", port), rx)
}

/// Well-formed responses with the given status and body.
pub fn serve(responses: Vec<(u16, Vec<u8>)>) -> (String, Receiver<String>) {
    let raw = responses
        .into_iter()
        .map(|(status, body)| {
            let mut reply = format!(
                "HTTP/1.1 {} X\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            )
            .into_bytes();
            reply.extend_from_slice(&body);
            reply
        })
        .collect();
    serve_raw(raw)
}

pub fn client(base_url: &str) -> ApiClient {
    ApiClient::new(&Config::with_base_url(base_url).unwrap()).unwrap()
}

pub fn ok(body: &str) -> (u16, Vec<u8>) {
    (200, body.as_bytes().to_vec())
}
