//! Loopback HTTP server with canned responses, for exercising the reqwest clients.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;

use reqwest::blocking::Client;

/// One request as received: request line, headers (lowercased names) and body.
#[derive(Debug)]
pub struct Request {
    pub line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Request {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

pub struct Server {
    pub url: String,
    requests: Receiver<Request>,
    handle: JoinHandle<()>,
}

impl Server {
    /// Wait for every canned response to be served and return the requests.
    pub fn finish(self) -> Vec<Request> {
        self.handle.join().unwrap();
        self.requests.try_iter().collect()
    }
}

/// Client without proxies, so loopback requests never leave the host.
pub fn client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

/// Answer one connection per `(status, body)` pair, in order, then stop.
pub fn serve(responses: Vec<(u16, &'static str)>) -> Server {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (tx, requests) = mpsc::channel();

    let handle = std::thread::spawn(move || {
        for (status, body) in responses {
            let (stream, _) = listener.accept().unwrap();
            let request = answer(stream, status, body);
            tx.send(request).unwrap();
        }
    });

    Server { url, requests, handle }
}

fn answer(stream: TcpStream, status: u16, body: &str) -> Request {
    let mut reader = BufReader::new(stream.try_clone().unwrap());

    let mut line = String::new();
    reader.read_line(&mut line).unwrap();

    let mut headers = Vec::new();
    loop {
        let mut raw = String::new();
        reader.read_line(&mut raw).unwrap();
        let raw = raw.trim_end();
        if raw.is_empty() {
            break;
        }
        if let Some((key, value)) = raw.split_once(':') {
            headers.push((key.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(key, _)| key == "content-length")
        .map_or(0, |(_, value)| value.parse::<usize>().unwrap());
    let mut payload = vec![0; length];
    reader.read_exact(&mut payload).unwrap();

    let mut stream = stream;
    let response = if status == 204 {
        "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string()
    } else {
        format!(
            "HTTP/1.1 {status} Canned\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    };
    stream.write_all(response.as_bytes()).unwrap();
    stream.flush().unwrap();

    Request {
        line: line.trim_end().to_string(),
        headers,
        body: String::from_utf8(payload).unwrap(),
    }
}
