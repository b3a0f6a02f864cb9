//! InfluxDB v2 write endpoint over blocking HTTP.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;

use super::line_protocol::encode;
use super::points::Point;
use super::MetricSink;
use crate::config::InfluxConfig;
use crate::error::SinkError;

/// Points per request. Larger batches are split.
pub const MAX_BATCH: usize = 5_000;

const WRITE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct InfluxSink {
    client: Client,
    config: InfluxConfig,
}

impl InfluxSink {
    pub fn new(config: InfluxConfig) -> Result<Self, SinkError> {
        let client = Client::builder().timeout(WRITE_TIMEOUT).build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: Client, config: InfluxConfig) -> Self {
        Self { client, config }
    }

    fn write_url(&self) -> String {
        format!("{}/api/v2/write", self.config.url)
    }

    fn post_lines(&self, body: String) -> Result<(), SinkError> {
        let resp = self
            .client
            .post(self.write_url())
            .query(&[
                ("org", self.config.org.as_str()),
                ("bucket", self.config.bucket.as_str()),
                ("precision", "s"),
            ])
            .header("Authorization", format!("Token {}", self.config.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .body(body)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}

/// Request bodies for `points`: at most `MAX_BATCH` lines each, none when empty.
pub fn batch_bodies(points: &[Point]) -> Vec<String> {
    points
        .chunks(MAX_BATCH)
        .map(|chunk| chunk.iter().map(encode).collect::<Vec<_>>().join("\n"))
        .collect()
}

impl MetricSink for InfluxSink {
    fn write_points(&mut self, points: Vec<Point>) -> Result<usize, SinkError> {
        for body in batch_bodies(&points) {
            debug!(bytes = body.len(), "posting batch");
            self.post_lines(body)?;
        }
        Ok(points.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::test_http;

    fn points(n: usize) -> Vec<Point> {
        let date = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        (0..n)
            .map(|i| Point::new("nl", date).field("deaths", i as i64))
            .collect()
    }

    fn sink(url: &str) -> InfluxSink {
        let config = InfluxConfig {
            url: url.to_string(),
            token: "s3cret".to_string(),
            bucket: "epi".to_string(),
            org: "acme".to_string(),
        };
        InfluxSink::with_client(test_http::client(), config)
    }

    #[test]
    fn bodies_split_at_batch_size() {
        let bodies = batch_bodies(&points(2 * MAX_BATCH + 1));

        assert_eq!(bodies.len(), 3);
        assert_eq!(bodies[0].lines().count(), MAX_BATCH);
        assert_eq!(bodies[1].lines().count(), MAX_BATCH);
        assert_eq!(bodies[2].lines().count(), 1);
        assert_eq!(bodies[2], "nl deaths=10000i 1583020800");
        assert!(batch_bodies(&[]).is_empty());
    }

    #[test]
    fn writes_post_each_batch_with_credentials() {
        let server = test_http::serve(vec![(204, ""), (204, "")]);
        let mut sink = sink(&server.url);

        let written = sink.write_points(points(MAX_BATCH + 2)).unwrap();
        assert_eq!(written, MAX_BATCH + 2);

        let requests = server.finish();
        assert_eq!(requests.len(), 2);
        for request in &requests {
            assert!(request.line.starts_with("POST /api/v2/write?"), "{}", request.line);
            assert!(request.line.contains("org=acme"));
            assert!(request.line.contains("bucket=epi"));
            assert!(request.line.contains("precision=s"));
            assert_eq!(request.header("authorization"), Some("Token s3cret"));
        }
        assert_eq!(requests[0].body.lines().count(), MAX_BATCH);
        assert_eq!(requests[1].body.lines().count(), 2);
    }

    #[test]
    fn empty_write_sends_nothing() {
        let server = test_http::serve(Vec::new());
        let mut sink = sink(&server.url);

        assert_eq!(sink.write_points(Vec::new()).unwrap(), 0);
        assert!(server.finish().is_empty());
    }

    #[test]
    fn non_success_status_is_rejected_with_body() {
        let server = test_http::serve(vec![(401, r#"{"code":"unauthorized"}"#)]);
        let mut sink = sink(&server.url);

        let err = sink.write_points(points(1)).unwrap_err();
        match err {
            SinkError::Rejected { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("unauthorized"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        server.finish();
    }
}
