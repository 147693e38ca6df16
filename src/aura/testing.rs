//! Test doubles for the Aura API.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mockall::mock;
use serde_json::{Value, json};
use tracing::subscriber::DefaultGuard;

use crate::error::Result;

use super::transport::{ApiRequest, RawResponse};

mock! {
    pub Transport {}

    #[async_trait]
    impl crate::aura::transport::Transport for Transport {
        async fn send(&self, request: ApiRequest) -> Result<RawResponse>;
    }
}

/// A response with a JSON body.
pub fn json_response(status: u16, body: &Value) -> RawResponse {
    RawResponse::new(status, body.to_string())
}

/// A 200 carrying an instance with the given status.
pub fn instance_response(id: &str, status: &str) -> RawResponse {
    json_response(
        200,
        &json!({"data": {"id": id, "name": "t1", "status": status, "memory": "4GB"}}),
    )
}

/// An error envelope with a single message.
pub fn error_response(status: u16, message: &str) -> RawResponse {
    json_response(status, &json!({"errors": [{"message": message, "reason": "error"}]}))
}

/// Log output collected by [`capture_logs`].
#[derive(Debug, Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Everything written so far.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Records every event on the current thread, down to `TRACE`, until the guard drops.
pub fn capture_logs() -> (CapturedLogs, DefaultGuard) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    (logs, tracing::subscriber::set_default(subscriber))
}
