#![allow(clippy::expect_used)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::core::error::Result;
use crate::core::transport::{ChatTransport, LineStream};
use crate::core::types::TurnRequest;

use super::error::TransportError;

/// One scripted outcome for a [`MockTransport`] turn.
#[derive(Debug)]
pub enum MockScript {
    /// Serve these raw protocol lines.
    Lines(Vec<String>),
    /// Fail the request before any line is produced.
    Fail(TransportError),
}

/// Scripted transport for tests: queued per-turn outcomes, consumed in
/// order, every request recorded.
#[derive(Clone, Default)]
pub struct MockTransport {
    scripts: Arc<Mutex<Vec<MockScript>>>,
    request_history: Arc<Mutex<Vec<TurnRequest>>>,
}

impl MockTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_lines<I, S>(self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripts
            .lock()
            .expect("MockTransport mutex poisoned")
            .push(MockScript::Lines(
                lines.into_iter().map(Into::into).collect(),
            ));
        self
    }

    #[must_use]
    pub fn with_failure(self, error: TransportError) -> Self {
        self.scripts
            .lock()
            .expect("MockTransport mutex poisoned")
            .push(MockScript::Fail(error));
        self
    }

    #[must_use]
    pub fn request_history(&self) -> Vec<TurnRequest> {
        self.request_history
            .lock()
            .expect("MockTransport mutex poisoned")
            .clone()
    }

    #[must_use]
    pub fn request_count(&self) -> usize {
        self.request_history
            .lock()
            .expect("MockTransport mutex poisoned")
            .len()
    }

    fn next_script(&self) -> Result<MockScript> {
        let mut scripts = self.scripts.lock().expect("MockTransport mutex poisoned");
        if scripts.is_empty() {
            return Err(TransportError::Configuration(
                "MockTransport: no scripted turns queued".to_string(),
            )
            .into());
        }
        Ok(scripts.remove(0))
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn open(&self, request: &TurnRequest) -> Result<LineStream> {
        self.request_history
            .lock()
            .expect("MockTransport mutex poisoned")
            .push(request.clone());

        match self.next_script()? {
            MockScript::Lines(lines) => {
                let lines: Vec<Result<String>> = lines.into_iter().map(Ok).collect();
                Ok(Box::pin(futures::stream::iter(lines)))
            }
            MockScript::Fail(error) => Err(error.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GenerationParams;
    use futures::StreamExt;

    fn request() -> TurnRequest {
        TurnRequest {
            messages: vec![],
            params: GenerationParams::default(),
        }
    }

    #[tokio::test]
    async fn test_serves_scripted_lines_in_order() {
        let mock = MockTransport::new()
            .with_lines(["data: first", "data: [DONE]"])
            .with_lines(["data: second"]);

        let lines: Vec<_> = mock
            .open(&request())
            .await
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(lines, vec!["data: first", "data: [DONE]"]);

        let lines: Vec<_> = mock
            .open(&request())
            .await
            .unwrap()
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(lines, vec!["data: second"]);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let mock = MockTransport::new().with_failure(TransportError::server(500, "boom"));
        let result = mock.open(&request()).await;
        assert!(result.is_err());
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_errors_when_queue_is_empty() {
        let mock = MockTransport::new();
        assert!(mock.open(&request()).await.is_err());
    }

    #[tokio::test]
    async fn test_records_requests() {
        let mock = MockTransport::new().with_lines(["data: [DONE]"]);
        assert_eq!(mock.request_count(), 0);

        mock.open(&request()).await.unwrap();

        assert_eq!(mock.request_count(), 1);
        assert!(mock.request_history()[0].messages.is_empty());
    }
}
