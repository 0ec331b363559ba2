use async_trait::async_trait;

use super::error::Result;
use super::types::TurnRequest;

/// Raw protocol lines as read from the response body, one event per item.
pub type LineStream = futures::stream::BoxStream<'static, Result<String>>;

/// Seam between the session core and whatever produces the response body.
/// The core never owns transport lifecycle; it only consumes lines.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn open(&self, request: &TurnRequest) -> Result<LineStream>;
}
