use async_trait::async_trait;
use opentelemetry::Context;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Raw configuration payload as handed to processors.
///
/// Every processor registered on a handler shares the same stream, in
/// registration order. The handler does not buffer or replay it, so a
/// processor that drains the stream leaves nothing for the ones after it.
/// Processors that need to coexist must cooperate on how much they consume.
pub type ConfigStream = Pin<Box<dyn AsyncRead + Send>>;

/// A pluggable consumer of submitted collector configurations.
///
/// Implementations interpret the payload for some purpose (validation,
/// persistence, triggering a build); the submission handler is agnostic to
/// their semantics. The context carries the request span and is cancelled
/// when the client goes away, so long-running work should observe it at its
/// await points.
///
/// A returned error short-circuits dispatch: processors registered after the
/// failing one are not invoked, and the caller receives a generic failure
/// response. The error text itself is only recorded to the trace.
#[async_trait]
pub trait Processor: Send + Sync {
    async fn process(&self, cx: &Context, body: &mut ConfigStream) -> anyhow::Result<()>;
}
