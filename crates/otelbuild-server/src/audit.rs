use async_trait::async_trait;
use opentelemetry::Context;
use otelbuild_handlers::{ConfigStream, Processor};
use tokio::io::AsyncReadExt;
use tracing::info;

/// Processor that drains the submitted payload and logs its size.
///
/// Registered by default so a deployed service records that a submission
/// arrived without interpreting it. Consumes the whole stream; register it
/// last if other processors need to see the payload.
pub struct PayloadAudit;

#[async_trait]
impl Processor for PayloadAudit {
    async fn process(&self, _cx: &Context, body: &mut ConfigStream) -> anyhow::Result<()> {
        let mut payload = Vec::new();
        let bytes = body.read_to_end(&mut payload).await?;
        info!(bytes, "Received collector configuration payload");
        Ok(())
    }
}
