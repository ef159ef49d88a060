// Submission handler for collector configurations
//
// Validates the request shape, assigns a correlation identifier, and
// dispatches the raw payload to the registered processors in order.

use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    response::{IntoResponse, Response as HttpResponse},
};
use futures_util::TryStreamExt;
use opentelemetry::{
    global::{self, BoxedTracer},
    trace::{Status, TraceContextExt, Tracer},
    Context, KeyValue,
};
use opentelemetry_http::HeaderExtractor;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use uuid::Uuid;

use crate::processor::{ConfigStream, Processor};
use crate::response::{
    Response, MSG_INVALID_CONTENT_TYPE, MSG_INVALID_METHOD, MSG_PROCESSING_FAILED,
};

/// Media type required for submitted collector configurations.
pub const CONFIG_CONTENT_TYPE: &str = "application/yaml";

const SPAN_NAME: &str = "CreateConfig";

/// HTTP handler accepting an OTel Collector configuration submission.
///
/// Holds no mutable state: the tracer and processor list are fixed at
/// construction, so a single handler instance serves concurrent requests.
pub struct CreateConfig {
    tracer: BoxedTracer,
    processors: Vec<Arc<dyn Processor>>,
}

/// Builder for [`CreateConfig`].
#[derive(Default)]
pub struct CreateConfigBuilder {
    tracer: Option<BoxedTracer>,
    processors: Vec<Arc<dyn Processor>>,
}

impl CreateConfigBuilder {
    /// Overrides the default tracer.
    pub fn with_tracer(mut self, tracer: BoxedTracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// Replaces the processor list. A later call overwrites an earlier one;
    /// insertion order is invocation order.
    pub fn with_processors(mut self, processors: Vec<Arc<dyn Processor>>) -> Self {
        self.processors = processors;
        self
    }

    pub fn build(self) -> CreateConfig {
        CreateConfig {
            tracer: self.tracer.unwrap_or_else(|| global::tracer("config")),
            processors: self.processors,
        }
    }
}

impl CreateConfig {
    pub fn builder() -> CreateConfigBuilder {
        CreateConfigBuilder::default()
    }

    pub fn processors(&self) -> &[Arc<dyn Processor>] {
        &self.processors
    }

    /// Handles one submission request, producing exactly one response.
    ///
    /// The method check runs before the content-type check, and dispatch
    /// stops at the first failing processor. Processor error text is
    /// recorded to the span only; callers get a generic message.
    pub async fn handle(&self, req: Request<Body>) -> HttpResponse {
        let parent_cx = global::get_text_map_propagator(|propagator| {
            propagator.extract(&HeaderExtractor(req.headers()))
        });
        let span = self.tracer.start_with_context(SPAN_NAME, &parent_cx);
        // The span ends when `cx` drops, on every exit path.
        let cx = parent_cx.with_span(span);

        let id = Uuid::new_v4();
        cx.span().set_attribute(KeyValue::new("id", id.to_string()));

        if req.method() != Method::POST {
            cx.span()
                .set_attribute(KeyValue::new("method", req.method().to_string()));
            cx.span().set_status(Status::error("invalid request method"));
            return write_response(
                &cx,
                StatusCode::METHOD_NOT_ALLOWED,
                Response::failure(MSG_INVALID_METHOD),
            );
        }

        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if content_type != CONFIG_CONTENT_TYPE {
            cx.span()
                .set_attribute(KeyValue::new("content-type", content_type));
            cx.span()
                .set_status(Status::error("invalid request content type"));
            return write_response(
                &cx,
                StatusCode::BAD_REQUEST,
                Response::failure(MSG_INVALID_CONTENT_TYPE),
            );
        }

        // One shared stream for all processors, in registration order.
        let mut body: ConfigStream = Box::pin(StreamReader::new(
            req.into_body().into_data_stream().map_err(std::io::Error::other),
        ));
        for processor in &self.processors {
            if let Err(err) = processor.process(&cx, &mut body).await {
                cx.span().set_status(Status::error(err.to_string()));
                return write_response(
                    &cx,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Response::failure(MSG_PROCESSING_FAILED),
                );
            }
        }

        cx.span().set_attribute(KeyValue::new("success", true));
        write_response(&cx, StatusCode::OK, Response::received(id))
    }
}

fn write_response(cx: &Context, status: StatusCode, resp: Response) -> HttpResponse {
    let body = match serde_json::to_vec(&resp) {
        Ok(body) => body,
        Err(err) => {
            let span = cx.span();
            span.record_error(&err);
            span.set_status(Status::error("failed to marshal response"));
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to marshal response",
            )
                .into_response();
        }
    };

    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::MSG_RECEIVED;
    use axum::body::to_bytes;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::AsyncReadExt;

    #[derive(Default)]
    struct MockProcessor {
        calls: AtomicUsize,
        fail_with: Option<String>,
    }

    impl MockProcessor {
        fn failing(message: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail_with: Some(message.to_string()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl Processor for MockProcessor {
        async fn process(&self, _cx: &Context, body: &mut ConfigStream) -> anyhow::Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut payload = Vec::new();
            body.read_to_end(&mut payload).await?;
            match &self.fail_with {
                Some(message) => Err(anyhow::anyhow!("{message}")),
                None => Ok(()),
            }
        }
    }

    fn request(method: &str, content_type: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body.to_owned())).unwrap()
    }

    async fn read_response(response: HttpResponse) -> (StatusCode, Response) {
        let status = response.status();
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            "application/json"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn builder_defaults_to_empty_processor_list() {
        let handler = CreateConfig::builder().build();
        assert!(handler.processors().is_empty());
    }

    #[test]
    fn with_processors_replaces_the_list() {
        let handler = CreateConfig::builder()
            .with_processors(vec![Arc::new(MockProcessor::default())])
            .with_processors(vec![
                Arc::new(MockProcessor::default()),
                Arc::new(MockProcessor::default()),
            ])
            .build();
        assert_eq!(handler.processors().len(), 2);
    }

    #[tokio::test]
    async fn rejects_non_post_method() {
        let handler = CreateConfig::builder().build();
        let (status, resp) = read_response(handler.handle(request("GET", None, "")).await).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(!resp.success);
        assert_eq!(resp.message, MSG_INVALID_METHOD);
        assert!(resp.id.is_nil());
    }

    #[tokio::test]
    async fn method_check_runs_before_content_type_check() {
        let handler = CreateConfig::builder().build();
        let req = request("GET", Some("text/plain"), "");
        let (status, resp) = read_response(handler.handle(req).await).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.message, MSG_INVALID_METHOD);
    }

    #[tokio::test]
    async fn rejects_wrong_content_type() {
        let handler = CreateConfig::builder().build();
        let req = request("POST", Some("application/json"), "{}");
        let (status, resp) = read_response(handler.handle(req).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(!resp.success);
        assert_eq!(resp.message, MSG_INVALID_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn rejects_missing_content_type() {
        let handler = CreateConfig::builder().build();
        let (status, resp) = read_response(handler.handle(request("POST", None, "")).await).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(resp.message, MSG_INVALID_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn accepts_submission_with_no_processors() {
        let handler = CreateConfig::builder().build();
        let req = request("POST", Some(CONFIG_CONTENT_TYPE), "receivers: {}");
        let (status, resp) = read_response(handler.handle(req).await).await;
        assert_eq!(status, StatusCode::OK);
        assert!(resp.success);
        assert_eq!(resp.message, MSG_RECEIVED);
        assert!(!resp.id.is_nil());
    }

    #[tokio::test]
    async fn invokes_registered_processor() {
        let processor = Arc::new(MockProcessor::default());
        let handler = CreateConfig::builder()
            .with_processors(vec![processor.clone()])
            .build();
        let req = request("POST", Some(CONFIG_CONTENT_TYPE), r#"{"key":"value"}"#);
        let (status, resp) = read_response(handler.handle(req).await).await;
        assert_eq!(status, StatusCode::OK);
        assert!(resp.success);
        assert_eq!(resp.message, MSG_RECEIVED);
        assert!(!resp.id.is_nil());
        assert_eq!(processor.calls(), 1);
    }

    #[tokio::test]
    async fn reports_processor_failure_generically() {
        let processor = Arc::new(MockProcessor::failing("disk full"));
        let handler = CreateConfig::builder()
            .with_processors(vec![processor.clone()])
            .build();
        let req = request("POST", Some(CONFIG_CONTENT_TYPE), "exporters: {}");
        let (status, resp) = read_response(handler.handle(req).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!resp.success);
        assert_eq!(resp.message, MSG_PROCESSING_FAILED);
        assert_eq!(processor.calls(), 1);
    }

    #[tokio::test]
    async fn stops_at_first_failing_processor() {
        let failing = Arc::new(MockProcessor::failing("broken"));
        let never_reached = Arc::new(MockProcessor::default());
        let handler = CreateConfig::builder()
            .with_processors(vec![failing.clone(), never_reached.clone()])
            .build();
        let req = request("POST", Some(CONFIG_CONTENT_TYPE), "processors: {}");
        let (status, _) = read_response(handler.handle(req).await).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(failing.calls(), 1);
        assert_eq!(never_reached.calls(), 0);
    }
}
