//! Billing filter middleware
//! 
//! Binds the billing filter to proxied responses: one `HttpContext` per
//! request, fed with every response body chunk on its way to the client.

use crate::filter::HttpContext;
use crate::handlers::AppState;
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::header::CONTENT_TYPE,
    middleware::Next,
    response::Response,
};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};
use tokio_stream::Stream;

/// Attach the billing filter to the response of every proxied request
pub async fn billing_filter_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    // Skip health check endpoints
    if request.uri().path().starts_with("/health") {
        return next.run(request).await;
    }
    
    let tenant_header = request
        .headers()
        .get(state.filter.config().tenant_header.as_str())
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned());
    let mut context = state.filter.create_http_context(tenant_header.as_deref());
    
    let response = next.run(request).await;
    
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    context.on_response_headers(content_type);
    
    let (parts, body) = response.into_parts();
    let body = Body::from_stream(BillingBodyStream::new(body.into_data_stream(), context));
    
    Response::from_parts(parts, body)
}

pin_project! {
    /// Body stream that shows each chunk to an `HttpContext` before yielding
    /// it unchanged
    pub struct BillingBodyStream<S> {
        #[pin]
        inner: S,
        context: HttpContext,
    }
}

impl<S> BillingBodyStream<S> {
    pub fn new(inner: S, context: HttpContext) -> Self {
        Self { inner, context }
    }
    
    pub fn context(&self) -> &HttpContext {
        &self.context
    }
}

impl<S, E> Stream for BillingBodyStream<S>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    type Item = Result<Bytes, E>;
    
    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let item = ready!(this.inner.poll_next(cx));
        
        if let Some(Ok(chunk)) = &item {
            // The verdict is always Continue; the chunk is forwarded as-is.
            this.context.on_response_body(chunk);
        }
        
        Poll::Ready(item)
    }
    
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
