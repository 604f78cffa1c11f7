//! Billing filter behaviour tests
//!
//! Exercises the filter through `HttpContext` with an in-memory call
//! channel standing in for the host.

use ai_billing_plugin::config::PluginConfig;
use ai_billing_plugin::filter::{BillingFilter, FilterAction};
use ai_billing_plugin::services::{HttpCall, HttpCallCallback, HttpCallDispatcher, HttpCallResponse};
use ai_billing_plugin::utils::error::DispatchError;
use serde_json::{json, Value};
use std::io;
use std::sync::{Arc, Mutex};

/// Call channel that records submissions, optionally completing or rejecting them
#[derive(Default)]
struct MockDispatcher {
    calls: Mutex<Vec<HttpCall>>,
    complete: bool,
    reject: bool,
}

impl MockDispatcher {
    fn completing() -> Self {
        Self { complete: true, ..Default::default() }
    }
    
    fn rejecting() -> Self {
        Self { reject: true, ..Default::default() }
    }
    
    fn bodies(&self) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| serde_json::from_slice(&call.body).unwrap())
            .collect()
    }
}

impl HttpCallDispatcher for MockDispatcher {
    fn dispatch_http_call(
        &self,
        call: HttpCall,
        callback: HttpCallCallback,
    ) -> Result<u32, DispatchError> {
        if self.reject {
            return Err(DispatchError::Rejected("cluster billing-service-cluster is down".to_string()));
        }
        
        let token = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            calls.len() as u32
        };
        
        if self.complete {
            callback(HttpCallResponse {
                status: 200,
                num_headers: 1,
                body_size: 0,
            });
        }
        
        Ok(token)
    }
}

/// Log sink for a scoped `tracing` subscriber
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_captured_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();
    
    let result = tracing::subscriber::with_default(subscriber, f);
    let output = String::from_utf8_lossy(&logs.0.lock().unwrap()).into_owned();
    (result, output)
}

fn filter_with(channel: Arc<MockDispatcher>) -> BillingFilter {
    BillingFilter::new(PluginConfig::default(), channel)
}

const USAGE_CHUNK: &str = "data: {\"id\":\"chatcmpl-1\",\"choices\":[],\"usage\":{\"prompt_tokens\":10,\"completion_tokens\":5,\"total_tokens\":15}}\n\n";

#[test]
fn test_non_data_lines_produce_no_events() {
    let channel = Arc::new(MockDispatcher::default());
    let mut context = filter_with(channel.clone()).create_http_context(Some("acme"));
    
    let body = "event: completion\nid: 17\n: keep-alive\nretry: 3000\n\n\n{\"usage\":{\"prompt_tokens\":1,\"completion_tokens\":1}}\n";
    
    assert_eq!(context.on_response_body(body.as_bytes()), FilterAction::Continue);
    assert!(channel.calls.lock().unwrap().is_empty());
    assert_eq!(context.reported(), 0);
}

#[test]
fn test_lines_after_done_are_ignored() {
    let channel = Arc::new(MockDispatcher::default());
    let mut context = filter_with(channel.clone()).create_http_context(Some("acme"));
    
    let body = format!(
        "{}data: [DONE]\n\n{}data: {{\"usage\":{{\"prompt_tokens\":99,\"completion_tokens\":99}}}}\n",
        USAGE_CHUNK, USAGE_CHUNK
    );
    
    assert_eq!(context.on_response_body(body.as_bytes()), FilterAction::Continue);
    assert_eq!(channel.calls.lock().unwrap().len(), 1);
    assert_eq!(channel.bodies()[0]["prompt_tokens"], 10);
}

#[test]
fn test_usage_chunk_dispatches_one_event() {
    let channel = Arc::new(MockDispatcher::default());
    let mut context = filter_with(channel.clone()).create_http_context(Some("acme"));
    
    let body = format!(
        "data: {{\"choices\":[{{\"index\":0,\"delta\":{{\"content\":\"Hello\"}}}}]}}\n\n{}data: [DONE]\n\n",
        USAGE_CHUNK
    );
    
    assert_eq!(context.on_response_body(body.as_bytes()), FilterAction::Continue);
    assert_eq!(context.reported(), 1);
    
    let calls = channel.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].upstream, "billing-service-cluster");
    assert_eq!(calls[0].header(":method"), Some("POST"));
    assert_eq!(calls[0].header(":path"), Some("/api/v1/record"));
    assert_eq!(calls[0].header(":authority"), Some("billing.internal"));
    assert_eq!(calls[0].header("content-type"), Some("application/json"));
    drop(calls);
    
    assert_eq!(
        channel.bodies(),
        vec![json!({"tenant_id": "acme", "prompt_tokens": 10, "completion_tokens": 5})]
    );
}

#[test]
fn test_invalid_json_does_not_abort_processing() {
    let channel = Arc::new(MockDispatcher::default());
    let mut context = filter_with(channel.clone()).create_http_context(Some("acme"));
    
    let body = format!("data: {{\"usage\": {{\"prompt_tokens\": 1,\n\ndata: not json at all\n\n{}", USAGE_CHUNK);
    
    let (action, logs) = with_captured_logs(|| context.on_response_body(body.as_bytes()));
    
    assert_eq!(action, FilterAction::Continue);
    assert_eq!(channel.calls.lock().unwrap().len(), 1);
    assert!(!logs.contains("ERROR"), "decode failures must not be logged as errors: {}", logs);
}

#[test]
fn test_tenant_resolution() {
    let channel = Arc::new(MockDispatcher::default());
    let filter = filter_with(channel.clone());
    
    for header in [Some("acme"), None, Some("")] {
        let mut context = filter.create_http_context(header);
        context.on_response_body(USAGE_CHUNK.as_bytes());
    }
    
    let tenants: Vec<Value> = channel
        .bodies()
        .into_iter()
        .map(|body| body["tenant_id"].clone())
        .collect();
    assert_eq!(tenants, vec![json!("acme"), json!("default-tenant"), json!("default-tenant")]);
}

#[test]
fn test_custom_tenant_default() {
    let channel = Arc::new(MockDispatcher::default());
    let config = PluginConfig {
        default_tenant: "anonymous".to_string(),
        ..Default::default()
    };
    let filter = BillingFilter::new(config, channel.clone());
    
    let context = filter.create_http_context(None);
    assert_eq!(context.tenant().as_str(), "anonymous");
}

#[test]
fn test_verdict_is_always_continue() {
    let channel = Arc::new(MockDispatcher::default());
    let filter = filter_with(channel.clone());
    
    let well_formed = format!("{}data: [DONE]\n\n", USAGE_CHUNK);
    let inputs: Vec<&[u8]> = vec![
        &b""[..],
        &b"\n\n\n"[..],
        &b"\x00\xff\xfe garbage \x80\n\x81"[..],
        &b"data:"[..],
        &b"data: {"[..],
        &b"data: [DONE]"[..],
        &b"data: {\"usage\":{\"prompt_tokens\":-5,\"completion_tokens\":1}}\n"[..],
        &b"data: {\"usage\":null}\n"[..],
        well_formed.as_bytes(),
    ];
    
    for input in inputs {
        let mut context = filter.create_http_context(Some("acme"));
        assert_eq!(context.on_response_headers(Some("text/event-stream")), FilterAction::Continue);
        assert_eq!(context.on_response_body(input), FilterAction::Continue);
    }
    
    assert_eq!(channel.calls.lock().unwrap().len(), 1);
}

#[test]
fn test_dispatch_failure_is_only_logged() {
    let channel = Arc::new(MockDispatcher::rejecting());
    let mut context = filter_with(channel).create_http_context(Some("acme"));
    
    let (action, logs) = with_captured_logs(|| context.on_response_body(USAGE_CHUNK.as_bytes()));
    
    assert_eq!(action, FilterAction::Continue);
    assert_eq!(context.reported(), 0);
    assert!(logs.contains("ERROR"), "expected an error log, got: {}", logs);
    assert!(logs.contains("Failed to dispatch billing call"));
    assert!(logs.contains("cluster billing-service-cluster is down"));
}

#[test]
fn test_completion_logs_success_with_tenant() {
    let channel = Arc::new(MockDispatcher::completing());
    let mut context = filter_with(channel).create_http_context(Some("acme"));
    
    let (_, logs) = with_captured_logs(|| context.on_response_body(USAGE_CHUNK.as_bytes()));
    
    assert!(logs.contains("INFO"));
    assert!(logs.contains("Billing usage reported for tenant acme"));
}

#[test]
fn test_each_usage_payload_is_reported() {
    let channel = Arc::new(MockDispatcher::default());
    let mut context = filter_with(channel.clone()).create_http_context(Some("acme"));
    
    let body = format!("{}{}", USAGE_CHUNK, USAGE_CHUNK);
    context.on_response_body(body.as_bytes());
    
    assert_eq!(channel.calls.lock().unwrap().len(), 2);
}

#[test]
fn test_chunks_are_processed_independently() {
    let channel = Arc::new(MockDispatcher::default());
    let mut context = filter_with(channel.clone()).create_http_context(Some("acme"));
    
    // A sentinel only ends processing of its own slice.
    context.on_response_body(b"data: [DONE]\n\n");
    context.on_response_body(USAGE_CHUNK.as_bytes());
    
    assert_eq!(channel.calls.lock().unwrap().len(), 1);
}

#[test]
fn test_usage_split_across_chunks_is_dropped() {
    let channel = Arc::new(MockDispatcher::default());
    let mut context = filter_with(channel.clone()).create_http_context(Some("acme"));
    
    let (head, tail) = USAGE_CHUNK.split_at(40);
    assert_eq!(context.on_response_body(head.as_bytes()), FilterAction::Continue);
    assert_eq!(context.on_response_body(tail.as_bytes()), FilterAction::Continue);
    
    assert!(channel.calls.lock().unwrap().is_empty());
}
