//! Structured logging with correlation tracking for OData operations
//!
//! Every function call gets a correlation id; the requests and responses of
//! that call are logged as JSON events carrying it, so a multi-request
//! association sequence can be followed in the log.

use crate::api::operations::request::{Headers, HttpRequest, HttpResponse};
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::time::{Duration, Instant};

/// Monitoring and logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub request_logging: bool,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            request_logging: true,
            log_level: LogLevel::Info,
        }
    }
}

/// Structured logger for OData operations
#[derive(Debug, Clone, Default)]
pub struct ApiLogger {
    config: MonitoringConfig,
}

/// A single function call being tracked
#[derive(Debug, Clone)]
pub struct OperationContext {
    pub correlation_id: String,
    /// Qualified function name
    pub operation: String,
    pub method: String,
    pub transaction_id: Option<String>,
    pub start_time: Instant,
}

impl ApiLogger {
    pub fn new(config: MonitoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonitoringConfig {
        &self.config
    }

    /// Start tracking a function call under a fresh correlation id
    pub fn start_operation(
        &self,
        operation: &str,
        method: &str,
        transaction_id: Option<&str>,
    ) -> OperationContext {
        let context = OperationContext {
            correlation_id: uuid::Uuid::new_v4().to_string(),
            operation: operation.to_string(),
            method: method.to_string(),
            transaction_id: transaction_id.map(str::to_string),
            start_time: Instant::now(),
        };

        if self.should_log(LogLevel::Info) {
            let log_data = json!({
                "event": "operation_started",
                "correlation_id": context.correlation_id,
                "operation": context.operation,
                "method": context.method,
                "transaction_id": context.transaction_id,
                "timestamp": chrono::Utc::now().to_rfc3339()
            });

            info!("OData Operation Started: {}", log_data);
        }

        context
    }

    /// Log HTTP request details
    pub fn log_request(&self, context: &OperationContext, request: &HttpRequest) {
        if !self.config.request_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "http_request",
            "correlation_id": context.correlation_id,
            "operation": context.operation,
            "method": request.method,
            "target": request.target,
            "headers": sanitize_headers(&request.headers),
            "body_length": request.body.as_ref().map(Vec::len),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        debug!("HTTP Request: {}", log_data);
    }

    /// Log HTTP response details
    pub fn log_response(&self, context: &OperationContext, response: &HttpResponse, duration: Duration) {
        if !self.config.request_logging || !self.should_log(LogLevel::Debug) {
            return;
        }

        let log_data = json!({
            "event": "http_response",
            "correlation_id": context.correlation_id,
            "operation": context.operation,
            "status_code": response.status,
            "duration_ms": duration.as_millis(),
            "headers": sanitize_headers(&response.headers),
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if response.status >= 400 {
            warn!("HTTP Response (Error): {}", log_data);
        } else {
            debug!("HTTP Response: {}", log_data);
        }
    }

    /// Log the outcome of a function call
    pub fn complete_operation(
        &self,
        context: &OperationContext,
        status_code: Option<u16>,
        error_message: Option<String>,
    ) {
        let success = error_message.is_none();
        let level = if success { LogLevel::Info } else { LogLevel::Error };
        if !self.should_log(level) {
            return;
        }

        let log_data = json!({
            "event": "operation_completed",
            "correlation_id": context.correlation_id,
            "operation": context.operation,
            "method": context.method,
            "duration_ms": context.elapsed().as_millis(),
            "success": success,
            "status_code": status_code,
            "error_message": error_message,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });

        if success {
            info!("OData Operation Completed: {}", log_data);
        } else {
            error!("OData Operation Failed: {}", log_data);
        }
    }

    fn should_log(&self, level: LogLevel) -> bool {
        level <= self.config.log_level
    }
}

/// Header map with credentials removed
fn sanitize_headers(headers: &Headers) -> Map<String, Value> {
    let mut sanitized = Map::new();

    for (key, value) in headers.iter() {
        let key_lower = key.to_lowercase();
        if key_lower.contains("authorization") || key_lower.contains("cookie") || key_lower.contains("token") {
            sanitized.insert(key.to_string(), Value::from("[REDACTED]"));
        } else {
            sanitized.insert(key.to_string(), Value::from(value));
        }
    }

    sanitized
}

impl OperationContext {
    /// Calculate elapsed time since operation started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}
