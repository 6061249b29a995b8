//! Canned transport for offline runs and tests

use super::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Reply {
    Response(HttpResponse),
    Fail(String),
}

/// Serves fixed responses keyed by a URL fragment
///
/// Routes are matched in insertion order against the request URL; the first
/// route whose fragment is contained in the URL wins. Unmatched requests get
/// a 404. Every request is recorded.
#[derive(Debug, Default)]
pub struct CannedTransport {
    routes: Vec<(String, Reply)>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedTransport {
    /// Create a transport with no routes
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `response` for URLs containing `fragment`
    pub fn route(mut self, fragment: impl Into<String>, response: HttpResponse) -> Self {
        self.routes
            .push((fragment.into(), Reply::Response(response)));
        self
    }

    /// Fail with a transport error for URLs containing `fragment`
    pub fn fail(mut self, fragment: impl Into<String>, message: impl Into<String>) -> Self {
        self.routes.push((fragment.into(), Reply::Fail(message.into())));
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HttpTransport for CannedTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request.clone());
        }

        let reply = self
            .routes
            .iter()
            .find(|(fragment, _)| request.url.contains(fragment.as_str()))
            .map(|(_, reply)| reply.clone());

        match reply {
            Some(Reply::Response(response)) => Ok(response),
            Some(Reply::Fail(message)) => Err(HttpError::Transport {
                url: request.url,
                message,
            }),
            None => Ok(HttpResponse::status(404)),
        }
    }
}
