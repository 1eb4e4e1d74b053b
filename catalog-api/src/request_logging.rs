use poem::{
    http::{Method, StatusCode},
    Endpoint, IntoResponse, Middleware, Request, Response,
};
use std::time::Instant;

/// Access log middleware: one line per request with method, path, query
/// string, status, duration, and client IP.
pub struct RequestLogging;

impl<E: Endpoint> Middleware<E> for RequestLogging {
    type Output = RequestLoggingEndpoint<E>;

    fn transform(&self, ep: E) -> Self::Output {
        RequestLoggingEndpoint { inner: ep }
    }
}

pub struct RequestLoggingEndpoint<E> {
    inner: E,
}

struct RequestSummary {
    method: Method,
    path: String,
    query: String,
    client_ip: String,
    started: Instant,
}

impl RequestSummary {
    fn new(req: &Request) -> Self {
        Self {
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().unwrap_or_default().to_string(),
            client_ip: req
                .remote_addr()
                .as_socket_addr()
                .map(|addr| addr.ip().to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            started: Instant::now(),
        }
    }

    fn log(&self, status: StatusCode, error: Option<&poem::Error>) {
        let duration_ms = self.started.elapsed().as_millis();
        let status = status.as_u16();
        let Self {
            method,
            path,
            query,
            client_ip,
            ..
        } = self;

        macro_rules! access_log {
            ($level:ident, $msg:literal) => {
                tracing::$level!(
                    method = %method,
                    path = %path,
                    query = %query,
                    status,
                    duration_ms = %duration_ms,
                    client_ip = %client_ip,
                    error = error.map(tracing::field::display),
                    $msg
                )
            };
        }

        match status {
            500..=599 => access_log!(error, "request error"),
            400..=499 => access_log!(warn, "request failed"),
            200..=299 => access_log!(info, "request completed"),
            _ => access_log!(debug, "request completed"),
        }
    }
}

impl<E: Endpoint> Endpoint for RequestLoggingEndpoint<E> {
    type Output = Response;

    async fn call(&self, req: Request) -> poem::Result<Self::Output> {
        let summary = RequestSummary::new(&req);

        match self.inner.call(req).await {
            Ok(resp) => {
                let resp = resp.into_response();
                summary.log(resp.status(), None);
                Ok(resp)
            }
            Err(err) => {
                summary.log(err.status(), Some(&err));
                Err(err)
            }
        }
    }
}
