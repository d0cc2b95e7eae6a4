//! `GET`-based probe operation for checking HTTP dependencies.
//!
//! Plain `http://` only; the request runs over a single hyper HTTP/1.1
//! connection and fails unless the response status is exactly `200`.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use bytes::Bytes;
use http::{
    Request, StatusCode, Uri,
    header::{HOST, USER_AGENT},
};
use http_body_util::Empty;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tracing::debug;

use crate::{
    error::OpError,
    ops::{OpRef, Operation, Scope},
};

/// Operation performing `GET url` under a bounded child scope.
pub struct HttpGetCheck {
    url: String,
    timeout: Duration,
}

#[async_trait]
impl Operation for HttpGetCheck {
    fn name(&self) -> &str {
        &self.url
    }

    async fn run(&self, scope: Scope) -> Result<(), OpError> {
        let bounded = scope.with_timeout(self.timeout);
        tokio::select! {
            res = get_ok(&self.url) => res,
            _ = bounded.cancelled() => Err(bounded.error().unwrap_or(OpError::Canceled)),
        }
    }
}

/// Returns an operation that succeeds iff `GET url` answers `200` within `timeout`.
///
/// # Example
/// ```no_run
/// use std::time::Duration;
/// use procvisor::{Process, http_get_check};
///
/// let process = Process::builder()
///     .ready(http_get_check("http://127.0.0.1:9200/_cluster/health", Duration::from_secs(1)))
///     .build();
/// ```
pub fn http_get_check(url: impl Into<String>, timeout: Duration) -> OpRef {
    Arc::new(HttpGetCheck {
        url: url.into(),
        timeout,
    })
}

async fn get_ok(url: &str) -> Result<(), OpError> {
    let uri: Uri = url
        .parse()
        .map_err(|e| OpError::fail(format!("invalid url {url:?}: {e}")))?;
    if uri.scheme_str() != Some("http") {
        return Err(OpError::fail(format!("unsupported url {url:?}: only http:// is supported")));
    }
    let authority = uri
        .authority()
        .ok_or_else(|| OpError::fail(format!("invalid url {url:?}: missing host")))?;
    let host = authority.host().trim_start_matches('[').trim_end_matches(']');
    let port = authority.port_u16().unwrap_or(80);

    let stream = TcpStream::connect((host, port)).await.map_err(OpError::fail)?;
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(OpError::fail)?;
    tokio::spawn(async move {
        if let Err(e) = conn.await {
            debug!(error = %e, "probe connection closed with error");
        }
    });

    let path = uri.path_and_query().map_or("/", |p| p.as_str());
    let req = Request::get(path)
        .header(HOST, authority.as_str())
        .header(USER_AGENT, concat!("procvisor/", env!("CARGO_PKG_VERSION")))
        .body(Empty::<Bytes>::new())
        .map_err(OpError::fail)?;

    let resp = sender.send_request(req).await.map_err(OpError::fail)?;
    if resp.status() != StatusCode::OK {
        return Err(OpError::fail(format!("status code is not 200: {}", resp.status())));
    }
    Ok(())
}
