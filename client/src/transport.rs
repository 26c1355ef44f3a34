use std::io::Read;

use frames_core::stream::MessageBody;
use frames_core::table::Table;
use reqwest::blocking::{Body, Client as HttpClient, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::request::{ReadRequest, WriteParams};

/// Streamed request body of a write: every table chunked and encoded lazily.
pub type WriteBody = MessageBody<Box<dyn Iterator<Item = Table> + Send>>;

/// Moves requests and message bytes between the codec and a server.
pub trait Transport {
    /// Response body: back-to-back messages, no outer framing.
    type Body: Read;

    fn read(&self, request: &ReadRequest) -> Result<Self::Body, ClientError>;

    /// Send `body` as the write payload and return the server's ack.
    fn write(&self, params: &WriteParams, body: WriteBody) -> Result<serde_json::Value, ClientError>;
}

/// Blocking HTTP transport.
///
/// - read:  `POST <url>/read` with the JSON query
/// - write: `POST <url>/write?type=..&table=..` with a chunked message body
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            base_url: config.base_url().to_owned(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let req = self.http.post(self.endpoint(path));
        match &self.api_key {
            Some(key) => req.header(AUTHORIZATION, key),
            None => req,
        }
    }
}

/// Pass successful responses through; turn anything else into `TransportFailure`.
fn check_status(resp: Response) -> Result<Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    warn!(status = status.as_u16(), body = %body, "server rejected request");
    Err(ClientError::TransportFailure {
        status: status.as_u16(),
        body,
    })
}

impl Transport for HttpTransport {
    type Body = Response;

    fn read(&self, request: &ReadRequest) -> Result<Response, ClientError> {
        debug!(typ = %request.typ, table = %request.table, "read request");
        let resp = self
            .post("read")
            .header(CONTENT_TYPE, "application/json")
            .body(serde_json::to_vec(request)?)
            .send()?;
        check_status(resp)
    }

    fn write(&self, params: &WriteParams, body: WriteBody) -> Result<serde_json::Value, ClientError> {
        debug!(typ = %params.typ, table = %params.table, "write request");
        let resp = self
            .post("write")
            .query(params)
            .body(Body::new(body))
            .send()?;
        let text = check_status(resp)?.text()?;
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}
