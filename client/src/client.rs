use std::io::BufReader;

use frames_core::stream::{MessageBody, TableReader};
use frames_core::table::Table;
use tracing::info;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::request::{ReadRequest, WriteParams};
use crate::transport::{HttpTransport, Transport, WriteBody};

/// Frames client: codec on top of a `Transport`.
#[derive(Debug, Clone)]
pub struct Client<T = HttpTransport> {
    transport: T,
    max_in_message: usize,
}

impl Client<HttpTransport> {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(config)?;
        Ok(Self {
            transport,
            max_in_message: config.max_in_message,
        })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(&ClientConfig::from_env()?)
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            max_in_message: 0,
        }
    }

    /// Default rows per written message when `write` is given `None`.
    pub fn set_max_in_message(&mut self, rows: usize) {
        self.max_in_message = rows;
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run a read query; tables are decoded lazily as the response arrives.
    pub fn read(&self, request: &ReadRequest) -> Result<TableReader<BufReader<T::Body>>, ClientError> {
        let body = self.transport.read(request)?;
        Ok(TableReader::new(BufReader::new(body)))
    }

    /// Write `tables` to `table` of backend `typ`.
    ///
    /// Each table is split into messages of at most `max_in_message` rows
    /// (0 = one message per table, `None` = client default). The body is
    /// produced on demand while the request streams.
    pub fn write<I>(
        &self,
        typ: &str,
        table: &str,
        tables: I,
        max_in_message: Option<usize>,
    ) -> Result<serde_json::Value, ClientError>
    where
        I: IntoIterator<Item = Table>,
        I::IntoIter: Send + 'static,
    {
        let max_rows = max_in_message.unwrap_or(self.max_in_message);
        let tables: Box<dyn Iterator<Item = Table> + Send> = Box::new(tables.into_iter());
        let body: WriteBody = MessageBody::new(tables, max_rows);

        let ack = self.transport.write(&WriteParams::new(typ, table), body)?;
        info!(typ, table, max_rows, "write acknowledged");
        Ok(ack)
    }
}
