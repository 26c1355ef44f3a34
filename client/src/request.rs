use serde::{Deserialize, Serialize};

/// Read query, sent as the JSON body of `POST /read`.
///
/// Every field is always sent; empty strings and zeros mean "unset" to the
/// server. Not validated client-side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadRequest {
    /// Backend type (e.g. `csv`, `kv`, `tsdb`).
    #[serde(rename = "type")]
    pub typ: String,
    pub data_format: String,
    pub row_layout: bool,
    /// SQL query; excludes `table`, `columns`, `filter`, `group_by` and `marker`.
    pub query: String,
    pub table: String,
    pub columns: Option<Vec<String>>,
    pub filter: String,
    pub group_by: String,
    pub limit: u64,
    /// Rows per response message (0 = server default).
    pub max_in_message: u64,
    pub marker: String,
    /// Backend-specific parameters.
    pub extra: Option<serde_json::Value>,
}

impl ReadRequest {
    pub fn new(typ: impl Into<String>) -> Self {
        Self {
            typ: typ.into(),
            ..Self::default()
        }
    }

    pub fn data_format(mut self, v: impl Into<String>) -> Self {
        self.data_format = v.into();
        self
    }

    pub fn row_layout(mut self, v: bool) -> Self {
        self.row_layout = v;
        self
    }

    pub fn query(mut self, v: impl Into<String>) -> Self {
        self.query = v.into();
        self
    }

    pub fn table(mut self, v: impl Into<String>) -> Self {
        self.table = v.into();
        self
    }

    pub fn columns<S: Into<String>>(mut self, v: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(v.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter(mut self, v: impl Into<String>) -> Self {
        self.filter = v.into();
        self
    }

    pub fn group_by(mut self, v: impl Into<String>) -> Self {
        self.group_by = v.into();
        self
    }

    pub fn limit(mut self, v: u64) -> Self {
        self.limit = v;
        self
    }

    pub fn max_in_message(mut self, v: u64) -> Self {
        self.max_in_message = v;
        self
    }

    pub fn marker(mut self, v: impl Into<String>) -> Self {
        self.marker = v.into();
        self
    }

    pub fn extra(mut self, v: serde_json::Value) -> Self {
        self.extra = Some(v);
        self
    }
}

/// URL query parameters of `POST /write`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteParams {
    #[serde(rename = "type")]
    pub typ: String,
    pub table: String,
}

impl WriteParams {
    pub fn new(typ: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            typ: typ.into(),
            table: table.into(),
        }
    }
}
