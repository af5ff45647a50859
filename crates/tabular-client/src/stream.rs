//! Streaming Pipeline (§4.4): bulk CSV/JSON export without buffering
//! the whole resource in memory. The HEAD-for-total + batched-GET loop
//! shape is grounded on `DataAccessor.get_resource_data_streamed`; the
//! reassembly state machines themselves are written as explicit
//! state-carrying structs per §9's instruction, rather than the
//! source's cruder chunk-by-chunk passthrough.

use crate::error::ClientError;
use bytes::Bytes;
use futures::Stream;

/// Strips the header line from every batch after the first. PostgREST
/// re-emits the CSV header on every batched response; a line-scanning
/// buffer is needed because a chunk boundary may land mid-line.
pub struct CsvReassembler {
    first_batch: bool,
    header_stripped: bool,
    buffer: Vec<u8>,
}

impl CsvReassembler {
    pub fn new() -> Self {
        Self {
            first_batch: true,
            header_stripped: false,
            buffer: Vec::new(),
        }
    }

    pub fn begin_batch(&mut self) {
        self.header_stripped = false;
        self.buffer.clear();
    }

    /// Feed one chunk of a batch's body, returning the bytes ready to
    /// forward to the client (possibly empty while still buffering a
    /// split header line).
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<u8> {
        if self.first_batch || self.header_stripped {
            return chunk.to_vec();
        }
        self.buffer.extend_from_slice(chunk);
        match self.buffer.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                let rest = self.buffer[pos + 1..].to_vec();
                self.buffer.clear();
                self.header_stripped = true;
                rest
            }
            None => Vec::new(),
        }
    }

    pub fn end_batch(&mut self) {
        self.first_batch = false;
    }
}

impl Default for CsvReassembler {
    fn default() -> Self {
        Self::new()
    }
}

/// Splices consecutive PostgREST JSON arrays into a single well-formed
/// array, each batch contributing its inner elements only.
pub struct JsonReassembler {
    wrote_any: bool,
}

impl JsonReassembler {
    pub fn new() -> Self {
        Self { wrote_any: false }
    }

    pub fn open(&self) -> &'static [u8] {
        b"["
    }

    /// `batch` is one complete PostgREST JSON array response body.
    pub fn push_batch(&mut self, batch: &[u8]) -> Vec<u8> {
        let inner = strip_array_brackets(batch);
        if inner.is_empty() {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(inner.len() + 1);
        if self.wrote_any {
            out.push(b',');
        }
        out.extend_from_slice(inner);
        self.wrote_any = true;
        out
    }

    pub fn close(&self) -> &'static [u8] {
        b"]"
    }
}

impl Default for JsonReassembler {
    fn default() -> Self {
        Self::new()
    }
}

fn strip_array_brackets(bytes: &[u8]) -> &[u8] {
    let trimmed = trim_ascii(bytes);
    if trimmed.len() >= 2 && trimmed[0] == b'[' && trimmed[trimmed.len() - 1] == b']' {
        trim_ascii(&trimmed[1..trimmed.len() - 1])
    } else {
        trimmed
    }
}

fn trim_ascii(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !b.is_ascii_whitespace()).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !b.is_ascii_whitespace()).map(|i| i + 1).unwrap_or(start);
    &bytes[start..end]
}

/// Bulk-export driver: learns the total via HEAD, then paginates GETs
/// in `batch_size` increments, handing each batch to the caller's
/// reassembler. Shared by the resource and metrics variants; the
/// metrics variant additionally checks `total` against its size gate
/// before streaming.
#[derive(Clone)]
pub struct StreamingPipeline {
    http: reqwest::Client,
    base_url: String,
    batch_size: u64,
}

impl StreamingPipeline {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, batch_size: u64) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            batch_size,
        }
    }

    /// Learns the total row count for `table`/`sql_query` via a HEAD
    /// request with `limit=1`, without fetching any rows.
    pub async fn total(&self, table: &str, sql_query: &str) -> Result<u64, ClientError> {
        let url = format!("{}/{}?{}&limit=1&", self.base_url, table, sql_query);
        let response = self
            .http
            .head(&url)
            .header("Prefer", "count=exact")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Upstream {
                status: status.as_u16(),
                body: serde_json::Value::Null,
            });
        }
        let content_range = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("0-0/0")
            .to_string();
        crate::executor::process_total(&content_range)
            .ok_or_else(|| ClientError::Upstream {
                status: status.as_u16(),
                body: serde_json::Value::Null,
            })
    }

    /// Streams `table`/`sql_query` as CSV, rejecting with
    /// `ClientError::TooLarge` when `size_gate` is set and the total
    /// exceeds it.
    pub async fn stream_csv(
        &self,
        table: String,
        sql_query: String,
        size_gate: Option<u64>,
    ) -> Result<impl Stream<Item = Result<Bytes, ClientError>>, ClientError> {
        let total = self.total(&table, &sql_query).await?;
        if let Some(max) = size_gate {
            if total > max {
                return Err(ClientError::TooLarge { table, total, max });
            }
        }
        let http = self.http.clone();
        let base_url = self.base_url.clone();
        let batch_size = self.batch_size;
        Ok(async_stream::try_stream! {
            let mut reassembler = CsvReassembler::new();
            let mut offset = 0u64;
            while offset < total {
                let url = format!("{base_url}/{table}?{sql_query}&limit={batch_size}&offset={offset}");
                let response = http.get(&url).header("Accept", "text/csv").send().await?;
                let status = response.status();
                if !status.is_success() {
                    Err(ClientError::Upstream { status: status.as_u16(), body: serde_json::Value::Null })?;
                }
                reassembler.begin_batch();
                let body = response.bytes().await?;
                let forwarded = reassembler.feed(&body);
                if !forwarded.is_empty() {
                    yield Bytes::from(forwarded);
                }
                reassembler.end_batch();
                offset += batch_size;
            }
        })
    }

    /// Streams `table`/`sql_query` as one well-formed JSON array.
    pub async fn stream_json(
        &self,
        table: String,
        sql_query: String,
        size_gate: Option<u64>,
    ) -> Result<impl Stream<Item = Result<Bytes, ClientError>>, ClientError> {
        let total = self.total(&table, &sql_query).await?;
        if let Some(max) = size_gate {
            if total > max {
                return Err(ClientError::TooLarge { table, total, max });
            }
        }
        let http = self.http.clone();
        let base_url = self.base_url.clone();
        let batch_size = self.batch_size;
        Ok(async_stream::try_stream! {
            let mut reassembler = JsonReassembler::new();
            yield Bytes::from_static(reassembler.open());
            let mut offset = 0u64;
            while offset < total {
                let url = format!("{base_url}/{table}?{sql_query}&limit={batch_size}&offset={offset}");
                let response = http.get(&url).header("Accept", "application/json").send().await?;
                let status = response.status();
                if !status.is_success() {
                    Err(ClientError::Upstream { status: status.as_u16(), body: serde_json::Value::Null })?;
                }
                let body = response.bytes().await?;
                let spliced = reassembler.push_batch(&body);
                if !spliced.is_empty() {
                    yield Bytes::from(spliced);
                }
                offset += batch_size;
            }
            yield Bytes::from_static(reassembler.close());
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_keeps_first_batch_header() {
        let mut r = CsvReassembler::new();
        r.begin_batch();
        let out = r.feed(b"a,b\n1,2\n");
        r.end_batch();
        assert_eq!(out, b"a,b\n1,2\n");
    }

    #[test]
    fn csv_strips_header_on_later_batches() {
        let mut r = CsvReassembler::new();
        r.begin_batch();
        r.feed(b"a,b\n1,2\n");
        r.end_batch();

        r.begin_batch();
        let out = r.feed(b"a,b\n3,4\n");
        r.end_batch();
        assert_eq!(out, b"3,4\n");
    }

    #[test]
    fn csv_handles_header_split_across_chunks() {
        let mut r = CsvReassembler::new();
        r.begin_batch();
        r.feed(b"a,b\n1,2\n");
        r.end_batch();

        r.begin_batch();
        let mut out = r.feed(b"a,");
        out.extend(r.feed(b"b\n5,6\n"));
        r.end_batch();
        assert_eq!(out, b"5,6\n");
    }

    #[test]
    fn json_splices_batches_with_commas() {
        let mut r = JsonReassembler::new();
        let mut out = r.open().to_vec();
        out.extend(r.push_batch(b"[{\"a\":1},{\"a\":2}]"));
        out.extend(r.push_batch(b"[{\"a\":3}]"));
        out.extend_from_slice(r.close());
        assert_eq!(out, br#"[{"a":1},{"a":2},{"a":3}]"#);
    }

    #[test]
    fn json_empty_batches_are_skipped() {
        let mut r = JsonReassembler::new();
        let mut out = r.open().to_vec();
        out.extend(r.push_batch(b"[]"));
        out.extend(r.push_batch(b"[{\"a\":1}]"));
        out.extend_from_slice(r.close());
        assert_eq!(out, br#"[{"a":1}]"#);
    }

    #[test]
    fn json_fully_empty_result_is_empty_array() {
        let mut r = JsonReassembler::new();
        let mut out = r.open().to_vec();
        out.extend(r.push_batch(b"[]"));
        out.extend_from_slice(r.close());
        assert_eq!(out, b"[]");
    }
}
