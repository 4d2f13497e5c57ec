//! Server-side cursors.
//!
//! A [`Cursor`] buffers one batch of a paginated result stream and pulls the
//! next batch from the server when the current one runs out. Rows can be
//! consumed one at a time ([`Cursor::fetch_one`]) or a whole batch at a time
//! ([`Cursor::fetch_batch_into`]).
//!
//! A cursor whose server side still has batches should be deleted with
//! [`Cursor::delete`]; otherwise the server keeps it until its TTL expires.

pub mod envelope;

pub use envelope::{CursorEnvelope, ErrorEnvelope, Extra, Stats, Warning};

use futures::stream::{self, Stream};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::db::Database;
use crate::error::{AqlError, Result};
use crate::transport::Method;
use envelope::rejection;

/// Resource name of the cursor API.
pub(crate) const CURSOR_RESOURCE: &str = "cursor";

/// Lifecycle of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Rows are buffered or more batches can be fetched.
    Readable,
    /// The last batch has been consumed.
    Exhausted,
    /// A refill failed; iteration is over but deletion is still allowed.
    Errored,
    /// The server-side cursor has been deleted.
    Disposed,
}

/// Client-side view of a server-side result stream.
#[derive(Debug)]
pub struct Cursor<'db> {
    db: &'db Database,
    id: Option<String>,
    buffer: Vec<Value>,
    read_index: usize,
    has_more: bool,
    count: Option<u64>,
    extra: Extra,
    cached: bool,
    error: bool,
    error_message: Option<String>,
    code: Option<u16>,
    state: CursorState,
    last_error: Option<AqlError>,
    last_fetch_time: Duration,
}

impl<'db> Cursor<'db> {
    /// Builds a cursor from the response to a query submission.
    pub(crate) fn from_envelope(
        db: &'db Database,
        envelope: CursorEnvelope,
        elapsed: Duration,
    ) -> Result<Self> {
        if envelope.has_more && envelope.id.is_none() {
            return Err(AqlError::decode(
                "cursor response reports more batches but carries no id",
            ));
        }

        let mut cursor = Self {
            db,
            id: envelope.id,
            buffer: envelope.result,
            read_index: 0,
            has_more: envelope.has_more,
            count: envelope.count,
            extra: envelope.extra,
            cached: envelope.cached,
            error: envelope.error,
            error_message: envelope.error_message,
            code: envelope.code,
            state: CursorState::Readable,
            last_error: None,
            last_fetch_time: elapsed,
        };
        cursor.settle();
        Ok(cursor)
    }

    /// Decodes the next row, fetching the next batch when the buffer is used up.
    ///
    /// Returns `Ok(None)` once the last batch has been consumed. A refill
    /// failure is returned as an error and ends iteration; later calls fail
    /// with `InvalidState`. A row that does not decode into `T` returns
    /// `TypeMismatch` and is not consumed.
    pub async fn fetch_one<T: DeserializeOwned>(&mut self) -> Result<Option<T>> {
        if !self.advance().await? {
            return Ok(None);
        }

        let item = self.decode_at(self.read_index)?;
        self.read_index += 1;
        self.settle();
        Ok(Some(item))
    }

    /// Skips the next row without decoding it.
    ///
    /// Returns false when there was nothing left to skip.
    pub async fn skip(&mut self) -> Result<bool> {
        if !self.advance().await? {
            return Ok(false);
        }

        self.read_index += 1;
        self.settle();
        Ok(true)
    }

    /// Decodes the unread rows of the current batch into `destination`, then
    /// fetches the next batch if the server has one.
    ///
    /// The batch is decoded completely before anything is appended: if a row
    /// does not decode into `T`, `TypeMismatch` is returned and neither the
    /// destination nor the cursor changes. If fetching the next batch fails,
    /// the rows already appended stay in `destination` and the error is
    /// returned. Returns the number of rows appended.
    pub async fn fetch_batch_into<T: DeserializeOwned>(
        &mut self,
        destination: &mut Vec<T>,
    ) -> Result<usize> {
        self.ensure_usable()?;

        let rows = (self.read_index..self.buffer.len())
            .map(|index| self.decode_at(index))
            .collect::<Result<Vec<T>>>()?;
        let decoded = rows.len();

        destination.extend(rows);
        self.read_index = self.buffer.len();

        if self.has_more {
            self.refill().await?;
        } else {
            self.state = CursorState::Exhausted;
        }

        Ok(decoded)
    }

    /// Decodes the current batch into a new vector.
    ///
    /// If fetching the next batch fails the decoded rows are dropped; use
    /// [`Cursor::fetch_batch_into`] to keep them.
    pub async fn fetch_batch<T: DeserializeOwned>(&mut self) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        self.fetch_batch_into(&mut rows).await?;
        Ok(rows)
    }

    /// Drains every remaining row into a vector.
    pub async fn collect_all<T: DeserializeOwned>(&mut self) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_one().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Turns the cursor into a stream of decoded rows.
    pub fn into_stream<T>(self) -> impl Stream<Item = Result<T>> + 'db
    where
        T: DeserializeOwned + 'db,
    {
        stream::try_unfold(self, |mut cursor| async move {
            let row = cursor.fetch_one::<T>().await?;
            Ok::<_, AqlError>(row.map(|row| (row, cursor)))
        })
    }

    /// Deletes the server-side cursor and frees its memory.
    ///
    /// A 404 from the server is reported as `AlreadyGone`; like a successful
    /// delete it leaves the cursor disposed. Any other failure is returned
    /// and leaves the cursor untouched so deletion can be retried.
    pub async fn delete(&mut self) -> Result<()> {
        if self.state == CursorState::Disposed {
            return Err(AqlError::invalid_state("cursor has already been deleted"));
        }
        let id = self
            .id
            .clone()
            .ok_or_else(|| AqlError::invalid_state("cursor has no server id to delete"))?;

        let response = self
            .db
            .send(CURSOR_RESOURCE, Some(&id), Method::Delete, None)
            .await?;

        match response.status {
            202 => {
                debug!(cursor = %id, "cursor deleted");
                self.dispose();
                Ok(())
            }
            404 => {
                debug!(cursor = %id, "cursor already gone");
                self.dispose();
                Err(AqlError::AlreadyGone { id })
            }
            _ => Err(rejection(&response)),
        }
    }

    /// Returns the server-assigned cursor id, if the server keeps one.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Total result count, when the query asked for it.
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    /// Rows matching the query ignoring LIMIT, when the query asked for it.
    pub fn full_count(&self) -> Option<u64> {
        self.extra.stats.full_count
    }

    /// Whether the server has batches beyond the current one.
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Statistics from the most recent envelope.
    pub fn stats(&self) -> &Stats {
        &self.extra.stats
    }

    /// Warnings from the most recent envelope.
    pub fn warnings(&self) -> &[Warning] {
        &self.extra.warnings
    }

    /// Whether the result came from the query cache.
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    /// The envelope-level error flag.
    pub fn is_error(&self) -> bool {
        self.error
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// The envelope `code` (HTTP status echoed by the server).
    pub fn error_code(&self) -> Option<u16> {
        self.code
    }

    /// The last refill or decode failure.
    pub fn last_error(&self) -> Option<&AqlError> {
        self.last_error.as_ref()
    }

    /// Time spent on the most recent server round-trip.
    pub fn last_fetch_time(&self) -> Duration {
        self.last_fetch_time
    }

    /// Position of the next row within the current batch.
    pub fn read_index(&self) -> usize {
        self.read_index
    }

    /// Number of rows in the current batch.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Makes sure a row is available at `read_index`, refilling as needed.
    async fn advance(&mut self) -> Result<bool> {
        self.ensure_usable()?;

        while self.read_index >= self.buffer.len() {
            if !self.has_more {
                self.state = CursorState::Exhausted;
                return Ok(false);
            }
            self.refill().await?;
        }
        Ok(true)
    }

    /// Replaces the buffer with the next batch from the server.
    async fn refill(&mut self) -> Result<()> {
        let id = self
            .id
            .clone()
            .ok_or_else(|| AqlError::invalid_state("cursor has no server id to refill from"))?;

        let start = Instant::now();
        let result = self
            .db
            .send(CURSOR_RESOURCE, Some(&id), Method::Put, None)
            .await
            .and_then(|response| {
                if response.status == 200 {
                    CursorEnvelope::from_response(&response)
                } else {
                    Err(rejection(&response))
                }
            });
        self.last_fetch_time = start.elapsed();

        match result {
            Ok(envelope) => {
                debug!(
                    cursor = %id,
                    rows = envelope.result.len(),
                    has_more = envelope.has_more,
                    "fetched next batch"
                );
                self.apply(envelope);
                Ok(())
            }
            Err(e) => {
                warn!(cursor = %id, error = %e, "failed to fetch next batch");
                self.last_error = Some(e.clone());
                self.state = CursorState::Errored;
                Err(e)
            }
        }
    }

    fn apply(&mut self, envelope: CursorEnvelope) {
        self.buffer = envelope.result;
        self.read_index = 0;
        // Once the server says there is nothing more, it stays that way.
        self.has_more = self.has_more && envelope.has_more;
        self.count = envelope.count.or(self.count);
        self.extra = envelope.extra;
        self.cached = envelope.cached;
        self.error = envelope.error;
        self.error_message = envelope.error_message;
        self.code = envelope.code;
        self.state = CursorState::Readable;
        self.settle();
    }

    fn decode_at<T: DeserializeOwned>(&mut self, index: usize) -> Result<T> {
        match T::deserialize(&self.buffer[index]) {
            Ok(row) => Ok(row),
            Err(e) => {
                let err =
                    AqlError::type_mismatch(format!("row {} cannot be decoded: {}", index, e));
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn ensure_usable(&self) -> Result<()> {
        match self.state {
            CursorState::Disposed => Err(AqlError::invalid_state("cursor has been deleted")),
            CursorState::Errored => Err(AqlError::invalid_state(match &self.last_error {
                Some(e) => format!("cursor failed earlier: {}", e),
                None => "cursor failed earlier".to_string(),
            })),
            CursorState::Readable | CursorState::Exhausted => Ok(()),
        }
    }

    fn settle(&mut self) {
        if self.state == CursorState::Readable
            && !self.has_more
            && self.read_index >= self.buffer.len()
        {
            self.state = CursorState::Exhausted;
        }
    }

    fn dispose(&mut self) {
        self.id = None;
        self.buffer.clear();
        self.read_index = 0;
        self.has_more = false;
        self.state = CursorState::Disposed;
    }
}

impl Drop for Cursor<'_> {
    fn drop(&mut self) {
        if self.state != CursorState::Disposed && self.has_more {
            if let Some(id) = &self.id {
                warn!(
                    cursor = %id,
                    "cursor dropped with unread batches; the server keeps it until its TTL expires"
                );
            }
        }
    }
}
