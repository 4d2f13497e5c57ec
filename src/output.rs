//! Row output and cursor cleanup for the `aql` binary.

use aql_cursor::cursor::{Cursor, CursorState};
use aql_cursor::error::{AqlError, Result};
use serde_json::Value;
use tracing::warn;

/// Emits rows one at a time. Returns the number of rows emitted.
pub async fn emit_rows<F>(cursor: &mut Cursor<'_>, mut emit: F) -> Result<usize>
where
    F: FnMut(&Value),
{
    let mut emitted = 0;
    while let Some(row) = cursor.fetch_one::<Value>().await? {
        emit(&row);
        emitted += 1;
    }
    Ok(emitted)
}

/// Emits rows a batch at a time.
///
/// Rows decoded before a failed refill are still emitted.
pub async fn emit_batches<F>(cursor: &mut Cursor<'_>, mut emit: F) -> Result<usize>
where
    F: FnMut(&Value),
{
    let mut emitted = 0;
    loop {
        let mut batch: Vec<Value> = Vec::new();
        let result = cursor.fetch_batch_into(&mut batch).await;
        for row in &batch {
            emit(row);
        }
        emitted += batch.len();
        result?;

        if cursor.state() == CursorState::Exhausted {
            return Ok(emitted);
        }
    }
}

/// Deletes the server-side cursor if batches were left unread.
///
/// A cursor the server already dropped counts as released.
pub async fn release(cursor: &mut Cursor<'_>) {
    if !cursor.has_more() || cursor.id().is_none() || cursor.state() == CursorState::Disposed {
        return;
    }
    match cursor.delete().await {
        Ok(()) | Err(AqlError::AlreadyGone { .. }) => {}
        Err(e) => warn!("Failed to delete cursor: {}", e),
    }
}
