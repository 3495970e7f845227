//! Bounded-store eviction.
//!
//! The cap is a soft ceiling: one clean removes at most one entry, so a burst
//! of writes can transiently push a store past its cap until enough cleans
//! have run. The bound exists to stop unbounded growth, not to hold an exact
//! size at every instant.

use super::connection::StoreSet;
use crate::Error;
use tokio_rusqlite::params;

/// Evict the single oldest entry if the store is over its cap.
///
/// Returns true if an entry was removed. "Oldest" is insertion order, which
/// the entries table exposes as the minimum rowid for the store.
pub async fn clean(stores: &StoreSet, store: &str, cap: usize) -> Result<bool, Error> {
    let name = store.to_string();
    let cap = cap as i64;
    let removed = stores
        .conn
        .call(move |conn| -> Result<bool, Error> {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM entries WHERE store = ?1",
                params![name],
                |row| row.get(0),
            )?;
            if count <= cap {
                return Ok(false);
            }

            let deleted = conn.execute(
                "DELETE FROM entries WHERE rowid IN (
                    SELECT rowid FROM entries WHERE store = ?1 ORDER BY rowid ASC LIMIT 1
                )",
                params![name],
            )?;
            Ok(deleted > 0)
        })
        .await
        .map_err(Error::from)?;

    if removed {
        tracing::debug!(store, "evicted oldest entry");
    }

    Ok(removed)
}
