//! Entry operations on the named stores.
//!
//! A store is a named, insertion-ordered collection of
//! (request identity → response) entries. Identity is (method, url); only the
//! engine ever writes, and it only writes GET responses. Each put and delete
//! is a single SQL statement, so an aborted handler can never leave a partial
//! entry behind.

use super::connection::StoreSet;
use crate::cache::request::{CachedResponse, RequestKey};
use crate::Error;
use bytes::Bytes;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

fn row_to_response(row: &rusqlite::Row<'_>) -> Result<CachedResponse, rusqlite::Error> {
    let status: u16 = row.get(0)?;
    let headers_json: String = row.get(1)?;
    let body: Vec<u8> = row.get(2)?;
    // headers_json is always engine-written; an undecodable value means the
    // row predates the current schema and headers are dropped, not the body.
    let headers = serde_json::from_str(&headers_json).unwrap_or_default();
    Ok(CachedResponse { status, headers, body: Bytes::from(body) })
}

impl StoreSet {
    /// Look up an entry in one named store.
    ///
    /// Returns None on a cache miss; a miss is a normal branch, not an error.
    pub async fn match_in(&self, store: &str, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        let store = store.to_string();
        let key = key.clone();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body FROM entries
                     WHERE store = ?1 AND method = ?2 AND url = ?3",
                    params![store, key.method, key.url],
                    |row| row_to_response(row),
                );

                match result {
                    Ok(resp) => Ok(Some(resp)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry across ALL stores, oldest entry first.
    ///
    /// Used by the navigational strategy, which accepts a hit from any store.
    pub async fn match_any(&self, key: &RequestKey) -> Result<Option<CachedResponse>, Error> {
        let key = key.clone();
        self.conn
            .call(move |conn| -> Result<Option<CachedResponse>, Error> {
                let result = conn.query_row(
                    "SELECT status, headers_json, body FROM entries
                     WHERE method = ?1 AND url = ?2
                     ORDER BY rowid ASC LIMIT 1",
                    params![key.method, key.url],
                    |row| row_to_response(row),
                );

                match result {
                    Ok(resp) => Ok(Some(resp)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update an entry.
    ///
    /// UPSERT semantics: a re-write of an existing identity replaces the
    /// response but keeps the row's rowid, so insertion order is stable
    /// under refresh. Concurrent writers race last-writer-wins.
    pub async fn put(&self, store: &str, key: &RequestKey, response: &CachedResponse) -> Result<(), Error> {
        let store = store.to_string();
        let key = key.clone();
        let status = response.status;
        let headers_json =
            serde_json::to_string(&response.headers).unwrap_or_else(|_| "[]".to_string());
        let body = response.body.to_vec();
        let stored_at = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO entries (store, method, url, status, headers_json, body, stored_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(store, method, url) DO UPDATE SET
                        status = excluded.status,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![store, key.method, key.url, status, headers_json, body, stored_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// All identities in a store, in insertion order (oldest first).
    pub async fn keys(&self, store: &str) -> Result<Vec<RequestKey>, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<Vec<RequestKey>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT method, url FROM entries WHERE store = ?1 ORDER BY rowid ASC",
                )?;
                let keys = stmt
                    .query_map(params![store], |row| {
                        Ok(RequestKey { method: row.get(0)?, url: row.get(1)? })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete one entry. Returns true if an entry existed.
    pub async fn delete(&self, store: &str, key: &RequestKey) -> Result<bool, Error> {
        let store = store.to_string();
        let key = key.clone();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let count = conn.execute(
                    "DELETE FROM entries WHERE store = ?1 AND method = ?2 AND url = ?3",
                    params![store, key.method, key.url],
                )?;
                Ok(count > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Entry count of a store.
    pub async fn len(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM entries WHERE store = ?1",
                    params![store],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Names of all stores that currently hold at least one entry.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT store FROM entries ORDER BY store")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a whole store. Returns the number of deleted entries.
    ///
    /// Lifecycle-only operation; the strategies never call this.
    pub async fn delete_store(&self, store: &str) -> Result<u64, Error> {
        let store = store.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count = conn.execute("DELETE FROM entries WHERE store = ?1", params![store])?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(url: &str) -> RequestKey {
        RequestKey { method: "GET".to_string(), url: url.to_string() }
    }

    fn resp(body: &str) -> CachedResponse {
        CachedResponse::new(200, body.to_string()).with_header("content-type", "text/plain")
    }

    #[tokio::test]
    async fn test_put_and_match() {
        let stores = StoreSet::open_in_memory().await.unwrap();
        stores.put("runtime", &key("https://a/x"), &resp("hello")).await.unwrap();

        let found = stores.match_in("runtime", &key("https://a/x")).await.unwrap().unwrap();
        assert_eq!(found.status, 200);
        assert_eq!(found.body.as_ref(), b"hello");
        assert_eq!(found.header("content-type"), Some("text/plain"));
    }

    #[tokio::test]
    async fn test_match_miss() {
        let stores = StoreSet::open_in_memory().await.unwrap();
        let found = stores.match_in("runtime", &key("https://a/missing")).await.unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_match_is_store_scoped() {
        let stores = StoreSet::open_in_memory().await.unwrap();
        stores.put("images", &key("https://a/x"), &resp("img")).await.unwrap();

        assert!(stores.match_in("runtime", &key("https://a/x")).await.unwrap().is_none());
        assert!(stores.match_any(&key("https://a/x")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_keys_insertion_order() {
        let stores = StoreSet::open_in_memory().await.unwrap();
        for name in ["https://a/1", "https://a/2", "https://a/3"] {
            stores.put("runtime", &key(name), &resp(name)).await.unwrap();
        }

        let keys = stores.keys("runtime").await.unwrap();
        let urls: Vec<&str> = keys.iter().map(|k| k.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a/1", "https://a/2", "https://a/3"]);
    }

    #[tokio::test]
    async fn test_upsert_keeps_insertion_order() {
        let stores = StoreSet::open_in_memory().await.unwrap();
        stores.put("runtime", &key("https://a/1"), &resp("v1")).await.unwrap();
        stores.put("runtime", &key("https://a/2"), &resp("v1")).await.unwrap();
        // refresh the first entry; it must not move to the back
        stores.put("runtime", &key("https://a/1"), &resp("v2")).await.unwrap();

        let keys = stores.keys("runtime").await.unwrap();
        assert_eq!(keys[0].url, "https://a/1");
        assert_eq!(keys[1].url, "https://a/2");

        let refreshed = stores.match_in("runtime", &key("https://a/1")).await.unwrap().unwrap();
        assert_eq!(refreshed.body.as_ref(), b"v2");
    }

    #[tokio::test]
    async fn test_delete() {
        let stores = StoreSet::open_in_memory().await.unwrap();
        stores.put("runtime", &key("https://a/x"), &resp("x")).await.unwrap();

        assert!(stores.delete("runtime", &key("https://a/x")).await.unwrap());
        assert!(!stores.delete("runtime", &key("https://a/x")).await.unwrap());
        assert_eq!(stores.len("runtime").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_store_names_and_delete_store() {
        let stores = StoreSet::open_in_memory().await.unwrap();
        stores.put("app-static-v1", &key("https://a/1"), &resp("a")).await.unwrap();
        stores.put("app-runtime-v1", &key("https://a/2"), &resp("b")).await.unwrap();

        assert_eq!(
            stores.store_names().await.unwrap(),
            vec!["app-runtime-v1".to_string(), "app-static-v1".to_string()]
        );

        let deleted = stores.delete_store("app-static-v1").await.unwrap();
        assert_eq!(deleted, 1);
        assert_eq!(stores.store_names().await.unwrap(), vec!["app-runtime-v1".to_string()]);
    }
}
