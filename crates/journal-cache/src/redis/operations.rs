//! Redis key-value store implementation.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use journal_core::error::{AppError, ErrorKind};
use journal_core::result::AppResult;
use journal_core::traits::KeyValueStore;

use super::client::RedisClient;

/// Lua script for atomic compare-and-swap.
///
/// KEYS[1] = key
/// ARGV[1] = "1" if a current value is expected, "0" if the key must be absent
/// ARGV[2] = expected value
/// ARGV[3] = "1" to write ARGV[4], "0" to delete the key
/// ARGV[4] = new value
/// ARGV[5] = TTL in milliseconds ("0" for none)
///
/// Returns 1 if swapped, 0 if the current value did not match.
const CAS_SCRIPT: &str = r#"
    local current = redis.call('GET', KEYS[1])

    if ARGV[1] == '0' then
        if current then
            return 0
        end
    elseif current ~= ARGV[2] then
        return 0
    end

    if ARGV[3] == '0' then
        redis.call('DEL', KEYS[1])
    elseif tonumber(ARGV[5]) > 0 then
        redis.call('SET', KEYS[1], ARGV[4], 'PX', ARGV[5])
    else
        redis.call('SET', KEYS[1], ARGV[4])
    end

    return 1
"#;

/// Redis-backed key-value store for multi-instance deployments.
#[derive(Debug, Clone)]
pub struct RedisKvStore {
    /// Redis client.
    client: RedisClient,
}

impl RedisKvStore {
    /// Create a new Redis store.
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }

    /// Map a Redis error to an AppError.
    fn map_err(e: redis::RedisError) -> AppError {
        AppError::with_source(ErrorKind::Cache, format!("Redis error: {e}"), e)
    }
}

#[async_trait]
impl KeyValueStore for RedisKvStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let result: Option<String> = conn.get(&full_key).await.map_err(Self::map_err)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        match ttl {
            Some(ttl) => {
                let _: () = conn
                    .pset_ex(&full_key, value, ttl.as_millis() as u64)
                    .await
                    .map_err(Self::map_err)?;
            }
            None => {
                let _: () = conn.set(&full_key, value).await.map_err(Self::map_err)?;
            }
        }
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();
        let _: () = conn.del(&full_key).await.map_err(Self::map_err)?;
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: Option<&str>,
        ttl: Option<Duration>,
    ) -> AppResult<bool> {
        let full_key = self.client.prefixed_key(key);
        let mut conn = self.client.conn_mut();

        let ttl_ms = ttl.map(|t| t.as_millis() as u64).unwrap_or(0);

        let swapped: i64 = redis::Script::new(CAS_SCRIPT)
            .key(&full_key)
            .arg(if expected.is_some() { "1" } else { "0" })
            .arg(expected.unwrap_or(""))
            .arg(if new.is_some() { "1" } else { "0" })
            .arg(new.unwrap_or(""))
            .arg(ttl_ms)
            .invoke_async(&mut conn)
            .await
            .map_err(Self::map_err)?;

        debug!(key = %full_key, swapped, "Compare-and-swap");
        Ok(swapped == 1)
    }

    async fn health_check(&self) -> AppResult<bool> {
        let mut conn = self.client.conn_mut();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(Self::map_err)?;
        Ok(pong == "PONG")
    }
}
