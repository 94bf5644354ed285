use anyhow::Result;
use futures::StreamExt;
use moka::future::Cache;
use sqlx::MySqlPool;
use std::time::Duration;

/// fingerprint => employee id, mirroring the `device_bindings` table.
#[derive(Clone)]
pub struct FingerprintCache {
    inner: Cache<String, u64>,
}

impl FingerprintCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn get(&self, fingerprint: &str) -> Option<u64> {
        self.inner.get(fingerprint).await
    }

    pub async fn remember(&self, fingerprint: &str, employee_id: u64) {
        self.inner.insert(fingerprint.to_string(), employee_id).await;
    }

    pub async fn forget(&self, fingerprint: &str) {
        self.inner.invalidate(fingerprint).await;
    }

    /// Batch insert bindings
    async fn batch_remember(&self, bindings: &[(String, u64)]) {
        let futures: Vec<_> = bindings
            .iter()
            .map(|(fp, id)| self.inner.insert(fp.clone(), *id))
            .collect();

        // Await all insertions concurrently
        futures::future::join_all(futures).await;
    }

    /// Load recently used bindings into the cache (batched)
    pub async fn warmup(&self, pool: &MySqlPool, days: u32, batch_size: usize) -> Result<()> {
        let mut stream = sqlx::query_as::<_, (String, u64)>(
            r#"
            SELECT fingerprint, employee_id
            FROM device_bindings
            WHERE updated_at >= NOW() - INTERVAL ? DAY
            ORDER BY updated_at DESC
            "#,
        )
        .bind(days)
        .fetch(pool);

        let mut batch = Vec::with_capacity(batch_size);
        let mut total_count = 0usize;

        while let Some(row) = stream.next().await {
            batch.push(row?);
            total_count += 1;

            if batch.len() >= batch_size {
                self.batch_remember(&batch).await;
                batch.clear();
            }
        }

        if !batch.is_empty() {
            self.batch_remember(&batch).await;
        }

        log::info!(
            "Fingerprint cache warmup complete: {} devices (last {} days)",
            total_count,
            days
        );

        Ok(())
    }
}

impl Default for FingerprintCache {
    fn default() -> Self {
        Self::new(50_000, Duration::from_secs(86400)) // 24h TTL
    }
}
