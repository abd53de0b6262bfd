//! Fixed-size connection pool.
//!
//! Idle connections sit in a bounded channel. [`Pool::acquire`] takes one out and
//! returns a guard that puts it back when dropped, so a connection is held for exactly
//! one statement (or one transaction) on every exit path. A `may` semaphore counts the
//! idle connections; waiting on it parks the current coroutine (or thread) until a
//! release posts it or the timeout passes.

use crate::connection::{connect, ConnectionError};
use crate::executor::{is_postgres_unique_violation, ClientEngine, DbError, QueryEngine};
use crate::pool::config::DatabaseConfig;
use crate::row::RawRow;
use crate::value::Value;
use crossbeam_channel::{bounded, Receiver, Sender};
use may::sync::Semphore;
use may_postgres::Client;
use std::ops::{Deref, DerefMut};
use std::time::{Duration, Instant};

#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

/// Pool of `may_postgres` clients.
pub type ConnectionPool = Pool<Client>;

/// Bounded pool of reusable resources.
pub struct Pool<T> {
    idle_tx: Sender<T>,
    idle_rx: Receiver<T>,
    /// Posted once per resource in `idle_rx`.
    available: Semphore,
    size: usize,
    timeout: Duration,
}

impl<T> Pool<T> {
    /// Build a pool from already opened resources.
    pub fn from_resources(resources: Vec<T>, timeout: Duration) -> Self {
        let size = resources.len();
        let (idle_tx, idle_rx) = bounded(size.max(1));
        for resource in resources {
            // Capacity equals the number of resources, so this never blocks.
            let _ = idle_tx.send(resource);
        }
        Self {
            idle_tx,
            idle_rx,
            available: Semphore::new(size),
            size,
            timeout,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Resources currently waiting in the pool.
    pub fn idle(&self) -> usize {
        self.idle_rx.len()
    }

    /// Take a resource, waiting up to the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns `DbError::Pool` if no resource became free in time.
    pub fn acquire(&self) -> Result<Pooled<'_, T>, DbError> {
        #[cfg(feature = "tracing")]
        let _span = tracing::trace_span!("db.acquire").entered();

        let start = Instant::now();
        if !self.available.wait_timeout(self.timeout) {
            return Err(DbError::Pool(format!(
                "no connection available after {:?} ({} in pool)",
                self.timeout, self.size
            )));
        }

        // A successful wait reserves exactly one idle resource.
        let resource = self
            .idle_rx
            .try_recv()
            .map_err(|e| DbError::Pool(format!("idle connection missing after wait: {e}")))?;

        #[cfg(feature = "metrics")]
        METRICS.observe_pool_wait(start.elapsed());
        #[cfg(not(feature = "metrics"))]
        let _ = start;

        Ok(Pooled {
            resource: Some(resource),
            pool: self,
        })
    }

    fn release(&self, resource: T) {
        match self.idle_tx.try_send(resource) {
            Ok(()) => self.available.post(),
            Err(_) => log::warn!("dropping a connection returned to a full pool"),
        }
    }
}

impl Pool<Client> {
    /// Open `max_connections` clients up front.
    pub fn connect(config: &DatabaseConfig) -> Result<Self, ConnectionError> {
        if config.max_connections == 0 {
            return Err(ConnectionError::InvalidConnectionString(
                "max_connections must be at least 1".to_string(),
            ));
        }
        let clients = (0..config.max_connections)
            .map(|_| connect(&config.url))
            .collect::<Result<Vec<_>, _>>()?;
        log::info!(
            "opened {} database connections (timeout {}s)",
            clients.len(),
            config.pool_timeout_seconds
        );
        Ok(Self::from_resources(clients, config.pool_timeout()))
    }
}

/// A resource checked out of a [`Pool`]; returned on drop.
pub struct Pooled<'p, T> {
    resource: Option<T>,
    pool: &'p Pool<T>,
}

/// A client checked out of a [`ConnectionPool`].
pub type PooledConnection<'p> = Pooled<'p, Client>;

impl<T> Deref for Pooled<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.resource
            .as_ref()
            .expect("pooled resource is present until drop")
    }
}

impl<T> DerefMut for Pooled<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.resource
            .as_mut()
            .expect("pooled resource is present until drop")
    }
}

impl<T> Drop for Pooled<'_, T> {
    fn drop(&mut self) {
        if let Some(resource) = self.resource.take() {
            self.pool.release(resource);
        }
    }
}

impl QueryEngine for Pool<Client> {
    fn fetch_all(&self, sql: &str, args: &[Value]) -> Result<Vec<RawRow>, DbError> {
        let conn = self.acquire()?;
        ClientEngine::new(&conn).fetch_all(sql, args)
    }

    fn fetch_one(&self, sql: &str, args: &[Value]) -> Result<Option<RawRow>, DbError> {
        let conn = self.acquire()?;
        ClientEngine::new(&conn).fetch_one(sql, args)
    }

    fn fetch_none(&self, sql: &str, args: &[Value]) -> Result<u64, DbError> {
        let conn = self.acquire()?;
        ClientEngine::new(&conn).fetch_none(sql, args)
    }

    fn is_unique_violation(&self, err: &DbError) -> bool {
        is_postgres_unique_violation(err)
    }

    fn transaction(
        &self,
        body: &mut dyn FnMut(&dyn QueryEngine) -> Result<(), DbError>,
    ) -> Result<(), DbError> {
        let conn = self.acquire()?;
        ClientEngine::new(&conn).transaction(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_acquire_and_release() {
        let pool = Pool::from_resources(vec![1u32, 2], Duration::from_millis(50));
        assert_eq!(pool.size(), 2);
        assert_eq!(pool.idle(), 2);
        {
            let a = pool.acquire().unwrap();
            let b = pool.acquire().unwrap();
            assert_eq!(*a + *b, 3);
            assert_eq!(pool.idle(), 0);
        }
        assert_eq!(pool.idle(), 2);
    }

    #[test]
    fn test_acquire_times_out_when_exhausted() {
        let pool = Pool::from_resources(vec!["only"], Duration::from_millis(20));
        let _held = pool.acquire().unwrap();
        let err = pool.acquire().err().unwrap();
        assert!(matches!(err, DbError::Pool(msg) if msg.contains("no connection available")));
    }

    #[test]
    fn test_released_on_early_return() {
        fn failing(pool: &Pool<u8>) -> Result<(), DbError> {
            let _conn = pool.acquire()?;
            Err(DbError::Other("boom".to_string()))
        }

        let pool = Pool::from_resources(vec![7u8], Duration::from_millis(20));
        assert!(failing(&pool).is_err());
        assert_eq!(pool.idle(), 1);
        assert_eq!(*pool.acquire().unwrap(), 7);
    }

    #[test]
    fn test_waiting_acquirer_is_woken_by_release() {
        let pool = Arc::new(Pool::from_resources(vec![5u8], Duration::from_secs(5)));
        let (held_tx, held_rx) = may::sync::mpsc::channel();

        let holder_pool = Arc::clone(&pool);
        let holder = may::go!(move || {
            let conn = holder_pool.acquire().unwrap();
            held_tx.send(()).unwrap();
            may::coroutine::sleep(Duration::from_millis(50));
            drop(conn);
        });

        held_rx.recv().unwrap();
        assert_eq!(pool.idle(), 0);
        let start = Instant::now();
        let conn = pool.acquire().unwrap();
        let waited = start.elapsed();

        assert_eq!(*conn, 5);
        assert!(waited >= Duration::from_millis(20), "acquired before release: {waited:?}");
        assert!(waited < Duration::from_secs(5), "woken only by timeout: {waited:?}");
        holder.join().unwrap();
    }

    #[test]
    fn test_waiting_coroutine_is_woken_by_release() {
        let pool = Arc::new(Pool::from_resources(vec![9u8], Duration::from_secs(5)));
        let held = pool.acquire().unwrap();

        let waiter_pool = Arc::clone(&pool);
        let waiter = may::go!(move || {
            let start = Instant::now();
            let value = *waiter_pool.acquire().unwrap();
            (value, start.elapsed())
        });

        std::thread::sleep(Duration::from_millis(50));
        drop(held);
        let (value, waited) = waiter.join().unwrap();
        assert_eq!(value, 9);
        assert!(waited < Duration::from_secs(5));
        assert_eq!(pool.idle(), 1);
    }

    #[test]
    fn test_connect_rejects_zero_connections() {
        let config = DatabaseConfig {
            max_connections: 0,
            ..DatabaseConfig::default()
        };
        assert!(ConnectionPool::connect(&config).is_err());
    }
}
