//! Reusable HTTP clients, one per bot endpoint.
//!
//! A client is cached for as long as it keeps being used: every [`ConnectionPool::acquire`]
//! resets its idle timer, and it is dropped once it has been idle for the configured TTL.
//! A client is also dropped eagerly after a run of consecutive timeouts or errors from its
//! endpoint, so a bot that restarted behind the same URL gets fresh connections.
//!
//! The pool is meant to be built once and shared (behind an `Arc`) by every running match.

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use dashmap::DashMap;
use moka::{notification::RemovalCause, sync::Cache};
use reqwest::Client;
use tracing::{debug, trace, warn};

use crate::settings::MatchSettings;

/// Upper bound on distinct endpoints kept at once.
const MAX_CACHED_CLIENTS: u64 = 1024;

pub struct ConnectionPool {
    clients: Cache<String, Client>,
    failure_streaks: Arc<DashMap<String, u32>>,
    /// Default for requests sent without their own timeout.
    request_timeout: Duration,
    max_consecutive_failures: Option<u32>,
}

impl ConnectionPool {
    pub fn new(settings: &MatchSettings) -> ConnectionPool {
        let failure_streaks = Arc::new(DashMap::<String, u32>::new());
        let streaks = Arc::clone(&failure_streaks);
        let clients = Cache::builder()
            .max_capacity(MAX_CACHED_CLIENTS)
            .time_to_idle(settings.client_ttl)
            .eviction_listener(move |endpoint: Arc<String>, _client, cause: RemovalCause| {
                if cause.was_evicted() {
                    trace!(endpoint = %endpoint, ?cause, "idle client dropped");
                    streaks.remove(endpoint.as_str());
                }
            })
            .build();

        ConnectionPool {
            clients,
            failure_streaks,
            request_timeout: settings.request_timeout,
            max_consecutive_failures: settings.max_consecutive_failures,
        }
    }

    /// Returns the cached client for `endpoint`, building one if none is cached.
    ///
    /// Two concurrent callers may both build a client for the same endpoint; the last one
    /// inserted stays cached and both are usable.
    pub fn acquire(&self, endpoint: &str) -> anyhow::Result<Client> {
        if let Some(client) = self.clients.get(endpoint) {
            trace!(endpoint, "reusing cached client");
            return Ok(client);
        }

        let client = Client::builder()
            .timeout(self.request_timeout)
            .build()
            .inspect_err(|e| warn!(endpoint, error = %e, "local http client could not be built"))
            .with_context(|| format!("could not build http client for {endpoint}"))?;
        debug!(endpoint, timeout = ?self.request_timeout, "new client cached");
        self.clients.insert(endpoint.to_owned(), client.clone());
        Ok(client)
    }

    /// Records how the last request to `endpoint` went.
    ///
    /// A success resets the failure streak; a failure extends it and evicts the client once
    /// the streak reaches the configured threshold.
    pub fn record(&self, endpoint: &str, succeeded: bool) {
        if succeeded {
            self.failure_streaks.remove(endpoint);
            return;
        }

        let Some(threshold) = self.max_consecutive_failures else {
            return;
        };

        let streak = {
            let mut entry = self.failure_streaks.entry(endpoint.to_owned()).or_insert(0);
            *entry += 1;
            *entry
        };
        if streak >= threshold {
            debug!(endpoint, streak, "evicting client after consecutive failures");
            self.invalidate(endpoint);
        }
    }

    /// Drops the cached client for `endpoint`, if any, and forgets its failure streak.
    pub fn invalidate(&self, endpoint: &str) {
        self.clients.invalidate(endpoint);
        self.failure_streaks.remove(endpoint);
    }

    /// True if a live client is cached for `endpoint`. Does not reset its idle timer.
    pub fn is_cached(&self, endpoint: &str) -> bool {
        self.clients.contains_key(endpoint)
    }
}

impl std::fmt::Debug for ConnectionPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("cached_clients", &self.clients.entry_count())
            .field("request_timeout", &self.request_timeout)
            .field("max_consecutive_failures", &self.max_consecutive_failures)
            .finish()
    }
}
