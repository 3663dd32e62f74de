//! TTL-cached liveness probe for the sidecar backend.
//!
//! Call paths that depend on the sidecar (code review, debug, registry
//! operations) consult [`HealthMonitor::require_healthy`] before doing any
//! work; a cached `Unhealthy` short-circuits them immediately with
//! `ServiceUnavailable`. The cached status is refreshed at most once per
//! TTL window. The state mutex is held across the probe itself, so two
//! concurrent callers on an expired cache produce exactly one probe and
//! a probe can never be overwritten by a staler one.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::config::SidecarConfig;
use crate::error::MuxError;
use crate::transport::{HttpCall, HttpTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl HealthStatus {
    pub fn is_healthy(self) -> bool {
        matches!(self, Self::Healthy)
    }
}

#[derive(Debug)]
struct HealthState {
    status: HealthStatus,
    checked_at: Option<Instant>,
}

pub struct HealthMonitor {
    transport: Arc<dyn HttpTransport>,
    url: String,
    ttl: Duration,
    probe_timeout: Duration,
    state: Mutex<HealthState>,
}

impl HealthMonitor {
    pub fn new(sidecar: &SidecarConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            url: sidecar.health_url(),
            ttl: sidecar.health_ttl,
            probe_timeout: sidecar.probe_timeout,
            state: Mutex::new(HealthState {
                status: HealthStatus::Unhealthy,
                checked_at: None,
            }),
        }
    }

    /// Current liveness, probing only when the cached status has expired.
    pub async fn is_healthy(&self) -> bool {
        let mut state = self.state.lock().await;
        if let Some(checked_at) = state.checked_at {
            if checked_at.elapsed() < self.ttl {
                return state.status.is_healthy();
            }
        }
        let status = self.probe().await;
        state.status = status;
        state.checked_at = Some(Instant::now());
        status.is_healthy()
    }

    /// Gate for sidecar-dependent call paths.
    pub async fn require_healthy(&self) -> Result<(), MuxError> {
        if self.is_healthy().await {
            Ok(())
        } else {
            Err(MuxError::ServiceUnavailable)
        }
    }

    async fn probe(&self) -> HealthStatus {
        let call = HttpCall::get(self.url.clone());
        match tokio::time::timeout(self.probe_timeout, self.transport.execute(call)).await {
            Ok(Ok(reply)) if reply.is_success() => {
                debug!(url = %self.url, "sidecar healthy");
                HealthStatus::Healthy
            }
            Ok(Ok(reply)) => {
                warn!(url = %self.url, status = reply.status, "sidecar probe rejected");
                HealthStatus::Unhealthy
            }
            Ok(Err(err)) => {
                warn!(url = %self.url, error = %err, "sidecar probe failed");
                HealthStatus::Unhealthy
            }
            Err(_) => {
                warn!(url = %self.url, "sidecar probe timed out");
                HealthStatus::Unhealthy
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CallError;
    use crate::transport::HttpReply;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};

    /// Transport that counts probes and serves a configurable status.
    struct CountingTransport {
        probes: AtomicUsize,
        status: AtomicU16,
    }

    impl CountingTransport {
        fn healthy() -> Self {
            Self {
                probes: AtomicUsize::new(0),
                status: AtomicU16::new(200),
            }
        }

        fn count(&self) -> usize {
            self.probes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl HttpTransport for CountingTransport {
        async fn execute(&self, _call: HttpCall) -> Result<HttpReply, CallError> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            Ok(HttpReply {
                status: self.status.load(Ordering::SeqCst),
                body: "ok".to_string(),
            })
        }
    }

    fn sidecar(ttl_secs: u64) -> SidecarConfig {
        SidecarConfig {
            host: "127.0.0.1".to_string(),
            port: 8765,
            health_ttl: Duration::from_secs(ttl_secs),
            probe_timeout: Duration::from_secs(2),
        }
    }

    #[tokio::test]
    async fn calls_within_ttl_share_one_probe() {
        let transport = Arc::new(CountingTransport::healthy());
        let monitor = HealthMonitor::new(&sidecar(30), transport.clone());

        assert!(monitor.is_healthy().await);
        assert!(monitor.is_healthy().await);
        assert_eq!(transport.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_ttl_triggers_a_fresh_probe() {
        let transport = Arc::new(CountingTransport::healthy());
        let monitor = HealthMonitor::new(&sidecar(30), transport.clone());

        assert!(monitor.is_healthy().await);
        tokio::time::advance(Duration::from_secs(31)).await;
        assert!(monitor.is_healthy().await);
        assert_eq!(transport.count(), 2);
    }

    #[tokio::test]
    async fn unhealthy_status_is_cached_and_gates() {
        let transport = Arc::new(CountingTransport::healthy());
        transport.status.store(503, Ordering::SeqCst);
        let monitor = HealthMonitor::new(&sidecar(30), transport.clone());

        assert!(!monitor.is_healthy().await);
        assert!(matches!(
            monitor.require_healthy().await,
            Err(MuxError::ServiceUnavailable)
        ));
        // Second read hits the cache, no new probe.
        assert_eq!(transport.count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_probe_is_unhealthy_after_its_own_timeout() {
        struct HangingTransport;

        #[async_trait]
        impl HttpTransport for HangingTransport {
            async fn execute(&self, _call: HttpCall) -> Result<HttpReply, CallError> {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(HttpReply::ok("late"))
            }
        }

        let monitor = HealthMonitor::new(&sidecar(30), Arc::new(HangingTransport));
        assert!(!monitor.is_healthy().await);
    }

    #[tokio::test]
    async fn concurrent_callers_on_cold_cache_probe_once() {
        let transport = Arc::new(CountingTransport::healthy());
        let monitor = Arc::new(HealthMonitor::new(&sidecar(30), transport.clone()));

        let a = {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.is_healthy().await })
        };
        let b = {
            let monitor = monitor.clone();
            tokio::spawn(async move { monitor.is_healthy().await })
        };
        assert!(a.await.unwrap());
        assert!(b.await.unwrap());
        assert_eq!(transport.count(), 1);
    }
}
