use async_trait::async_trait;
use futures::future;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// Default time services get to stop before they are abandoned.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// A long running part of the engine (e.g. the JSON-RPC server)
#[async_trait]
pub trait Service: Send + Sync + 'static {
    /// Run the service until `shutdown_rx` fires
    async fn start(&self, shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()>;

    /// Release resources after the run loop returned
    async fn shutdown(&self) -> anyhow::Result<()>;

    fn name(&self) -> String;
}

type DynService = Arc<dyn Service>;

/// Starts services in registration order and stops them together
pub struct ServiceManager {
    services: Mutex<Vec<DynService>>,
    handles: Mutex<Vec<(String, JoinHandle<()>)>>,
    shutdown_tx: broadcast::Sender<()>,
    grace: Duration,
}

impl ServiceManager {
    pub fn new() -> Self {
        Self::with_grace(DEFAULT_SHUTDOWN_GRACE)
    }

    pub fn with_grace(grace: Duration) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        ServiceManager {
            services: Mutex::new(Vec::new()),
            handles: Mutex::new(Vec::new()),
            shutdown_tx,
            grace,
        }
    }

    /// Register a service. Names must be unique.
    pub async fn register_service<S>(&self, service: Arc<S>) -> anyhow::Result<()>
    where
        S: Service,
    {
        let name = service.name();
        let mut services = self.services.lock().await;
        if services.iter().any(|s| s.name() == name) {
            anyhow::bail!("Service {} is already registered", name);
        }
        services.push(service);
        Ok(())
    }

    /// Spawn every registered service
    pub async fn start_all(&self) -> anyhow::Result<()> {
        let services = self.services.lock().await;
        let mut handles = self.handles.lock().await;
        for service in services.iter() {
            let shutdown_rx = self.shutdown_signal();
            let service: DynService = Arc::clone(service);
            let name = service.name();
            info!(service.name = %name, "Starting service");
            let handle = tokio::spawn(async move {
                if let Err(e) = service.start(shutdown_rx).await {
                    error!(error = %e, service.name = service.name(), "Service stopped with an error");
                }
            });
            handles.push((name, handle));
        }
        Ok(())
    }

    /// Signal shutdown, wait up to the grace period for run loops, then call
    /// `shutdown` on every service with the same bound
    pub async fn shutdown_all(&self) -> anyhow::Result<()> {
        let _ = self.shutdown_tx.send(());

        let mut handles = self.handles.lock().await;
        let joins = handles.drain(..).map(|(name, handle)| async move {
            if let Err(e) = handle.await {
                error!(error = %e, service.name = name, "Service task panicked or was cancelled");
            }
        });
        if timeout(self.grace, future::join_all(joins)).await.is_err() {
            warn!(grace = ?self.grace, "Some services did not stop in time");
        }

        let services = self.services.lock().await;
        let shutdowns = services.iter().map(|service| async move {
            if let Err(e) = service.shutdown().await {
                error!(error = %e, service.name = service.name(), "Error shutting down service");
            }
        });
        match timeout(self.grace, future::join_all(shutdowns)).await {
            Ok(_) => info!("All services shut down"),
            Err(_) => warn!(grace = ?self.grace, "Some services did not shut down in time"),
        }

        Ok(())
    }

    pub fn shutdown_signal(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }
}

impl Default for ServiceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::time::sleep;

    struct TestService {
        name: String,
        shutdown_delay: Duration,
        saw_signal: Arc<AtomicBool>,
        was_shutdown: Arc<AtomicBool>,
    }

    impl TestService {
        fn new(name: &str, shutdown_delay: Duration) -> Self {
            TestService {
                name: name.to_string(),
                shutdown_delay,
                saw_signal: Arc::new(AtomicBool::new(false)),
                was_shutdown: Arc::new(AtomicBool::new(false)),
            }
        }
    }

    #[async_trait]
    impl Service for TestService {
        async fn start(&self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
            let _ = shutdown_rx.recv().await;
            self.saw_signal.store(true, Ordering::SeqCst);
            Ok(())
        }

        async fn shutdown(&self) -> anyhow::Result<()> {
            sleep(self.shutdown_delay).await;
            self.was_shutdown.store(true, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> String {
            self.name.clone()
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_is_rejected() {
        let manager = ServiceManager::new();
        let service = Arc::new(TestService::new("rpc", Duration::ZERO));

        assert!(manager.register_service(service.clone()).await.is_ok());
        assert!(manager.register_service(service).await.is_err());
    }

    #[tokio::test]
    async fn test_graceful_shutdown_reaches_every_service() {
        let manager = ServiceManager::new();
        let first = Arc::new(TestService::new("rpc", Duration::from_millis(50)));
        let second = Arc::new(TestService::new("admin", Duration::ZERO));

        manager.register_service(first.clone()).await.unwrap();
        manager.register_service(second.clone()).await.unwrap();
        manager.start_all().await.unwrap();
        assert_eq!(manager.handles.lock().await.len(), 2);

        manager.shutdown_all().await.unwrap();
        for service in [&first, &second] {
            assert!(service.saw_signal.load(Ordering::SeqCst));
            assert!(service.was_shutdown.load(Ordering::SeqCst));
        }
    }

    #[tokio::test]
    async fn test_slow_shutdown_is_bounded_by_grace() {
        let manager = ServiceManager::with_grace(Duration::from_millis(100));
        let service = Arc::new(TestService::new("slow", Duration::from_secs(20)));

        manager.register_service(service.clone()).await.unwrap();
        manager.start_all().await.unwrap();

        let start = std::time::Instant::now();
        manager.shutdown_all().await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!service.was_shutdown.load(Ordering::SeqCst));
    }
}
