use crate::backend::IndexBackend;
use crate::elasticsearch::ElasticsearchIndex;
use crate::error::StoreError;
use crate::filter::{CountCriteria, LogFilter, LogPage, LogStatistics};
use crate::memory::MemoryIndex;
use locator_core::config::{LogBackendKind, LoggingConfig};
use locator_core::{LogEntry, LogKind};
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, error, info, warn};

/// Append-only interaction log over an [`IndexBackend`].
///
/// The store never fails its caller. With no backend configured, or with
/// the backend unreachable, writes report `false`, reads come back empty
/// and counts come back zero; the cause is logged here.
pub struct LogStore {
    config: LoggingConfig,
    /// Backend handle, built on first use. `None` inside means logging
    /// is not configured.
    backend: OnceCell<Option<Arc<dyn IndexBackend>>>,
    /// Set once `ensure_index` has succeeded.
    index_ready: AtomicBool,
}

impl LogStore {
    /// A store whose backend is constructed from `config` on first use.
    pub fn new(config: LoggingConfig) -> Self {
        Self {
            config,
            backend: OnceCell::new(),
            index_ready: AtomicBool::new(false),
        }
    }

    /// A store over an already constructed backend.
    pub fn with_backend(backend: Arc<dyn IndexBackend>) -> Self {
        Self {
            config: LoggingConfig::default(),
            backend: OnceCell::with_value(Some(backend)),
            index_ready: AtomicBool::new(false),
        }
    }

    /// A store with logging switched off.
    pub fn disabled() -> Self {
        Self {
            config: LoggingConfig::default(),
            backend: OnceCell::with_value(None),
            index_ready: AtomicBool::new(false),
        }
    }

    fn backend(&self) -> Option<&Arc<dyn IndexBackend>> {
        self.backend.get_or_init(|| connect(&self.config)).as_ref()
    }

    /// Make sure the log index exists, creating it with the log mapping
    /// if needed. `false` means logging is degraded, not that the caller
    /// should fail.
    pub async fn ensure_index(&self) -> bool {
        let Some(backend) = self.backend() else {
            return false;
        };

        let created = match backend.index_exists().await {
            Ok(true) => return true,
            Ok(false) => backend.create_index().await,
            Err(e) => Err(e),
        };

        match created {
            Ok(()) => {
                info!("Log index created");
                true
            }
            Err(StoreError::AlreadyExists(_)) => {
                debug!("Log index already exists, continuing");
                true
            }
            Err(e) => {
                error!(error = %e, "Failed to initialize log index");
                false
            }
        }
    }

    /// Run [`ensure_index`](Self::ensure_index) until it first succeeds.
    pub async fn ensure_ready(&self) {
        if self.index_ready.load(Ordering::Acquire) {
            return;
        }
        if self.ensure_index().await {
            self.index_ready.store(true, Ordering::Release);
        }
    }

    /// Drop every stored entry by deleting and recreating the index.
    pub async fn reset_index(&self) -> bool {
        let Some(backend) = self.backend() else {
            return false;
        };

        self.index_ready.store(false, Ordering::Release);
        if let Err(e) = backend.delete_index().await {
            error!(error = %e, "Failed to delete log index");
            return false;
        }
        info!("Log index deleted");

        let recreated = self.ensure_index().await;
        if recreated {
            self.index_ready.store(true, Ordering::Release);
            info!("Log index recreated");
        }
        recreated
    }

    pub async fn append(&self, entry: &LogEntry) -> bool {
        let Some(backend) = self.backend() else {
            debug!(kind = %entry.kind(), "Logging not configured, skipping entry");
            return false;
        };

        match backend.index_document(entry).await {
            Ok(()) => {
                debug!(kind = %entry.kind(), session_id = %entry.session_id, "Interaction logged");
                true
            }
            Err(e) => {
                error!(error = %e, kind = %entry.kind(), "Failed to log interaction");
                false
            }
        }
    }

    pub async fn query(&self, filter: &LogFilter) -> LogPage {
        let Some(backend) = self.backend() else {
            return LogPage::default();
        };

        backend.search(filter).await.unwrap_or_else(|e| {
            error!(error = %e, "Failed to retrieve logs");
            LogPage::default()
        })
    }

    /// Five independent counts, requested concurrently. Any failure
    /// zeroes all of them.
    pub async fn statistics(&self) -> LogStatistics {
        let Some(backend) = self.backend() else {
            return LogStatistics::default();
        };

        let counts = tokio::try_join!(
            backend.count(CountCriteria::All),
            backend.count(CountCriteria::Kind(LogKind::Verifier)),
            backend.count(CountCriteria::Kind(LogKind::Source)),
            backend.count(CountCriteria::Verification { is_valid: true }),
            backend.count(CountCriteria::Verification { is_valid: false }),
        );

        match counts {
            Ok((total, verifier, source, successful, failed)) => LogStatistics {
                total_logs: total,
                verifier_logs: verifier,
                source_logs: source,
                successful_verifications: successful,
                failed_verifications: failed,
            },
            Err(e) => {
                error!(error = %e, "Failed to get log statistics");
                LogStatistics::default()
            }
        }
    }

    /// Whether the backend answers at all.
    pub async fn health_check(&self) -> bool {
        let Some(backend) = self.backend() else {
            return false;
        };

        match backend.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "Log backend health check failed");
                false
            }
        }
    }
}

fn connect(config: &LoggingConfig) -> Option<Arc<dyn IndexBackend>> {
    match config.backend {
        LogBackendKind::Elasticsearch => match ElasticsearchIndex::new(&config.elasticsearch) {
            Ok(index) => {
                info!(
                    node = %config.elasticsearch.node,
                    index = %index.index_name(),
                    "Elasticsearch log backend ready"
                );
                Some(Arc::new(index))
            }
            Err(StoreError::NotConfigured) => {
                warn!("Elasticsearch configuration not found, logging will be disabled");
                None
            }
            Err(e) => {
                error!(error = %e, "Failed to initialize Elasticsearch client");
                None
            }
        },
        LogBackendKind::Memory => {
            info!("In-memory log backend ready");
            Some(Arc::new(MemoryIndex::new()))
        }
        LogBackendKind::None => {
            info!("Interaction logging disabled");
            None
        }
    }
}
