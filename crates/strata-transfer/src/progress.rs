use std::collections::HashMap;
use std::sync::Arc;

use strata_backend::Service;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Upload progress snapshot, emitted after each successfully stored chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadProgress {
    /// Whole-transfer completion, 0–100.
    pub overall: f64,
    pub uploaded: u32,
    pub total: u32,
    /// Per-service completion against that service's assigned chunk count.
    pub per_service_percent: HashMap<Service, f64>,
    pub per_service_count: HashMap<Service, u32>,
}

/// Download progress snapshot, emitted after each verified chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadProgress {
    pub overall: f64,
    pub downloaded: u32,
    pub total: u32,
    /// Index of the chunk whose completion produced this snapshot.
    pub current_chunk_index: u32,
}

pub type UploadProgressFn = Arc<dyn Fn(&UploadProgress) + Send + Sync>;
pub type DownloadProgressFn = Arc<dyn Fn(&DownloadProgress) + Send + Sync>;

fn percent(done: u32, total: u32) -> f64 {
    if total == 0 {
        100.0
    } else {
        f64::from(done) / f64::from(total) * 100.0
    }
}

/// Single-writer progress accumulator for uploads.
///
/// Chunk completions race, so no counter is shared: every completion sends
/// one event over a channel and a dedicated task owns the counts, building
/// each snapshot from a consistent view before invoking the callback.
pub(crate) struct UploadTracker {
    tx: Option<mpsc::UnboundedSender<Service>>,
    handle: JoinHandle<()>,
}

impl UploadTracker {
    pub(crate) fn spawn(assignments: &[Service], callback: Option<UploadProgressFn>) -> Self {
        let mut totals: HashMap<Service, u32> = HashMap::new();
        for service in assignments {
            *totals.entry(*service).or_default() += 1;
        }
        let total = assignments.len() as u32;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut done: HashMap<Service, u32> =
                totals.keys().map(|service| (*service, 0)).collect();
            let mut uploaded = 0u32;
            while let Some(service) = rx.recv().await {
                uploaded += 1;
                *done.entry(service).or_default() += 1;
                if let Some(callback) = &callback {
                    let snapshot = UploadProgress {
                        overall: percent(uploaded, total),
                        uploaded,
                        total,
                        per_service_percent: totals
                            .iter()
                            .map(|(service, assigned)| {
                                (*service, percent(done[service], *assigned))
                            })
                            .collect(),
                        per_service_count: done.clone(),
                    };
                    callback(&snapshot);
                }
            }
        });
        Self {
            tx: Some(tx),
            handle,
        }
    }

    /// Report one stored chunk. Never blocks; called from racing
    /// completion futures.
    pub(crate) fn emit(&self, service: Service) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(service);
        }
    }

    /// Close the channel and wait for the aggregator to drain, so every
    /// emitted completion is observed before the transfer returns.
    pub(crate) async fn finish(mut self) {
        self.tx.take();
        let _ = self.handle.await;
    }
}

/// Single-writer progress accumulator for downloads.
pub(crate) struct DownloadTracker {
    tx: Option<mpsc::UnboundedSender<u32>>,
    handle: JoinHandle<()>,
}

impl DownloadTracker {
    pub(crate) fn spawn(total: u32, callback: Option<DownloadProgressFn>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut downloaded = 0u32;
            while let Some(index) = rx.recv().await {
                downloaded += 1;
                if let Some(callback) = &callback {
                    let snapshot = DownloadProgress {
                        overall: percent(downloaded, total),
                        downloaded,
                        total,
                        current_chunk_index: index,
                    };
                    callback(&snapshot);
                }
            }
        });
        Self {
            tx: Some(tx),
            handle,
        }
    }

    pub(crate) fn emit(&self, index: u32) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(index);
        }
    }

    pub(crate) async fn finish(mut self) {
        self.tx.take();
        let _ = self.handle.await;
    }
}
