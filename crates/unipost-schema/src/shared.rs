use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arc_swap::ArcSwap;
use tracing::{error, info};

use crate::error::SchemaLoadError;
use crate::registry::{LoadSummary, SchemaRegistry};

/// Atomically swappable registry handle.
///
/// Readers take a full snapshot and never observe a half-reloaded state; a
/// failed reload leaves the previous snapshot serving. Only one reload runs
/// at a time.
pub struct SharedSchemas {
    inner: ArcSwap<SchemaRegistry>,
    reloading: AtomicBool,
}

impl SharedSchemas {
    pub fn new(initial: SchemaRegistry) -> Self {
        Self {
            inner: ArcSwap::new(Arc::new(initial)),
            reloading: AtomicBool::new(false),
        }
    }

    /// Owned snapshot of the current registry. In-flight work holding this
    /// snapshot is unaffected by concurrent reloads.
    pub fn load_full(&self) -> Arc<SchemaRegistry> {
        self.inner.load_full()
    }

    /// Re-read the schema directory and swap the registry in one step.
    ///
    /// Returns `Ok(None)` when another reload is already running. On any
    /// load error the previous registry keeps serving and the error is
    /// handed back to the caller.
    pub fn reload(&self) -> Result<Option<LoadSummary>, SchemaLoadError> {
        if self
            .reloading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("schema reload already in progress, skipping");
            return Ok(None);
        }

        let schema_dir = self.inner.load().schema_dir().to_path_buf();
        let result = SchemaRegistry::load_dir(&schema_dir);
        let outcome = match result {
            Ok((registry, summary)) => {
                self.inner.store(Arc::new(registry));
                info!(
                    platforms = summary.platform_count,
                    mappings = summary.mapping_count,
                    "schema registry reloaded"
                );
                Ok(Some(summary))
            }
            Err(e) => {
                error!(error = %e, "schema reload failed, keeping previous registry");
                Err(e)
            }
        };

        self.reloading.store(false, Ordering::SeqCst);
        outcome
    }
}
