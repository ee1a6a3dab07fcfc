//! Bookkeeping for two-write sequences.
//!
//! Creating or deleting a home or device writes the document and the owner's
//! id set separately. If the second write fails the first one is kept, the
//! failure is logged and counted, and the caller gets the first write's
//! result.

use tracing::error;
use uuid::Uuid;

use crate::error::StoreError;

pub const ORPHAN_WRITES_METRIC: &str = "homegraph_orphan_writes_total";

/// Records a failed second write of a two-write sequence.
pub fn record_orphan_write(operation: &'static str, document_id: Uuid, err: &StoreError) {
    error!(
        orphan = true,
        operation,
        document_id = %document_id,
        error = %err,
        "Second write failed; first write kept"
    );
    metrics::counter!(ORPHAN_WRITES_METRIC, "operation" => operation).increment(1);
}
