//! # Container Lifecycle
//!
//! Bulk deletion of every document in a container.
//!
//! The wipe runs in two phases: list everything first, then delete in
//! batches. Deleting while paging would shift later pages under the cursor.
//! Both phases are strictly sequential.

use crate::error::WipeError;
use crate::gateway::MemoryGateway;
use serde::Serialize;

/// Documents requested per listing page
pub const LIST_PAGE_SIZE: u32 = 100;
/// Documents per bulk-delete call
pub const DELETE_BATCH_SIZE: usize = 100;

/// Result of a completed wipe
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WipeSummary {
    pub deleted_count: usize,
}

/// Collect the id of every document in `tag`, in listing order
pub async fn list_all_documents<G>(gateway: &G, tag: &str) -> Result<Vec<String>, WipeError>
where
    G: MemoryGateway + ?Sized,
{
    let mut all_ids = Vec::new();
    let mut page: u32 = 1;

    loop {
        let listing = gateway
            .list_documents(tag, page, LIST_PAGE_SIZE)
            .await
            .map_err(|source| WipeError::Listing { page, source })?;

        if listing.document_ids.is_empty() {
            break;
        }
        all_ids.extend(listing.document_ids);

        match listing.total_pages {
            Some(total) if page < total => page += 1,
            _ => break,
        }
    }

    Ok(all_ids)
}

/// Delete every document in container `tag`.
///
/// Any failed batch aborts the wipe; the error carries the number of
/// documents deleted by earlier batches.
pub async fn wipe_container<G>(gateway: &G, tag: &str) -> Result<WipeSummary, WipeError>
where
    G: MemoryGateway + ?Sized,
{
    tracing::debug!(container = %tag, "wipe: listing documents");

    let all_ids = list_all_documents(gateway, tag).await?;

    if all_ids.is_empty() {
        tracing::debug!(container = %tag, "wipe: no documents found");
        return Ok(WipeSummary { deleted_count: 0 });
    }

    tracing::debug!(
        container = %tag,
        count = all_ids.len(),
        "wipe: deleting in batches"
    );

    let mut deleted_count = 0;
    for (batch_index, batch) in all_ids.chunks(DELETE_BATCH_SIZE).enumerate() {
        gateway
            .delete_bulk(batch)
            .await
            .map_err(|source| WipeError::BatchFailed {
                batch_index,
                deleted_so_far: deleted_count,
                source,
            })?;
        deleted_count += batch.len();
    }

    tracing::info!(container = %tag, deleted_count, "wipe complete");
    Ok(WipeSummary { deleted_count })
}
