//! Sequential offset pagination
//!
//! Pages are fetched strictly one after another: the next request starts
//! only after the previous page has been decoded. A fixed pause separates
//! pages to stay under Spotify's rolling rate limit; there is no pause
//! after the last page. Any failed page aborts the walk and the items
//! gathered so far are dropped.

use std::future::Future;

use tracing::debug;

use crate::error::{Error, Result};
use crate::metrics;
use crate::models::Page;

/// Walk a collection from offset 0 until a page has no `next`.
///
/// `fetch(limit, offset)` loads one page; `pause()` runs between pages.
/// Items come back in page order, then in order within each page.
pub async fn collect_all_pages<T, F, Fut, P, PFut>(
    page_size: u32,
    mut fetch: F,
    mut pause: P,
) -> Result<Vec<T>>
where
    F: FnMut(u32, u32) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
    P: FnMut() -> PFut,
    PFut: Future<Output = ()>,
{
    let mut items = Vec::new();
    let mut offset = 0u32;

    loop {
        let page = fetch(page_size, offset).await?;
        metrics::record_page();
        let more = page.has_next();
        debug!(
            offset,
            received = page.items.len(),
            total = page.total,
            more,
            "page fetched"
        );

        // A page that reports more items but carries none would loop forever
        if more && page.items.is_empty() {
            return Err(Error::InvalidResponse(format!(
                "empty page at offset {offset} reports a next page"
            )));
        }

        items.extend(page.items);
        if !more {
            break;
        }

        offset = offset.checked_add(page_size).ok_or_else(|| {
            Error::InvalidResponse(format!(
                "next page after offset {offset} is past the u32 offset range"
            ))
        })?;
        pause().await;
    }

    Ok(items)
}
