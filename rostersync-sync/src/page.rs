//! Size-sentinel pagination.
//!
//! Pages are requested from index 0 upward until one comes back with fewer
//! than `page_size` items. There is no server-side "has more" flag, so a
//! collection that ends exactly on a page boundary costs one extra request
//! which must return an empty page.
//!
//! A failed page ends the fetch early. Whatever was accumulated is still
//! returned, together with a [`Truncation`] describing where it stopped.

use std::num::NonZeroUsize;

use crate::error::RemoteError;

/// Where and why a fetch stopped before the short page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Truncation {
    pub page: usize,
    pub error: RemoteError,
}

/// Result of [`fetch_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    /// Number of page requests issued, including the failed one if any.
    pub requests: usize,
    pub truncated: Option<Truncation>,
}

/// Concatenate every page returned by `fetch_page`.
///
/// `fetch_page` receives the zero-based page index. It is never retried.
pub fn fetch_all<T, F>(page_size: NonZeroUsize, mut fetch_page: F) -> Fetched<T>
where
    F: FnMut(usize) -> Result<Vec<T>, RemoteError>,
{
    let mut items = Vec::new();
    let mut requests = 0;
    let mut page = 0;

    loop {
        requests += 1;
        match fetch_page(page) {
            Ok(batch) => {
                let received = batch.len();
                tracing::debug!("page {page}: {received} items");
                items.extend(batch);
                if received < page_size.get() {
                    return Fetched {
                        items,
                        requests,
                        truncated: None,
                    };
                }
                page += 1;
            }
            Err(error) => {
                tracing::warn!(
                    "fetch stopped at page {page} after {} items: {error}",
                    items.len()
                );
                return Fetched {
                    items,
                    requests,
                    truncated: Some(Truncation { page, error }),
                };
            }
        }
    }
}
