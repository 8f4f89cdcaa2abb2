//! Following `paging.next` links of Graph API collections.

use std::future::Future;

use crate::models::Page;
use crate::Result;

/// Collect every item of a paginated collection, starting from its first page.
///
/// `fetch` is called with the exact continuation URL of the current page and
/// must return the next page. Items keep the order the source returned them
/// in. A failed fetch aborts the walk and its error is returned unchanged.
///
/// There is no upper bound on the number of pages, so very long histories
/// can take a while.
pub async fn follow_pages<T, F, Fut>(first: Page<T>, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Page<T>>>,
{
    let mut next = first.next_url().map(str::to_owned);
    let mut items = first.data;

    while let Some(url) = next.take() {
        let page = fetch(url).await?;
        next = page.next_url().map(str::to_owned);
        items.extend(page.data);
    }

    Ok(items)
}
