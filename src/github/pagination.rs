//! Page-number traversal of listing endpoints.

use super::Page;
use std::future::Future;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Start,
    Next(u32),
    Done,
}

/// Lazy cursor over a paginated listing.
///
/// `fetch` receives the page to request (`None` for the first one) and must
/// keep every other query parameter fixed. Pages are yielded in provider
/// order; traversal ends after the first error or a terminal page marker.
/// Build a new paginator to restart.
pub struct Paginator<F> {
    fetch: F,
    cursor: Cursor,
}

impl<F, Fut, T, E> Paginator<F>
where
    F: FnMut(Option<u32>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    /// Start a traversal at the first page
    pub fn new(fetch: F) -> Self {
        Self {
            fetch,
            cursor: Cursor::Start,
        }
    }

    /// Fetch the next page, or `None` once the listing is exhausted
    pub async fn next_page(&mut self) -> Option<Result<Vec<T>, E>> {
        let page = match self.cursor {
            Cursor::Done => return None,
            Cursor::Start => None,
            Cursor::Next(n) => Some(n),
        };

        match (self.fetch)(page).await {
            Ok(page) => {
                self.cursor = match page.next_page {
                    Some(n) if n != 0 => Cursor::Next(n),
                    _ => Cursor::Done,
                };
                Some(Ok(page.items))
            }
            Err(e) => {
                self.cursor = Cursor::Done;
                Some(Err(e))
            }
        }
    }
}

/// Collect every item of a listing, propagating the first error
pub async fn collect_pages<F, Fut, T, E>(fetch: F) -> Result<Vec<T>, E>
where
    F: FnMut(Option<u32>) -> Fut,
    Fut: Future<Output = Result<Page<T>, E>>,
{
    let mut pages = Paginator::new(fetch);
    let mut items = Vec::new();
    while let Some(page) = pages.next_page().await {
        items.extend(page?);
    }
    Ok(items)
}
