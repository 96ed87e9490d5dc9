//! The paging calculator: count, describe, fetch one window.

use dataforge_core::result::DataResult;
use dataforge_core::traits::{Entity, PersistenceContext};
use dataforge_core::types::pagination::{Page, PagedResult};
use dataforge_core::types::query::Query;

use crate::repository::Repository;

impl<T, C> Repository<T, C>
where
    T: Entity,
    C: PersistenceContext<T>,
{
    /// Execute `query` as one page of results.
    ///
    /// Issues two round trips by design: a count of the full filtered
    /// query, then a fetch of exactly the page window. The window is
    /// always fetched untracked: paged rows are for display, not for
    /// later mutation through this fetch. A page past the end returns
    /// empty items under a descriptor still carrying the true totals.
    ///
    /// `current_page` and `page_size` are clamped to ≥ 1, and the size is
    /// additionally capped by the repository's paging configuration.
    pub async fn paginate(
        &mut self,
        query: &Query<T>,
        current_page: u64,
        page_size: u64,
    ) -> DataResult<PagedResult<T>> {
        let (current_page, page_size) = self.paging().normalize(current_page, page_size);

        let total_count = {
            let predicate = query.predicate.clone();
            self.context_mut().count(predicate.as_ref()).await?
        };
        let page = Page::new(current_page, page_size, total_count);

        let window = query
            .clone()
            .tracked(false)
            .skip(page.skip())
            .take(page.page_size);
        let items = self.context_mut().fetch(&window).await?;

        Ok(PagedResult::new(items, page))
    }
}
