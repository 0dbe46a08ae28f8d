//! Search Listings Use Case

use std::sync::Arc;
use tracing::debug;

use crate::listing::repository::ListingRepository;
use crate::listing::search::{ListingSearch, SearchPage};
use crate::shared::error::Result;

/// Filtered page plus total match count.
///
/// The count is a separate pass over the same predicate, so under
/// concurrent writes it may disagree with the page by a few documents.
pub struct SearchListingsUseCase {
    listings: Arc<dyn ListingRepository>,
}

impl SearchListingsUseCase {
    pub fn new(listings: Arc<dyn ListingRepository>) -> Self {
        Self { listings }
    }

    pub async fn execute(&self, search: &ListingSearch) -> Result<SearchPage> {
        let predicate = search.predicate();
        debug!(?predicate, page = search.page, size = ?search.size, "Searching listings");

        let listings = self.listings.search(&predicate, search.skip(), search.limit()).await?;
        let count = self.listings.count(&predicate).await?;

        Ok(SearchPage { listings, count })
    }
}
