//! Offset pagination for expense listings.


/// Smallest accepted page size.
pub const MIN_PAGE_SIZE: u64 = 1;
/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u64 = 100;
/// Page size used when the caller does not provide one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// A clamped page request: `page >= 1`, `page_size` in `[1, 100]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Builds a request, clamping out-of-range values instead of rejecting them.
    #[must_use]
    pub fn new(page: i64, page_size: i64) -> Self {
        let page = u64::try_from(page.max(1)).unwrap_or(1);
        let page_size = u64::try_from(page_size.max(1))
            .unwrap_or(MIN_PAGE_SIZE)
            .clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE);
        Self { page, page_size }
    }

    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Number of rows to skip.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Pagination metadata returned with every page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageMeta {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl PageMeta {
    /// `total_pages` is `ceil(total / page_size)`, never less than 1.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        let total_pages = total.div_ceil(request.page_size).max(1);
        Self {
            page: request.page,
            page_size: request.page_size,
            total,
            total_pages,
        }
    }
}

/// A slice of results plus its metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_is_clamped() {
        let req = PageRequest::new(0, 0);
        assert_eq!((req.page(), req.page_size()), (1, 1));

        let req = PageRequest::new(-3, 1000);
        assert_eq!((req.page(), req.page_size()), (1, 100));

        let req = PageRequest::new(4, 25);
        assert_eq!((req.page(), req.page_size()), (4, 25));
        assert_eq!(req.offset(), 75);
    }

    #[test]
    fn default_request() {
        let req = PageRequest::default();
        assert_eq!((req.page(), req.page_size(), req.offset()), (1, 10, 0));
    }

    #[test]
    fn total_pages_rounds_up_and_is_at_least_one() {
        let req = PageRequest::new(1, 10);
        assert_eq!(PageMeta::new(req, 0).total_pages, 1);
        assert_eq!(PageMeta::new(req, 1).total_pages, 1);
        assert_eq!(PageMeta::new(req, 10).total_pages, 1);
        assert_eq!(PageMeta::new(req, 11).total_pages, 2);
        assert_eq!(PageMeta::new(req, 95).total_pages, 10);
    }
}
