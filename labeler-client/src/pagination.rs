//! Grid pagination arithmetic

/// Default grid page size
pub const PAGE_SIZE: usize = 100;

/// Pagination metadata for one page of a filtered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// Current page number (1-indexed)
    pub page: usize,
    /// Total number of pages (0 for an empty list)
    pub total_pages: usize,
    /// Index of the first item on the page
    pub offset: usize,
    /// Number of items on the page
    pub count: usize,
}

impl Pagination {
    /// Index range of the page within the filtered list
    pub fn range(&self) -> std::ops::Range<usize> {
        self.offset..self.offset + self.count
    }
}

/// Calculate pagination metadata from total items and requested page
///
/// The page is clamped to `[1, total_pages]`; an empty list yields page 1
/// with no items.
///
/// # Examples
/// ```
/// use labeler_client::pagination::calculate_pagination;
///
/// // 250 items = 3 pages (100 + 100 + 50)
/// let p = calculate_pagination(250, 2, 100);
/// assert_eq!(p.page, 2);
/// assert_eq!(p.total_pages, 3);
/// assert_eq!(p.offset, 100);
///
/// // Out-of-bounds page is clamped to the last page
/// let p = calculate_pagination(250, 99, 100);
/// assert_eq!(p.page, 3);
/// assert_eq!(p.count, 50);
/// ```
pub fn calculate_pagination(total_items: usize, requested_page: usize, page_size: usize) -> Pagination {
    let page_size = page_size.max(1);
    let total_pages = total_items.div_ceil(page_size);
    let page = requested_page.clamp(1, total_pages.max(1));
    let offset = ((page - 1) * page_size).min(total_items);
    let count = page_size.min(total_items - offset);

    Pagination {
        page,
        total_pages,
        offset,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_normal() {
        let p = calculate_pagination(250, 2, 100);
        assert_eq!(p.page, 2);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.offset, 100);
        assert_eq!(p.count, 100);
    }

    #[test]
    fn test_pagination_last_page_remainder() {
        let p = calculate_pagination(250, 3, 100);
        assert_eq!(p.count, 50);
        assert_eq!(p.range(), 200..250);
    }

    #[test]
    fn test_pagination_exact_multiple() {
        let p = calculate_pagination(200, 2, 100);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.count, 100);
    }

    #[test]
    fn test_pagination_zero_results() {
        let p = calculate_pagination(0, 1, 100);
        assert_eq!(p.page, 1);
        assert_eq!(p.total_pages, 0);
        assert_eq!(p.offset, 0);
        assert_eq!(p.count, 0);
    }

    #[test]
    fn test_pagination_page_zero() {
        let p = calculate_pagination(150, 0, 100);
        assert_eq!(p.page, 1); // Clamped to 1
    }

    #[test]
    fn test_pagination_property_over_sizes() {
        for page_size in [1, 7, 50, 100] {
            for n in 0..=230 {
                let first = calculate_pagination(n, 1, page_size);
                assert_eq!(first.total_pages, (n + page_size - 1) / page_size);
                assert_eq!(first.count, page_size.min(n));

                if n > 0 {
                    let last = calculate_pagination(n, first.total_pages, page_size);
                    let expected = if n % page_size == 0 { page_size } else { n % page_size };
                    assert_eq!(last.count, expected);
                    assert_eq!(last.range().end, n);
                }
            }
        }
    }
}
