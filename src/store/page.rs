//! Pagination contract shared by all list endpoints.

use serde::Serialize;

/// Caller-facing page selection.
///
/// `page_number <= 0` is a sentinel meaning "return everything
/// unpaginated"; the response then reports current_page = last_page = 1.
#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page_number: i64,
    pub page_size: i64,
}

/// A resolved skip/limit window to hand to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub limit: u64,
}

/// One page of results.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub current_page: i64,
    pub last_page: i64,
    pub total: u64,
    pub items: Vec<T>,
}

impl PageRequest {
    /// Resolve the request against the total match count.
    ///
    /// Clamps page_size to >= 1 and page_number into `[1, last_page]`.
    /// Returns `(current_page, last_page, window)`; a `None` window means
    /// the whole result set.
    pub fn resolve(self, total: u64) -> (i64, i64, Option<PageWindow>) {
        if self.page_number <= 0 {
            return (1, 1, None);
        }

        let size = self.page_size.max(1);
        let last_page = (total.div_ceil(size as u64)).max(1) as i64;
        let page = self.page_number.min(last_page);
        let skip = ((page - 1) * size) as u64;

        (page, last_page, Some(PageWindow { skip, limit: size as u64 }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_zero_returns_everything() {
        let (current, last, window) = PageRequest { page_number: 0, page_size: 3 }.resolve(10);
        assert_eq!(current, 1);
        assert_eq!(last, 1);
        assert!(window.is_none());
    }

    #[test]
    fn test_negative_page_is_the_same_sentinel() {
        let (current, last, window) = PageRequest { page_number: -2, page_size: 3 }.resolve(10);
        assert_eq!((current, last), (1, 1));
        assert!(window.is_none());
    }

    #[test]
    fn test_page_clamped_to_last_page() {
        // 10 rows, 3 per page -> 4 pages; page 5 clamps to 4, skipping 9 rows
        let (current, last, window) = PageRequest { page_number: 5, page_size: 3 }.resolve(10);
        assert_eq!(current, 4);
        assert_eq!(last, 4);
        assert_eq!(window, Some(PageWindow { skip: 9, limit: 3 }));
    }

    #[test]
    fn test_page_size_clamped_to_one() {
        let (current, last, window) = PageRequest { page_number: 1, page_size: 0 }.resolve(5);
        assert_eq!(current, 1);
        assert_eq!(last, 5);
        assert_eq!(window, Some(PageWindow { skip: 0, limit: 1 }));
    }

    #[test]
    fn test_empty_result_set() {
        let (current, last, window) = PageRequest { page_number: 3, page_size: 10 }.resolve(0);
        assert_eq!(current, 1);
        assert_eq!(last, 1);
        assert_eq!(window, Some(PageWindow { skip: 0, limit: 10 }));
    }

    #[test]
    fn test_exact_page_boundary() {
        let (current, last, window) = PageRequest { page_number: 2, page_size: 5 }.resolve(10);
        assert_eq!(current, 2);
        assert_eq!(last, 2);
        assert_eq!(window, Some(PageWindow { skip: 5, limit: 5 }));
    }
}
