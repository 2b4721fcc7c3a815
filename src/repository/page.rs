//! Pagination request and result types

use crate::error::AppError;
use serde::Serialize;

/// Largest page size accepted unless configured otherwise
pub const MAX_PAGE_SIZE: u32 = 100;

/// A validated page request: 1-indexed page, bounded page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Validate against the default maximum page size
    pub fn new(page: i64, per_page: i64) -> Result<Self, AppError> {
        Self::with_max(page, per_page, MAX_PAGE_SIZE)
    }

    /// Validate against an explicit maximum page size
    ///
    /// # Returns
    /// * `Ok(PageRequest)` - page >= 1 and 1 <= per_page <= max_page_size
    /// * `Err(AppError::InvalidPagination)` - otherwise
    pub fn with_max(page: i64, per_page: i64, max_page_size: u32) -> Result<Self, AppError> {
        if page < 1 || page > i64::from(u32::MAX) {
            return Err(AppError::InvalidPagination(
                "Page must be greater than 0".to_string(),
            ));
        }
        if per_page < 1 || per_page > i64::from(max_page_size) {
            return Err(AppError::InvalidPagination(format!(
                "Per page must be between 1 and {}",
                max_page_size
            )));
        }
        Ok(Self {
            page: page as u32,
            per_page: per_page as u32,
        })
    }

    /// 1-indexed page number
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Items per page
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub(crate) fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub(crate) fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}

/// One page of a result set plus navigation metadata
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    /// Items on this page
    #[serde(rename = "data")]
    pub items: Vec<T>,
    /// Total matching rows
    pub total: u64,
    /// Total number of pages
    pub pages: u64,
    /// This page's number
    #[serde(rename = "current_page")]
    pub page: u32,
    /// Requested page size
    pub per_page: u32,
    /// A later page exists
    pub has_next: bool,
    /// An earlier page exists
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Assemble a page from its items and the total row count
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let per_page = u64::from(request.per_page);
        let pages = total.div_ceil(per_page);
        Self {
            items,
            total,
            pages,
            page: request.page,
            per_page: request.per_page,
            has_next: u64::from(request.page) < pages,
            has_prev: request.page > 1,
        }
    }

    /// Transform the items, keeping the metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            pages: self.pages,
            page: self.page,
            per_page: self.per_page,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            PageRequest::new(0, 10),
            Err(AppError::InvalidPagination(_))
        ));
        assert!(PageRequest::new(1, 0).is_err());
        assert!(PageRequest::new(-3, 10).is_err());
        assert!(PageRequest::new(1, 101).is_err());
        assert!(PageRequest::with_max(1, 60, 50).is_err());
        assert!(PageRequest::new(1, 100).is_ok());
    }

    #[test]
    fn test_offset() {
        let request = PageRequest::new(3, 20).unwrap();
        assert_eq!(request.offset(), 40);
        assert_eq!(request.limit(), 20);
    }

    #[test]
    fn test_page_metadata() {
        let request = PageRequest::new(2, 5).unwrap();
        let page = Page::new(vec![6, 7, 8, 9, 10], 12, request);
        assert_eq!(page.pages, 3);
        assert!(page.has_next);
        assert!(page.has_prev);

        let last = Page::new(vec![11, 12], 12, PageRequest::new(3, 5).unwrap());
        assert!(!last.has_next);

        let empty: Page<i32> = Page::new(vec![], 0, PageRequest::new(1, 5).unwrap());
        assert_eq!(empty.pages, 0);
        assert!(!empty.has_next);
        assert!(!empty.has_prev);
    }

    #[test]
    fn test_serialized_shape() {
        let page = Page::new(vec!["a"], 1, PageRequest::new(1, 20).unwrap());
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["data"], serde_json::json!(["a"]));
        assert_eq!(json["current_page"], 1);
        assert_eq!(json["per_page"], 20);
        assert_eq!(json["pages"], 1);
    }
}
