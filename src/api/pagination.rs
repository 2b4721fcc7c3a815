//! Query-string pagination and listing bodies

use crate::config::PaginationConfig;
use crate::error::AppError;
use crate::repository::{Page, PageRequest};
use serde::{Deserialize, Serialize};

/// `?page=&per_page=`, both optional
#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    /// 1-indexed page number, default 1
    pub page: Option<i64>,
    /// Page size, default from configuration
    pub per_page: Option<i64>,
}

impl PaginationQuery {
    /// Fill in defaults and validate against the configured maximum
    pub fn to_request(&self, config: &PaginationConfig) -> Result<PageRequest, AppError> {
        PageRequest::with_max(
            self.page.unwrap_or(1),
            self.per_page
                .unwrap_or_else(|| i64::from(config.default_page_size)),
            config.max_page_size,
        )
    }
}

/// Listing body: a page for plain listings, a bare array for search paths
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Listing<T> {
    /// Paginated listing
    Page(Page<T>),
    /// Unpaginated search results
    All(Vec<T>),
}

impl<T> From<Page<T>> for Listing<T> {
    fn from(page: Page<T>) -> Self {
        Listing::Page(page)
    }
}

impl<T> From<Vec<T>> for Listing<T> {
    fn from(items: Vec<T>) -> Self {
        Listing::All(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_config() {
        let config = PaginationConfig {
            default_page_size: 5,
            max_page_size: 50,
        };
        let request = PaginationQuery::default().to_request(&config).unwrap();
        assert_eq!(request.page(), 1);
        assert_eq!(request.per_page(), 5);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let config = PaginationConfig::default();
        let too_big = PaginationQuery {
            page: Some(1),
            per_page: Some(101),
        };
        assert!(matches!(
            too_big.to_request(&config),
            Err(AppError::InvalidPagination(_))
        ));
        let zero_page = PaginationQuery {
            page: Some(0),
            per_page: None,
        };
        assert!(zero_page.to_request(&config).is_err());
    }

    #[test]
    fn test_listing_shapes() {
        let page = Page::new(vec![1, 2], 2, PageRequest::new(1, 20).unwrap());
        let json = serde_json::to_value(Listing::from(page)).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
        assert_eq!(json["current_page"], 1);

        let json = serde_json::to_value(Listing::from(vec![3])).unwrap();
        assert_eq!(json, serde_json::json!([3]));
    }
}
