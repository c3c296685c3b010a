//! Page requests and pages

use super::sort::Sort;
use crate::errors::StoreError;
use config::PagingConfig;
use serde::{Deserialize, Serialize};

/// Zero-based page number, page size and sort order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    size: u32,
    sort: Sort,
}

impl PageRequest {
    pub fn new(page: u32, size: u32, sort: Sort) -> Result<Self, StoreError> {
        if size == 0 {
            return Err(StoreError::InvalidPageRequest(
                "page size must be at least 1".to_string(),
            ));
        }
        Ok(Self { page, size, sort })
    }

    /// Unsorted request
    pub fn of(page: u32, size: u32) -> Result<Self, StoreError> {
        Self::new(page, size, Sort::unsorted())
    }

    /// Build a request from caller-supplied query parameters.
    ///
    /// A missing page means the first page and a missing size the configured
    /// default. Sizes above the configured maximum are capped.
    pub fn from_query<S: AsRef<str>>(
        page: Option<u32>,
        size: Option<u32>,
        sort_params: &[S],
        paging: &PagingConfig,
    ) -> Result<Self, StoreError> {
        let size = size
            .unwrap_or(paging.default_page_size)
            .min(paging.max_page_size);
        Self::new(page.unwrap_or(0), size, Sort::parse_all(sort_params))
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn sort(&self) -> &Sort {
        &self.sort
    }

    /// Number of records before this page
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn next(&self) -> Self {
        Self {
            page: self.page.saturating_add(1),
            size: self.size,
            sort: self.sort.clone(),
        }
    }
}

/// One page of a sorted sequence plus the totals of the whole sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u32,
    pub size: u32,
    pub total_elements: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: &PageRequest, total_elements: i64) -> Self {
        let size = i64::from(request.size());
        let total_pages = (total_elements.max(0) + size - 1) / size;
        Self {
            content,
            number: request.page(),
            size: request.size(),
            total_elements,
            total_pages,
        }
    }

    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    pub fn is_last(&self) -> bool {
        i64::from(self.number) + 1 >= self.total_pages
    }

    pub fn has_next(&self) -> bool {
        !self.is_last()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Convert the content, keeping the paging figures
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            PageRequest::of(0, 0),
            Err(StoreError::InvalidPageRequest(_))
        ));
    }

    #[test]
    fn test_from_query_defaults_and_caps() {
        let paging = PagingConfig::new(20, 100);
        let none: &[&str] = &[];

        let request = PageRequest::from_query(None, None, none, &paging).unwrap();
        assert_eq!((request.page(), request.size()), (0, 20));
        assert!(request.sort().is_unsorted());

        let request = PageRequest::from_query(Some(3), Some(5000), &["hospitalName"], &paging).unwrap();
        assert_eq!((request.page(), request.size()), (3, 100));
        assert_eq!(request.offset(), 300);
        assert!(!request.sort().is_unsorted());

        assert!(PageRequest::from_query(None, Some(0), none, &paging).is_err());
    }

    #[test]
    fn test_page_math() {
        let request = PageRequest::of(0, 2).unwrap();
        let page = Page::new(vec![1, 2], &request, 5);
        assert_eq!(page.total_pages, 3);
        assert!(page.is_first());
        assert!(page.has_next());

        let last = Page::new(vec![5], &request.next().next(), 5);
        assert!(last.is_last());
        assert!(!last.has_next());

        let empty = Page::<i32>::new(vec![], &request, 0);
        assert_eq!(empty.total_pages, 0);
        assert!(empty.is_last());
        assert!(empty.is_empty());
    }

    #[test]
    fn test_map_keeps_figures() {
        let request = PageRequest::of(1, 2).unwrap();
        let page = Page::new(vec![3, 4], &request, 4).map(|n| n * 10);
        assert_eq!(page.content, vec![30, 40]);
        assert_eq!((page.number, page.total_pages), (1, 2));
    }

    #[test]
    fn test_serializes_camel_case() {
        let request = PageRequest::of(0, 10).unwrap();
        let page = Page::new(vec!["a"], &request, 1);
        assert_eq!(
            serde_json::to_value(&page).unwrap(),
            json!({
                "content": ["a"],
                "number": 0,
                "size": 10,
                "totalElements": 1,
                "totalPages": 1
            })
        );
    }
}
