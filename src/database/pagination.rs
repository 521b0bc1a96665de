use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

/// Raw `?page=&size=` query parameters
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

/// Zero-based page index plus page size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size: size.max(1) }
    }

    /// Resolve query parameters against configured limits. A missing or zero
    /// size falls back to the default; oversized requests are clamped.
    pub fn from_query(query: PageQuery, limits: &PaginationConfig) -> Self {
        let size = match query.size {
            None | Some(0) => limits.default_page_size,
            Some(size) => size.min(limits.max_page_size),
        };
        Self::new(query.page.unwrap_or(0), size)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

/// One page of results together with the size of the whole result set
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: u64) -> Self {
        let size = u64::from(request.size.max(1));
        Self {
            content,
            page: request.page,
            size: request.size,
            total_elements,
            total_pages: total_elements.div_ceil(size),
        }
    }

    /// Cut a page out of a fully materialized result set. An offset past the
    /// end yields an empty page that still reports the full total.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len() as u64;
        let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content = all
            .into_iter()
            .skip(start)
            .take(request.size as usize)
            .collect();
        Self::new(content, request, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> PaginationConfig {
        PaginationConfig { default_page_size: 20, max_page_size: 50 }
    }

    #[test]
    fn slices_pages_and_keeps_total() {
        let items: Vec<u32> = (0..7).collect();

        let first = Page::slice(items.clone(), PageRequest::new(0, 5));
        assert_eq!(first.content, vec![0, 1, 2, 3, 4]);
        assert_eq!(first.total_elements, 7);
        assert_eq!(first.total_pages, 2);

        let second = Page::slice(items.clone(), PageRequest::new(1, 5));
        assert_eq!(second.content, vec![5, 6]);
        assert_eq!(second.total_elements, 7);

        let past_end = Page::slice(items, PageRequest::new(2, 5));
        assert!(past_end.content.is_empty());
        assert_eq!(past_end.total_elements, 7);
    }

    #[test]
    fn query_defaults_and_clamps() {
        let q = PageRequest::from_query(PageQuery::default(), &limits());
        assert_eq!(q, PageRequest::new(0, 20));

        let q = PageRequest::from_query(PageQuery { page: Some(3), size: Some(0) }, &limits());
        assert_eq!(q, PageRequest::new(3, 20));

        let q = PageRequest::from_query(PageQuery { page: None, size: Some(500) }, &limits());
        assert_eq!(q.size, 50);
        assert_eq!(PageRequest::new(2, 5).offset(), 10);
    }

    #[test]
    fn serializes_camel_case() {
        let page = Page::new(vec![1], PageRequest::new(0, 10), 1);
        let v = serde_json::to_value(&page).unwrap();
        assert_eq!(v["totalElements"], 1);
        assert_eq!(v["totalPages"], 1);
    }
}
