use serde::Serialize;

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self { page: page.max(1), limit: limit.max(1) }
    }

    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.limit as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_movies: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, returned: usize, total: i64) -> Self {
        let total = total.max(0) as u64;
        let limit = request.limit as u64;

        Self {
            current_page: request.page,
            total_pages: total.div_ceil(limit),
            total_movies: total,
            has_next: request.offset() + (returned as u64) < total,
            has_prev: request.page > 1,
        }
    }
}
