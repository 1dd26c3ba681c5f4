//! # 페이지네이션 모델
//!
//! 목록 API 응답 형식: `{ "count", "next", "previous", "results" }`
//! `next`/`previous`는 같은 경로에 `?page=N`을 붙인 링크이고, 없으면 null입니다.

use serde::{Deserialize, Serialize};

/// 목록 API의 쿼리 파라미터 (`?page=2`)
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
}

/// 요청된 페이지가 전체 목록의 어느 구간인지 계산한 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// 1부터 시작하는 페이지 번호
    pub page: u32,
    pub page_size: u32,
    /// 전체 항목 수
    pub count: i64,
}

impl PageWindow {
    /// 페이지 번호를 검사해 구간을 만듭니다.
    ///
    /// 페이지 0, 또는 마지막 페이지를 넘는 번호는 None입니다.
    /// 항목이 하나도 없어도 1페이지는 (빈 페이지로) 유효합니다.
    pub fn new(page: Option<u32>, page_size: u32, count: i64) -> Option<Self> {
        let page = page.unwrap_or(1);
        let window = Self {
            page,
            page_size: page_size.max(1),
            count,
        };
        if page == 0 || (page > 1 && page > window.last_page()) {
            return None;
        }
        Some(window)
    }

    pub fn last_page(&self) -> u32 {
        let size = i64::from(self.page_size);
        let pages = (self.count + size - 1) / size;
        u32::try_from(pages.max(1)).unwrap_or(u32::MAX)
    }

    /// SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    /// SQL `LIMIT`
    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page()
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// 페이지 단위 목록 응답
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: i64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// `path`는 링크를 만들 때 사용할 요청 경로입니다 (예: "/api/v1/habits/public").
    pub fn new(window: PageWindow, path: &str, results: Vec<T>) -> Self {
        let link = |page: u32| format!("{}?page={}", path, page);
        Self {
            count: window.count,
            next: window.has_next().then(|| link(window.page + 1)),
            previous: window.has_previous().then(|| link(window.page - 1)),
            results,
        }
    }
}
