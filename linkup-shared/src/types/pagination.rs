use serde::{Deserialize, Serialize};

pub const MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct PaginationParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_page() -> u64 { 1 }
fn default_per_page() -> u64 { 20 }

impl PaginationParams {
    pub fn new(page: u64, per_page: u64) -> Self {
        Self { page, per_page }
    }

    /// Row offset of the page, capped so it always fits a SQL `OFFSET`.
    pub fn offset(&self) -> u64 {
        (self.page.max(1) - 1)
            .saturating_mul(self.limit())
            .min(i64::MAX as u64)
    }

    pub fn limit(&self) -> u64 {
        self.per_page.clamp(1, MAX_PER_PAGE)
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self { page: 1, per_page: 20 }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Paginated<T: Serialize> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T: Serialize> Paginated<T> {
    pub fn new(items: Vec<T>, total: u64, params: &PaginationParams) -> Self {
        let per_page = params.limit();
        let total_pages = if total == 0 { 0 } else { total.div_ceil(per_page) };
        Self {
            items,
            total,
            page: params.page.max(1),
            per_page,
            total_pages,
        }
    }

    /// Pages over a list that is already fully materialized in memory.
    pub fn from_vec(all: Vec<T>, params: &PaginationParams) -> Self {
        let total = all.len() as u64;
        let items = all
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();
        Self::new(items, total, params)
    }

    /// Converts the items while keeping the page metadata.
    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_is_clamped() {
        assert_eq!(PaginationParams::new(1, 500).limit(), MAX_PER_PAGE);
        assert_eq!(PaginationParams::new(1, 0).limit(), 1);
    }

    #[test]
    fn page_zero_behaves_like_first_page() {
        let p = PaginationParams::new(0, 10);
        assert_eq!(p.offset(), 0);
        let page = Paginated::from_vec((0..5).collect::<Vec<u32>>(), &p);
        assert_eq!(page.page, 1);
        assert_eq!(page.items, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn from_vec_slices_the_requested_page() {
        let page = Paginated::from_vec((0..25).collect::<Vec<u32>>(), &PaginationParams::new(3, 10));
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Paginated::from_vec(vec![1, 2, 3], &PaginationParams::new(1, 2)).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn huge_pages_saturate_the_offset() {
        assert_eq!(PaginationParams::new(u64::MAX, 20).offset(), i64::MAX as u64);
        assert_eq!(PaginationParams::new(1 << 60, 20).offset(), i64::MAX as u64);
        assert!(i64::try_from(PaginationParams::new(u64::MAX, 100).offset()).is_ok());

        let page = Paginated::from_vec(vec![1, 2, 3], &PaginationParams::new(u64::MAX, 20));
        assert!(page.items.is_empty());
    }

    #[test]
    fn past_the_end_is_empty() {
        let page = Paginated::from_vec(vec![1, 2, 3], &PaginationParams::new(4, 2));
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
    }
}
