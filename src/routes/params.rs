use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::response::Meta;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }

    /// Cut one page out of an already sorted listing.
    pub fn apply<T>(&self, items: Vec<T>) -> (Vec<T>, Meta) {
        let (page, per_page, offset) = self.normalize();
        let total = items.len() as i64;
        let items = items
            .into_iter()
            .skip(offset as usize)
            .take(per_page as usize)
            .collect();
        (items, Meta::new(page, per_page, total))
    }
}

#[cfg(test)]
mod tests {
    use super::Pagination;

    #[test]
    fn clamps_and_slices() {
        let pagination = Pagination {
            page: Some(2),
            per_page: Some(3),
        };
        let (items, meta) = pagination.apply((1..=7).collect::<Vec<_>>());
        assert_eq!(items, vec![4, 5, 6]);
        assert_eq!(meta.total, Some(7));

        let (page, per_page, offset) = Pagination {
            page: Some(0),
            per_page: Some(1000),
        }
        .normalize();
        assert_eq!((page, per_page, offset), (1, 100, 0));
    }
}
