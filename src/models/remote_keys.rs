use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Eq, PartialEq)]
pub struct RemoteKeys {
    pub id: String,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

impl RemoteKeys {
    pub fn new(id: String, prev_page: Option<u32>, next_page: Option<u32>) -> Self {
        Self {
            id,
            prev_page,
            next_page,
        }
    }

    /// Remote page the item was fetched from.
    pub fn page(&self) -> u32 {
        match (self.prev_page, self.next_page) {
            (_, Some(next)) => next - 1,
            (Some(prev), None) => prev + 1,
            (None, None) => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, Some(2), 1)]
    #[case(Some(2), Some(4), 3)]
    #[case(Some(6), None, 7)]
    #[case(None, None, 1)]
    fn page_is_derived_from_neighbours(
        #[case] prev: Option<u32>,
        #[case] next: Option<u32>,
        #[case] expected: u32,
    ) {
        let keys = RemoteKeys::new("id".to_string(), prev, next);
        assert_eq!(keys.page(), expected);
    }
}
