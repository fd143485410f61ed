pub mod mediator;
pub mod pager;
pub mod search;

use crate::models::image::Image;

pub const STARTING_PAGE_INDEX: u32 = 1;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum LoadType {
    /// Reload everything, replacing the cached feed.
    Refresh,
    /// Load the page before the first loaded item.
    Prepend,
    /// Load the page after the last loaded item.
    Append,
}

/// Snapshot of what the consumer currently holds, used to pick the next page.
#[derive(Debug, Clone, Default)]
pub struct PagingState {
    pub pages: Vec<Vec<Image>>,
    pub anchor_position: Option<usize>,
    pub page_size: u32,
}

impl PagingState {
    pub fn new(pages: Vec<Vec<Image>>, anchor_position: Option<usize>, page_size: u32) -> Self {
        Self {
            pages,
            anchor_position,
            page_size,
        }
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn first_item(&self) -> Option<&Image> {
        self.pages
            .iter()
            .find(|page| !page.is_empty())
            .and_then(|page| page.first())
    }

    pub fn last_item(&self) -> Option<&Image> {
        self.pages
            .iter()
            .rev()
            .find(|page| !page.is_empty())
            .and_then(|page| page.last())
    }

    /// Item at `position`, clamped into the loaded range.
    pub fn closest_item_to_position(&self, position: usize) -> Option<&Image> {
        let count = self.item_count();
        if count == 0 {
            return None;
        }
        let position = position.min(count - 1);
        self.pages.iter().flatten().nth(position)
    }
}

#[derive(Debug)]
pub enum MediatorResult {
    Success { end_of_pagination_reached: bool },
    Error(anyhow::Error),
}

#[derive(Debug, Clone, Copy)]
pub struct LoadParams {
    pub key: Option<u32>,
    pub load_size: u32,
}

#[derive(Debug)]
pub enum LoadResult {
    Page {
        data: Vec<Image>,
        prev_key: Option<u32>,
        next_key: Option<u32>,
    },
    Error(anyhow::Error),
}
