use crate::models::image::Image;
use crate::paging::{LoadParams, LoadResult, PagingState, STARTING_PAGE_INDEX};
use crate::repository::ImageSource;
use anyhow::Result;

/// Pages search results straight from the remote, nothing is persisted.
#[derive(Debug, Clone)]
pub struct SearchPagingSource<S> {
    source: S,
    query: String,
}

impl<S: ImageSource> SearchPagingSource<S> {
    pub fn new(source: S, query: String) -> Self {
        Self { source, query }
    }

    pub async fn load(&self, params: LoadParams) -> LoadResult {
        let current_page = params.key.unwrap_or(STARTING_PAGE_INDEX);
        match self
            .source
            .search_images(&self.query, current_page, params.load_size)
            .await
        {
            Ok(response) => {
                let end_of_pagination_reached = response.images.is_empty();
                LoadResult::Page {
                    data: response.images,
                    prev_key: if current_page == STARTING_PAGE_INDEX {
                        None
                    } else {
                        Some(current_page - 1)
                    },
                    next_key: if end_of_pagination_reached {
                        None
                    } else {
                        Some(current_page + 1)
                    },
                }
            }
            Err(e) => {
                log::error!("Error searching for {:?}: {e:#}", self.query);
                LoadResult::Error(e)
            }
        }
    }

    /// Page that contains the anchor position, if anything is loaded.
    pub fn refresh_key(&self, state: &PagingState, keys: &[(Option<u32>, Option<u32>)]) -> Option<u32> {
        let anchor = state.anchor_position?;
        let mut seen = 0;
        for (page, (prev_key, next_key)) in state.pages.iter().zip(keys) {
            seen += page.len();
            if anchor < seen {
                return prev_key
                    .map(|prev| prev + 1)
                    .or_else(|| next_key.map(|next| next - 1));
            }
        }
        None
    }
}

/// Incremental loader over [`SearchPagingSource`].
pub struct SearchPager<S> {
    paging_source: SearchPagingSource<S>,
    page_size: u32,
    pages: Vec<Vec<Image>>,
    keys: Vec<(Option<u32>, Option<u32>)>,
    anchor_position: Option<usize>,
}

impl<S: ImageSource> SearchPager<S> {
    pub fn new(source: S, query: String, page_size: u32) -> Self {
        Self {
            paging_source: SearchPagingSource::new(source, query),
            page_size,
            pages: Vec::new(),
            keys: Vec::new(),
            anchor_position: None,
        }
    }

    pub fn items(&self) -> Vec<&Image> {
        self.pages.iter().flatten().collect()
    }

    pub fn pages(&self) -> &[Vec<Image>] {
        &self.pages
    }

    pub fn set_anchor(&mut self, position: usize) {
        self.anchor_position = Some(position);
    }

    pub fn end_reached(&self) -> bool {
        matches!(self.keys.last(), Some((_, None)))
    }

    fn state(&self) -> PagingState {
        PagingState::new(self.pages.clone(), self.anchor_position, self.page_size)
    }

    /// Loads the following page, returns how many items arrived.
    pub async fn load_next(&mut self) -> Result<usize> {
        let key = match self.keys.last() {
            None => None,
            Some((_, Some(next_key))) => Some(*next_key),
            Some((_, None)) => return Ok(0),
        };
        self.load_page(key).await
    }

    /// Drops everything and reloads starting from the page holding the anchor.
    pub async fn refresh(&mut self) -> Result<usize> {
        let key = self.paging_source.refresh_key(&self.state(), &self.keys);
        self.pages.clear();
        self.keys.clear();
        self.load_page(key).await
    }

    async fn load_page(&mut self, key: Option<u32>) -> Result<usize> {
        let params = LoadParams {
            key,
            load_size: self.page_size,
        };
        match self.paging_source.load(params).await {
            LoadResult::Page {
                data,
                prev_key,
                next_key,
            } => {
                let loaded = data.len();
                self.pages.push(data);
                self.keys.push((prev_key, next_key));
                Ok(loaded)
            }
            LoadResult::Error(e) => Err(e),
        }
    }
}
