use crate::db::SqliteDatabase;
use crate::models::image::Image;
use crate::paging::{mediator::EditorialFeedMediator, LoadType, MediatorResult, PagingState};
use crate::repository::ImageSource;
use anyhow::Result;

/// Offline-first feed loader: pages are always served from the local cache,
/// the mediator is only asked for more when the cache runs out.
pub struct FeedPager<S> {
    mediator: EditorialFeedMediator<S>,
    database: SqliteDatabase,
    page_size: u32,
    pages: Vec<Vec<Image>>,
    anchor_position: Option<usize>,
    append_end_reached: bool,
    prepend_end_reached: bool,
}

impl<S: ImageSource> FeedPager<S> {
    pub fn new(mediator: EditorialFeedMediator<S>, database: SqliteDatabase, page_size: u32) -> Self {
        Self {
            mediator,
            database,
            page_size,
            pages: Vec::new(),
            anchor_position: None,
            append_end_reached: false,
            prepend_end_reached: false,
        }
    }

    pub fn items(&self) -> Vec<&Image> {
        self.pages.iter().flatten().collect()
    }

    pub fn pages(&self) -> &[Vec<Image>] {
        &self.pages
    }

    pub fn item_count(&self) -> usize {
        self.pages.iter().map(Vec::len).sum()
    }

    pub fn set_anchor(&mut self, position: usize) {
        self.anchor_position = Some(position);
    }

    pub fn append_end_reached(&self) -> bool {
        self.append_end_reached
    }

    pub fn prepend_end_reached(&self) -> bool {
        self.prepend_end_reached
    }

    fn page_len(&self) -> usize {
        self.page_size as usize
    }

    fn state(&self) -> PagingState {
        PagingState::new(self.pages.clone(), self.anchor_position, self.page_size)
    }

    /// Shows what is cached, refreshing first when the cache is empty or a
    /// refresh is requested.
    pub async fn start(&mut self, force_refresh: bool) -> Result<()> {
        let cached = self.database.count_feed_images().await?;
        log::debug!("{cached} cached feed images");
        if force_refresh || cached == 0 {
            self.refresh().await
        } else {
            self.reload(self.page_len()).await
        }
    }

    pub async fn refresh(&mut self) -> Result<()> {
        let window = self.item_count().max(self.page_len());
        match self.mediator.load(LoadType::Refresh, &self.state()).await {
            MediatorResult::Success {
                end_of_pagination_reached,
            } => {
                self.append_end_reached = end_of_pagination_reached;
                self.prepend_end_reached = false;
                self.reload(window).await
            }
            MediatorResult::Error(e) => Err(e),
        }
    }

    /// Appends the next page, returns how many items arrived.
    pub async fn load_next(&mut self) -> Result<usize> {
        let offset = self.item_count();
        let cached = self
            .database
            .select_feed_images_with_limit(self.page_len(), offset)
            .await?;
        if !cached.is_empty() {
            return Ok(self.push_page(cached));
        }
        if self.append_end_reached {
            return Ok(0);
        }
        match self.mediator.load(LoadType::Append, &self.state()).await {
            MediatorResult::Success {
                end_of_pagination_reached,
            } => {
                self.append_end_reached = end_of_pagination_reached;
                let fetched = self
                    .database
                    .select_feed_images_with_limit(self.page_len(), offset)
                    .await?;
                Ok(self.push_page(fetched))
            }
            MediatorResult::Error(e) => Err(e),
        }
    }

    /// Loads the page before the first loaded item, returns how many items arrived.
    pub async fn load_previous(&mut self) -> Result<usize> {
        if self.prepend_end_reached {
            return Ok(0);
        }
        let before = self.item_count();
        match self.mediator.load(LoadType::Prepend, &self.state()).await {
            MediatorResult::Success {
                end_of_pagination_reached,
            } => {
                if end_of_pagination_reached {
                    self.prepend_end_reached = true;
                    return Ok(0);
                }
                self.reload(before + self.page_len()).await?;
                let added = self.item_count().saturating_sub(before);
                if let Some(anchor) = self.anchor_position.as_mut() {
                    *anchor += added;
                }
                Ok(added)
            }
            MediatorResult::Error(e) => Err(e),
        }
    }

    fn push_page(&mut self, page: Vec<Image>) -> usize {
        let loaded = page.len();
        if loaded > 0 {
            self.pages.push(page);
        }
        loaded
    }

    // Re-reads the first `window` cached rows, the cache changed underneath us.
    async fn reload(&mut self, window: usize) -> Result<()> {
        let rows = self
            .database
            .select_feed_images_with_limit(window, 0)
            .await?;
        self.pages = rows
            .chunks(self.page_len().max(1))
            .map(<[Image]>::to_vec)
            .collect();
        Ok(())
    }
}
