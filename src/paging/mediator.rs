use crate::db::SqliteDatabase;
use crate::models::remote_keys::RemoteKeys;
use crate::paging::{LoadType, MediatorResult, PagingState, STARTING_PAGE_INDEX};
use crate::repository::ImageSource;
use anyhow::Result;

/// Fetches editorial feed pages and writes them, with their page bookkeeping,
/// into the local cache.
#[derive(Debug, Clone)]
pub struct EditorialFeedMediator<S> {
    source: S,
    database: SqliteDatabase,
}

enum PageSelection {
    Load(u32),
    Done { end_of_pagination_reached: bool },
}

impl<S: ImageSource> EditorialFeedMediator<S> {
    pub fn new(source: S, database: SqliteDatabase) -> Self {
        Self { source, database }
    }

    pub async fn load(&self, load_type: LoadType, state: &PagingState) -> MediatorResult {
        match self.try_load(load_type, state).await {
            Ok(end_of_pagination_reached) => MediatorResult::Success {
                end_of_pagination_reached,
            },
            Err(e) => {
                log::error!("Error loading editorial feed ({load_type:?}): {e:#}");
                MediatorResult::Error(e)
            }
        }
    }

    async fn try_load(&self, load_type: LoadType, state: &PagingState) -> Result<bool> {
        let current_page = match self.select_page(load_type, state).await? {
            PageSelection::Load(page) => page,
            PageSelection::Done {
                end_of_pagination_reached,
            } => return Ok(end_of_pagination_reached),
        };

        let images = self
            .source
            .fetch_editorial_feed(current_page, state.page_size)
            .await?;

        let end_of_pagination_reached = images.is_empty();
        log::debug!(
            "page {current_page} ({load_type:?}) returned {} images, end of pagination: {end_of_pagination_reached}",
            images.len()
        );

        let prev_page = if current_page == STARTING_PAGE_INDEX {
            None
        } else {
            Some(current_page - 1)
        };
        let next_page = if end_of_pagination_reached {
            None
        } else {
            Some(current_page + 1)
        };

        self.database
            .store_feed_page(load_type, &images, prev_page, next_page)
            .await?;

        Ok(end_of_pagination_reached)
    }

    async fn select_page(&self, load_type: LoadType, state: &PagingState) -> Result<PageSelection> {
        match load_type {
            LoadType::Refresh => {
                let remote_keys = self.remote_keys_closest_to_current_position(state).await?;
                log::debug!(
                    "refresh anchored on cached page {:?}",
                    remote_keys.as_ref().map(RemoteKeys::page)
                );
                let page = remote_keys
                    .and_then(|keys| keys.next_page)
                    .map_or(STARTING_PAGE_INDEX, |next| next - 1);
                Ok(PageSelection::Load(page))
            }
            LoadType::Prepend => {
                let remote_keys = self.remote_keys_for_first_item(state).await?;
                log::debug!(
                    "remote keys prev: {:?}",
                    remote_keys.as_ref().map(|k| k.prev_page)
                );
                Ok(match remote_keys.as_ref().and_then(|k| k.prev_page) {
                    Some(prev_page) => PageSelection::Load(prev_page),
                    None => PageSelection::Done {
                        end_of_pagination_reached: remote_keys.is_some(),
                    },
                })
            }
            LoadType::Append => {
                let remote_keys = self.remote_keys_for_last_item(state).await?;
                log::debug!(
                    "remote keys next: {:?}",
                    remote_keys.as_ref().map(|k| k.next_page)
                );
                Ok(match remote_keys.as_ref().and_then(|k| k.next_page) {
                    Some(next_page) => PageSelection::Load(next_page),
                    None => PageSelection::Done {
                        end_of_pagination_reached: remote_keys.is_some(),
                    },
                })
            }
        }
    }

    async fn remote_keys_closest_to_current_position(
        &self,
        state: &PagingState,
    ) -> Result<Option<RemoteKeys>> {
        let item = match state.anchor_position {
            Some(position) => state.closest_item_to_position(position),
            None => state.first_item(),
        };
        match item {
            Some(image) => self.database.select_remote_keys(&image.id).await,
            None => Ok(None),
        }
    }

    async fn remote_keys_for_first_item(&self, state: &PagingState) -> Result<Option<RemoteKeys>> {
        match state.first_item() {
            Some(image) => self.database.select_remote_keys(&image.id).await,
            None => Ok(None),
        }
    }

    async fn remote_keys_for_last_item(&self, state: &PagingState) -> Result<Option<RemoteKeys>> {
        match state.last_item() {
            Some(image) => self.database.select_remote_keys(&image.id).await,
            None => Ok(None),
        }
    }
}
