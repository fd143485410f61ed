use crate::db::SqliteDatabase;
use crate::models::{
    db_cursor::FavoritesPaginationCursor,
    favorite::FavoriteImage,
    image::{Image, SearchPage},
};
use crate::paging::{mediator::EditorialFeedMediator, pager::FeedPager, search::SearchPager};
use anyhow::Result;
use chrono::Utc;
use tokio::sync::watch;

/// Remote reads the paging core depends on.
pub trait ImageSource {
    async fn fetch_editorial_feed(&self, page: u32, per_page: u32) -> Result<Vec<Image>>;
    async fn search_images(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage>;
    async fn fetch_image(&self, image_id: &str) -> Result<Image>;
}

pub struct ImageRepository<S> {
    source: S,
    database: SqliteDatabase,
    items_per_page: u32,
    favorite_ids: watch::Sender<Vec<String>>,
}

impl<S: ImageSource + Clone> ImageRepository<S> {
    pub async fn new(source: S, database: SqliteDatabase, items_per_page: u32) -> Result<Self> {
        let ids = database.select_favorite_ids().await?;
        let (favorite_ids, _) = watch::channel(ids);
        Ok(Self {
            source,
            database,
            items_per_page,
            favorite_ids,
        })
    }

    pub fn editorial_feed(&self) -> FeedPager<S> {
        let mediator = EditorialFeedMediator::new(self.source.clone(), self.database.clone());
        FeedPager::new(mediator, self.database.clone(), self.items_per_page)
    }

    pub fn search_images(&self, query: &str) -> SearchPager<S> {
        SearchPager::new(self.source.clone(), query.to_string(), self.items_per_page)
    }

    pub async fn get_image(&self, image_id: &str) -> Result<Image> {
        self.source.fetch_image(image_id).await
    }

    /// Looks the image up in the feed cache and then in favorites, without touching the network.
    pub async fn cached_image(&self, image_id: &str) -> Result<Option<Image>> {
        if let Some(image) = self.database.select_feed_image(image_id).await? {
            return Ok(Some(image));
        }
        Ok(self
            .database
            .select_favorite_image(image_id)
            .await?
            .map(Image::from))
    }

    pub async fn find_image(&self, image_id: &str) -> Result<Image> {
        match self.cached_image(image_id).await? {
            Some(image) => Ok(image),
            None => self.get_image(image_id).await,
        }
    }

    pub async fn toggle_favorite_status(&self, image: &Image) -> Result<bool> {
        let favorite = FavoriteImage::new(image.clone(), Utc::now().timestamp());
        let is_favorite = self.database.toggle_favorite_image(&favorite).await?;
        log::debug!("image {} favorite: {is_favorite}", image.id);
        self.publish_favorite_ids().await?;
        Ok(is_favorite)
    }

    /// Adds or removes a favorite regardless of its current state.
    pub async fn set_favorite_status(&self, image: &Image, favorite: bool) -> Result<()> {
        if favorite {
            let favorite = FavoriteImage::new(image.clone(), Utc::now().timestamp());
            self.database.insert_favorite_image(&favorite).await?;
        } else {
            self.database.delete_favorite_image(&image.id).await?;
        }
        log::debug!("image {} favorite: {favorite}", image.id);
        self.publish_favorite_ids().await
    }

    async fn publish_favorite_ids(&self) -> Result<()> {
        let ids = self.favorite_image_ids().await?;
        self.favorite_ids.send_replace(ids);
        Ok(())
    }

    pub async fn is_favorite(&self, image_id: &str) -> Result<bool> {
        self.database.is_image_favorite(image_id).await
    }

    pub async fn favorite_image_ids(&self) -> Result<Vec<String>> {
        self.database.select_favorite_ids().await
    }

    /// Stream of the current favorite ids, updated after every toggle.
    pub fn subscribe_favorite_ids(&self) -> watch::Receiver<Vec<String>> {
        self.favorite_ids.subscribe()
    }

    pub fn all_favorite_images(&self) -> FavoritesPaginationCursor {
        let mut cursor = FavoritesPaginationCursor::new(self.database.clone());
        cursor.items_per_page = self.items_per_page;
        cursor
    }

    pub async fn clear_feed_cache(&self) -> Result<()> {
        self.database.clear_feed_cache().await
    }
}
