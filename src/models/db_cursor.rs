use crate::db::SqliteDatabase;
use crate::models::favorite::FavoriteImage;
use anyhow::Result;

pub trait Pagination {
    async fn refresh_count(&mut self) -> Result<()>;
    async fn refresh_offset(&mut self, page_index: usize);
    async fn fetch_next_results(&mut self) -> Result<()>;
}

#[derive(Debug, Default, Clone)]
pub struct FavoritesPaginationCursor {
    offset: usize,
    pub current_page: usize,
    pub database: Option<SqliteDatabase>,
    pub items_per_page: u32,
    pub result: Option<Vec<FavoriteImage>>,
    pub total_entries: usize,
    pub total_pages: usize,
}

impl FavoritesPaginationCursor {
    pub fn new(database: SqliteDatabase) -> Self {
        Self {
            offset: 0,
            current_page: 1,
            database: Some(database),
            items_per_page: 0,
            result: None,
            total_entries: 0,
            total_pages: 1,
        }
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.current_page = page.clamp(1, self.total_pages);
    }
}

impl Pagination for FavoritesPaginationCursor {
    async fn refresh_count(&mut self) -> Result<()> {
        if let Some(database) = &self.database {
            self.total_entries = database.count_favorite_images().await?;
            self.total_pages = std::cmp::max(
                self.total_entries.div_ceil(self.items_per_page.max(1) as usize),
                1,
            );
        }
        if self.current_page > self.total_pages {
            self.current_page = self.total_pages;
        }
        Ok(())
    }

    async fn refresh_offset(&mut self, page_index: usize) {
        if page_index == 0 {
            self.offset = 0;
            self.current_page = 1;
        } else {
            self.offset = page_index * self.items_per_page as usize;
        }
    }

    async fn fetch_next_results(&mut self) -> Result<()> {
        self.refresh_offset(self.current_page.saturating_sub(1)).await;
        if let Some(database) = &self.database {
            self.result = Some(
                database
                    .select_favorite_images_with_limit(self.items_per_page as usize, self.offset)
                    .await?,
            );
        }
        Ok(())
    }
}
