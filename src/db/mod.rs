use crate::{
    app::{config::Config, APPID},
    models::{favorite::FavoriteImage, image::Image, remote_keys::RemoteKeys},
    paging::LoadType,
};
use anyhow::Result;

use std::path::Path;

use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqliteConnection, SqlitePool,
};

const DB_PATH: &str = constcat::concat!(APPID, "-db", ".sqlite");

#[derive(Debug, Clone)]
pub struct SqliteDatabase {
    conn: SqlitePool,
}

impl SqliteDatabase {
    pub async fn create() -> Result<Self> {
        let data_dir = Config::data_dir()?;
        std::fs::create_dir_all(&data_dir)?;
        Self::open(&data_dir.join(DB_PATH)).await
    }

    pub async fn open(db_path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let conn = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::migrate(conn).await
    }

    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        use std::str::FromStr;
        // A single connection that never expires, every new connection would see an empty database.
        let conn = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(SqliteConnectOptions::from_str("sqlite::memory:")?)
            .await?;
        Self::migrate(conn).await
    }

    async fn migrate(conn: SqlitePool) -> Result<Self> {
        sqlx::migrate!("./migrations").run(&conn).await?;
        Ok(SqliteDatabase { conn })
    }

    pub async fn count_feed_images(&self) -> Result<usize> {
        let query: &str = "SELECT COUNT(*) FROM FeedImages;";
        let result: i64 = sqlx::query_scalar(query).fetch_one(&self.conn).await?;
        Ok(usize::try_from(result)?)
    }

    // NOTE: rows are ordered by the remote page they came from so a prepended page
    //       lands before the pages that were already cached.
    pub async fn select_feed_images_with_limit(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Image>> {
        let query: &str = r"
            SELECT
                FeedImages.*
            FROM
                FeedImages
            LEFT JOIN
                RemoteKeys ON FeedImages.id = RemoteKeys.id
            ORDER BY
                COALESCE(RemoteKeys.next_page - 1, RemoteKeys.prev_page + 1, 1) ASC,
                FeedImages.rowid ASC
            LIMIT
                $1 OFFSET $2;
            ";
        let result: Vec<Image> = sqlx::query_as(query)
            .bind(i64::try_from(limit)?)
            .bind(i64::try_from(offset)?)
            .fetch_all(&self.conn)
            .await?;
        Ok(result)
    }

    pub async fn select_feed_image(&self, image_id: &str) -> Result<Option<Image>> {
        let query: &str = "SELECT * FROM FeedImages WHERE id = $1;";
        let result: Option<Image> = sqlx::query_as(query)
            .bind(image_id)
            .fetch_optional(&self.conn)
            .await?;
        Ok(result)
    }

    pub async fn select_remote_keys(&self, image_id: &str) -> Result<Option<RemoteKeys>> {
        let query: &str = "SELECT * FROM RemoteKeys WHERE id = $1;";
        let result: Option<RemoteKeys> = sqlx::query_as(query)
            .bind(image_id)
            .fetch_optional(&self.conn)
            .await?;
        Ok(result)
    }

    /// Persists one remote page and its bookkeeping in a single transaction.
    /// A refresh wipes the previous feed and every remote key first.
    pub async fn store_feed_page(
        &self,
        load_type: LoadType,
        images: &[Image],
        prev_page: Option<u32>,
        next_page: Option<u32>,
    ) -> Result<()> {
        let mut tx = self.conn.begin().await?;
        if load_type == LoadType::Refresh {
            Self::delete_feed_cache(&mut tx).await?;
        }
        for image in images {
            let keys = RemoteKeys::new(image.id.clone(), prev_page, next_page);
            Self::upsert_remote_keys(&mut tx, &keys).await?;
        }
        for image in images {
            Self::upsert_feed_image(&mut tx, image).await?;
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn clear_feed_cache(&self) -> Result<()> {
        let mut tx = self.conn.begin().await?;
        Self::delete_feed_cache(&mut tx).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_feed_cache(conn: &mut SqliteConnection) -> Result<()> {
        sqlx::query("DELETE FROM FeedImages;").execute(&mut *conn).await?;
        sqlx::query("DELETE FROM RemoteKeys;").execute(&mut *conn).await?;
        Ok(())
    }

    async fn upsert_remote_keys(conn: &mut SqliteConnection, keys: &RemoteKeys) -> Result<()> {
        let query: &str = r"
        INSERT INTO RemoteKeys (id, prev_page, next_page)
        VALUES ($1, $2, $3)
        ON CONFLICT(id) DO UPDATE SET
            prev_page = excluded.prev_page,
            next_page = excluded.next_page;
        ";
        sqlx::query(query)
            .bind(&keys.id)
            .bind(keys.prev_page)
            .bind(keys.next_page)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn upsert_feed_image(conn: &mut SqliteConnection, image: &Image) -> Result<()> {
        let query: &str = r"
        INSERT INTO FeedImages (
            id,
            author_name,
            author_username,
            author_avatar_url,
            thumb_url,
            regular_url,
            full_url,
            width,
            height,
            description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT(id) DO UPDATE SET
            author_name = excluded.author_name,
            author_username = excluded.author_username,
            author_avatar_url = excluded.author_avatar_url,
            thumb_url = excluded.thumb_url,
            regular_url = excluded.regular_url,
            full_url = excluded.full_url,
            width = excluded.width,
            height = excluded.height,
            description = excluded.description;
        ";
        sqlx::query(query)
            .bind(&image.id)
            .bind(&image.author_name)
            .bind(&image.author_username)
            .bind(&image.author_avatar_url)
            .bind(&image.thumb_url)
            .bind(&image.regular_url)
            .bind(&image.full_url)
            .bind(image.width)
            .bind(image.height)
            .bind(&image.description)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn insert_favorite_image(&self, favorite: &FavoriteImage) -> Result<()> {
        let mut conn = self.conn.acquire().await?;
        Self::upsert_favorite_image(&mut conn, favorite).await
    }

    async fn upsert_favorite_image(
        conn: &mut SqliteConnection,
        favorite: &FavoriteImage,
    ) -> Result<()> {
        let query: &str = r"
        INSERT INTO FavoriteImages (
            id,
            author_name,
            author_username,
            author_avatar_url,
            thumb_url,
            regular_url,
            full_url,
            width,
            height,
            description,
            favorited_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT(id) DO UPDATE SET
            author_name = excluded.author_name,
            author_username = excluded.author_username,
            author_avatar_url = excluded.author_avatar_url,
            thumb_url = excluded.thumb_url,
            regular_url = excluded.regular_url,
            full_url = excluded.full_url,
            width = excluded.width,
            height = excluded.height,
            description = excluded.description;
        ";
        sqlx::query(query)
            .bind(&favorite.id)
            .bind(&favorite.author_name)
            .bind(&favorite.author_username)
            .bind(&favorite.author_avatar_url)
            .bind(&favorite.thumb_url)
            .bind(&favorite.regular_url)
            .bind(&favorite.full_url)
            .bind(favorite.width)
            .bind(favorite.height)
            .bind(&favorite.description)
            .bind(favorite.favorited_at)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn delete_favorite_image(&self, image_id: &str) -> Result<()> {
        let mut conn = self.conn.acquire().await?;
        Self::remove_favorite_image(&mut conn, image_id).await
    }

    async fn remove_favorite_image(conn: &mut SqliteConnection, image_id: &str) -> Result<()> {
        let query: &str = "DELETE FROM FavoriteImages WHERE id = $1;";
        sqlx::query(query).bind(image_id).execute(conn).await?;
        Ok(())
    }

    pub async fn is_image_favorite(&self, image_id: &str) -> Result<bool> {
        let query: &str = "SELECT EXISTS(SELECT 1 FROM FavoriteImages WHERE id = $1);";
        let result: bool = sqlx::query_scalar(query)
            .bind(image_id)
            .fetch_one(&self.conn)
            .await?;
        Ok(result)
    }

    /// Flips the favorite state of an image, returns the new state.
    pub async fn toggle_favorite_image(&self, favorite: &FavoriteImage) -> Result<bool> {
        let mut tx = self.conn.begin().await?;
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM FavoriteImages WHERE id = $1);")
                .bind(&favorite.id)
                .fetch_one(&mut *tx)
                .await?;
        if exists {
            Self::remove_favorite_image(&mut tx, &favorite.id).await?;
        } else {
            Self::upsert_favorite_image(&mut tx, favorite).await?;
        }
        tx.commit().await?;
        Ok(!exists)
    }

    pub async fn select_favorite_ids(&self) -> Result<Vec<String>> {
        let query: &str = "SELECT id FROM FavoriteImages ORDER BY favorited_at DESC, rowid DESC;";
        let result: Vec<String> = sqlx::query_scalar(query).fetch_all(&self.conn).await?;
        Ok(result)
    }

    pub async fn select_favorite_image(&self, image_id: &str) -> Result<Option<FavoriteImage>> {
        let query: &str = "SELECT * FROM FavoriteImages WHERE id = $1;";
        let result: Option<FavoriteImage> = sqlx::query_as(query)
            .bind(image_id)
            .fetch_optional(&self.conn)
            .await?;
        Ok(result)
    }

    pub async fn count_favorite_images(&self) -> Result<usize> {
        let query: &str = "SELECT COUNT(*) FROM FavoriteImages;";
        let result: i64 = sqlx::query_scalar(query).fetch_one(&self.conn).await?;
        Ok(usize::try_from(result)?)
    }

    pub async fn select_favorite_images_with_limit(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<FavoriteImage>> {
        let query: &str = r"
            SELECT * FROM FavoriteImages
            ORDER BY favorited_at DESC, rowid DESC
            LIMIT $1 OFFSET $2;
            ";
        let result: Vec<FavoriteImage> = sqlx::query_as(query)
            .bind(i64::try_from(limit)?)
            .bind(i64::try_from(offset)?)
            .fetch_all(&self.conn)
            .await?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{favorite, image};
    use tempfile::TempDir;

    fn ids(images: &[Image]) -> Vec<&str> {
        images.iter().map(|i| i.id.as_str()).collect()
    }

    #[tokio::test]
    async fn opens_database_file_and_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DB_PATH);
        {
            let db = SqliteDatabase::open(&path).await.unwrap();
            db.insert_favorite_image(&favorite("kept", 1)).await.unwrap();
        }
        let db = SqliteDatabase::open(&path).await.unwrap();
        assert!(db.is_image_favorite("kept").await.unwrap());
    }

    #[tokio::test]
    async fn append_keeps_existing_rows_and_bookkeeping() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.store_feed_page(LoadType::Refresh, &[image("a"), image("b")], None, Some(2))
            .await
            .unwrap();
        db.store_feed_page(LoadType::Append, &[image("c")], Some(1), Some(3))
            .await
            .unwrap();

        assert_eq!(db.count_feed_images().await.unwrap(), 3);
        let keys = db.select_remote_keys("c").await.unwrap().unwrap();
        assert_eq!(keys.prev_page, Some(1));
        assert_eq!(keys.next_page, Some(3));
        let keys = db.select_remote_keys("a").await.unwrap().unwrap();
        assert_eq!(keys.prev_page, None);
        assert_eq!(keys.next_page, Some(2));
    }

    #[tokio::test]
    async fn refresh_replaces_images_and_keys_together() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.store_feed_page(LoadType::Refresh, &[image("a"), image("b")], None, Some(2))
            .await
            .unwrap();
        db.store_feed_page(LoadType::Refresh, &[image("x")], None, Some(2))
            .await
            .unwrap();

        let images = db.select_feed_images_with_limit(10, 0).await.unwrap();
        assert_eq!(ids(&images), vec!["x"]);
        assert!(db.select_remote_keys("a").await.unwrap().is_none());
        assert!(db.select_remote_keys("b").await.unwrap().is_none());
        assert!(db.select_remote_keys("x").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn feed_is_ordered_by_page_then_insertion() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        // page 3 cached first, then page 2 prepended
        db.store_feed_page(LoadType::Refresh, &[image("p3a"), image("p3b")], Some(2), Some(4))
            .await
            .unwrap();
        db.store_feed_page(LoadType::Prepend, &[image("p2a"), image("p2b")], Some(1), Some(3))
            .await
            .unwrap();
        db.store_feed_page(LoadType::Append, &[image("p4a")], Some(3), None)
            .await
            .unwrap();

        let images = db.select_feed_images_with_limit(10, 0).await.unwrap();
        assert_eq!(ids(&images), vec!["p2a", "p2b", "p3a", "p3b", "p4a"]);
        let images = db.select_feed_images_with_limit(2, 2).await.unwrap();
        assert_eq!(ids(&images), vec!["p3a", "p3b"]);
    }

    #[tokio::test]
    async fn clear_feed_cache_leaves_favorites_alone() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.store_feed_page(LoadType::Refresh, &[image("a")], None, Some(2))
            .await
            .unwrap();
        db.insert_favorite_image(&favorite("a", 1)).await.unwrap();

        db.clear_feed_cache().await.unwrap();

        assert_eq!(db.count_feed_images().await.unwrap(), 0);
        assert!(db.select_remote_keys("a").await.unwrap().is_none());
        assert!(db.is_image_favorite("a").await.unwrap());
    }

    #[tokio::test]
    async fn toggling_twice_restores_state() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        let fav = favorite("a", 1);

        assert!(db.toggle_favorite_image(&fav).await.unwrap());
        assert!(db.is_image_favorite("a").await.unwrap());
        assert!(!db.toggle_favorite_image(&fav).await.unwrap());
        assert!(!db.is_image_favorite("a").await.unwrap());
        assert_eq!(db.count_favorite_images().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn favorites_are_listed_newest_first() {
        let db = SqliteDatabase::in_memory().await.unwrap();
        db.insert_favorite_image(&favorite("old", 10)).await.unwrap();
        db.insert_favorite_image(&favorite("new", 30)).await.unwrap();
        db.insert_favorite_image(&favorite("mid", 20)).await.unwrap();

        assert_eq!(
            db.select_favorite_ids().await.unwrap(),
            vec!["new", "mid", "old"]
        );
        let page = db.select_favorite_images_with_limit(2, 1).await.unwrap();
        let page_ids: Vec<&str> = page.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(page_ids, vec!["mid", "old"]);

        db.delete_favorite_image("mid").await.unwrap();
        assert!(db.select_favorite_image("mid").await.unwrap().is_none());
        assert_eq!(db.count_favorite_images().await.unwrap(), 2);
    }
}
