use crate::models::image::Image;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Eq, PartialEq)]
pub struct FavoriteImage {
    pub id: String,
    pub author_name: String,
    pub author_username: String,
    pub author_avatar_url: String,
    pub thumb_url: String,
    pub regular_url: String,
    pub full_url: String,
    pub width: u32,
    pub height: u32,
    pub description: Option<String>,
    pub favorited_at: i64,
}

impl FavoriteImage {
    pub fn new(image: Image, favorited_at: i64) -> Self {
        Self {
            id: image.id,
            author_name: image.author_name,
            author_username: image.author_username,
            author_avatar_url: image.author_avatar_url,
            thumb_url: image.thumb_url,
            regular_url: image.regular_url,
            full_url: image.full_url,
            width: image.width,
            height: image.height,
            description: image.description,
            favorited_at,
        }
    }
}

impl From<FavoriteImage> for Image {
    fn from(favorite: FavoriteImage) -> Self {
        Self {
            id: favorite.id,
            author_name: favorite.author_name,
            author_username: favorite.author_username,
            author_avatar_url: favorite.author_avatar_url,
            thumb_url: favorite.thumb_url,
            regular_url: favorite.regular_url,
            full_url: favorite.full_url,
            width: favorite.width,
            height: favorite.height,
            description: favorite.description,
        }
    }
}
