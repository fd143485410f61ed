use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Eq, PartialEq)]
pub struct Image {
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
}

impl Image {
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.width as f32 / self.height as f32;
        ratio
    }

    /// Human readable title, used for listings and download file names.
    pub fn title(&self) -> String {
        match &self.description {
            Some(description) if !description.trim().is_empty() => description.trim().to_string(),
            _ => self.id.clone(),
        }
    }
}

// NOTE: the API returns many more fields, serde drops whatever is not declared here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsplashImageDto {
    pub id: String,
    pub description: Option<String>,
    pub alt_description: Option<String>,
    pub urls: UrlsDto,
    pub user: UserDto,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrlsDto {
    pub raw: Option<String>,
    pub full: String,
    pub regular: String,
    pub small: Option<String>,
    pub thumb: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub name: String,
    pub username: String,
    pub profile_image: ProfileImageDto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileImageDto {
    pub small: String,
    pub medium: String,
    pub large: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponseDto {
    pub total: u64,
    pub total_pages: u32,
    pub results: Vec<UnsplashImageDto>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub total: u64,
    pub total_pages: u32,
    pub images: Vec<Image>,
}

impl From<UnsplashImageDto> for Image {
    fn from(dto: UnsplashImageDto) -> Self {
        Self {
            id: dto.id,
            author_name: dto.user.name,
            author_username: dto.user.username,
            author_avatar_url: dto.user.profile_image.medium,
            thumb_url: dto.urls.thumb,
            regular_url: dto.urls.regular,
            full_url: dto.urls.full,
            width: dto.width,
            height: dto.height,
            description: dto.description.or(dto.alt_description),
        }
    }
}

impl From<SearchResponseDto> for SearchPage {
    fn from(dto: SearchResponseDto) -> Self {
        Self {
            total: dto.total,
            total_pages: dto.total_pages,
            images: dto.results.into_iter().map(Image::from).collect(),
        }
    }
}
