use crate::app::config::Config;
use crate::models::{
    favorite::FavoriteImage,
    image::{Image, SearchPage},
};
use crate::repository::ImageSource;
use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub fn image(id: &str) -> Image {
    Image {
        id: id.to_string(),
        author_name: format!("Author {id}"),
        author_username: format!("author_{id}"),
        author_avatar_url: format!("https://images.example.com/{id}/avatar"),
        thumb_url: format!("https://images.example.com/{id}/thumb"),
        regular_url: format!("https://images.example.com/{id}/regular"),
        full_url: format!("https://images.example.com/{id}/full"),
        width: 4000,
        height: 3000,
        description: Some(format!("Photo {id}")),
    }
}

pub fn images(ids: &[&str]) -> Vec<Image> {
    ids.iter().map(|id| image(id)).collect()
}

pub fn favorite(id: &str, favorited_at: i64) -> FavoriteImage {
    FavoriteImage::new(image(id), favorited_at)
}

pub fn photo_json(id: &str) -> Value {
    json!({
        "id": id,
        "width": 4000,
        "height": 3000,
        "description": format!("Photo {id}"),
        "alt_description": null,
        "likes": 12,
        "urls": {
            "raw": format!("https://images.example.com/{id}/raw"),
            "full": format!("https://images.example.com/{id}/full"),
            "regular": format!("https://images.example.com/{id}/regular"),
            "small": format!("https://images.example.com/{id}/small"),
            "thumb": format!("https://images.example.com/{id}/thumb")
        },
        "user": {
            "id": format!("user-{id}"),
            "name": format!("Author {id}"),
            "username": format!("author_{id}"),
            "profile_image": {
                "small": format!("https://images.example.com/{id}/avatar-small"),
                "medium": format!("https://images.example.com/{id}/avatar"),
                "large": format!("https://images.example.com/{id}/avatar-large")
            }
        }
    })
}

pub fn test_config(api_url: &str) -> Config {
    Config {
        api_url: api_url.to_string(),
        access_key: Some("test-key".to_string()),
        ..Config::default()
    }
}

#[derive(Default)]
struct StubState {
    feed_pages: HashMap<u32, Vec<Image>>,
    search_pages: HashMap<u32, Vec<Image>>,
    details: HashMap<String, Image>,
    feed_calls: Vec<(u32, u32)>,
    search_calls: Vec<(String, u32, u32)>,
    detail_calls: Vec<String>,
    failing: bool,
}

/// In-memory remote, pages that were not registered come back empty.
#[derive(Clone, Default)]
pub struct StubSource {
    state: Arc<Mutex<StubState>>,
}

impl StubSource {
    pub fn with_feed_page(self, page: u32, ids: &[&str]) -> Self {
        self.state.lock().unwrap().feed_pages.insert(page, images(ids));
        self
    }

    pub fn with_search_page(self, page: u32, ids: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .search_pages
            .insert(page, images(ids));
        self
    }

    pub fn with_detail(self, image: Image) -> Self {
        self.state
            .lock()
            .unwrap()
            .details
            .insert(image.id.clone(), image);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.state.lock().unwrap().failing = failing;
    }

    /// `(page, per_page)` of every feed request, in order.
    pub fn feed_calls(&self) -> Vec<(u32, u32)> {
        self.state.lock().unwrap().feed_calls.clone()
    }

    pub fn search_calls(&self) -> Vec<(String, u32, u32)> {
        self.state.lock().unwrap().search_calls.clone()
    }

    pub fn detail_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().detail_calls.clone()
    }
}

impl ImageSource for StubSource {
    async fn fetch_editorial_feed(&self, page: u32, per_page: u32) -> Result<Vec<Image>> {
        let mut state = self.state.lock().unwrap();
        state.feed_calls.push((page, per_page));
        if state.failing {
            return Err(anyhow!("stub remote failure"));
        }
        Ok(state.feed_pages.get(&page).cloned().unwrap_or_default())
    }

    async fn search_images(&self, query: &str, page: u32, per_page: u32) -> Result<SearchPage> {
        let mut state = self.state.lock().unwrap();
        state.search_calls.push((query.to_string(), page, per_page));
        if state.failing {
            return Err(anyhow!("stub remote failure"));
        }
        let images = state.search_pages.get(&page).cloned().unwrap_or_default();
        Ok(SearchPage {
            total: state.search_pages.values().map(|p| p.len() as u64).sum(),
            total_pages: u32::try_from(state.search_pages.len()).unwrap(),
            images,
        })
    }

    async fn fetch_image(&self, image_id: &str) -> Result<Image> {
        let mut state = self.state.lock().unwrap();
        state.detail_calls.push(image_id.to_string());
        if state.failing {
            return Err(anyhow!("stub remote failure"));
        }
        state
            .details
            .get(image_id)
            .cloned()
            .ok_or_else(|| anyhow!("no image {image_id}"))
    }
}
