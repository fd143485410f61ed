pub mod cli;
pub mod config;

use crate::app::cli::Command;
use crate::app::config::Config;
use crate::db::SqliteDatabase;
use crate::download::download_image;
use crate::http::UnsplashClient;
use crate::models::db_cursor::Pagination;
use crate::models::image::Image;
use crate::repository::ImageRepository;
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt::Write;

pub const QUALIFIER: &str = "com";
pub const ORG: &str = "photoreel";
pub const APP: &str = "photoreel";
pub const APPID: &str = constcat::concat!(QUALIFIER, ".", ORG, ".", APP);

pub struct Photoreel {
    config: Config,
    client: UnsplashClient,
    repository: ImageRepository<UnsplashClient>,
}

impl Photoreel {
    pub async fn new(config: Config) -> Result<Self> {
        let client = UnsplashClient::new(&config)?;
        let db = SqliteDatabase::create()
            .await
            .context("failed to open the local database")?;
        let repository = ImageRepository::new(client.clone(), db, config.items_per_page).await?;
        Ok(Self {
            config,
            client,
            repository,
        })
    }

    /// Runs one command and returns what should be printed.
    pub async fn update(&self, command: Command) -> Result<String> {
        let mut out = String::new();
        match command {
            Command::Feed {
                refresh,
                pages,
                previous,
                anchor,
            } => {
                let mut pager = self.repository.editorial_feed();
                pager.start(refresh && anchor.is_none()).await?;
                for _ in 1..pages {
                    if pager.load_next().await? == 0 {
                        break;
                    }
                }
                if let Some(anchor) = anchor {
                    pager.set_anchor(anchor);
                    pager.refresh().await?;
                }
                if previous && pager.load_previous().await? == 0 {
                    log::info!("already at the start of the feed");
                }
                if previous && pager.prepend_end_reached() {
                    writeln!(out, "(start of feed)")?;
                }
                let favorites = self.favorite_ids();
                for (index, page) in pager.pages().iter().enumerate() {
                    writeln!(out, "--- page {} ---", index + 1)?;
                    for image in page {
                        writeln!(out, "{}", format_image_line(image, &favorites))?;
                    }
                }
                if pager.item_count() == 0 {
                    writeln!(out, "The feed is empty.")?;
                } else if pager.append_end_reached() {
                    writeln!(out, "(end of feed)")?;
                }
            }
            Command::Search {
                query,
                pages,
                anchor,
            } => {
                let mut pager = self.repository.search_images(&query);
                for _ in 0..pages.max(1) {
                    if pager.load_next().await? == 0 {
                        break;
                    }
                }
                if let Some(anchor) = anchor {
                    pager.set_anchor(anchor);
                    pager.refresh().await?;
                    log::debug!("search reloaded into {} page(s)", pager.pages().len());
                }
                let favorites = self.favorite_ids();
                let images = pager.items();
                if images.is_empty() {
                    writeln!(out, "No images found for {query:?}.")?;
                }
                for image in &images {
                    writeln!(out, "{}", format_image_line(image, &favorites))?;
                }
                if !images.is_empty() && pager.end_reached() {
                    writeln!(out, "(end of results)")?;
                }
            }
            Command::Favorites { page } => {
                let mut cursor = self.repository.all_favorite_images();
                cursor.refresh_count().await?;
                cursor.go_to_page(page);
                cursor.fetch_next_results().await?;
                let favorites = self.favorite_ids();
                for favorite in cursor.result.unwrap_or_default() {
                    writeln!(out, "{}", format_image_line(&favorite.into(), &favorites))?;
                }
                writeln!(
                    out,
                    "page {}/{} ({} favorites)",
                    cursor.current_page, cursor.total_pages, cursor.total_entries
                )?;
            }
            Command::Favorite { ids, add, remove } => {
                let images = futures::future::try_join_all(
                    ids.iter().map(|id| self.repository.find_image(id)),
                )
                .await?;
                for image in images {
                    let is_favorite = if add || remove {
                        self.repository.set_favorite_status(&image, add).await?;
                        add
                    } else {
                        self.repository.toggle_favorite_status(&image).await?
                    };
                    if is_favorite {
                        writeln!(out, "{} added to favorites", image.id)?;
                    } else {
                        writeln!(out, "{} removed from favorites", image.id)?;
                    }
                }
            }
            Command::Show { id } => {
                let image = match self.repository.get_image(&id).await {
                    Ok(image) => image,
                    Err(e) => match self.repository.cached_image(&id).await? {
                        Some(image) => {
                            log::warn!("showing cached copy of {id}: {e:#}");
                            image
                        }
                        None => return Err(e),
                    },
                };
                let is_favorite = self.repository.is_favorite(&image.id).await?;
                write!(out, "{}", format_image_details(&image, is_favorite))?;
            }
            Command::Download { id, dir } => {
                let image = self.repository.find_image(&id).await?;
                let dir = dir.unwrap_or_else(|| self.config.download_dir());
                let path = download_image(&self.client, &image, &dir).await?;
                writeln!(out, "Saved {} to {}", image.id, path.display())?;
            }
            Command::Open { id } => {
                let image = self.repository.find_image(&id).await?;
                open::that(&image.full_url)
                    .with_context(|| format!("failed to open {}", image.full_url))?;
                writeln!(out, "Opened {}", image.full_url)?;
            }
            Command::ClearCache => {
                self.repository.clear_feed_cache().await?;
                writeln!(out, "Feed cache cleared.")?;
            }
        }
        Ok(out)
    }

    fn favorite_ids(&self) -> HashSet<String> {
        self.repository
            .subscribe_favorite_ids()
            .borrow()
            .iter()
            .cloned()
            .collect()
    }
}

pub fn format_image_line(image: &Image, favorites: &HashSet<String>) -> String {
    let mark = if favorites.contains(&image.id) { '*' } else { ' ' };
    format!(
        "{mark} {:<12} {:>5}x{:<5} {:<24} {}",
        image.id,
        image.width,
        image.height,
        image.author_name,
        image.title()
    )
}

pub fn format_image_details(image: &Image, is_favorite: bool) -> String {
    let mut details = String::new();
    let _ = writeln!(details, "id:          {}", image.id);
    let _ = writeln!(details, "title:       {}", image.title());
    let _ = writeln!(
        details,
        "author:      {} (@{})",
        image.author_name, image.author_username
    );
    let _ = writeln!(
        details,
        "size:        {}x{} ({:.2})",
        image.width,
        image.height,
        image.aspect_ratio()
    );
    let _ = writeln!(details, "favorite:    {}", if is_favorite { "yes" } else { "no" });
    let _ = writeln!(details, "thumb:       {}", image.thumb_url);
    let _ = writeln!(details, "regular:     {}", image.regular_url);
    let _ = writeln!(details, "full:        {}", image.full_url);
    details
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::image;

    #[test]
    fn favorites_are_marked_in_listings() {
        let favorites = HashSet::from(["a".to_string()]);
        let line = format_image_line(&image("a"), &favorites);
        assert!(line.starts_with("* a "));
        assert!(line.contains("4000x3000"));
        assert!(line.ends_with("Photo a"));
        assert!(format_image_line(&image("b"), &favorites).starts_with("  b "));
    }

    #[test]
    fn details_show_favorite_state_and_urls() {
        let details = format_image_details(&image("a"), true);
        assert!(details.contains("favorite:    yes"));
        assert!(details.contains("author:      Author a (@author_a)"));
        assert!(details.contains("size:        4000x3000 (1.33)"));
        assert!(details.contains("full:        https://images.example.com/a/full"));
    }
}
