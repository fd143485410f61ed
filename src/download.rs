use crate::http::UnsplashClient;
use crate::models::image::Image;
use anyhow::{Context, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;

const MAX_FILE_STEM_LEN: usize = 80;

/// Downloads the full size image into `dir`, returns the written path.
pub async fn download_image(client: &UnsplashClient, image: &Image, dir: &Path) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("can't create {}", dir.display()))?;
    let bytes = client.fetch_image_bytes(&image.full_url).await?;
    let (path, mut file) = create_available_file(dir, &file_stem(&image.title())).await?;
    file.write_all(&bytes)
        .await
        .with_context(|| format!("can't write {}", path.display()))?;
    file.flush().await?;
    log::info!("downloaded {} ({} bytes) to {}", image.id, bytes.len(), path.display());
    Ok(path)
}

fn file_stem(title: &str) -> String {
    let mut stem: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    // collapse runs of underscores left by punctuation and spaces
    while stem.contains("__") {
        stem = stem.replace("__", "_");
    }
    let stem: String = stem.trim_matches('_').chars().take(MAX_FILE_STEM_LEN).collect();
    if stem.is_empty() {
        "image".to_string()
    } else {
        stem
    }
}

/// Creates `<stem>.jpg`, or the first free `<stem>-N.jpg`, without replacing any file.
async fn create_available_file(dir: &Path, stem: &str) -> Result<(PathBuf, File)> {
    let mut n = 0;
    loop {
        let path = if n == 0 {
            dir.join(format!("{stem}.jpg"))
        } else {
            dir.join(format!("{stem}-{n}.jpg"))
        };
        match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => n += 1,
            Err(e) => {
                return Err(e).with_context(|| format!("can't create {}", path.display()));
            }
        }
    }
}
