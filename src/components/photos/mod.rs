//! Photo sync: mirror an album into the slideshow directory and regenerate
//! `photos.js`.
//!
//! Downloads are idempotent by filename only. An image that changes remotely
//! but keeps its name is not fetched again.

pub mod client;
pub mod models;

pub use client::{GooglePhotosClient, PhotoSource};
pub use models::{MediaItem, MediaItemPage, PhotoSyncReport};

use super::{SyncComponent, SyncContext};
use crate::config::PhotosConfig;
use crate::error::SyncResult;
use crate::utils::render::write_assignment;
use async_trait::async_trait;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Global variable name the front end reads
pub const PHOTOS_VAR: &str = "photos";

/// Suffix of in-progress downloads
const PARTIAL_SUFFIX: &str = ".part";

/// Filenames that stay inside the slideshow directory and show up in the listing
fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains('\0')
        && !name.contains("..")
}

/// In-progress download left by `fetch_item`
fn is_partial_download(name: &str) -> bool {
    name.starts_with('.') && name.ends_with(PARTIAL_SUFFIX)
}

/// Download one item unless a file of the same name exists
async fn fetch_item(
    source: &dyn PhotoSource,
    item: &MediaItem,
    directory: &Path,
    report: &mut PhotoSyncReport,
) -> SyncResult<()> {
    if !is_safe_filename(&item.filename) {
        warn!("Rejecting media item {} with filename {:?}", item.id, item.filename);
        report.rejected += 1;
        return Ok(());
    }

    let target = directory.join(&item.filename);
    if target.exists() {
        debug!("{} already present, skipping", item.filename);
        report.skipped += 1;
        return Ok(());
    }

    let content = source.download(item).await?;

    // Write under a hidden name first so an interrupted download is never
    // mistaken for a complete file on the next run
    let partial = directory.join(format!(".{}{}", item.filename, PARTIAL_SUFFIX));
    tokio::fs::write(&partial, &content).await?;
    tokio::fs::rename(&partial, &target).await?;

    info!("Downloaded {} ({} bytes)", item.filename, content.len());
    report.downloaded += 1;
    Ok(())
}

/// List the directory's files as `<url_prefix><filename>`, sorted by name.
///
/// Every regular file is listed, hidden ones included, except in-progress
/// downloads.
pub fn build_listing(directory: &Path, url_prefix: &str) -> SyncResult<Vec<String>> {
    let mut names = Vec::new();

    for entry in fs::read_dir(directory)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) if !is_partial_download(&name) => names.push(name),
            Ok(_) => {}
            Err(name) => warn!("Skipping non UTF-8 filename {:?}", name),
        }
    }

    names.sort();
    Ok(names
        .into_iter()
        .map(|name| format!("{}{}", url_prefix, name))
        .collect())
}

/// Mirror the album and rewrite the listing file.
///
/// Fetches every page unless `settings.paginate` is off, in which case only
/// the first page is considered.
pub async fn sync_photos(
    source: &dyn PhotoSource,
    settings: &PhotosConfig,
) -> SyncResult<PhotoSyncReport> {
    fs::create_dir_all(&settings.directory)?;

    let mut report = PhotoSyncReport::default();
    let mut page_token: Option<String> = None;

    loop {
        let page = source
            .search_album(&settings.album_id, settings.page_size, page_token.as_deref())
            .await?;
        info!("Found {} photos...", page.media_items.len());
        report.found += page.media_items.len();

        for item in &page.media_items {
            fetch_item(source, item, &settings.directory, &mut report).await?;
        }

        if !settings.paginate {
            break;
        }
        match page.next_page_token.filter(|t| !t.is_empty()) {
            Some(token) => page_token = Some(token),
            None => break,
        }
    }

    report.listing = build_listing(&settings.directory, &settings.url_prefix)?;
    write_assignment(&settings.output, PHOTOS_VAR, &report.listing)?;

    info!(
        "Photo sync complete: {} found, {} downloaded, {} already present",
        report.found, report.downloaded, report.skipped
    );
    Ok(report)
}

/// Photo component backed by Google Photos
#[derive(Debug, Default, Clone, Copy)]
pub struct PhotoSync;

#[async_trait]
impl SyncComponent for PhotoSync {
    fn name(&self) -> &'static str {
        "photos"
    }

    async fn run(&self, ctx: &SyncContext) -> SyncResult<()> {
        let client = GooglePhotosClient::new(ctx.client.clone(), &ctx.credentials);
        sync_photos(&client, &ctx.config.photos).await?;
        Ok(())
    }
}
