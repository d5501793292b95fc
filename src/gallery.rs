use crate::error::AppError;
use crate::models::SearchResult;
use crate::search::SearchBackend;
use futures::future::join_all;
use std::path::{Path, PathBuf};

/// File name for a downloaded result, prefixed with its rank so a
/// directory listing keeps the server's order.
fn target_name(rank: usize, image_url: &str) -> String {
    let base = image_url
        .split(['?', '#'])
        .next()
        .unwrap_or(image_url)
        .rsplit('/')
        .find(|s| !s.is_empty())
        .unwrap_or("image");
    format!("{:02}-{}", rank, base)
}

/// Fetches every result image and writes it under `dir`.
///
/// Failed fetches are logged and skipped; only directory errors abort.
pub async fn download_images(
    backend: &dyn SearchBackend,
    results: &[SearchResult],
    dir: &Path,
) -> Result<Vec<PathBuf>, AppError> {
    tokio::fs::create_dir_all(dir).await?;

    let wanted: Vec<(usize, &str)> = results
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.image_url.as_deref().map(|u| (i + 1, u)))
        .collect();
    log::info!("Downloading {} result images to {:?}", wanted.len(), dir);

    let fetched = join_all(wanted.iter().map(|(_, url)| backend.fetch_image(url))).await;

    let mut written = Vec::new();
    for ((rank, url), outcome) in wanted.into_iter().zip(fetched) {
        match outcome {
            Ok(bytes) => {
                let path = dir.join(target_name(rank, url));
                tokio::fs::write(&path, bytes).await?;
                log::debug!("Saved {} to {:?}", url, path);
                written.push(path);
            }
            Err(e) => log::warn!("Could not fetch {}: {}", url, e),
        }
    }

    Ok(written)
}
