//! Saving fetched file content to the download directory.

use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::{fs, io::AsyncWriteExt};
use uuid::Uuid;

/// Reduce a backend-supplied name to one safe path component.
pub fn safe_file_name(name: &str, fallback: &str) -> String {
    let candidate = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim()
        .trim_start_matches('.');
    let cleaned: String = candidate
        .chars()
        .map(|c| if c.is_control() { '_' } else { c })
        .collect();
    if cleaned.is_empty() {
        fallback.to_string()
    } else {
        cleaned
    }
}

/// `name`, or `stem (n).ext` for the first `n` not already taken in `dir`.
async fn free_target(dir: &Path, name: &str) -> io::Result<PathBuf> {
    let target = dir.join(name);
    if !fs::try_exists(&target).await? {
        return Ok(target);
    }
    let (stem, ext) = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, format!(".{}", ext)),
        _ => (name, String::new()),
    };
    let mut n = 1;
    loop {
        let candidate = dir.join(format!("{} ({}){}", stem, n, ext));
        if !fs::try_exists(&candidate).await? {
            return Ok(candidate);
        }
        n += 1;
    }
}

/// Write `bytes` to `dir/name` through a temporary file renamed into place,
/// creating `dir` if needed. An existing file is never replaced: the name
/// gets a ` (n)` suffix instead. Returns the final path.
pub async fn save_bytes(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir).await?;
    let tmp_path = dir.join(format!(".tmp-{}", Uuid::new_v4()));

    let mut file = fs::File::create(&tmp_path).await?;
    let written = async {
        file.write_all(bytes).await?;
        file.flush().await?;
        file.sync_all().await
    }
    .await;
    drop(file);
    if let Err(err) = written {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(err);
    }

    let target = match free_target(dir, name).await {
        Ok(target) => target,
        Err(err) => {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(err);
        }
    };
    if let Err(err) = fs::rename(&tmp_path, &target).await {
        let _ = fs::remove_file(&tmp_path).await;
        return Err(err);
    }
    Ok(target)
}
