use crate::utils::fs::atomic_write;
use anyhow::{Context, Result};
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordlistStatus {
    AlreadyPresent(PathBuf),
    Downloaded { path: PathBuf, bytes: usize },
}

/// Relative wordlist paths are resolved against `base`, the directory the
/// fuzzer is started from.
pub fn resolve(wordlist: &Path, base: &Path) -> PathBuf {
    if wordlist.is_absolute() {
        wordlist.to_path_buf()
    } else {
        base.join(wordlist)
    }
}

/// Downloads `url` to `path` unless a file is already there.
pub async fn ensure_wordlist(path: &Path, url: &str) -> Result<WordlistStatus> {
    if path.is_file() {
        tracing::debug!("Wordlist already present at {}", path.display());
        return Ok(WordlistStatus::AlreadyPresent(path.to_path_buf()));
    }

    tracing::info!("Downloading wordlist from {}", url);
    let client = Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .context("Failed to create HTTP client")?;

    let body = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("Failed to download wordlist from {}", url))?
        .error_for_status()
        .with_context(|| format!("Wordlist download from {} was refused", url))?
        .bytes()
        .await
        .context("Failed to read wordlist body")?;

    if body.is_empty() {
        anyhow::bail!("Wordlist download from {} returned an empty file", url);
    }

    atomic_write(path, &body)?;
    Ok(WordlistStatus::Downloaded {
        path: path.to_path_buf(),
        bytes: body.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    // Port 9 (discard) is never served; any request there fails fast.
    const UNREACHABLE: &str = "http://127.0.0.1:9/common.txt";

    #[test]
    fn test_resolve_relative_and_absolute() {
        let base = Path::new("/work");
        assert_eq!(
            resolve(Path::new("wordlists/dirb/common.txt"), base),
            PathBuf::from("/work/wordlists/dirb/common.txt")
        );
        assert_eq!(resolve(Path::new("/opt/common.txt"), base), PathBuf::from("/opt/common.txt"));
    }

    #[tokio::test]
    async fn test_existing_wordlist_is_not_downloaded() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("common.txt");
        fs::write(&path, "admin\nlogin\n").unwrap();

        let status = ensure_wordlist(&path, UNREACHABLE).await.unwrap();

        assert_eq!(status, WordlistStatus::AlreadyPresent(path.clone()));
        assert_eq!(fs::read_to_string(&path).unwrap(), "admin\nlogin\n");
    }

    #[tokio::test]
    async fn test_failed_download_leaves_nothing_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wordlists/dirb/common.txt");

        assert!(ensure_wordlist(&path, UNREACHABLE).await.is_err());
        assert!(!path.exists());
    }
}
