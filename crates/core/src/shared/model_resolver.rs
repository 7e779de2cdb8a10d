use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("{0} not found (pass --download-cascade to fetch it)")]
    NotFound(PathBuf),
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Where [`resolve`] looks, in order.
pub struct Resolution<'a> {
    pub explicit: &'a Path,
    pub cache_dir: Option<PathBuf>,
    /// `None` disables downloading.
    pub url: Option<&'a str>,
}

/// Resolve a detector definition file.
///
/// Resolution order:
/// 1. The explicit path
/// 2. The cache directory, under the explicit path's file name
/// 3. Download from the URL into the cache directory
pub fn resolve(
    resolution: &Resolution<'_>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if resolution.explicit.exists() {
        return Ok(resolution.explicit.to_path_buf());
    }

    let file_name = resolution
        .explicit
        .file_name()
        .map(PathBuf::from)
        .ok_or_else(|| ModelResolveError::NotFound(resolution.explicit.to_path_buf()))?;

    if let Some(dir) = &resolution.cache_dir {
        let cached_path = dir.join(&file_name);
        if cached_path.exists() {
            log::debug!("Using cached {}", cached_path.display());
            return Ok(cached_path);
        }
    }

    let Some(url) = resolution.url else {
        return Err(ModelResolveError::NotFound(
            resolution.explicit.to_path_buf(),
        ));
    };
    let dir = match &resolution.cache_dir {
        Some(dir) => dir.clone(),
        None => model_cache_dir()?,
    };
    fs::create_dir_all(&dir).map_err(ModelResolveError::CacheDir)?;
    let dest = dir.join(&file_name);
    log::info!("Downloading {url} to {}", dest.display());
    download(url, &dest, progress)?;
    Ok(dest)
}

/// Platform-specific cache directory for detector definitions.
///
/// - macOS: `~/Library/Application Support/facecam/models/`
/// - Linux: `$XDG_CACHE_HOME/facecam/models/` or `~/.cache/facecam/models/`
/// - Windows: `%LOCALAPPDATA%/facecam/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("facecam").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("facecam").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let bytes = response.bytes().map_err(|e| ModelResolveError::Download {
        url: url.to_string(),
        source: e,
    })?;

    // Write to a temp file first, then rename
    let temp_path = dest.with_extension("part");
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source| ModelResolveError::Write { path, source }
    };
    let mut file = fs::File::create(&temp_path).map_err(write_err(&temp_path))?;

    let mut downloaded: u64 = 0;
    for chunk in bytes.chunks(256 * 1024) {
        file.write_all(chunk).map_err(write_err(&temp_path))?;
        downloaded += chunk.len() as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err(&temp_path))?;
    drop(file);

    fs::rename(&temp_path, dest).map_err(write_err(dest))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_explicit_path_wins() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("cascade.xml");
        fs::write(&explicit, b"<opencv_storage/>").unwrap();

        let cache = tmp.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("cascade.xml"), b"cached").unwrap();

        let resolved = resolve(
            &Resolution {
                explicit: &explicit,
                cache_dir: Some(cache),
                url: None,
            },
            None,
        )
        .unwrap();
        assert_eq!(resolved, explicit);
    }

    #[test]
    fn test_falls_back_to_cache_dir() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("cascade.xml"), b"cached").unwrap();

        let explicit = tmp.path().join("missing").join("cascade.xml");
        let resolved = resolve(
            &Resolution {
                explicit: &explicit,
                cache_dir: Some(cache.clone()),
                url: None,
            },
            None,
        )
        .unwrap();
        assert_eq!(resolved, cache.join("cascade.xml"));
    }

    #[test]
    fn test_missing_without_url_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let explicit = tmp.path().join("cascade.xml");
        let result = resolve(
            &Resolution {
                explicit: &explicit,
                cache_dir: Some(tmp.path().join("cache")),
                url: None,
            },
            None,
        );
        assert!(matches!(result, Err(ModelResolveError::NotFound(p)) if p == explicit));
    }

    #[test]
    fn test_model_cache_dir_returns_path() {
        let path = model_cache_dir().unwrap();
        assert!(path.to_string_lossy().contains("facecam"));
        assert!(path.to_string_lossy().contains("models"));
    }

    #[test]
    fn test_download_failure_leaves_no_files() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("cascade.xml");
        let result = download("http://invalid.nonexistent.example.com/cascade", &dest, None);
        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }
}
