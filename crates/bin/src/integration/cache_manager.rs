//! Location of the on-disk response cache.

use screener_data::cache::SqliteCache;
use screener_data::error::DataError;
use std::path::PathBuf;

/// Get the default cache directory path.
///
/// Uses platform-specific cache directories:
/// - Linux: `~/.cache/screener/`
/// - macOS: `~/Library/Caches/screener/`
/// - Windows: `%LOCALAPPDATA%\screener\`
pub(crate) fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("screener")
}

/// Get the default cache database path.
pub(crate) fn default_cache_path() -> PathBuf {
    default_cache_dir().join("responses.db")
}

/// Open the cache, creating the directory if needed.
pub(crate) fn open_cache() -> Result<SqliteCache, DataError> {
    let cache_path = default_cache_path();

    if let Some(parent) = cache_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    SqliteCache::new(&cache_path)
}

/// Print a summary of the cache contents.
pub(crate) fn print_cache_info(cache: &SqliteCache) -> Result<(), DataError> {
    let stats = cache.get_stats()?;

    println!("Cache: {}", default_cache_path().display());
    println!("  Entries: {}", stats.entries);
    println!("  Size:    {:.1} KiB", stats.total_bytes as f64 / 1024.0);
    match stats.oldest {
        Some(oldest) => println!("  Oldest:  {}", oldest.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("  Oldest:  -"),
    }
    Ok(())
}
