//! Locating and starting a Chromium process

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use chromiumoxide::fetcher::{BrowserFetcher, BrowserFetcherOptions};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tokio::task::{self, JoinHandle};
use tracing::{error, info, trace, warn};

use crate::config::SessionConfig;
use crate::utils::ENV_CHROMIUM_PATH;

/// Find a Chrome/Chromium executable.
///
/// Order: explicit override, `CHROMIUM_PATH`, well-known install locations,
/// then `which` on Unix.
pub async fn find_browser_executable(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            info!("Using configured browser executable: {}", path.display());
            return Ok(path.to_path_buf());
        }
        warn!(
            "Configured browser executable does not exist: {}",
            path.display()
        );
    }

    if let Ok(path) = std::env::var(ENV_CHROMIUM_PATH) {
        let path = PathBuf::from(path);
        if path.exists() {
            info!(
                "Using browser from {ENV_CHROMIUM_PATH}: {}",
                path.display()
            );
            return Ok(path);
        }
        warn!(
            "{ENV_CHROMIUM_PATH} points to non-existent file: {}",
            path.display()
        );
    }

    for path in install_locations() {
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in ["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let found = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !found.is_empty() {
                    info!("Found browser using 'which {cmd}': {found}");
                    return Ok(PathBuf::from(found));
                }
            }
        }
    }

    warn!("No Chrome/Chromium executable found, falling back to the fetcher");
    Err(anyhow::anyhow!("Chrome/Chromium executable not found"))
}

/// Well-known install paths for the current platform, already expanded
fn install_locations() -> Vec<PathBuf> {
    let raw: &[&str] = if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"%LOCALAPPDATA%\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "~/Applications/Chromium.app/Contents/MacOS/Chromium",
            "/opt/homebrew/bin/chromium",
        ]
    } else {
        &[
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/snap/bin/chromium",
            "/usr/local/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    raw.iter()
        .filter_map(|entry| {
            if let Some(rest) = entry.strip_prefix("~/") {
                dirs::home_dir().map(|home| home.join(rest))
            } else if entry.contains('%') {
                Some(PathBuf::from(expand_env_tokens(entry, |k| std::env::var(k).ok())))
            } else {
                Some(PathBuf::from(entry))
            }
        })
        .collect()
}

/// Expand `%VAR%` tokens. Unknown variables and unterminated tokens are kept
/// verbatim; `%%` collapses to a single `%`.
fn expand_env_tokens(path: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(path.len());
    let mut rest = path;

    while let Some(start) = rest.find('%') {
        result.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        match after.find('%') {
            Some(0) => {
                result.push('%');
                rest = &after[1..];
            }
            Some(end) => {
                let name = &after[..end];
                match lookup(name) {
                    Some(value) => result.push_str(&value),
                    None => {
                        result.push('%');
                        result.push_str(name);
                        result.push('%');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push('%');
                result.push_str(after);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

/// Download a managed Chromium into the user cache directory
pub async fn download_managed_browser() -> Result<PathBuf> {
    info!("Downloading managed Chromium browser...");

    let cache_dir = dirs::cache_dir()
        .unwrap_or_else(|| {
            let fallback = std::env::temp_dir();
            warn!(
                "Could not determine user cache directory, using {}",
                fallback.display()
            );
            fallback
        })
        .join("webextract")
        .join("chromium");

    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;

    let fetcher = BrowserFetcher::new(
        BrowserFetcherOptions::builder()
            .with_path(&cache_dir)
            .build()
            .context("Failed to build fetcher options")?,
    );

    let revision_info = fetcher.fetch().await.context("Failed to fetch browser")?;
    info!(
        "Downloaded Chromium to: {}",
        revision_info.folder_path.display()
    );

    Ok(revision_info.executable_path)
}

/// A started browser together with what must be torn down after it
pub struct LaunchedBrowser {
    pub browser: Browser,
    /// Drives the CDP connection; must be aborted once the browser is closed
    pub handler: JoinHandle<()>,
    /// Private profile directory, removed when dropped
    pub profile_dir: TempDir,
}

/// Find or download Chromium and start it as `config` describes.
///
/// Every launch gets its own temporary profile directory so concurrent
/// sessions never contend for a profile lock.
pub async fn launch_browser(config: &SessionConfig) -> Result<LaunchedBrowser> {
    let chrome_path = match find_browser_executable(config.chrome_executable.as_deref()).await {
        Ok(path) => path,
        Err(_) => download_managed_browser().await?,
    };

    let profile_dir = tempfile::Builder::new()
        .prefix("webextract_chrome_")
        .tempdir()
        .context("Failed to create browser profile directory")?;

    let (width, height) = config.window_size;
    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(config.timeout())
        .window_size(width, height)
        .user_data_dir(profile_dir.path())
        .chrome_executable(chrome_path);

    builder = if config.headless {
        builder.headless_mode(HeadlessMode::default())
    } else {
        builder.with_head()
    };

    builder = builder
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-extensions")
        .arg("--disable-popup-blocking")
        .arg("--disable-background-networking")
        .arg("--disable-breakpad")
        .arg("--password-store=basic")
        .arg("--use-mock-keychain")
        .arg("--mute-audio");

    if let Some(user_agent) = &config.user_agent {
        builder = builder.arg(format!("--user-agent={user_agent}"));
    }
    for arg in &config.args {
        builder = builder.arg(arg.as_str());
    }

    let browser_config = builder
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!(
        headless = config.headless,
        "Launching browser with profile {}",
        profile_dir.path().display()
    );
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                let message = e.to_string();
                // Chrome emits CDP events chromiumoxide has no type for; those are noise
                let benign = message.contains("data did not match any variant of untagged enum Message")
                    || message.contains("Failed to deserialize WS response");
                if benign {
                    trace!("Suppressed benign CDP serialization error: {message}");
                } else {
                    error!("Browser handler error: {e:?}");
                }
            }
        }
        trace!("Browser handler task completed");
    });

    Ok(LaunchedBrowser {
        browser,
        handler,
        profile_dir,
    })
}
