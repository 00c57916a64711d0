//! Locating a Chrome/Chromium executable.

use std::path::{Path, PathBuf};

use tracing::info;

use super::BrowserError;

/// Common Chrome executable paths to check.
const CHROME_PATHS: &[&str] = &[
    // Linux
    "/usr/bin/google-chrome",
    "/usr/bin/google-chrome-stable",
    "/usr/bin/chromium",
    "/usr/bin/chromium-browser",
    "/snap/bin/chromium",
    // macOS
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    // Common install locations
    "/opt/google/chrome/google-chrome",
];

/// Executable names looked up on `PATH`.
const CHROME_COMMANDS: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
];

/// Find a Chrome executable, checking well-known install paths first and
/// then `PATH`.
pub fn find_chrome() -> Result<PathBuf, BrowserError> {
    find_chrome_in(CHROME_PATHS, CHROME_COMMANDS)
}

fn find_chrome_in(paths: &[&str], commands: &[&str]) -> Result<PathBuf, BrowserError> {
    for path in paths {
        let p = Path::new(path);
        if p.exists() {
            info!("Found Chrome at: {}", path);
            return Ok(p.to_path_buf());
        }
    }

    for cmd in commands {
        if let Ok(path) = which::which(cmd) {
            info!("Found Chrome in PATH: {}", path.display());
            return Ok(path);
        }
    }

    Err(BrowserError::ChromeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_chrome_prefers_known_path() {
        let dir = tempfile::tempdir().unwrap();
        let fake = dir.path().join("chromium");
        std::fs::write(&fake, b"").unwrap();
        let fake_str = fake.to_str().unwrap();

        let found = find_chrome_in(&["/nonexistent/chrome", fake_str], &[]).unwrap();
        assert_eq!(found, fake);
    }

    #[test]
    fn test_find_chrome_not_found() {
        let result = find_chrome_in(
            &["/nonexistent/chrome"],
            &["definitely-not-a-browser-binary-xyz"],
        );
        assert!(matches!(result, Err(BrowserError::ChromeNotFound)));
    }
}
