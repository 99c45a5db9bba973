use anyhow::{Context, Result};

/// Open a URL in the user's default browser
///
/// # Arguments
/// * `url` - The URL to open (e.g., a verification video)
///
/// # Errors
/// Returns error if the URL is empty or the browser cannot be opened
pub fn open_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("No link to open");
    }
    webbrowser::open(url)
        .with_context(|| format!("Failed to open browser for URL: {}", url))?;
    Ok(())
}
