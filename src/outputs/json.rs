//! JSON dump of the collected briefing data.
//!
//! Written alongside the text briefing when `--json-output` is given, so other
//! tools can reuse the raw material (news items with links and previews,
//! weather values, novelty text) without scraping the text output.

use crate::models::BriefingData;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `data` as pretty JSON and write it to `path`.
///
/// Parent directories are created as needed and an existing file is replaced.
///
/// # Arguments
///
/// * `data` - Everything collected for this run
/// * `path` - Destination file, typically from `--json-output`
///
/// # Returns
///
/// `Ok(())` once the file is written, or an error if directory creation,
/// serialization or the write fails. The caller decides whether that is fatal;
/// `main` only logs it.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_briefing_json(data: &BriefingData, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(data)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(items = data.news.len(), "Wrote briefing JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewsItem;

    #[tokio::test]
    async fn test_write_briefing_json() {
        let dir = std::env::temp_dir().join(format!("daily_briefing_json_{}", std::process::id()));
        let path = dir.join("nested").join("briefing.json");
        let data = BriefingData {
            location_name: "Liverpool".to_string(),
            news: vec![NewsItem {
                title: "Ferry returns".to_string(),
                description: "Service resumes".to_string(),
                link: Some("https://example.com/ferry".to_string()),
                source: "BBC England".to_string(),
                preview: String::new(),
            }],
            ..BriefingData::default()
        };

        write_briefing_json(&data, &path).await.unwrap();

        let written = tokio::fs::read_to_string(&path).await.unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(value["location_name"], "Liverpool");
        assert_eq!(value["news"][0]["link"], "https://example.com/ferry");
        assert!(value["weather"].is_null());

        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
