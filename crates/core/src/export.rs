use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use serde::Serialize;
use tracing::info;

use crate::{
    error::{Result, ScopeError},
    types::ExtractedContent,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportKind {
    /// The whole session.
    All,
    /// Every extracted article.
    Portal,
    /// The most recent article.
    Single,
    /// The most recent transcript.
    Youtube,
}

impl ExportKind {
    pub const ALL: [ExportKind; 4] = [
        ExportKind::All,
        ExportKind::Portal,
        ExportKind::Single,
        ExportKind::Youtube,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportKind::All => "all",
            ExportKind::Portal => "portal",
            ExportKind::Single => "single",
            ExportKind::Youtube => "youtube",
        }
    }

    pub fn filename(&self) -> &'static str {
        match self {
            ExportKind::All => "all_extracted_content.json",
            ExportKind::Portal => "portal_articles.json",
            ExportKind::Single => "single_article.json",
            ExportKind::Youtube => "youtube_transcript.json",
        }
    }

    /// Pretty-printed JSON for this kind of export.
    pub fn render(&self, content: &ExtractedContent) -> Result<String> {
        match self {
            ExportKind::All => pretty(content),
            ExportKind::Portal => pretty(content.articles()),
            ExportKind::Single => {
                let latest = content
                    .articles()
                    .last()
                    .ok_or_else(|| ScopeError::validation("No article to export"))?;
                pretty(&[latest])
            }
            ExportKind::Youtube => {
                let latest = content
                    .transcripts()
                    .last()
                    .ok_or_else(|| ScopeError::validation("No transcript to export"))?;
                pretty(&[latest])
            }
        }
    }
}

impl fmt::Display for ExportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportKind {
    type Err = ScopeError;

    fn from_str(s: &str) -> Result<Self> {
        ExportKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScopeError::validation(format!("Unknown export kind: {s}")))
    }
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Write the export under `dir` using the kind's fixed filename.
pub async fn export_to_dir(
    kind: ExportKind,
    content: &ExtractedContent,
    dir: &Path,
) -> Result<PathBuf> {
    let json = kind.render(content)?;
    let path = dir.join(kind.filename());

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ScopeError::Export {
            path: dir.to_path_buf(),
            source,
        })?;
    tokio::fs::write(&path, json)
        .await
        .map_err(|source| ScopeError::Export {
            path: path.clone(),
            source,
        })?;

    info!(kind = %kind, path = %path.display(), "exported");
    Ok(path)
}

/// Read back an `all` export.
pub fn parse_extracted(json: &str) -> Result<ExtractedContent> {
    Ok(serde_json::from_str(json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filenames_are_fixed_per_kind() {
        let names: Vec<_> = ExportKind::ALL.iter().map(ExportKind::filename).collect();
        assert_eq!(
            names,
            vec![
                "all_extracted_content.json",
                "portal_articles.json",
                "single_article.json",
                "youtube_transcript.json"
            ]
        );
    }

    #[test]
    fn kind_parses_case_insensitively() {
        assert_eq!("YouTube".parse::<ExportKind>().unwrap(), ExportKind::Youtube);
        assert!("pdf".parse::<ExportKind>().is_err());
    }

    #[test]
    fn empty_session_has_nothing_single_to_export() {
        let empty = ExtractedContent::default();
        assert!(ExportKind::Single.render(&empty).is_err());
        assert!(ExportKind::Youtube.render(&empty).is_err());
        assert_eq!(ExportKind::Portal.render(&empty).unwrap(), "[]");
    }

    #[test]
    fn session_export_uses_camel_case_total() {
        let json = ExportKind::All.render(&ExtractedContent::default()).unwrap();
        assert!(json.contains("\"totalWords\": 0"));
    }
}
