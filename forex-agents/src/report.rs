use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::models::AnalysisReport;

impl AnalysisReport {
    /// Renders the downloadable Markdown document.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let _ = writeln!(md, "# Forex Analysis: {}", self.pair);
        let _ = writeln!(md);
        let _ = writeln!(
            md,
            "**Report Generated:** {}",
            self.generated_at.format("%B %d, %Y %H:%M:%S UTC")
        );
        let _ = writeln!(
            md,
            "**Exchange Rate:** 1 {} = {} {}",
            self.pair.base, self.rate.rate, self.pair.target
        );
        if let Some(updated) = &self.rate.last_updated {
            let _ = writeln!(md, "**Rate Last Updated:** {}", updated);
        }
        let _ = writeln!(md);
        let _ = writeln!(md, "---");
        let _ = writeln!(md);
        let _ = writeln!(md, "{}", self.narrative.trim());

        if !self.articles.is_empty() {
            let _ = writeln!(md);
            let _ = writeln!(md, "---");
            let _ = writeln!(md);
            let _ = writeln!(md, "## Sources");
            let _ = writeln!(md);
            for article in &self.articles {
                let title = if article.title.is_empty() { "(untitled)" } else { article.title.as_str() };
                let line = if article.url.is_empty() {
                    title.to_string()
                } else {
                    format!("[{}]({})", title, article.url)
                };
                let source = if article.source.is_empty() { "unknown source" } else { article.source.as_str() };
                let _ = writeln!(md, "- {} ({}, {})", line, source, article.published_at);
            }
        }
        md
    }

    /// `forex_analysis_{BASE}_{TARGET}_{YYYYMMDD_HHMM}.md`
    pub fn file_name(&self) -> String {
        format!(
            "forex_analysis_{}_{}.md",
            self.pair.slug(),
            self.generated_at.format("%Y%m%d_%H%M")
        )
    }

    /// Writes the Markdown export into `dir` and returns its path.
    pub async fn save_markdown(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create report directory {}", dir.display()))?;
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.to_markdown())
            .await
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        Ok(path)
    }
}
