/// Offline jobs: the static `dist` build and the normalize-only pass
use crate::{config::Config, negotiate::FileKind, normalize::normalize, out};
use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};

const MAX_CONCURRENT_FILES: usize = 16;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub normalized: usize,
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Normalized,
    Copied,
    Skipped,
    Failed,
}

impl BuildReport {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Normalized => self.normalized += 1,
            Outcome::Copied => self.copied += 1,
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    fn summary(&self) -> String {
        format!(
            "{} normalized, {} copied, {} skipped, {} failed",
            self.normalized, self.copied, self.skipped, self.failed
        )
    }
}

/// Write every script to `dist` and `dist/scripts`, normalizing text files,
/// then copy the landing page to `dist`. Every run rewrites all outputs.
pub async fn build(config: &Config, dist_dir: &Path) -> Result<BuildReport> {
    let dist_scripts = dist_dir.join("scripts");
    tokio::fs::create_dir_all(&dist_scripts)
        .await
        .with_context(|| format!("Failed to create {}", dist_scripts.display()))?;

    let entries = list_dir(&config.scripts_dir).await?;
    let targets = [dist_dir.to_path_buf(), dist_scripts];

    let mut report = BuildReport::default();
    let mut results = stream::iter(entries)
        .map(|path| {
            let targets = &targets;
            async move { build_file(&path, targets).await }
        })
        .buffer_unordered(MAX_CONCURRENT_FILES);

    while let Some(outcome) = results.next().await {
        report.record(outcome);
    }

    let landing = config.landing_page();
    tokio::fs::copy(&landing, dist_dir.join(crate::config::LANDING_PAGE))
        .await
        .with_context(|| format!("Failed to copy landing page {}", landing.display()))?;

    log_summary("build", &report);
    out::ok(
        "build",
        &format!("Deploy {} to any static host", dist_dir.display()),
    );
    Ok(report)
}

/// Normalize every `.sh` file into `out_dir`; other files are ignored.
pub async fn normalize_only(scripts_dir: &Path, out_dir: &Path) -> Result<BuildReport> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let entries = list_dir(scripts_dir).await?;
    let shell_scripts: Vec<PathBuf> = entries
        .into_iter()
        .filter(|path| file_name(path).is_some_and(|name| name.ends_with(".sh")))
        .collect();

    let mut report = BuildReport::default();
    let mut results = stream::iter(shell_scripts)
        .map(|path| async move {
            let Some(name) = file_name(&path) else {
                return Outcome::Skipped;
            };
            match normalize_file(&path, &[out_dir.join(name)]).await {
                Ok(()) => {
                    out::ok("normalize", &format!("Normalized {}", name));
                    Outcome::Normalized
                }
                Err(e) => {
                    out::error("normalize", &format!("{}: {:#}", name, e));
                    Outcome::Failed
                }
            }
        })
        .buffer_unordered(MAX_CONCURRENT_FILES);

    while let Some(outcome) = results.next().await {
        report.record(outcome);
    }

    log_summary("normalize", &report);
    Ok(report)
}

async fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read scripts directory {}", dir.display()))?;

    let mut paths = Vec::new();
    while let Some(entry) = reader
        .next_entry()
        .await
        .with_context(|| format!("Failed to list {}", dir.display()))?
    {
        paths.push(entry.path());
    }
    paths.sort();
    Ok(paths)
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|name| name.to_str())
}

async fn build_file(path: &Path, targets: &[PathBuf]) -> Outcome {
    let Some(name) = file_name(path) else {
        out::warning("build", &format!("Skipping non UTF-8 name {}", path.display()));
        return Outcome::Skipped;
    };

    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => {
            out::warning("build", &format!("Skipping directory {}", name));
            return Outcome::Skipped;
        }
        Ok(_) => {}
        Err(e) => {
            out::error("build", &format!("{}: {}", name, e));
            return Outcome::Failed;
        }
    }

    let destinations: Vec<PathBuf> = targets.iter().map(|dir| dir.join(name)).collect();

    if FileKind::classify(name).is_text() {
        match normalize_file(path, &destinations).await {
            Ok(()) => {
                out::ok("build", &format!("Normalized: {}", name));
                Outcome::Normalized
            }
            Err(e) => {
                out::error("build", &format!("{}: {:#}", name, e));
                Outcome::Failed
            }
        }
    } else {
        match copy_file(path, &destinations).await {
            Ok(()) => {
                out::info("build", &format!("Copied: {}", name));
                Outcome::Copied
            }
            Err(e) => {
                out::error("build", &format!("{}: {:#}", name, e));
                Outcome::Failed
            }
        }
    }
}

async fn normalize_file(source: &Path, destinations: &[PathBuf]) -> Result<()> {
    let content = tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let normalized = normalize(&content);
    for destination in destinations {
        tokio::fs::write(destination, normalized.as_bytes())
            .await
            .with_context(|| format!("Failed to write {}", destination.display()))?;
    }
    Ok(())
}

async fn copy_file(source: &Path, destinations: &[PathBuf]) -> Result<()> {
    for destination in destinations {
        tokio::fs::copy(source, destination)
            .await
            .with_context(|| format!("Failed to copy to {}", destination.display()))?;
    }
    Ok(())
}

fn log_summary(component: &str, report: &BuildReport) {
    if report.failed > 0 {
        out::warning(component, &format!("Finished with errors: {}", report.summary()));
    } else {
        out::ok(component, &format!("Finished: {}", report.summary()));
    }
}
