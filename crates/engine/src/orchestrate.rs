use crate::diff::diff_fingerprints;
use crate::error::AnalyzeError;
use crate::host::PullRequestHost;
use crate::narrate::{fallback_line, file_level_line, narrate};
use std::collections::HashSet;
use std::sync::Arc;
use storyline_extractor::extractor_for_path;
use storyline_protocol::{
    AnalysisReport, ChangedFile, FileStatus, FingerprintMap, PullRequestRef,
};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Upper bound on files analyzed concurrently within one request; keeps the
/// fetch fan-out inside the hosting service's rate limits.
pub const FILE_CONCURRENCY: usize = 4;

struct FileOutcome {
    entry: String,
    prompts: Vec<String>,
}

/// Analyze a whole pull request into a storyline, documentation prompts,
/// and the accumulated raw diff.
///
/// The metadata and file-list fetches are fatal on failure; everything
/// after that is per-file and degrades to a fallback story line, so one
/// broken file never aborts the rest. Files are processed on a bounded
/// worker pool and reassembled in their original order, so output is
/// deterministic regardless of completion order. Dropping the returned
/// future aborts in-flight per-file work; partial results are never
/// surfaced.
pub async fn analyze_pull_request(
    host: Arc<dyn PullRequestHost>,
    pr: &PullRequestRef,
) -> Result<AnalysisReport, AnalyzeError> {
    let base_revision = host.pull_request_base(pr).await?;
    log::debug!("{pr}: base revision {base_revision}");
    let files = host.changed_files(pr).await?;
    log::info!("{pr}: analyzing {} changed files", files.len());

    // The raw diff needs no fetching; accumulate it up front in file order.
    let mut raw_diff = String::new();
    for file in &files {
        raw_diff.push_str(&format!(
            "--- Changes for {} ---\n{}\n\n",
            file.filename, file.patch
        ));
    }

    let labels: Vec<(String, FileStatus)> = files
        .iter()
        .map(|f| (f.filename.clone(), f.status))
        .collect();

    let semaphore = Arc::new(Semaphore::new(FILE_CONCURRENCY));
    let mut tasks = JoinSet::new();
    for (index, file) in files.into_iter().enumerate() {
        let host = Arc::clone(&host);
        let pr = pr.clone();
        let base_revision = base_revision.clone();
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            // The semaphore is never closed; acquire failures are not expected.
            let _permit = semaphore
                .acquire_owned()
                .await
                .unwrap_or_else(|_| unreachable!("file concurrency semaphore closed"));
            (
                index,
                analyze_file(host.as_ref(), &pr, &base_revision, &file).await,
            )
        });
    }

    let mut outcomes: Vec<Option<FileOutcome>> = Vec::new();
    outcomes.resize_with(labels.len(), || None);
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => outcomes[index] = Some(outcome),
            Err(err) => log::warn!("file analysis task failed: {err}"),
        }
    }

    let mut entries = Vec::with_capacity(labels.len());
    let mut prompts = Vec::new();
    let mut seen = HashSet::new();
    for (index, outcome) in outcomes.into_iter().enumerate() {
        let (filename, status) = &labels[index];
        // A lost task still yields its file's fallback line; every file
        // contributes exactly one storyline entry.
        let outcome = outcome.unwrap_or_else(|| degraded(filename, *status));
        entries.push(outcome.entry);
        for prompt in outcome.prompts {
            if seen.insert(prompt.clone()) {
                prompts.push(prompt);
            }
        }
    }

    let storyline = if entries.is_empty() {
        "No files were analyzed.".to_string()
    } else {
        entries.join("\n\n")
    };

    Ok(AnalysisReport {
        storyline,
        prompts,
        raw_diff,
    })
}

/// Analyze one changed file. Infallible: every degradation path collapses
/// into the file's fallback story line.
async fn analyze_file(
    host: &dyn PullRequestHost,
    pr: &PullRequestRef,
    base_revision: &str,
    file: &ChangedFile,
) -> FileOutcome {
    if file.status.skips_analysis() {
        return FileOutcome {
            entry: file_level_line(&file.filename, file.status),
            prompts: Vec::new(),
        };
    }

    let Some(mut extractor) = extractor_for_path(&file.filename) else {
        return degraded(&file.filename, file.status);
    };

    let after_content = host.raw_content(&file.raw_url).await;
    if after_content.is_empty() {
        log::debug!("{}: head content unavailable", file.filename);
        return degraded(&file.filename, file.status);
    }

    let after = match extractor.extract(&after_content) {
        Ok(map) => map,
        Err(err) => {
            log::warn!("{}: extraction failed: {err}", file.filename);
            return degraded(&file.filename, file.status);
        }
    };

    // Only modified files have a prior state worth fetching; an unreadable
    // or unparseable base side degrades to "everything looks added".
    let mut before = FingerprintMap::new();
    if file.status == FileStatus::Modified {
        let before_content = host.content_at(pr, &file.filename, base_revision).await;
        if before_content.is_empty() {
            log::debug!("{}: base content unavailable", file.filename);
        } else {
            match extractor.extract(&before_content) {
                Ok(map) => before = map,
                Err(err) => {
                    log::warn!("{}: base extraction failed: {err}", file.filename);
                }
            }
        }
    }

    let diff = diff_fingerprints(&before, &after);
    let narrative = narrate(&file.filename, file.status, &diff);
    if narrative.story_lines.is_empty() {
        return degraded(&file.filename, file.status);
    }

    FileOutcome {
        entry: format!(
            "In `{}`:\n- {}",
            file.filename,
            narrative.story_lines.join("\n- ")
        ),
        prompts: narrative.prompts,
    }
}

fn degraded(filename: &str, status: FileStatus) -> FileOutcome {
    FileOutcome {
        entry: fallback_line(filename, status),
        prompts: Vec::new(),
    }
}
