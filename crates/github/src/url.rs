use once_cell::sync::Lazy;
use regex::Regex;
use storyline_engine::AnalyzeError;
use storyline_protocol::PullRequestRef;

static PR_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"github\.com/([^/\s]+)/([^/\s]+)/pull/(\d+)")
        .unwrap_or_else(|e| unreachable!("PR URL pattern is valid: {e}"))
});

/// Parse a GitHub pull-request URL into its owner/repo/number reference.
///
/// Accepts any URL containing the canonical `github.com/{owner}/{repo}/pull/{n}`
/// segment; anything else is an [`AnalyzeError::InvalidReference`].
pub fn parse_pull_request_url(url: &str) -> Result<PullRequestRef, AnalyzeError> {
    let captures = PR_URL_PATTERN
        .captures(url)
        .ok_or_else(|| AnalyzeError::invalid_reference(format!("not a GitHub PR URL: {url}")))?;
    let number = captures[3]
        .parse::<u64>()
        .map_err(|_| AnalyzeError::invalid_reference(format!("PR number out of range: {url}")))?;
    Ok(PullRequestRef::new(&captures[1], &captures[2], number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parses_canonical_url() {
        let pr = parse_pull_request_url("https://github.com/rust-lang/cargo/pull/1234").unwrap();
        assert_eq!(pr, PullRequestRef::new("rust-lang", "cargo", 1234));
    }

    #[test]
    fn test_parses_url_with_trailing_path() {
        let pr = parse_pull_request_url("https://github.com/a/b/pull/7/files#diff").unwrap();
        assert_eq!(pr, PullRequestRef::new("a", "b", 7));
    }

    #[test]
    fn test_rejects_non_pr_urls() {
        assert!(parse_pull_request_url("https://github.com/rust-lang/cargo").is_err());
        assert!(parse_pull_request_url("https://github.com/a/b/issues/3").is_err());
        assert!(parse_pull_request_url("https://gitlab.com/a/b/pull/3").is_err());
        assert!(parse_pull_request_url("not a url at all").is_err());
    }

    #[test]
    fn test_invalid_reference_error_kind() {
        let err = parse_pull_request_url("nope").unwrap_err();
        assert!(matches!(err, AnalyzeError::InvalidReference(_)));
    }
}
