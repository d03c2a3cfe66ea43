use std::path::Path;

use camino::Utf8PathBuf;
use directories::BaseDirs;
use glob::MatchOptions;

use crate::diagnostics::DiagnosticSink;
use crate::domain::TrackKind;
use crate::error::HubError;

/// Expands every pattern in order. Matches from overlapping patterns are kept
/// as separate entries. Wildcards never match a leading dot, so hidden files
/// such as `._S1.bw` are skipped.
pub fn resolve_patterns<S: AsRef<str>>(
    patterns: &[S],
    kind: TrackKind,
    sink: &dyn DiagnosticSink,
) -> Result<Vec<Utf8PathBuf>, HubError> {
    let mut resolved = Vec::new();
    for pattern in patterns {
        let pattern = pattern.as_ref();
        let matches = expand_pattern(pattern, sink)?;
        if matches.is_empty() {
            sink.warn(format!(
                "No {} files found matching pattern: {pattern}",
                kind.file_tag()
            ));
            continue;
        }
        sink.info(format!(
            "Found {} {} files matching pattern: {pattern}",
            matches.len(),
            kind.file_tag()
        ));
        resolved.extend(matches);
    }
    Ok(resolved)
}

fn expand_pattern(pattern: &str, sink: &dyn DiagnosticSink) -> Result<Vec<Utf8PathBuf>, HubError> {
    let expanded = expand_home(pattern);
    let options = MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    };
    let paths = glob::glob_with(&expanded, options).map_err(|err| HubError::InvalidPattern {
        pattern: pattern.to_string(),
        message: err.to_string(),
    })?;

    let mut matches = Vec::new();
    for entry in paths {
        let path = match entry {
            Ok(path) => path,
            Err(err) => {
                sink.warn(format!("Skipping unreadable match for {pattern}: {err}"));
                continue;
            }
        };
        match Utf8PathBuf::from_path_buf(path) {
            Ok(path) => matches.push(path),
            Err(path) => sink.warn(format!("Skipping non-UTF-8 path: {}", path.display())),
        }
    }
    Ok(matches)
}

/// Replaces a leading `~` with the current user's home directory.
pub fn expand_home(pattern: &str) -> String {
    let rest = if pattern == "~" {
        ""
    } else if let Some(rest) = pattern.strip_prefix("~/") {
        rest
    } else {
        return pattern.to_string();
    };

    match BaseDirs::new() {
        Some(dirs) => join_home(dirs.home_dir(), rest),
        None => pattern.to_string(),
    }
}

fn join_home(home: &Path, rest: &str) -> String {
    if rest.is_empty() {
        home.to_string_lossy().into_owned()
    } else {
        home.join(rest).to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::MemorySink;

    #[test]
    fn leaves_plain_patterns_alone() {
        assert_eq!(expand_home("data/*.bw"), "data/*.bw");
        assert_eq!(expand_home("/abs/~x.bw"), "/abs/~x.bw");
    }

    #[test]
    fn expands_home_prefix() {
        let Some(dirs) = BaseDirs::new() else {
            return;
        };
        let expanded = expand_home("~/tracks/*.bw");
        assert!(expanded.starts_with(&*dirs.home_dir().to_string_lossy()));
        assert!(expanded.ends_with("*.bw"));
    }

    #[test]
    fn empty_pattern_warns_and_continues() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("S1.bw"), b"").unwrap();
        let missing = format!("{}/*.nothing", temp.path().display());
        let present = format!("{}/*.bw", temp.path().display());

        let sink = MemorySink::new();
        let paths = resolve_patterns(&[missing, present], TrackKind::Signal, &sink).unwrap();

        assert_eq!(paths.len(), 1);
        assert!(paths[0].as_str().ends_with("S1.bw"));
        assert_eq!(sink.warnings().len(), 1);
        assert!(sink.warnings()[0].contains("No bigwig files found"));
    }

    #[test]
    fn overlapping_patterns_keep_duplicates() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("S1_rep1.bw"), b"").unwrap();
        let a = format!("{}/*.bw", temp.path().display());
        let b = format!("{}/S1_*.bw", temp.path().display());

        let paths = resolve_patterns(&[a, b], TrackKind::Signal, &MemorySink::new()).unwrap();
        assert_eq!(paths.len(), 2);
        assert_eq!(paths[0], paths[1]);
    }

    #[test]
    fn wildcards_skip_hidden_files() {
        let temp = tempfile::tempdir().unwrap();
        std::fs::write(temp.path().join("S1_rep1.bw"), b"").unwrap();
        std::fs::write(temp.path().join("._S1_rep1.bw"), b"").unwrap();
        let pattern = format!("{}/*.bw", temp.path().display());

        let paths = resolve_patterns(&[pattern], TrackKind::Signal, &MemorySink::new()).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].file_name(), Some("S1_rep1.bw"));
    }

    #[test]
    fn malformed_pattern_is_fatal() {
        let result = resolve_patterns(&["data/[.bw"], TrackKind::Signal, &MemorySink::new());
        assert!(matches!(result, Err(HubError::InvalidPattern { .. })));
    }
}
