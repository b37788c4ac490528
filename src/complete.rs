//! Tab completion over builtin names and PATH executables.

use std::fs;

use crate::external::is_executable;
use crate::registry::Registry;

/// Candidate set for one completion request.
pub struct Proposal {
    /// Candidate words, each carrying a trailing space.
    pub candidates: Vec<String>,
    /// Set when the candidates diverge right at the typed prefix, so the
    /// line editor should ring the terminal bell instead of extending.
    pub alert: bool,
}

/// One answer from the index-based interface.
pub struct Completion {
    /// The candidate at the requested index, or `None` once exhausted.
    pub text: Option<String>,
    pub bell: bool,
}

/// Completion over builtin names plus executables found on PATH.
pub struct CompletionEngine {
    builtins: Vec<String>,
    matches: Vec<String>,
}

impl CompletionEngine {
    pub fn new(builtins: Vec<String>) -> Self {
        Self {
            builtins,
            matches: Vec::new(),
        }
    }

    pub fn from_registry(registry: &Registry) -> Self {
        Self::new(registry.names().map(String::from).collect())
    }

    /// Builds the candidate set for `prefix`: builtin names first, then the
    /// executables of each `search_paths` directory in PATH order (entries
    /// sorted within a directory, unreadable directories skipped), every
    /// candidate suffixed with a space.
    ///
    /// With several candidates, the set collapses to their longest common
    /// prefix when that extends past the typed text; otherwise everything
    /// is kept and `alert` is set.
    pub fn propose(&self, prefix: &str, search_paths: &str) -> Proposal {
        let mut candidates: Vec<String> = self
            .builtins
            .iter()
            .filter(|name| name.starts_with(prefix))
            .map(|name| format!("{name} "))
            .collect();

        for dir in std::env::split_paths(search_paths) {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            let mut names = Vec::new();
            for entry in entries.flatten() {
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                if name.starts_with(prefix) && is_executable(&entry.path()) {
                    names.push(name);
                }
            }
            names.sort();
            candidates.extend(names.into_iter().map(|name| format!("{name} ")));
        }

        if candidates.len() > 1 {
            let trimmed: Vec<String> = candidates
                .iter()
                .map(|candidate| candidate.trim_end().to_string())
                .collect();
            let lcp = common_prefix(&trimmed);
            if !lcp.is_empty() && lcp != prefix {
                return Proposal {
                    candidates: vec![format!("{lcp} ")],
                    alert: false,
                };
            }
            return Proposal {
                candidates,
                alert: true,
            };
        }
        Proposal {
            candidates,
            alert: false,
        }
    }

    /// Index-based interface: request 0 builds and stores the candidate
    /// set (possibly ringing the bell), later requests walk the stored set
    /// until it runs out.
    pub fn complete(&mut self, prefix: &str, search_paths: &str, state: usize) -> Completion {
        let mut bell = false;
        if state == 0 {
            let proposal = self.propose(prefix, search_paths);
            bell = proposal.alert;
            self.matches = proposal.candidates;
        }
        Completion {
            text: self.matches.get(state).cloned(),
            bell,
        }
    }
}

fn common_prefix(words: &[String]) -> String {
    let mut iter = words.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };
    let mut prefix = first.as_str();
    for word in iter {
        while !word.starts_with(prefix) {
            let mut chars = prefix.chars();
            chars.next_back();
            prefix = chars.as_str();
        }
    }
    prefix.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(builtins: &[&str]) -> CompletionEngine {
        CompletionEngine::new(builtins.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn diverging_candidates_ring_the_bell() {
        let engine = engine(&["cd", "cp"]);
        let proposal = engine.propose("c", "");
        assert!(proposal.alert);
        assert_eq!(
            proposal.candidates,
            vec!["cd ".to_string(), "cp ".to_string()]
        );
    }

    #[test]
    fn single_match_keeps_trailing_space() {
        let engine = engine(&["cd", "cp"]);
        let proposal = engine.propose("cd", "");
        assert!(!proposal.alert);
        assert_eq!(proposal.candidates, vec!["cd ".to_string()]);
    }

    #[test]
    fn ambiguous_set_collapses_to_common_prefix() {
        let engine = engine(&["alpha-one", "alpha-two"]);
        let proposal = engine.propose("al", "");
        assert!(!proposal.alert);
        assert_eq!(proposal.candidates, vec!["alpha- ".to_string()]);
    }

    #[test]
    fn no_shared_prefix_keeps_everything_and_alerts() {
        let engine = engine(&["cat", "ls"]);
        let proposal = engine.propose("", "");
        assert!(proposal.alert);
        assert_eq!(proposal.candidates.len(), 2);
    }

    #[test]
    fn indexed_requests_walk_the_stored_set() {
        let mut engine = engine(&["cd", "cp"]);

        let first = engine.complete("c", "", 0);
        assert_eq!(first.text.as_deref(), Some("cd "));
        assert!(first.bell);

        let second = engine.complete("c", "", 1);
        assert_eq!(second.text.as_deref(), Some("cp "));
        assert!(!second.bell);

        let exhausted = engine.complete("c", "", 2);
        assert!(exhausted.text.is_none());
    }

    #[test]
    fn no_candidates_yields_nothing() {
        let mut engine = engine(&["cd"]);
        let answer = engine.complete("zz", "", 0);
        assert!(answer.text.is_none());
        assert!(!answer.bell);
    }

    #[test]
    #[cfg(unix)]
    fn path_scan_requires_executable_bit() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().unwrap();
        let runner = temp.path().join("runner");
        std::fs::write(&runner, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&runner, std::fs::Permissions::from_mode(0o755)).unwrap();
        std::fs::write(temp.path().join("runplain"), "data").unwrap();

        let engine = engine(&[]);
        let search = temp.path().to_string_lossy().into_owned();
        let proposal = engine.propose("run", &search);
        assert_eq!(proposal.candidates, vec!["runner ".to_string()]);
    }

    #[test]
    #[cfg(unix)]
    fn missing_path_directories_are_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let search = format!("/definitely/not/here:{}", temp.path().display());
        let engine = engine(&["pwd"]);
        let proposal = engine.propose("pw", &search);
        assert_eq!(proposal.candidates, vec!["pwd ".to_string()]);
    }

    #[test]
    fn common_prefix_of_mixed_words() {
        let words = vec![
            "interlock".to_string(),
            "internal".to_string(),
            "interact".to_string(),
        ];
        assert_eq!(common_prefix(&words), "inter");
        assert_eq!(common_prefix(&[]), "");
    }
}
