//! Solution-variant lookup for a problem file
//!
//! Candidates are derived deterministically from the problem path by
//! substituting suffix tokens, then probed in order through the same
//! resolution path used for reads (so the first existing candidate is also
//! materialized in the overlay). A miss is a soft condition: the caller
//! stays in problem view.

use crate::catalog::VARIANT_FAMILIES;
use crate::workspace::{PathResolver, TaskFileRef};

/// Ordered solution candidates for a problem ref.
///
/// The matched family's own solution token comes first, the other family's
/// second, to tolerate mixed-language file trees. A ref with no problem
/// token yields no candidates.
pub fn solution_candidates(problem: &TaskFileRef) -> Vec<TaskFileRef> {
    let path = problem.as_str();

    for (idx, (problem_token, _)) in VARIANT_FAMILIES.iter().enumerate() {
        let needle = format!(".{problem_token}.");
        if !path.contains(&needle) {
            continue;
        }

        // Matched family's solution token first, then the other families'
        let mut tokens: Vec<&str> = vec![VARIANT_FAMILIES[idx].1];
        for (i, family) in VARIANT_FAMILIES.iter().enumerate() {
            if i != idx {
                tokens.push(family.1);
            }
        }

        return tokens
            .into_iter()
            .filter_map(|solution_token| {
                let candidate = path.replacen(&needle, &format!(".{solution_token}."), 1);
                TaskFileRef::parse(&candidate).ok()
            })
            .collect();
    }

    Vec::new()
}

/// Probe the candidates in order and return the first that resolves
pub async fn find_solution(
    resolver: &PathResolver,
    problem: &TaskFileRef,
) -> Option<TaskFileRef> {
    for candidate in solution_candidates(problem) {
        if resolver.resolve(&candidate).await.is_ok() {
            return Some(candidate);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::PathResolver;
    use std::fs;
    use tempfile::TempDir;

    fn refs(candidates: &[TaskFileRef]) -> Vec<&str> {
        candidates.iter().map(|c| c.as_str()).collect()
    }

    #[test]
    fn test_ascii_problem_candidates_in_order() {
        let problem = TaskFileRef::parse("a/b.problem.jsx").unwrap();
        let candidates = solution_candidates(&problem);
        assert_eq!(refs(&candidates), ["a/b.solution.jsx", "a/b.решение.jsx"]);
    }

    #[test]
    fn test_localized_problem_candidates_in_order() {
        let problem = TaskFileRef::parse("a/b.проблема.html").unwrap();
        let candidates = solution_candidates(&problem);
        assert_eq!(refs(&candidates), ["a/b.решение.html", "a/b.solution.html"]);
    }

    #[test]
    fn test_non_problem_ref_yields_nothing() {
        let not_problem = TaskFileRef::parse("a/b.solution.jsx").unwrap();
        assert!(solution_candidates(&not_problem).is_empty());
        let plain = TaskFileRef::parse("a/b.jsx").unwrap();
        assert!(solution_candidates(&plain).is_empty());
    }

    #[tokio::test]
    async fn test_finds_localized_solution_for_ascii_problem() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/a")).unwrap();
        fs::write(dir.path().join("src/a/b.problem.jsx"), "problem").unwrap();
        fs::write(dir.path().join("src/a/b.решение.jsx"), "solution").unwrap();

        let resolver =
            PathResolver::with_roots(dir.path().join("src"), dir.path().join("playground"));
        let problem = TaskFileRef::parse("a/b.problem.jsx").unwrap();

        let found = find_solution(&resolver, &problem).await;
        assert_eq!(found.unwrap().as_str(), "a/b.решение.jsx");
    }

    #[tokio::test]
    async fn test_missing_solution_is_soft() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/a")).unwrap();
        fs::write(dir.path().join("src/a/b.problem.jsx"), "problem").unwrap();

        let resolver =
            PathResolver::with_roots(dir.path().join("src"), dir.path().join("playground"));
        let problem = TaskFileRef::parse("a/b.problem.jsx").unwrap();

        assert!(find_solution(&resolver, &problem).await.is_none());
    }
}
