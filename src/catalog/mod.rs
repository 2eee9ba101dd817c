//! Task catalogue: scanning the source tree, listing a task's files, and
//! resolving problem/solution variants

pub mod scanner;
pub mod solution;
pub mod task_files;

pub use scanner::{Chapter, SourceFileEntry, TaskCatalogScanner, TaskDescriptor};
pub use solution::{find_solution, solution_candidates};
pub use task_files::{TaskFileInfo, TaskFileKind, list_task_files};

/// Problem/solution suffix tokens, ASCII and localized, in probe order
pub const VARIANT_FAMILIES: &[(&str, &str)] = &[("problem", "solution"), ("проблема", "решение")];

/// Does this file name carry any problem/solution variant token?
pub fn is_variant_file(file_name: &str) -> bool {
    VARIANT_FAMILIES.iter().any(|(problem, solution)| {
        file_name.contains(&format!(".{problem}.")) || file_name.contains(&format!(".{solution}."))
    })
}

/// Is this a problem-variant file name?
pub fn is_problem_file(file_name: &str) -> bool {
    VARIANT_FAMILIES
        .iter()
        .any(|(problem, _)| file_name.contains(&format!(".{problem}.")))
}

/// Is this a solution-variant file name?
pub fn is_solution_file(file_name: &str) -> bool {
    VARIANT_FAMILIES
        .iter()
        .any(|(_, solution)| file_name.contains(&format!(".{solution}.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_detection() {
        assert!(is_variant_file("01-task.problem.jsx"));
        assert!(is_variant_file("01-task.solution.jsx"));
        assert!(is_variant_file("01-task.проблема.html"));
        assert!(is_variant_file("01-task.решение.html"));
        assert!(!is_variant_file("README.md"));
        assert!(!is_variant_file("problem.jsx"));
    }

    #[test]
    fn test_problem_vs_solution() {
        assert!(is_problem_file("a.problem.js"));
        assert!(is_problem_file("a.проблема.js"));
        assert!(!is_problem_file("a.solution.js"));
        assert!(is_solution_file("a.решение.js"));
        assert!(!is_solution_file("a.проблема.js"));
    }
}
