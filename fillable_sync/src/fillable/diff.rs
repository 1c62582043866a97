//! Line diff between the current and proposed declarations

use colored::Colorize;
use std::collections::HashSet;

/// Set-based line diff
///
/// Lines of `old` missing from `new` come first as `- line`, then lines of
/// `new` missing from `old` as `+ line`, each in source order. Identical
/// inputs produce an empty string.
pub fn diff(old: &str, new: &str) -> String {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let old_set: HashSet<&str> = old_lines.iter().copied().collect();
    let new_set: HashSet<&str> = new_lines.iter().copied().collect();

    let mut out = String::new();
    for line in old_lines.iter().filter(|l| !new_set.contains(*l)) {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    for line in new_lines.iter().filter(|l| !old_set.contains(*l)) {
        out.push_str("+ ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Terminal rendering of a diff: removals red, additions green, and a blue
/// "No changes" for an empty diff
pub fn colorize(diff: &str) -> String {
    if diff.is_empty() {
        return format!("{}\n", "No changes".blue());
    }

    diff.lines()
        .map(|line| {
            if line.starts_with("- ") {
                format!("{}\n", line.red())
            } else if line.starts_with("+ ") {
                format!("{}\n", line.green())
            } else {
                format!("{}\n", line)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_identical_inputs() {
        let text = "protected $fillable = [\n        'a',\n    ];";
        assert_eq!(diff(text, text), "");
    }

    #[test]
    fn test_removals_before_additions() {
        let old = "protected $fillable = [\n        'a',\n        'b',\n    ];";
        let new = "protected $fillable = [\n        'b',\n        'c',\n    ];";
        assert_eq!(diff(old, new), "-         'a',\n+         'c',\n");
    }

    #[test]
    fn test_every_line_of_new_declaration_added() {
        let new = "protected $fillable = [\n        'a',\n    ];";
        assert_eq!(
            diff("", new),
            "+ protected $fillable = [\n+         'a',\n+     ];\n"
        );
    }

    #[test]
    fn test_applying_diff_yields_new_line_set() {
        let old = "protected $fillable = [\n        'a',\n        'b',\n        'c',\n    ];";
        let new = "protected $fillable = [\n        'c',\n        'd',\n    ];";

        let mut lines: HashSet<String> = old.lines().map(|l| l.to_string()).collect();
        for line in diff(old, new).lines() {
            if let Some(removed) = line.strip_prefix("- ") {
                assert!(lines.remove(removed));
            } else if let Some(added) = line.strip_prefix("+ ") {
                lines.insert(added.to_string());
            } else {
                panic!("unexpected diff line {:?}", line);
            }
        }

        let expected: HashSet<String> = new.lines().map(|l| l.to_string()).collect();
        assert_eq!(lines, expected);
    }
}
