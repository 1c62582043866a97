//! Source patcher
//!
//! Replaces or inserts a rendered declaration in a model source file. Only
//! the span of the existing declaration (or the insertion point) changes;
//! every other byte of the file is kept, except for the open-tag
//! normalization described on [`normalize_open_tag`].

use regex::Regex;
use std::borrow::Cow;
use std::fs;
use std::ops::Range;
use std::path::Path;

use crate::error::{Error, Result};

/// Outcome of patching one file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchResult {
    /// An existing declaration was replaced
    Replaced,
    /// Inserted after an anchor declaration such as `$table`
    InsertedAfterAnchor,
    /// Appended at the end of the file
    Appended,
    /// The file already had the rendered declaration; nothing was written
    Unchanged,
}

/// Declarations the patcher knows how to place
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    Fillable,
    Dates,
}

impl Declaration {
    pub fn property(&self) -> &'static str {
        match self {
            Declaration::Fillable => "fillable",
            Declaration::Dates => "dates",
        }
    }

    /// Declarations to insert after, in order of preference
    fn anchors(&self) -> &'static [&'static str] {
        match self {
            Declaration::Fillable => &["table"],
            Declaration::Dates => &["fillable", "table"],
        }
    }
}

/// Where a rendered declaration goes in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Replace(Range<usize>),
    InsertAfter(usize),
    Append,
}

const MODIFIERS: &str = r"(?:\b(?:public|protected|private|var)\s+)?(?:static\s+)?(?:\??(?:array|string)\s+)?";
const LIST_VALUE: &str = r"(?:\[[^\]]*?\]|array\s*\([^)]*?\))\s*;";
const ANY_VALUE: &str = r"[^;]*;";

fn property_pattern(property: &str, value: &str) -> Result<Regex> {
    let pattern = format!(r"{}\${}\b\s*={}", MODIFIERS, regex::escape(property), value);
    Ok(Regex::new(&pattern)?)
}

/// Patcher for one kind of declaration
#[derive(Debug, Clone)]
pub struct SourcePatcher {
    declaration: Declaration,
    target: Regex,
    anchors: Vec<Regex>,
}

impl SourcePatcher {
    pub fn new(declaration: Declaration) -> Result<Self> {
        let target = property_pattern(declaration.property(), &format!(r"\s*{}", LIST_VALUE))?;
        let anchors = declaration
            .anchors()
            .iter()
            .map(|anchor| property_pattern(anchor, ANY_VALUE))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            declaration,
            target,
            anchors,
        })
    }

    /// Patcher for `$fillable`
    pub fn fillable() -> Result<Self> {
        Self::new(Declaration::Fillable)
    }

    /// Patcher for `$dates`
    pub fn dates() -> Result<Self> {
        Self::new(Declaration::Dates)
    }

    /// The existing declaration text, if any
    pub fn current_declaration<'c>(&self, content: &'c str) -> Option<&'c str> {
        self.target.find(content).map(|m| m.as_str())
    }

    pub fn locate(&self, content: &str) -> Placement {
        if let Some(m) = self.target.find(content) {
            return Placement::Replace(m.range());
        }

        self.anchors
            .iter()
            .find_map(|anchor| anchor.find(content))
            .map_or(Placement::Append, |m| Placement::InsertAfter(m.end()))
    }

    /// Patch source text in memory
    pub fn apply(&self, content: &str, rendered: &str) -> (String, PatchResult) {
        let normalized = normalize_open_tag(content);

        let (patched, result) = match self.locate(&normalized) {
            Placement::Replace(range) => {
                let mut patched = String::with_capacity(normalized.len() + rendered.len());
                patched.push_str(&normalized[..range.start]);
                patched.push_str(rendered);
                patched.push_str(&normalized[range.end..]);
                (patched, PatchResult::Replaced)
            }
            Placement::InsertAfter(offset) => {
                let mut patched = String::with_capacity(normalized.len() + rendered.len() + 6);
                patched.push_str(&normalized[..offset]);
                patched.push_str("\n\n    ");
                patched.push_str(rendered);
                patched.push_str(&normalized[offset..]);
                (patched, PatchResult::InsertedAfterAnchor)
            }
            Placement::Append => (
                format!("{}\n\n    {}\n", normalized, rendered),
                PatchResult::Appended,
            ),
        };

        if patched == content {
            (patched, PatchResult::Unchanged)
        } else {
            (patched, result)
        }
    }

    /// Patch the file at `path` in place
    pub fn patch(&self, path: &Path, rendered: &str) -> Result<PatchResult> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::PatchError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let (patched, result) = self.apply(&content, rendered);

        if result != PatchResult::Unchanged {
            fs::write(path, patched).map_err(|e| {
                Error::PatchError(format!("Failed to write {}: {}", path.display(), e))
            })?;
        }

        tracing::info!(
            path = %path.display(),
            property = self.declaration.property(),
            result = ?result,
            "Patched model source"
        );

        Ok(result)
    }
}

/// Normalize the opening tag of files that start with one
///
/// `<?` or `<?php` in any case becomes `<?php` followed by a blank line.
/// Files that do not start with an open tag, and `<?=` echo tags, are returned
/// untouched.
pub fn normalize_open_tag(content: &str) -> Cow<'_, str> {
    let rest = match content.get(..5) {
        Some(tag) if tag.eq_ignore_ascii_case("<?php") => &content[5..],
        _ => match content.strip_prefix("<?") {
            Some(rest) => rest,
            None => return Cow::Borrowed(content),
        },
    };

    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return Cow::Borrowed(content);
    }

    let body = rest.trim_start();
    let whitespace = &rest[..rest.len() - body.len()];

    let normalized = if whitespace.matches('\n').count() >= 2 {
        format!("<?php{}", rest)
    } else {
        format!("<?php\n\n{}", body)
    };

    if normalized == content {
        Cow::Borrowed(content)
    } else {
        Cow::Owned(normalized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locate_prefers_existing_declaration() {
        let patcher = SourcePatcher::fillable().unwrap();
        let content = "<?php\n\nclass A {\n    protected $table = 'a';\n    protected $fillable = ['x'];\n}\n";
        match patcher.locate(content) {
            Placement::Replace(range) => assert_eq!(&content[range], "protected $fillable = ['x'];"),
            other => panic!("unexpected placement {:?}", other),
        }
    }

    #[test]
    fn test_locate_anchor_then_append() {
        let patcher = SourcePatcher::fillable().unwrap();
        let anchored = "<?php\n\nclass A {\n    protected $table = 'a';\n}\n";
        assert_eq!(
            patcher.locate(anchored),
            Placement::InsertAfter(anchored.find("'a';").unwrap() + 4)
        );
        assert_eq!(patcher.locate("<?php\n\nclass A {}\n"), Placement::Append);
    }

    #[test]
    fn test_similar_property_names_are_not_matched() {
        let patcher = SourcePatcher::fillable().unwrap();
        let content = "<?php\n\nclass A {\n    protected $fillableExtra = ['x'];\n}\n";
        assert_eq!(patcher.current_declaration(content), None);
    }

    #[test]
    fn test_dates_anchor_on_fillable() {
        let patcher = SourcePatcher::dates().unwrap();
        let content = "<?php\n\nclass A {\n    protected $table = 'a';\n    protected $fillable = [\n        'x',\n    ];\n}\n";
        let (patched, result) = patcher.apply(content, "protected $dates = ['x'];");
        assert_eq!(result, PatchResult::InsertedAfterAnchor);
        assert!(patched.contains("    ];\n\n    protected $dates = ['x'];\n}"));
    }

    #[test]
    fn test_normalize_open_tag() {
        assert_eq!(normalize_open_tag("<?php\n\nclass A {}"), "<?php\n\nclass A {}");
        assert_eq!(normalize_open_tag("<?PHP\nclass A {}"), "<?php\n\nclass A {}");
        assert_eq!(normalize_open_tag("<? class A {}"), "<?php\n\nclass A {}");
        assert_eq!(normalize_open_tag("<?= $x ?>"), "<?= $x ?>");
        assert_eq!(normalize_open_tag("<html><?php"), "<html><?php");
        assert!(matches!(normalize_open_tag("<?php\n\nx"), Cow::Borrowed(_)));
    }
}
