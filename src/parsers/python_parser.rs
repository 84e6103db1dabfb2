//! Filepath: src/parsers/python_parser.rs
//! ------------------------------------------------------------------
//! Python name collector built on Tree-sitter 0.25.x.
//! Goals:
//!   - Collect every bound or referenced name in a module.
//!   - Treat any ERROR/MISSING node as a parse failure, since
//!     Tree-sitter recovers instead of rejecting input.
//!   - Reject Python 2 `print`/`exec` statements; the grammar still
//!     accepts them but Python 3 does not.
//!   - Walk with a cursor; no recursion on deep sources.
//!
//! Collected:
//!   - identifiers in expression and target position
//!   - parameters, function names, class names
//!   - import aliases (`import numpy as np` binds `np`)
//!
//! Skipped:
//!   - attribute names after a dot (`obj.attr`)
//!   - keyword-argument names in calls (`f(key=1)`)
//!   - module paths and imported names in import statements
//!   - names listed in `global` / `nonlocal`
//! ------------------------------------------------------------------

use std::collections::BTreeSet;

use tree_sitter::{Language, Node, Parser};

use crate::core::normalize::{NameCollector, NormalizeError};

/// Collects Python names for variable normalization.
pub struct PythonNameCollector {
    /// Python language handle for Tree-sitter.
    language: Language,
}

impl PythonNameCollector {
    /// Construct a collector, verifying the grammar loads.
    pub fn new() -> Result<Self, NormalizeError> {
        let language: Language = tree_sitter_python::LANGUAGE.into();

        // Fail early on an ABI mismatch instead of on first use.
        Parser::new()
            .set_language(&language)
            .map_err(|err| NormalizeError::Grammar {
                language: "python",
                reason: err.to_string(),
            })?;

        Ok(Self { language })
    }
}

impl NameCollector for PythonNameCollector {
    fn collect_names(&self, source: &str) -> Result<BTreeSet<String>, NormalizeError> {
        // Parsers are not Sync; build one per call.
        let mut parser = Parser::new();
        parser
            .set_language(&self.language)
            .map_err(|err| NormalizeError::Grammar {
                language: "python",
                reason: err.to_string(),
            })?;

        let tree = parser
            .parse(source, None)
            .ok_or(NormalizeError::NoTree)?;
        let root = tree.root_node();

        // Reject recovered trees so malformed input falls back upstream.
        if root.has_error() {
            let (line, column) = first_error_position(root);
            return Err(NormalizeError::Syntax { line, column });
        }

        let bytes = source.as_bytes();
        let mut names = BTreeSet::new();
        let mut cursor = root.walk();

        'walk: loop {
            let node = cursor.node();

            let descend = match node.kind() {
                "identifier" => {
                    if is_collected(node)
                        && let Ok(text) = node.utf8_text(bytes)
                    {
                        names.insert(text.to_string());
                    }
                    false
                }
                "import_statement" | "import_from_statement" | "future_import_statement" => {
                    collect_import_aliases(node, bytes, &mut names);
                    false
                }
                "global_statement" | "nonlocal_statement" => false,
                "print_statement" | "exec_statement" => {
                    let pos = node.start_position();
                    return Err(NormalizeError::Syntax {
                        line: pos.row + 1,
                        column: pos.column,
                    });
                }
                _ => true,
            };

            if descend && cursor.goto_first_child() {
                continue;
            }

            // Climb until a sibling exists or we are back at the root.
            loop {
                if cursor.goto_next_sibling() {
                    continue 'walk;
                }
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }

        Ok(names)
    }

    fn language(&self) -> &'static str {
        "python"
    }
}

/// Decide whether an identifier is a name binding or reference.
fn is_collected(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return true;
    };

    match parent.kind() {
        // `obj.attr`: only the object side is a name.
        "attribute" => parent.child_by_field_name("attribute") != Some(node),
        // `f(key=value)`: the key is a label, not a name.
        "keyword_argument" => parent.child_by_field_name("name") != Some(node),
        _ => true,
    }
}

/// Record the alias side of `import x as y` / `from m import x as y`.
fn collect_import_aliases(node: Node, bytes: &[u8], names: &mut BTreeSet<String>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "aliased_import" {
            continue;
        }
        if let Some(alias) = child.child_by_field_name("alias")
            && let Ok(text) = alias.utf8_text(bytes)
        {
            names.insert(text.to_string());
        }
    }
}

/// 1-based line and 0-based column of the first ERROR or MISSING node.
fn first_error_position(root: Node) -> (usize, usize) {
    let mut cursor = root.walk();

    'walk: loop {
        let node = cursor.node();
        if node.is_error() || node.is_missing() {
            let pos = node.start_position();
            return (pos.row + 1, pos.column);
        }

        // Only subtrees that contain an error are worth entering.
        if node.has_error() && cursor.goto_first_child() {
            continue;
        }

        loop {
            if cursor.goto_next_sibling() {
                continue 'walk;
            }
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    let pos = root.start_position();
    (pos.row + 1, pos.column)
}
