//! Filepath: src/infra/walk.rs
//! Corpus walker.
//! - Optionally respects .gitignore, .git/info/exclude, global gitignore and .ignore
//! - Extra ignore globs (early prune + late filter)
//! - Extension filter for eligible documents
//! - Optional max depth (corpus loading defaults to the top level)
//! - Deterministic ordering for stable reports
//! - Traversal errors are returned, never skipped
//!
//! Backed by ripgrep's `ignore` crate and `globset`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};

/// Walker that yields eligible files under a root.
/// Extra globs are applied in two places:
///   1) Early: prune directories during traversal (filter_entry).
///   2) Late: filter out files that still slipped through.
pub struct FileWalker
{
    /// Compiled set of additional ignore patterns
    ignore_patterns: GlobSet,

    /// Accepted extensions, lowercase, without the dot; empty = any
    extensions: Vec<String>,

    /// Include hidden (dot) files; default false
    include_hidden: bool,

    /// Honor gitignore-style ignore files; default true
    respect_gitignore: bool,

    /// Maximum recursion depth; default None (unbounded)
    max_depth: Option<usize>,
}

impl FileWalker
{
    /// Build a walker with additional ignore patterns (e.g., "drafts/**",
    /// "**/*_test.py"). Patterns match on paths relative to the root.
    pub fn new(additional_ignores: &[String]) -> Result<Self>
    {
        let mut builder = GlobSetBuilder::new();

        for pattern in additional_ignores
        {
            let glob =
                Glob::new(pattern).with_context(|| format!("Invalid ignore pattern: {pattern}"))?;
            builder.add(glob);
        }

        Ok(Self {
            ignore_patterns: builder.build()?,
            extensions: Vec::new(),
            include_hidden: false,
            respect_gitignore: true,
            max_depth: None,
        })
    }

    /// Only yield files whose extension is in `exts` (case-insensitive,
    /// leading dots tolerated).
    pub fn with_extensions(
        mut self,
        exts: &[String],
    ) -> Self
    {
        self.extensions = exts
            .iter()
            .map(|e| {
                e.trim_start_matches('.')
                    .to_ascii_lowercase()
            })
            .collect();
        self
    }

    /// Include or exclude hidden files (dotfiles).
    pub fn with_include_hidden(
        mut self,
        include_hidden: bool,
    ) -> Self
    {
        self.include_hidden = include_hidden;
        self
    }

    /// Honor or disregard .gitignore, git excludes and .ignore files.
    pub fn with_gitignore(
        mut self,
        respect: bool,
    ) -> Self
    {
        self.respect_gitignore = respect;
        self
    }

    /// Limit recursion depth (`None` = unbounded, `Some(1)` = root files only).
    pub fn with_max_depth(
        mut self,
        depth: Option<usize>,
    ) -> Self
    {
        self.max_depth = depth;
        self
    }

    /// Internal: construct a configured WalkBuilder for `root`.
    fn build_walk(
        &self,
        root: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(root);

        // WalkBuilder::hidden(true) => *skip* dotfiles
        b.hidden(!self.include_hidden);

        b.git_ignore(self.respect_gitignore);
        b.git_global(self.respect_gitignore);
        b.git_exclude(self.respect_gitignore);
        b.ignore(self.respect_gitignore);
        b.parents(self.respect_gitignore);
        b.max_depth(self.max_depth);

        // Early directory pruning using extra ignores, on relative paths.
        let extra = self
            .ignore_patterns
            .clone();
        let root_path = root.to_path_buf();
        b.filter_entry(move |ent: &DirEntry| {
            let is_dir = ent
                .file_type()
                .map(|ft| ft.is_dir())
                .unwrap_or(false);

            if is_dir
            {
                let rel = ent
                    .path()
                    .strip_prefix(&root_path)
                    .unwrap_or(ent.path());
                if !rel
                    .as_os_str()
                    .is_empty()
                    && extra.is_match(rel)
                {
                    return false;
                }
            }
            true
        });

        b
    }

    fn extension_ok(
        &self,
        path: &Path,
    ) -> bool
    {
        if self
            .extensions
            .is_empty()
        {
            return true;
        }

        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| {
                self.extensions
                    .iter()
                    .any(|want| want.eq_ignore_ascii_case(e))
            })
            .unwrap_or(false)
    }

    /// Traverse files under `root`, respecting ignore rules, extra globs
    /// and the extension filter. Returns a **sorted** list of paths.
    /// Any unreadable directory or entry fails the whole walk.
    pub fn walk_files<P: AsRef<Path>>(
        &self,
        root: P,
    ) -> Result<Vec<PathBuf>>
    {
        let root_path = root.as_ref();
        let walker = self
            .build_walk(root_path)
            .build();

        let mut out: Vec<PathBuf> = Vec::new();
        for res in walker
        {
            let entry =
                res.with_context(|| format!("Failed to walk {}", root_path.display()))?;

            if !entry
                .file_type()
                .is_some_and(|ft| ft.is_file())
            {
                continue;
            }

            let abs = entry.into_path();
            if !self.extension_ok(&abs)
            {
                continue;
            }

            // Late file-level extra ignore filtering using RELATIVE path
            let rel = abs
                .strip_prefix(root_path)
                .unwrap_or(&abs);
            if self
                .ignore_patterns
                .is_match(rel)
            {
                continue;
            }

            out.push(abs);
        }

        // Deterministic order (stable corpus order & tests)
        out.sort();

        Ok(out)
    }
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    /// Create a file with parent dirs as needed
    fn write_file(
        root: &Path,
        rel: &str,
        contents: &str,
    ) -> Result<()>
    {
        let path = root.join(rel);
        if let Some(parent) = path.parent()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)?;
        Ok(())
    }

    fn relative(
        root: &Path,
        files: Vec<PathBuf>,
    ) -> Vec<PathBuf>
    {
        files
            .into_iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_path_buf()
            })
            .collect()
    }

    #[test]
    fn test_extension_filter_and_sorting() -> Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "b.py", "x = 1")?;
        write_file(root, "a.PY", "y = 2")?;
        write_file(root, "notes.txt", "skip")?;

        let walker = FileWalker::new(&[])?.with_extensions(&[".py".to_string()]);
        let files = relative(root, walker.walk_files(root)?);

        assert_eq!(files, vec![PathBuf::from("a.PY"), PathBuf::from("b.py")]);
        Ok(())
    }

    #[test]
    fn test_max_depth_limits_to_top_level() -> Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "top.py", "a = 1")?;
        write_file(root, "nested/deep.py", "b = 2")?;

        let walker = FileWalker::new(&[])?.with_max_depth(Some(1));
        let files = relative(root, walker.walk_files(root)?);
        assert_eq!(files, vec![PathBuf::from("top.py")]);

        let walker = FileWalker::new(&[])?;
        let files = relative(root, walker.walk_files(root)?);
        assert_eq!(files.len(), 2);
        Ok(())
    }

    #[test]
    fn test_additional_globs_prune_and_filter() -> Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "drafts/wip.py", "pass")?;
        write_file(root, "keep.py", "pass")?;
        write_file(root, "skip_me.py", "pass")?;

        let ignores = vec!["drafts/**".to_string(), "skip_*.py".to_string()];
        let walker = FileWalker::new(&ignores)?;
        let files = relative(root, walker.walk_files(root)?);

        assert_eq!(files, vec![PathBuf::from("keep.py")]);
        Ok(())
    }

    #[test]
    fn test_hidden_files_skipped_by_default() -> Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, ".hidden.py", "h = 1")?;
        write_file(root, "visible.py", "v = 1")?;

        let files = relative(root, FileWalker::new(&[])?.walk_files(root)?);
        assert_eq!(files, vec![PathBuf::from("visible.py")]);

        let walker = FileWalker::new(&[])?.with_include_hidden(true);
        let files = relative(root, walker.walk_files(root)?);
        assert!(files.contains(&PathBuf::from(".hidden.py")));
        Ok(())
    }

    #[test]
    fn test_gitignore_toggle() -> Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        fs::create_dir(root.join(".git"))?;
        write_file(root, ".gitignore", "secret.py\n")?;
        write_file(root, "secret.py", "s = 1")?;
        write_file(root, "open.py", "o = 1")?;

        let exts = vec!["py".to_string()];
        let walker = FileWalker::new(&[])?.with_extensions(&exts);
        let files = relative(root, walker.walk_files(root)?);
        assert_eq!(files, vec![PathBuf::from("open.py")]);

        let walker = FileWalker::new(&[])?
            .with_extensions(&exts)
            .with_gitignore(false);
        let files = relative(root, walker.walk_files(root)?);
        assert_eq!(files, vec![PathBuf::from("open.py"), PathBuf::from("secret.py")]);
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_fails_walk() -> Result<()>
    {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new()?;
        let root = tmp.path();
        write_file(root, "ok.py", "a = 1")?;
        write_file(root, "locked/inner.py", "b = 2")?;

        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000))?;

        // Privileged users read through mode bits; nothing to observe then.
        let readable = fs::read_dir(&locked).is_ok();
        let result = FileWalker::new(&[])?.walk_files(root);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755))?;

        if !readable
        {
            let err = result
                .err()
                .expect("unreadable directory should fail the walk");
            assert!(
                format!("{err:#}").contains("Failed to walk")
            );
        }
        Ok(())
    }

    #[test]
    fn test_invalid_glob_is_reported()
    {
        let err = FileWalker::new(&["[unclosed".to_string()])
            .err()
            .expect("invalid glob should fail");
        assert!(
            err.to_string()
                .contains("[unclosed")
        );
    }
}
