use serde::Serialize;

use crate::view::ViewKind;

/// Listing entry that stands for "go to the parent directory".
pub const ASCEND_SENTINEL: &str = "..";

/// Per-view browsing state: a path history plus the last listings received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationContext {
    view: ViewKind,
    path_stack: Vec<String>,
    directories: Vec<String>,
    files: Vec<String>,
}

impl NavigationContext {
    pub fn new(view: ViewKind, root: impl Into<String>) -> Self {
        Self {
            view,
            path_stack: vec![root.into()],
            directories: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn view(&self) -> ViewKind {
        self.view
    }

    pub fn top(&self) -> &str {
        // path_stack is never empty: the root is pushed at construction and never popped.
        self.path_stack.last().map_or("", String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.path_stack.len()
    }

    pub fn path_stack(&self) -> &[String] {
        &self.path_stack
    }

    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Top path without its first segment, as shown above the listings.
    pub fn display_path(&self) -> &str {
        let top = self.top();
        top.split_once('/').map_or(top, |(_, rest)| rest)
    }

    /// Pushes `top/child`, or ascends when `child` is the sentinel. Returns the new top.
    pub fn descend(&mut self, child: &str) -> &str {
        if child == ASCEND_SENTINEL {
            self.ascend();
        } else {
            let path = format!("{}/{}", self.top(), child);
            self.path_stack.push(path);
        }
        self.top()
    }

    /// Pops the top path unless only the root remains. Returns whether anything was popped.
    pub fn ascend(&mut self) -> bool {
        if self.path_stack.len() > 1 {
            self.path_stack.pop();
            true
        } else {
            false
        }
    }

    /// Clear-then-rebuild: tagged names in order, the sentinel inserted at the front.
    pub fn apply_directories<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directories.clear();
        self.directories.extend(names.into_iter().map(Into::into));
        self.directories.insert(0, ASCEND_SENTINEL.to_string());
    }

    pub fn apply_files<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.clear();
        self.files.extend(names.into_iter().map(Into::into));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn context() -> NavigationContext {
        NavigationContext::new(ViewKind::Browse, "repo")
    }

    #[test]
    fn ascend_at_root_is_a_noop() {
        for view in ViewKind::ALL {
            let mut ctx = NavigationContext::new(view, "repo");
            assert!(!ctx.ascend());
            assert_eq!(ctx.depth(), 1);
            assert_eq!(ctx.top(), "repo");
        }
    }

    #[test]
    fn descend_then_ascend_restores_top() {
        for child in ["src", "include", "a b", "x/y"] {
            let mut ctx = context();
            ctx.descend("lib");
            let before = ctx.top().to_string();
            ctx.descend(child);
            assert_eq!(ctx.top(), format!("{before}/{child}"));
            ctx.ascend();
            assert_eq!(ctx.top(), before);
        }
    }

    #[test]
    fn descending_into_sentinel_ascends() {
        let mut ctx = context();
        ctx.descend("src");
        assert_eq!(ctx.descend(ASCEND_SENTINEL), "repo");
        assert_eq!(ctx.descend(ASCEND_SENTINEL), "repo");
        assert_eq!(ctx.depth(), 1);
    }

    #[test]
    fn directory_rebuild_puts_sentinel_first_and_is_idempotent() {
        let mut ctx = context();
        ctx.apply_directories(["include", "src"]);
        let first = ctx.directories().to_vec();
        ctx.apply_directories(["include", "src"]);
        assert_eq!(ctx.directories(), first.as_slice());
        assert_eq!(first, vec!["..", "include", "src"]);
    }

    #[test]
    fn empty_directory_reply_still_offers_parent() {
        let mut ctx = context();
        ctx.apply_directories(Vec::<String>::new());
        assert_eq!(ctx.directories(), [".."]);
    }

    #[test]
    fn file_rebuild_has_no_sentinel() {
        let mut ctx = context();
        ctx.apply_files(["a.cpp", "a.h"]);
        ctx.apply_files(["b.cpp"]);
        assert_eq!(ctx.files(), ["b.cpp"]);
    }

    #[test]
    fn display_path_strips_first_segment() {
        let mut ctx = NavigationContext::new(ViewKind::CheckOut, "codeRepository/remote");
        assert_eq!(ctx.display_path(), "remote");
        ctx.descend("src");
        assert_eq!(ctx.display_path(), "remote/src");
        assert_eq!(context().display_path(), "repo");
    }
}
