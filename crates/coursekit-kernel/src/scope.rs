//! Namespace scoping.
//!
//! A course file nests `namespace` blocks and may `open` other namespaces
//! for visibility. The scope is an explicit stack carried through
//! registration and lookup, never ambient state, so repeated parses stay
//! independent and reproducible.
//!
//! Each frame remembers the namespaces opened while it was innermost;
//! closing the frame drops those opens with it.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default)]
struct Frame {
    segment: String,
    opened: Vec<Vec<String>>,
}

/// The mutable scope carried by the parsing pass.
#[derive(Debug, Clone, Default)]
pub struct ScopeStack {
    frames: Vec<Frame>,
    root_opened: Vec<Vec<String>>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a `namespace <segment>` block.
    pub fn enter(&mut self, segment: impl Into<String>) {
        self.frames.push(Frame {
            segment: segment.into(),
            opened: Vec::new(),
        });
    }

    /// Leave the innermost namespace iff `segment` matches it.
    /// Returns false when nothing matches (the caller reports and ignores).
    pub fn leave(&mut self, segment: &str) -> bool {
        match self.frames.last() {
            Some(frame) if frame.segment == segment => {
                self.frames.pop();
                true
            }
            _ => false,
        }
    }

    /// Record an `open <dotted.path>` in the innermost frame.
    pub fn open(&mut self, dotted: &str) {
        let path: Vec<String> = dotted.split('.').map(str::to_string).collect();
        match self.frames.last_mut() {
            Some(frame) => frame.opened.push(path),
            None => self.root_opened.push(path),
        }
    }

    /// The current namespace path, outermost first.
    pub fn namespace_path(&self) -> Vec<String> {
        self.frames.iter().map(|f| f.segment.clone()).collect()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Freeze the current visibility into an immutable snapshot.
    pub fn snapshot(&self) -> ScopeSnapshot {
        let mut opened: Vec<Vec<String>> = self.root_opened.clone();
        for frame in &self.frames {
            opened.extend(frame.opened.iter().cloned());
        }
        ScopeSnapshot {
            namespace: self.namespace_path(),
            opened,
        }
    }
}

/// The visibility state at one registration point.
///
/// A declaration is reachable from a snapshot when its namespace is the
/// current namespace, an enclosing one, or one of the opened paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeSnapshot {
    pub namespace: Vec<String>,
    pub opened: Vec<Vec<String>>,
}

impl ScopeSnapshot {
    pub fn root() -> Self {
        Self {
            namespace: Vec::new(),
            opened: Vec::new(),
        }
    }

    pub fn can_see(&self, declared_in: &[String]) -> bool {
        if declared_in.len() <= self.namespace.len()
            && self.namespace[..declared_in.len()] == *declared_in
        {
            return true;
        }
        self.opened.iter().any(|path| path[..] == *declared_in)
    }

    /// Candidate qualified spellings for a bare name, innermost namespace
    /// first, then opened namespaces, then the root.
    pub fn lookup_candidates(&self, raw: &str) -> Vec<Vec<String>> {
        let tail: Vec<String> = raw.split('.').map(str::to_string).collect();
        let mut candidates = Vec::new();
        for depth in (0..=self.namespace.len()).rev() {
            let mut candidate: Vec<String> = self.namespace[..depth].to_vec();
            candidate.extend(tail.iter().cloned());
            candidates.push(candidate);
        }
        for path in &self.opened {
            let mut candidate = path.clone();
            candidate.extend(tail.iter().cloned());
            candidates.push(candidate);
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segs(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn enter_leave_matches_segments() {
        let mut scope = ScopeStack::new();
        scope.enter("sets");
        scope.enter("unions");
        assert_eq!(scope.namespace_path(), segs(&["sets", "unions"]));
        assert!(!scope.leave("sets"));
        assert!(scope.leave("unions"));
        assert!(scope.leave("sets"));
        assert!(scope.namespace_path().is_empty());
    }

    #[test]
    fn snapshot_sees_enclosing_and_opened() {
        let mut scope = ScopeStack::new();
        scope.enter("sets");
        scope.enter("unions");
        scope.open("logic.basics");
        let snap = scope.snapshot();
        assert!(snap.can_see(&[]));
        assert!(snap.can_see(&segs(&["sets"])));
        assert!(snap.can_see(&segs(&["sets", "unions"])));
        assert!(snap.can_see(&segs(&["logic", "basics"])));
        assert!(!snap.can_see(&segs(&["sets", "inters"])));
    }

    #[test]
    fn opens_are_dropped_with_their_frame() {
        let mut scope = ScopeStack::new();
        scope.enter("sets");
        scope.open("logic");
        scope.leave("sets");
        assert!(!scope.snapshot().can_see(&segs(&["logic"])));
    }

    #[test]
    fn candidates_are_innermost_first() {
        let mut scope = ScopeStack::new();
        scope.enter("sets");
        scope.open("logic");
        let candidates = scope.snapshot().lookup_candidates("comm");
        assert_eq!(
            candidates,
            vec![segs(&["sets", "comm"]), segs(&["comm"]), segs(&["logic", "comm"])]
        );
    }
}
