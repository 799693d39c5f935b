//! Helpers for rendering deterministic node paths.

use std::fmt;

use crate::core::value::Key;

/// One descent step: a sequence index or a mapping key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PathStep {
    Index(usize),
    Key(Key),
}

impl From<usize> for PathStep {
    fn from(index: usize) -> Self {
        PathStep::Index(index)
    }
}

impl From<Key> for PathStep {
    fn from(key: Key) -> Self {
        PathStep::Key(key)
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        PathStep::Key(Key::from(key))
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Index(index) => write!(f, "{index}"),
            PathStep::Key(key) => write!(f, "{key}"),
        }
    }
}

/// Location of a node within a value tree, root first.
///
/// Paths are never extended in place: [`ValuePath::child`] returns a new
/// path, so sibling subtrees never observe each other's steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ValuePath(Vec<PathStep>);

impl ValuePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Copy of this path with `step` appended.
    pub fn child(&self, step: impl Into<PathStep>) -> Self {
        let mut steps = Vec::with_capacity(self.0.len() + 1);
        steps.extend_from_slice(&self.0);
        steps.push(step.into());
        Self(steps)
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PathStep> for ValuePath {
    fn from_iter<I: IntoIterator<Item = PathStep>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Renders `/`-separated steps, or `<root>` for the empty path.
impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("<root>");
        }
        for (position, step) in self.0.iter().enumerate() {
            if position > 0 {
                f.write_str("/")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}
