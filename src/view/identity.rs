//! Handler identity.

use std::fmt;
use std::sync::Arc;

/// Fully qualified, dot-separated name of the action that produced a result,
/// e.g. `com.example.action.userAction`.
///
/// Cheap to clone; shared between the registry and every request it serves.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerIdentity(Arc<str>);

impl HandlerIdentity {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive the view sub-directory from this identity.
    ///
    /// The trailing `suffix_len` characters (the type marker, e.g. `Action`)
    /// are dropped, then every dot segment after the first segment equal to
    /// `marker` is emitted with a lower-cased first character, each prefixed
    /// by `/`. Returns `None` if no segment equals `marker`.
    pub fn view_subpath(&self, marker: &str, suffix_len: usize) -> Option<String> {
        let name = self.as_str();
        let base = match suffix_len {
            0 => name,
            n => {
                let (cut, _) = name.char_indices().rev().nth(n - 1)?;
                &name[..cut]
            }
        };

        let mut segments = base.split('.');
        segments.by_ref().find(|segment| *segment == marker)?;

        let mut subpath = String::new();
        for segment in segments {
            subpath.push('/');
            subpath.push_str(&lower_first(segment));
        }
        Some(subpath)
    }
}

impl fmt::Display for HandlerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for HandlerIdentity {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for HandlerIdentity {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

fn lower_first(segment: &str) -> String {
    let mut chars = segment.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
