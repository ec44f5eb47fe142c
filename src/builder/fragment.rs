//! Rendered query text with unresolved parameter references.
//!
//! Renderers never write parameter names into text directly. They emit a
//! [`Fragment`] made of literal text and [`ParamId`] handles, and the final
//! string is produced by [`Fragment::finalize`] once all tables have been merged.

use std::fmt;

use thiserror::Error;

use super::params::{ParamId, ParameterTable};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FinalizeError {
    #[error("Fragment references parameter {id:?} which is not in the table")]
    DanglingParameter { id: ParamId },
}

/// One piece of a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Param(ParamId),
}

/// Query text template: literal text interleaved with parameter handles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    segments: Vec<Segment>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fragment consisting of literal text only.
    pub fn text(s: impl Into<String>) -> Self {
        let mut fragment = Self::new();
        fragment.push_str(s);
        fragment
    }

    /// A fragment consisting of a single parameter reference.
    pub fn param(id: ParamId) -> Self {
        Self {
            segments: vec![Segment::Param(id)],
        }
    }

    /// Append literal text, coalescing with a trailing text segment.
    pub fn push_str(&mut self, s: impl Into<String>) {
        let s = s.into();
        if s.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(last)) => last.push_str(&s),
            _ => self.segments.push(Segment::Text(s)),
        }
    }

    pub fn push_param(&mut self, id: ParamId) {
        self.segments.push(Segment::Param(id));
    }

    pub fn append(&mut self, other: Fragment) {
        for segment in other.segments {
            match segment {
                Segment::Text(s) => self.push_str(s),
                Segment::Param(id) => self.push_param(id),
            }
        }
    }

    /// Join fragments with a literal separator.
    pub fn join<I>(fragments: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = Fragment>,
    {
        let mut joined = Self::new();
        for (i, fragment) in fragments.into_iter().enumerate() {
            if i > 0 {
                joined.push_str(separator);
            }
            joined.append(fragment);
        }
        joined
    }

    /// Wrap the fragment in parentheses.
    pub fn parenthesized(self) -> Self {
        let mut wrapped = Self::text("(");
        wrapped.append(self);
        wrapped.push_str(")");
        wrapped
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Handles referenced by this fragment, in order of appearance.
    pub fn params(&self) -> impl Iterator<Item = ParamId> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(id) => Some(*id),
            Segment::Text(_) => None,
        })
    }

    /// Resolve every handle to its current `$name` in `table`.
    pub fn finalize(&self, table: &ParameterTable) -> Result<String, FinalizeError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(s) => out.push_str(s),
                Segment::Param(id) => {
                    let param = table
                        .get(*id)
                        .ok_or(FinalizeError::DanglingParameter { id: *id })?;
                    out.push('$');
                    out.push_str(param.name());
                }
            }
        }
        Ok(out)
    }
}

impl From<&str> for Fragment {
    fn from(s: &str) -> Self {
        Fragment::text(s)
    }
}

impl From<String> for Fragment {
    fn from(s: String) -> Self {
        Fragment::text(s)
    }
}

/// Debug rendering with handles shown as `${id}`; not valid query text.
impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Text(s) => f.write_str(s)?,
                Segment::Param(id) => write!(f, "${{{:?}}}", id)?,
            }
        }
        Ok(())
    }
}
