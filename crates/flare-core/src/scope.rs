//! Isolated reporting scopes and the guard that restores them.

use crate::event::Breadcrumb;
use crate::hub::Hub;
use crate::span::Span;
use std::collections::{BTreeMap, VecDeque};

/// One unit of reporting context: tags, breadcrumbs, and the current span.
///
/// Scopes stack on the [`Hub`]. Pushing clones the active scope, so anything
/// set inside a pushed scope vanishes when it pops.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    tags: BTreeMap<String, String>,
    breadcrumbs: VecDeque<Breadcrumb>,
    span: Option<Span>,
}

impl Scope {
    /// Sets a tag on this scope, replacing any previous value for the key.
    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    /// The value of a tag, if set.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// All tags on this scope.
    pub fn tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    /// The span currently attached to this scope.
    pub fn span(&self) -> Option<Span> {
        self.span.clone()
    }

    /// Attaches or clears the scope's span.
    pub fn set_span(&mut self, span: Option<Span>) {
        self.span = span;
    }

    /// The breadcrumbs recorded on this scope, oldest first.
    pub fn breadcrumbs(&self) -> impl Iterator<Item = &Breadcrumb> {
        self.breadcrumbs.iter()
    }

    /// Removes all breadcrumbs from this scope.
    pub fn clear_breadcrumbs(&mut self) {
        self.breadcrumbs.clear();
    }

    pub(crate) fn add_breadcrumb(&mut self, breadcrumb: Breadcrumb, max_breadcrumbs: usize) {
        if max_breadcrumbs == 0 {
            return;
        }
        while self.breadcrumbs.len() >= max_breadcrumbs {
            self.breadcrumbs.pop_front();
        }
        self.breadcrumbs.push_back(breadcrumb);
    }
}

/// Guard returned by [`Hub::push_scope`].
///
/// Pops the pushed scope when dropped, restoring the scope that was active
/// before the push even if the code in between panicked.
#[must_use = "the pushed scope pops when the guard drops"]
#[derive(Debug)]
pub struct ScopeGuard<'a> {
    hub: &'a Hub,
}

impl<'a> ScopeGuard<'a> {
    pub(crate) fn new(hub: &'a Hub) -> Self {
        Self { hub }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.hub.pop_scope();
    }
}
