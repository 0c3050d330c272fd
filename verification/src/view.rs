//! Current-view tracking.
//!
//! Network continuations may resume after the user has navigated away. Each
//! form holds the [`ViewToken`] it was shown under and drops its effects when
//! the registry reports a newer view.

use std::cell::Cell;

/// The portal pages a form can live on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ViewKind {
    Home,
    Identify,
    VerifySms,
    Contact,
    MailSent,
    SecurityCenter,
}

/// Identity of one displayed view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewToken {
    generation: u64,
    kind: ViewKind,
}

impl ViewToken {
    pub fn kind(&self) -> ViewKind {
        self.kind
    }
}

#[derive(Debug, Default)]
pub struct ViewRegistry {
    generation: Cell<u64>,
    current: Cell<Option<ViewKind>>,
}

impl ViewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current view; every earlier token goes stale.
    pub fn navigate(&self, kind: ViewKind) -> ViewToken {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.current.set(Some(kind));
        tracing::debug!(?kind, generation, "view replaced");
        ViewToken { generation, kind }
    }

    pub fn is_current(&self, token: &ViewToken) -> bool {
        self.generation.get() == token.generation
    }

    pub fn current(&self) -> Option<ViewKind> {
        self.current.get()
    }
}
