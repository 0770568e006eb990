use std::collections::HashSet;
use std::hash::Hash;

use olympiad_core::model::{
    Blog, BlogId, MatchSetId, MatchSetSummary, SalesPerson, SalesPersonId, School, SchoolId, Task,
    TaskId, UpcomingExam, UpcomingExamId, UserAccount, UserId,
};

/// Records that can be patched in place by id.
pub trait Keyed {
    type Key: Clone + Eq + Hash + std::fmt::Debug;

    fn key(&self) -> Self::Key;
}

impl Keyed for School {
    type Key = SchoolId;

    fn key(&self) -> SchoolId {
        self.id.clone()
    }
}

impl Keyed for SalesPerson {
    type Key = SalesPersonId;

    fn key(&self) -> SalesPersonId {
        self.id
    }
}

impl Keyed for UserAccount {
    type Key = UserId;

    fn key(&self) -> UserId {
        self.id
    }
}

impl Keyed for Blog {
    type Key = BlogId;

    fn key(&self) -> BlogId {
        self.id.clone()
    }
}

impl Keyed for MatchSetSummary {
    type Key = MatchSetId;

    fn key(&self) -> MatchSetId {
        self.id
    }
}

impl Keyed for UpcomingExam {
    type Key = UpcomingExamId;

    fn key(&self) -> UpcomingExamId {
        self.id.clone()
    }
}

impl Keyed for Task {
    type Key = TaskId;

    fn key(&self) -> TaskId {
        self.id.clone()
    }
}

/// Issued by `begin_fetch`; only the newest ticket may replace the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

/// The rows a dashboard table renders.
///
/// Every local mutation bumps the generation, so a fetch that started before
/// it is dropped when it lands. Removed keys stay tombstoned and are filtered
/// out of later fetches.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<T: Keyed> {
    items: Vec<T>,
    generation: u64,
    loaded: bool,
    removed: HashSet<T::Key>,
}

impl<T: Keyed> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            generation: 0,
            loaded: false,
            removed: HashSet::new(),
        }
    }
}

impl<T: Keyed> ListState<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// A fetch has landed at least once.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[must_use]
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.items.iter().find(|item| &item.key() == key)
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        FetchTicket(self.generation)
    }

    /// Replace the rows with a fetch result. Returns `false` for a stale ticket.
    pub fn finish_fetch(&mut self, ticket: FetchTicket, items: Vec<T>) -> bool {
        if ticket.0 != self.generation {
            return false;
        }
        let removed = &self.removed;
        self.items = items
            .into_iter()
            .filter(|item| !removed.contains(&item.key()))
            .collect();
        self.loaded = true;
        true
    }

    /// Appends, or replaces a row with the same key.
    pub fn apply_created(&mut self, item: T) {
        self.generation += 1;
        let key = item.key();
        self.removed.remove(&key);
        match self.items.iter_mut().find(|existing| existing.key() == key) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
    }

    pub fn apply_updated(&mut self, item: T) {
        self.generation += 1;
        let key = item.key();
        if let Some(existing) = self.items.iter_mut().find(|existing| existing.key() == key) {
            *existing = item;
        }
    }

    pub fn apply_removed(&mut self, key: &T::Key) {
        self.generation += 1;
        self.items.retain(|item| &item.key() != key);
        self.removed.insert(key.clone());
    }
}
