//! Histories of operations performed on a shared object.
//!
//! A history is a sequence of _call_ and _response_ entries. Each call is
//! paired with the response that completes it, and the linearizability
//! checker repeatedly _lifts_ such pairs out of the history and puts them
//! back again while searching for a valid ordering.
use std::collections::HashMap;
use std::ops::Index;

/// A process identifier.
pub type ProcessId = usize;

/// An identifier for an entry, unique within its history.
pub type EntryId = usize;

/// Something a process did to a shared object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action<T> {
    /// The process invoked an operation.
    Call(T),
    /// The process received the result of its pending operation.
    Response(T),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEntry<T> {
    pub id: EntryId,
    pub operation: T,
    /// The id of the entry that completes this call.
    pub response: EntryId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseEntry<T> {
    pub id: EntryId,
    pub operation: T,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry<T> {
    Call(CallEntry<T>),
    Response(ResponseEntry<T>),
}

impl<T> Entry<T> {
    pub fn id(&self) -> EntryId {
        match self {
            Entry::Call(call) => call.id,
            Entry::Response(response) => response.id,
        }
    }
}

/// A complete history of operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct History<T> {
    entries: Vec<Entry<T>>,
    // When an entry is removed from this history, its index is recorded here.
    removed_from: Vec<Option<usize>>,
}

impl<T> History<T> {
    /// Creates a history from the actions of each process, in the order in
    /// which they happened.
    ///
    /// The operation recorded in a response is the one used when checking the
    /// history, so it should carry the result of the operation.
    ///
    /// # Panics
    ///
    /// Panics if a process calls an operation while another of its operations
    /// is pending, if a response has no matching call, or if a call never
    /// receives a response.
    pub fn from_actions(actions: Vec<(ProcessId, Action<T>)>) -> Self {
        let mut pending: HashMap<ProcessId, EntryId> = HashMap::new();
        let mut responses: Vec<Option<EntryId>> = vec![None; actions.len()];
        for (id, (process, action)) in actions.iter().enumerate() {
            match action {
                Action::Call(_) => {
                    if pending.insert(*process, id).is_some() {
                        panic!("Process {process} called an operation while another was pending");
                    }
                }
                Action::Response(_) => match pending.remove(process) {
                    Some(call) => responses[call] = Some(id),
                    None => panic!("Process {process} responded without a pending call"),
                },
            }
        }
        if let Some(process) = pending.keys().next() {
            panic!("Process {process} has an operation that never responded");
        }

        let entries: Vec<Entry<T>> = actions
            .into_iter()
            .zip(responses)
            .enumerate()
            .map(|(id, ((_, action), response))| match action {
                Action::Call(operation) => Entry::Call(CallEntry {
                    id,
                    operation,
                    response: response.unwrap_or_else(|| unreachable!("calls are matched above")),
                }),
                Action::Response(operation) => Entry::Response(ResponseEntry { id, operation }),
            })
            .collect();
        let removed_from = vec![None; entries.len()];
        Self {
            entries,
            removed_from,
        }
    }

    /// Returns the current index of the entry with the given id.
    ///
    /// # Panics
    ///
    /// Panics if no such entry is currently in the history.
    pub fn index_of_id(&self, id: EntryId) -> usize {
        match self.iter().position(|e| e.id() == id) {
            Some(index) => index,
            None => panic!("Entry {id} is not in the history"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry<T>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes the call entry at index `i` and its response from the history,
    /// and returns both.
    ///
    /// # Panics
    ///
    /// Panics if the entry at index `i` is not a call.
    pub fn lift(&mut self, i: usize) -> (Entry<T>, Entry<T>) {
        let call = self.remove(i);
        let response = match &call {
            Entry::Call(entry) => self.index_of_id(entry.response),
            Entry::Response(entry) => panic!("Cannot lift response entry {}", entry.id),
        };
        let response = self.remove(response);
        (call, response)
    }

    /// Re-inserts a call and response previously removed with [`lift`](Self::lift),
    /// and returns their indices.
    pub fn unlift(&mut self, call: Entry<T>, response: Entry<T>) -> (usize, usize) {
        let response_index = self.insert(response);
        let call_index = self.insert(call);
        (call_index, response_index)
    }

    fn remove(&mut self, i: usize) -> Entry<T> {
        let entry = self.entries.remove(i);
        self.removed_from[entry.id()] = Some(i);
        entry
    }

    /// # Panics
    ///
    /// Panics if input entry was not previously removed from the history.
    fn insert(&mut self, entry: Entry<T>) -> usize {
        match self.removed_from[entry.id()].take() {
            Some(index) => {
                self.entries.insert(index, entry);
                index
            }
            None => panic!("Index that entry {} was removed from is unknown", entry.id()),
        }
    }
}

impl<T> Index<usize> for History<T> {
    type Output = Entry<T>;

    fn index(&self, i: usize) -> &Self::Output {
        self.entries.index(i)
    }
}
