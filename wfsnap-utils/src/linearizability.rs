//! Checking [linearizability](https://en.wikipedia.org/wiki/Linearizability) of a
//! history of operations applied to a shared object.
//!
//! For more information, see the documentation of the [`WGLChecker`] and [`History`] structs.
use std::collections::HashSet;
use std::marker::PhantomData;

use crate::linearizability::history::{Entry, History};
use crate::specifications::Specification;

pub mod history;

/// A linearizability checker.
///
/// An implementation of the algorithm originally defined by Jeannette Wing and Chun Gong
/// [\[WG93\]](https://www.cs.cmu.edu/~wing/publications/WingGong93.pdf), and
/// extended by Gavin Lowe [\[L17\]](http://www.cs.ox.ac.uk/people/gavin.lowe/LinearizabiltyTesting/).
/// This particular implementation is based on the description given by Alex Horn
/// and Daniel Kroenig [\[HK15\]](https://arxiv.org/abs/1504.00204).
///
/// Given a history of operations, the algorithm works by linearizing each operation
/// as soon as possible. When an operation cannot be linearized, it backtracks and
/// proceeds with the next operation. Memoization occurs by caching each partial
/// linearization, and preventing the algorithm from continuing its search when it
/// is already known that the state of the object and remaining operations have no
/// valid linearization.
///
/// # Examples
///
/// Scans of a two-component snapshot object, modeled with
/// [`SnapshotSpecification`](crate::SnapshotSpecification). A scan is
/// called as `Scan(pid, None)` and responds with the view it returned.
///
/// ```
/// use wfsnap_utils::{Action::*, History, SnapshotOperation::*, SnapshotSpecification, WGLChecker};
///
/// let spec: SnapshotSpecification<u32> = SnapshotSpecification::new(2);
///
/// // A scan that overlaps an update may or may not observe it.
/// // P0 |---------------| Update(0, 5)
/// // P1    |---|          Scan -> [None, None]
/// // P1          |---|    Scan -> [5, None]
/// let history = History::from_actions(vec![
///     (0, Call(Update(0, 5))),
///     (1, Call(Scan(1, None))),
///     (1, Response(Scan(1, Some(vec![None, None])))),
///     (1, Call(Scan(1, None))),
///     (1, Response(Scan(1, Some(vec![Some(5), None])))),
///     (0, Response(Update(0, 5))),
/// ]);
/// assert!(WGLChecker::is_linearizable(spec, history));
///
/// // But once a scan has observed it, later scans must as well.
/// // P0 |---------------| Update(0, 5)
/// // P1    |---|          Scan -> [5, None]
/// // P1          |---|    Scan -> [None, None]
/// let history = History::from_actions(vec![
///     (0, Call(Update(0, 5))),
///     (1, Call(Scan(1, None))),
///     (1, Response(Scan(1, Some(vec![Some(5), None])))),
///     (1, Call(Scan(1, None))),
///     (1, Response(Scan(1, Some(vec![None, None])))),
///     (0, Response(Update(0, 5))),
/// ]);
/// assert!(!WGLChecker::is_linearizable(spec, history));
///
/// // Concurrent scans may not disagree about the order of two updates.
/// // P0 |-----------| Update(0, 1)
/// // P1 |-----------| Update(1, 2)
/// // P2   |-------|   Scan -> [1, None]
/// // P3   |-------|   Scan -> [None, 2]
/// let history = History::from_actions(vec![
///     (0, Call(Update(0, 1))),
///     (1, Call(Update(1, 2))),
///     (2, Call(Scan(2, None))),
///     (3, Call(Scan(3, None))),
///     (2, Response(Scan(2, Some(vec![Some(1), None])))),
///     (3, Response(Scan(3, Some(vec![None, Some(2)])))),
///     (0, Response(Update(0, 1))),
///     (1, Response(Update(1, 2))),
/// ]);
/// assert!(!WGLChecker::is_linearizable(spec, history));
/// ```
pub struct WGLChecker<S: Specification> {
    data_type: PhantomData<S>,
}

type OperationEntry<S> = Entry<<S as Specification>::Operation>;
type OperationCall<S> = (
    (OperationEntry<S>, OperationEntry<S>),
    <S as Specification>::State,
);

impl<S: Specification> WGLChecker<S> {
    /// Returns whether the history of operations is linearizable with respect to the specification.
    pub fn is_linearizable(spec: S, mut history: History<S::Operation>) -> bool {
        let mut state = spec.init();
        let mut linearized = vec![false; history.len()];
        let mut calls: Vec<OperationCall<S>> = Vec::new();
        let mut cache: HashSet<(Vec<bool>, S::State)> = HashSet::new();
        let mut curr = 0;
        loop {
            if history.is_empty() {
                return true;
            }
            match &history[curr] {
                Entry::Call(call) => {
                    let id = call.id;
                    let response = match &history[history.index_of_id(call.response)] {
                        Entry::Call(_) => panic!("Response cannot be a call entry"),
                        Entry::Response(response) => response,
                    };
                    let (is_valid, new_state) = spec.apply(&response.operation, &state);
                    let mut changed = false;
                    if is_valid {
                        let mut tmp_linearized = linearized.clone();
                        tmp_linearized[id] = true;
                        changed = cache.insert((tmp_linearized, new_state.clone()));
                    }
                    if changed {
                        linearized[id] = true;
                        let call = history.lift(curr);
                        calls.push((call, state));
                        state = new_state;
                        curr = 0;
                    } else {
                        curr += 1;
                    }
                }
                Entry::Response(_) => match calls.pop() {
                    None => return false,
                    Some(((call, response), old_state)) => {
                        state = old_state;
                        linearized[call.id()] = false;
                        let (call_index, _) = history.unlift(call, response);
                        curr = call_index + 1;
                    }
                },
            }
        }
    }
}
