//! Single-writer snapshot objects, as described in Section 4 of
//! Afek, Attiya, Dolev, Gafni, Merritt and Shavit
//! [[AAD+93]](https://dl.acm.org/doi/10.1145/153724.153741).
//!
//! Each of the `N` processes owns one component. A scan repeatedly performs a
//! _double collect_ of all registers. If no process moved between the two
//! collects, the second is a consistent view. A process that is seen moving
//! twice must have completed an update during the scan, and the view it
//! embedded in that update is returned instead.
use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use crate::config::SnapshotConfig;
use crate::error::Result;
use crate::handshake::HandshakeMatrix;
use crate::register::{MutexRegister, Register, SwapRegister};
use crate::snapshot::{check_index, ProcessId, ScanReport, Snapshot, View, ViewSource};

/// How many earlier moves of a process a scanner tolerates before it borrows
/// that process's view.
pub const HELPING_BOUND: usize = 1;

/// A single-writer snapshot backed by [`MutexRegister`] objects.
///
/// This snapshot is **not** lock-free. See [`SingleWriterSnapshot`].
pub type SingleWriterMutexSnapshot<T> =
    SingleWriterSnapshot<T, MutexRegister<SingleWriterContents<T>>>;

/// The contents of the register owned by one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleWriterContents<T> {
    value: Option<T>,
    view: View<T>,
    handshakes: Box<[bool]>,
    toggle: bool,
}

impl<T> SingleWriterContents<T> {
    fn initial(processes: usize) -> Self {
        Self {
            value: None,
            view: (0..processes).map(|_| None).collect(),
            handshakes: vec![false; processes].into_boxed_slice(),
            toggle: false,
        }
    }

    /// The most recently published value, if any.
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The view obtained by the scan embedded in the update that wrote these
    /// contents.
    pub fn view(&self) -> &[Option<T>] {
        &self.view
    }

    /// The handshake bit the writer announced to process _i_.
    pub fn handshake(&self, i: ProcessId) -> bool {
        self.handshakes[i]
    }

    pub fn toggle(&self) -> bool {
        self.toggle
    }
}

/// A wait-free `N`-process single-writer snapshot object.
///
/// Every `scan` finishes after at most `N + 1` double collects, and every
/// `update` performs one embedded scan. If the register type `R` is
/// linearizable then so is the snapshot.
///
/// # Examples
///
/// ```
/// use wfsnap_mem::snapshot::{SingleWriterSnapshot, Snapshot};
///
/// let snapshot: SingleWriterSnapshot<u32> = SingleWriterSnapshot::new(3).unwrap();
/// snapshot.update(0, 10);
/// snapshot.update(1, 20);
/// snapshot.update(2, 30);
/// assert_eq!(snapshot.scan(1), vec![Some(10), Some(20), Some(30)]);
/// ```
pub struct SingleWriterSnapshot<T, R = SwapRegister<SingleWriterContents<T>>> {
    registers: Box<[R]>,
    // observed[i][j] is process i's copy of the handshake bit j announced to it.
    observed: HandshakeMatrix,
    _value: PhantomData<T>,
}

impl<T, R> SingleWriterSnapshot<T, R>
where
    T: Clone,
    R: Register<Value = Arc<SingleWriterContents<T>>>,
{
    /// Creates a snapshot object for `processes` processes, each owning one
    /// component.
    pub fn new(processes: usize) -> Result<Self> {
        SnapshotConfig::new(processes, processes).validate()?;
        let initial = Arc::new(SingleWriterContents::initial(processes));
        Ok(Self {
            registers: (0..processes).map(|_| R::new(initial.clone())).collect(),
            observed: HandshakeMatrix::new(processes, processes),
            _value: PhantomData,
        })
    }

    pub fn processes(&self) -> usize {
        self.registers.len()
    }

    fn collect(&self) -> Vec<Arc<SingleWriterContents<T>>> {
        self.registers.iter().map(|r| r.read()).collect()
    }

    /// Copies the handshake bit that every process has announced to process
    /// _i_ into _i_'s observed bits.
    fn handshake(&self, i: ProcessId) {
        for (j, register) in self.registers.iter().enumerate() {
            self.observed.write(i, j, register.read().handshake(i));
        }
    }

    /// Returns whether process _i_ has seen process _j_ move while performing
    /// a double collect.
    ///
    /// A process _moves_ by changing its handshake bits or its toggle bit when
    /// performing an update operation.
    fn has_moved(
        &self,
        first: &[Arc<SingleWriterContents<T>>],
        second: &[Arc<SingleWriterContents<T>>],
        i: ProcessId,
        j: ProcessId,
    ) -> bool {
        let observed = self.observed.read(i, j);
        let first_changed = first[j].handshake(i) != observed;
        let second_changed = second[j].handshake(i) != observed;
        let toggle_changed = first[j].toggle != second[j].toggle;
        first_changed || second_changed || toggle_changed
    }

    /// Scans the object on behalf of process _i_, and reports how the scan
    /// terminated.
    ///
    /// # Panics
    ///
    /// Panics if `i` is not a process of this object.
    pub fn scan_with_report(&self, i: ProcessId) -> ScanReport<T> {
        let n = self.processes();
        check_index("process", i, n);
        let mut moved = vec![0; n];
        let mut rounds = 0;
        loop {
            rounds += 1;
            self.handshake(i);
            let first = self.collect();
            let second = self.collect();
            let movers: Vec<ProcessId> = (0..n)
                .filter(|&j| self.has_moved(&first, &second, i, j))
                .collect();
            // If nobody moved then no update was performed during the double
            // collect, and the second collect is a consistent view.
            if movers.is_empty() {
                return ScanReport {
                    view: second.iter().map(|c| c.value.clone()).collect(),
                    rounds,
                    source: ViewSource::Collected,
                };
            }
            for j in movers {
                if moved[j] == HELPING_BOUND {
                    // Process j has moved twice, so it completed an update that
                    // began after this scan did. The view it embedded is valid here.
                    trace!(scanner = i, helper = j, rounds, "borrowed view");
                    return ScanReport {
                        view: second[j].view.clone(),
                        rounds,
                        source: ViewSource::Borrowed(j),
                    };
                }
                moved[j] += 1;
            }
        }
    }
}

impl<T, R> Snapshot for SingleWriterSnapshot<T, R>
where
    T: Clone,
    R: Register<Value = Arc<SingleWriterContents<T>>>,
{
    type Value = T;

    fn components(&self) -> usize {
        self.processes()
    }

    fn scan(&self, i: ProcessId) -> View<T> {
        self.scan_with_report(i).view
    }

    /// Replaces the contents of the _i^{th}_ register with the new value, the
    /// result of an embedded scan, and negated handshake and toggle bits.
    fn update(&self, i: ProcessId, value: T) {
        let n = self.processes();
        check_index("process", i, n);
        let handshakes = (0..n).map(|j| !self.observed.read(j, i)).collect();
        let view = self.scan(i);
        let toggle = !self.registers[i].read().toggle;
        self.registers[i].write(Arc::new(SingleWriterContents {
            value: Some(value),
            view,
            handshakes,
            toggle,
        }));
    }
}
