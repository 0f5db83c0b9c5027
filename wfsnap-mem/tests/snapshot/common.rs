use std::fmt::Debug;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

use rand::Rng;
use wfsnap_mem::register::Register;
use wfsnap_mem::snapshot::multi_writer::{self, MultiWriterContents};
use wfsnap_mem::snapshot::single_writer::{self, SingleWriterContents};
use wfsnap_mem::snapshot::{
    MultiWriterSnapshot, ProcessId, ScanReport, SingleWriterSnapshot, Snapshot, View,
};
use wfsnap_utils::{Action, History, SnapshotOperation, SnapshotSpecification, WGLChecker};

pub const NUM_ITERATIONS: usize = 250;
pub const NUM_OPERATIONS: usize = 20;
pub const NUM_PREEMPTIONS: usize = 3;
pub const NUM_THREADS: usize = 3;

/// The operations a test drives on a snapshot object, whichever variant it is.
pub trait SharedSnapshot: Send + Sync + 'static {
    type Value: Clone + Debug + Eq + Hash + Send;

    fn components(&self) -> usize;

    /// The largest number of double collects a scan may take.
    fn max_rounds(&self) -> usize;

    fn scan_with_report(&self, i: ProcessId) -> ScanReport<Self::Value>;

    /// The component that an update of `component` by process _i_ writes.
    fn target(&self, i: ProcessId, component: usize) -> usize;

    fn update(&self, i: ProcessId, component: usize, value: Self::Value);
}

impl<T, R> SharedSnapshot for SingleWriterSnapshot<T, R>
where
    T: Clone + Debug + Eq + Hash + Send + Sync + 'static,
    R: Register<Value = Arc<SingleWriterContents<T>>> + Send + Sync + 'static,
{
    type Value = T;

    fn components(&self) -> usize {
        self.processes()
    }

    fn max_rounds(&self) -> usize {
        single_writer::HELPING_BOUND * self.processes() + 1
    }

    fn scan_with_report(&self, i: ProcessId) -> ScanReport<T> {
        SingleWriterSnapshot::scan_with_report(self, i)
    }

    /// Process _i_ always writes its own component.
    fn target(&self, i: ProcessId, _component: usize) -> usize {
        i
    }

    fn update(&self, i: ProcessId, _component: usize, value: T) {
        Snapshot::update(self, i, value)
    }
}

impl<T, R> SharedSnapshot for MultiWriterSnapshot<T, R>
where
    T: Clone + Debug + Eq + Hash + Send + Sync + 'static,
    R: Register<Value = Arc<MultiWriterContents<T>>> + Send + Sync + 'static,
{
    type Value = T;

    fn components(&self) -> usize {
        self.config().components
    }

    fn max_rounds(&self) -> usize {
        multi_writer::HELPING_BOUND * self.config().processes + 1
    }

    fn scan_with_report(&self, i: ProcessId) -> ScanReport<T> {
        MultiWriterSnapshot::scan_with_report(self, i)
    }

    fn target(&self, _i: ProcessId, component: usize) -> usize {
        component
    }

    fn update(&self, i: ProcessId, component: usize, value: T) {
        self.update_as(i, component, value)
    }
}

type RecordedAction<T> = (ProcessId, Action<SnapshotOperation<T>>);

/// A snapshot that records the calls and responses of operations performed
/// on it.
///
/// Actions are appended under a lock, and a call is recorded before the
/// operation starts and its response after it ends, so the order of the
/// recording respects the real-time order of operations.
pub struct RecordingSnapshot<S: SharedSnapshot> {
    actions: Mutex<Vec<RecordedAction<S::Value>>>,
    snapshot: S,
}

impl<S: SharedSnapshot> RecordingSnapshot<S> {
    pub fn new(snapshot: S) -> Self {
        Self {
            actions: Mutex::new(vec![]),
            snapshot,
        }
    }

    pub fn components(&self) -> usize {
        self.snapshot.components()
    }

    fn record(&self, i: ProcessId, action: Action<SnapshotOperation<S::Value>>) {
        self.actions.lock().unwrap().push((i, action));
    }

    pub fn scan(&self, i: ProcessId) -> View<S::Value> {
        self.record(i, Action::Call(SnapshotOperation::Scan(i, None)));

        let report = self.snapshot.scan_with_report(i);
        assert!(
            report.rounds <= self.snapshot.max_rounds(),
            "scan took {} rounds, more than the bound of {}",
            report.rounds,
            self.snapshot.max_rounds()
        );

        let response = SnapshotOperation::Scan(i, Some(report.view.clone()));
        self.record(i, Action::Response(response));
        report.view
    }

    pub fn update(&self, i: ProcessId, component: usize, value: S::Value) {
        let component = self.snapshot.target(i, component);
        let operation = SnapshotOperation::Update(component, value.clone());
        self.record(i, Action::Call(operation.clone()));

        self.snapshot.update(i, component, value);

        self.record(i, Action::Response(operation));
    }

    /// Asserts that the recorded actions form a linearizable history of
    /// snapshot operations.
    ///
    /// # Panics
    ///
    /// Panics if the history of snapshot actions is not linearizable.
    pub fn assert_linearizable(&self) {
        let actions = self.actions.lock().unwrap().clone();
        let spec = SnapshotSpecification::new(self.snapshot.components());
        let history = History::from_actions(actions);
        assert!(WGLChecker::is_linearizable(spec, history));
    }
}

impl<S: SharedSnapshot<Value = u32>> RecordingSnapshot<S> {
    /// Performs either a scan or an update of a random component with a
    /// random value, with equal probability.
    pub fn perform_random_operation(&self, i: ProcessId, rng: &mut impl Rng) {
        const SCAN_PROBABILITY: f64 = 1.0 / 2.0;

        if rng.gen_bool(SCAN_PROBABILITY) {
            self.scan(i);
        } else {
            let component = rng.gen_range(0..self.snapshot.components());
            let value = rng.gen_range(0..8);
            self.update(i, component, value);
        }
    }
}
