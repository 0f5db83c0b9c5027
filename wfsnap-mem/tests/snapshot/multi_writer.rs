use std::sync::{Arc, Mutex};

use shuttle::rand::{thread_rng, Rng};
use shuttle::thread;
use wfsnap_mem::snapshot::{MultiWriterMutexSnapshot, MultiWriterSnapshot};
use wfsnap_mem::SnapshotConfig;
use wfsnap_mem::ProcessId;
use wfsnap_utils::{Action, History, SnapshotOperation, SnapshotSpecification, WGLChecker};

use Action::{Call, Response};
use SnapshotOperation::{Scan, Update};

use super::common::{
    RecordingSnapshot, SharedSnapshot, NUM_ITERATIONS, NUM_OPERATIONS, NUM_PREEMPTIONS,
    NUM_THREADS,
};

type SwapSnapshot = MultiWriterSnapshot<u32>;
type MutexSnapshot = MultiWriterMutexSnapshot<u32>;

type RecordedAction = (ProcessId, Action<SnapshotOperation<u32>>);

/// Fewer components than processes, so that processes contend for them.
const NUM_COMPONENTS: usize = 2;

fn config() -> SnapshotConfig {
    SnapshotConfig::new(NUM_COMPONENTS, NUM_THREADS)
}

fn assert_random_operations_are_linearizable<S: SharedSnapshot<Value = u32>>(snapshot: S) {
    let snapshot = Arc::new(RecordingSnapshot::new(snapshot));
    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|i| {
            let snapshot = snapshot.clone();
            thread::spawn(move || {
                let mut rng = thread_rng();
                for _ in 0..NUM_OPERATIONS {
                    snapshot.perform_random_operation(i, &mut rng);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    snapshot.assert_linearizable();
}

/// Two writers cycle through the components while the last process scans,
/// so a writer may rewrite a component in the middle of a collect.
fn assert_alternating_writers_are_linearizable<S: SharedSnapshot<Value = u32>>(snapshot: S) {
    const NUM_WRITES: usize = 4;
    const NUM_SCANS: usize = 3;

    let scanner = NUM_THREADS - 1;
    let snapshot = Arc::new(RecordingSnapshot::new(snapshot));
    let writers: Vec<_> = (0..scanner)
        .map(|i| {
            let snapshot = snapshot.clone();
            thread::spawn(move || {
                for n in 0..NUM_WRITES {
                    let value = (i * NUM_WRITES + n) as u32;
                    snapshot.update(i, (i + n) % NUM_COMPONENTS, value);
                }
            })
        })
        .collect();
    for _ in 0..NUM_SCANS {
        snapshot.scan(scanner);
    }

    for writer in writers {
        writer.join().unwrap();
    }

    snapshot.assert_linearizable();
}

#[test]
fn mutex_snapshot_is_linearizable() {
    shuttle::check_pct(
        || assert_random_operations_are_linearizable(MutexSnapshot::new(config()).unwrap()),
        NUM_ITERATIONS,
        NUM_PREEMPTIONS,
    );
}

#[test]
fn swap_snapshot_is_linearizable() {
    shuttle::check_pct(
        || assert_random_operations_are_linearizable(SwapSnapshot::new(config()).unwrap()),
        NUM_ITERATIONS,
        NUM_PREEMPTIONS,
    );
}

/// Threads identify themselves implicitly, through the snapshot's identity
/// registry, rather than passing process ids.
#[test]
fn implicit_identities_are_linearizable() {
    shuttle::check_pct(
        || {
            let snapshot = Arc::new(MutexSnapshot::new(config()).unwrap());
            let actions: Arc<Mutex<Vec<RecordedAction>>> = Arc::new(Mutex::new(Vec::new()));
            let handles: Vec<_> = (0..NUM_THREADS)
                .map(|_| {
                    let snapshot = snapshot.clone();
                    let actions = actions.clone();
                    thread::spawn(move || {
                        let mut rng = thread_rng();
                        let record = |action| actions.lock().unwrap().push(action);
                        // The first operation assigns this thread its identity. A
                        // scan leaves the state unchanged, so it need not be recorded.
                        snapshot.scan().unwrap();
                        let process = snapshot.identities().current().unwrap();
                        for _ in 0..NUM_OPERATIONS {
                            if rng.gen_bool(0.5) {
                                record((process, Call(Scan(process, None))));
                                let view = snapshot.scan().unwrap();
                                record((process, Response(Scan(process, Some(view)))));
                            } else {
                                let component = rng.gen_range(0..NUM_COMPONENTS);
                                let value = rng.gen_range(0..8);
                                record((process, Call(Update(component, value))));
                                snapshot.update(component, value).unwrap();
                                record((process, Response(Update(component, value))));
                            }
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }

            assert_eq!(snapshot.identities().assigned(), NUM_THREADS);
            let actions = actions.lock().unwrap().clone();
            let history = History::from_actions(actions);
            assert!(WGLChecker::is_linearizable(
                SnapshotSpecification::new(NUM_COMPONENTS),
                history
            ));
        },
        NUM_ITERATIONS,
        NUM_PREEMPTIONS,
    );
}

/// Every process hammers the same component while scanning, which maximises
/// the number of moves a scanner observes.
#[test]
fn scans_finish_within_bound_under_contention() {
    shuttle::check_random(
        || {
            let snapshot = Arc::new(RecordingSnapshot::new(
                MutexSnapshot::new(config()).unwrap(),
            ));
            let handles: Vec<_> = (0..NUM_THREADS)
                .map(|i| {
                    let snapshot = snapshot.clone();
                    thread::spawn(move || {
                        for value in 0..NUM_OPERATIONS as u32 {
                            snapshot.update(i, 0, value);
                            snapshot.scan(i);
                        }
                    })
                })
                .collect();
            for handle in handles {
                handle.join().unwrap();
            }
            snapshot.assert_linearizable();
        },
        NUM_ITERATIONS,
    );
}

#[test]
fn alternating_writers_on_mutex_snapshot_are_linearizable() {
    shuttle::check_pct(
        || assert_alternating_writers_are_linearizable(MutexSnapshot::new(config()).unwrap()),
        4 * NUM_ITERATIONS,
        NUM_PREEMPTIONS + 1,
    );
}

#[test]
fn alternating_writers_on_swap_snapshot_are_linearizable() {
    shuttle::check_pct(
        || assert_alternating_writers_are_linearizable(SwapSnapshot::new(config()).unwrap()),
        4 * NUM_ITERATIONS,
        NUM_PREEMPTIONS + 1,
    );
}

#[test]
fn alternating_writers_are_linearizable_under_random_schedules() {
    shuttle::check_random(
        || assert_alternating_writers_are_linearizable(SwapSnapshot::new(config()).unwrap()),
        4 * NUM_ITERATIONS,
    );
}
