//! Handshake bits between scanners and writers.
//!
//! A handshake bit carries no data. A scanner copies a writer's bit before it
//! starts observing registers, and a writer negates the scanner's copy when it
//! begins an update. If the two bits differ when the scanner looks again, the
//! writer has started an update in the meantime.
//!
//! Every cell is an independent atomic boolean. The matrix is never read or
//! written as a whole; consistency comes from the order in which a scanner
//! reads individual cells around its collects.
use crate::snapshot::ProcessId;
use crate::sync::{AtomicBool, Ordering};

/// A `rows × cols` grid of atomic booleans.
#[derive(Debug)]
pub struct HandshakeMatrix {
    cols: usize,
    cells: Box<[AtomicBool]>,
}

impl HandshakeMatrix {
    /// Creates a matrix with every bit cleared.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            cols,
            cells: (0..rows * cols).map(|_| AtomicBool::new(false)).collect(),
        }
    }

    fn cell(&self, row: usize, col: usize) -> &AtomicBool {
        assert!(
            col < self.cols,
            "column {col} out of range for {} columns",
            self.cols
        );
        &self.cells[row * self.cols + col]
    }

    pub fn read(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).load(Ordering::SeqCst)
    }

    pub fn write(&self, row: usize, col: usize, bit: bool) {
        self.cell(row, col).store(bit, Ordering::SeqCst)
    }
}

/// Handshake bits for a multi-writer snapshot with `n` processes.
///
/// `announced[j][i]` is written by process _j_ when it starts an update, and
/// `observed[i][j]` is written by process _i_ when it starts a round of a
/// scan. Process _i_ has seen _j_ move whenever the two differ.
#[derive(Debug)]
pub struct Handshakes {
    processes: usize,
    announced: HandshakeMatrix,
    observed: HandshakeMatrix,
}

impl Handshakes {
    pub fn new(processes: usize) -> Self {
        Self {
            processes,
            announced: HandshakeMatrix::new(processes, processes),
            observed: HandshakeMatrix::new(processes, processes),
        }
    }

    /// Copies the bit that `writer` announced for `scanner` into the
    /// scanner's observed bits, and returns it.
    pub fn touch(&self, scanner: ProcessId, writer: ProcessId) -> bool {
        let bit = self.announced.read(writer, scanner);
        self.observed.write(scanner, writer, bit);
        bit
    }

    /// Returns the bit that `writer` currently announces to `scanner`.
    pub fn read(&self, scanner: ProcessId, writer: ProcessId) -> bool {
        self.announced.read(writer, scanner)
    }

    /// Announces that `writer` has started an update, to every scanner.
    pub fn announce(&self, writer: ProcessId) {
        for scanner in 0..self.processes {
            let observed = self.observed.read(scanner, writer);
            self.announced.write(writer, scanner, !observed);
        }
    }
}
