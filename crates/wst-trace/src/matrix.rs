//! Column-major trace matrix
//!
//! The trace builders fill a plain column-major matrix of field elements;
//! downstream proving consumes it column by column. Rows are appended
//! zero-initialized and then set cell by cell, so builders never need to
//! know the final row count up front.

use wst_primitives::{Felt, FELT_ZERO};

#[derive(Debug, Clone, PartialEq)]
pub struct TraceMatrix {
    columns: Vec<Vec<Felt>>,
}

impl TraceMatrix {
    pub fn new(width: usize) -> Self {
        Self {
            columns: vec![Vec::new(); width],
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Append a zero row and return its index
    pub fn push_row(&mut self) -> usize {
        let row = self.num_rows();
        for column in &mut self.columns {
            column.push(FELT_ZERO);
        }
        row
    }

    pub fn set(&mut self, row: usize, col: usize, value: Felt) {
        self.columns[col][row] = value;
    }

    pub fn get(&self, row: usize, col: usize) -> Felt {
        self.columns[col][row]
    }

    pub fn column(&self, col: usize) -> &[Felt] {
        &self.columns[col]
    }
}
