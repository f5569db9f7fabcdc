use super::grid::{ParameterCombination, SweepParameter};
use super::outcome::Outcome;

#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub combination: ParameterCombination,
    pub outcome: Outcome,
}

/// Append-only accumulator filled while a sweep runs. Rows keep the order
/// in which they were pushed.
#[derive(Debug)]
pub struct ResultTable {
    parameters: Vec<SweepParameter>,
    rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn new(parameters: Vec<SweepParameter>) -> Self {
        Self::with_capacity(parameters, 0)
    }

    pub fn with_capacity(parameters: Vec<SweepParameter>, capacity: usize) -> Self {
        Self {
            parameters,
            rows: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, row: ResultRow) {
        debug_assert!(
            row.combination
                .entries()
                .iter()
                .map(|(p, _)| *p)
                .eq(self.parameters.iter().copied()),
            "row parameters must match the table columns"
        );
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn finalize(self) -> SweepReport {
        SweepReport {
            parameters: self.parameters,
            rows: self.rows,
        }
    }
}

/// Immutable result of a finished sweep, one row per combination in
/// iteration order.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepReport {
    parameters: Vec<SweepParameter>,
    rows: Vec<ResultRow>,
}

impl SweepReport {
    pub fn parameters(&self) -> &[SweepParameter] {
        &self.parameters
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn failure_count(&self) -> usize {
        self.rows.iter().filter(|r| r.outcome.is_failure()).count()
    }
}
