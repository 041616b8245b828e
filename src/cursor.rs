//! Restartable record cursors
//!
//! A [`Values`] cursor walks a slice of records from a start index and
//! projects each record onto its tick, its whole payload, or one payload
//! member. Restarting means asking the owner for a fresh cursor at the same
//! start index; cursors are also `Clone`.

use crate::value::{Value, NIL};

/// Which part of a `(tick, payload)` record a cursor yields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Element 0 of the record
    Tick,
    /// Element 1 of the record, whole
    Payload,
    /// Element `n` of the payload
    Member(usize),
}

impl Projection {
    /// Project `record`, yielding `Nil` when the record has no such part
    pub fn apply(self, record: &Value) -> &Value {
        let found = match self {
            Projection::Tick => record.element(0),
            Projection::Payload => record.element(1),
            Projection::Member(n) => record.element(1).and_then(|p| p.element(n)),
        };
        found.unwrap_or(&NIL)
    }
}

/// Numeric tick of a record, if it has one
pub fn tick_of(record: &Value) -> Option<f64> {
    record.element(0).and_then(Value::as_f64)
}

/// Index of the first record whose tick is `>= lower`, or `records.len()`
pub(crate) fn seek_tick(records: &[Value], lower: f64) -> usize {
    records
        .iter()
        .position(|r| matches!(tick_of(r), Some(t) if t >= lower))
        .unwrap_or(records.len())
}

/// Lazy, finite sequence of projected record values
#[derive(Debug, Clone)]
pub struct Values<'a> {
    records: &'a [Value],
    position: usize,
    /// Stop at the first tick above this bound
    upper: Option<f64>,
    projection: Projection,
}

impl<'a> Values<'a> {
    /// Every record from `start` to the end
    pub(crate) fn new(records: &'a [Value], start: usize, projection: Projection) -> Self {
        Self {
            records,
            position: start,
            upper: None,
            projection,
        }
    }

    /// Records from `start` while their tick stays `<= upper`
    pub(crate) fn bounded(
        records: &'a [Value],
        start: usize,
        upper: f64,
        projection: Projection,
    ) -> Self {
        Self {
            records,
            position: start,
            upper: Some(upper),
            projection,
        }
    }

    pub fn projection(&self) -> Projection {
        self.projection
    }
}

impl<'a> Iterator for Values<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = self.records.get(self.position)?;
            self.position += 1;

            if let Some(upper) = self.upper {
                match tick_of(record) {
                    Some(tick) if tick > upper => {
                        self.position = self.records.len();
                        return None;
                    }
                    Some(_) => {}
                    // Records without a numeric tick are never inside a window
                    None => continue,
                }
            }

            return Some(self.projection.apply(record));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.records.len().saturating_sub(self.position);
        match self.upper {
            Some(_) => (0, Some(remaining)),
            None => (remaining, Some(remaining)),
        }
    }
}
