//! Period-windowed stream access
//!
//! A window caches the index of the first record whose tick reaches the
//! period's `index0`. Each iteration starts a new cursor there and stops at
//! the first tick past `index1`. Ticks are assumed non-decreasing within a
//! stream.

use crate::cursor::{seek_tick, Projection, Values};
use crate::error::Result;
use crate::inventory::{InventoriedStream, MemberKey};

use super::{Period, PeriodIndex};

/// An inventoried stream restricted to one period
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    stream: InventoriedStream<'a>,
    period: &'a Period,
    start: usize,
}

impl<'a> Window<'a> {
    pub fn new(stream: InventoriedStream<'a>, period: &'a Period) -> Self {
        let start = seek_tick(stream.records(), period.index0 as f64);
        Self {
            stream,
            period,
            start,
        }
    }

    pub fn period(&self) -> &'a Period {
        self.period
    }

    pub fn stream(&self) -> InventoriedStream<'a> {
        self.stream
    }

    /// Index of the first record inside the window
    pub fn start_index(&self) -> usize {
        self.start
    }

    /// Ticks inside the window
    pub fn time(&self) -> Values<'a> {
        self.cursor(Projection::Tick)
    }

    /// One member (or the whole payload) of every record inside the window
    pub fn member<'k>(&self, key: impl Into<MemberKey<'k>>) -> Result<Values<'a>> {
        let projection = self.stream.resolve(key.into())?;
        Ok(self.cursor(projection))
    }

    fn cursor(&self, projection: Projection) -> Values<'a> {
        Values::bounded(
            self.stream.records(),
            self.start,
            self.period.index1 as f64,
            projection,
        )
    }
}

/// An inventoried stream together with the period catalogue
#[derive(Debug, Clone, Copy)]
pub struct TaggedStream<'a> {
    stream: InventoriedStream<'a>,
    periods: &'a PeriodIndex,
}

impl<'a> TaggedStream<'a> {
    pub(crate) fn new(stream: InventoriedStream<'a>, periods: &'a PeriodIndex) -> Self {
        Self { stream, periods }
    }

    /// The unwindowed stream
    pub fn inventoried(&self) -> InventoriedStream<'a> {
        self.stream
    }

    /// Restrict the stream to the period named `name`
    pub fn window(&self, name: &str) -> Result<Window<'a>> {
        let period = self.periods.get(name)?;
        Ok(Window::new(self.stream, period))
    }

    /// Values of `key`, windowed to `period` when one is given
    pub fn get<'k>(&self, period: Option<&str>, key: impl Into<MemberKey<'k>>) -> Result<Values<'a>> {
        match period {
            Some(name) => self.window(name)?.member(key),
            None => self.stream.member(key),
        }
    }

    /// Ticks, windowed to `period` when one is given
    pub fn time(&self, period: Option<&str>) -> Result<Values<'a>> {
        match period {
            Some(name) => Ok(self.window(name)?.time()),
            None => Ok(self.stream.time()),
        }
    }
}
