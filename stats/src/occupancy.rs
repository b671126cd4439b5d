use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("block slot {slot} out of range (core has {num_slots} block slots)")]
    InvalidSlot { slot: usize, num_slots: usize },

    #[error("block slot {slot} issued while already active")]
    AlreadyActive { slot: usize },

    #[error("block slot {slot} committed while not active")]
    NotActive { slot: usize },
}

/// Activity of the hardware block (CTA) slots of a core.
///
/// Every slot keeps an append-only list of the ticks at which it
/// became active or inactive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupancy {
    active: Vec<bool>,
    num_active: usize,
    history: BTreeMap<usize, Vec<u64>>,
}

impl Occupancy {
    #[must_use]
    pub fn new(num_slots: usize) -> Self {
        Self {
            active: vec![false; num_slots],
            num_active: 0,
            history: BTreeMap::new(),
        }
    }

    fn check_slot(&self, slot: usize) -> Result<(), Error> {
        if slot >= self.active.len() {
            return Err(Error::InvalidSlot {
                slot,
                num_slots: self.active.len(),
            });
        }
        Ok(())
    }

    /// Marks `slot` active at `tick`.
    ///
    /// Returns `true` if the core had no active block before.
    pub fn activate(&mut self, slot: usize, tick: u64) -> Result<bool, Error> {
        self.check_slot(slot)?;
        if self.active[slot] {
            return Err(Error::AlreadyActive { slot });
        }
        self.active[slot] = true;
        self.history.entry(slot).or_default().push(tick);
        self.num_active += 1;
        Ok(self.num_active == 1)
    }

    /// Marks `slot` inactive at `tick`.
    ///
    /// Returns `true` if this was the last active block of the core.
    pub fn deactivate(&mut self, slot: usize, tick: u64) -> Result<bool, Error> {
        self.check_slot(slot)?;
        if !self.active[slot] {
            return Err(Error::NotActive { slot });
        }
        self.active[slot] = false;
        self.history.entry(slot).or_default().push(tick);
        self.num_active -= 1;
        Ok(self.num_active == 0)
    }

    #[must_use]
    pub fn is_active(&self, slot: usize) -> bool {
        self.active.get(slot).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn num_active(&self) -> usize {
        self.num_active
    }

    #[must_use]
    pub fn history(&self) -> &BTreeMap<usize, Vec<u64>> {
        &self.history
    }

    /// Writes one row per slot with history: `core_id, slot, t0, t1, ..., now`.
    pub fn write_csv<W: std::io::Write>(
        &self,
        core_id: usize,
        now: u64,
        writer: W,
    ) -> csv::Result<()> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(writer);
        for (slot, ticks) in &self.history {
            let mut record = vec![core_id.to_string(), slot.to_string()];
            record.extend(ticks.iter().map(u64::to_string));
            record.push(now.to_string());
            writer.write_record(&record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
