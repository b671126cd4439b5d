use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Memory spaces that loads and stores are classified by.
///
/// Only spaces a core can legally access are listed here.
/// Classifying an instruction into one of these is done by the core.
#[derive(
    Debug,
    strum::EnumIter,
    strum::Display,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
)]
pub enum MemorySpace {
    Local,
    Shared,
    /// global to all threads in a kernel (read-only)
    ParamKernel,
    /// local to a thread (read-writable)
    ParamLocal,
    Constant,
    Texture,
    Surface,
    Global,
    /// generic spaces (global, shared, local)
    Generic,
}

/// Load and store counts per memory space.
///
/// Keyed by `(space, is_store)`.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accesses(pub HashMap<(MemorySpace, bool), u64>);

impl std::ops::AddAssign for Accesses {
    fn add_assign(&mut self, other: Self) {
        for (key, count) in other.0 {
            *self.0.entry(key).or_insert(0) += count;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    pub core_id: usize,
    pub memory_space: MemorySpace,
    pub is_store: bool,
    pub accesses: u64,
}

impl Accesses {
    #[must_use]
    pub fn into_inner(self) -> HashMap<(MemorySpace, bool), u64> {
        self.0
    }

    pub fn inc(&mut self, space: impl Into<MemorySpace>, is_store: bool, count: u64) {
        *self.0.entry((space.into(), is_store)).or_insert(0) += count;
    }

    #[must_use]
    pub fn num_loads(&self, space: MemorySpace) -> u64 {
        self.0.get(&(space, false)).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn num_stores(&self, space: MemorySpace) -> u64 {
        self.0.get(&(space, true)).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_loads(&self) -> u64 {
        self.0
            .iter()
            .filter(|((_, is_store), _)| !is_store)
            .map(|(_, count)| count)
            .sum()
    }

    #[must_use]
    pub fn total_stores(&self) -> u64 {
        self.0
            .iter()
            .filter(|((_, is_store), _)| *is_store)
            .map(|(_, count)| count)
            .sum()
    }

    #[must_use]
    pub fn into_csv_rows(self, core_id: usize) -> Vec<CsvRow> {
        let mut rows: Vec<_> = self
            .0
            .into_iter()
            .map(|((memory_space, is_store), accesses)| CsvRow {
                core_id,
                memory_space,
                is_store,
                accesses,
            })
            .collect();
        rows.sort_by_key(|row| (row.memory_space, row.is_store));
        rows
    }
}

impl std::fmt::Debug for Accesses {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let mut accesses: Vec<_> = self
            .0
            .iter()
            .filter(|(_, &count)| count > 0)
            .map(|((space, is_store), count)| {
                (
                    format!("{:?}[{}]", space, if *is_store { "STORE" } else { "LOAD" }),
                    count,
                )
            })
            .collect();
        accesses.sort_by_key(|(key, _)| key.clone());

        let mut out = f.debug_struct("Accesses");
        for (key, count) in accesses {
            out.field(&key, count);
        }
        out.finish_non_exhaustive()
    }
}

impl std::ops::Deref for Accesses {
    type Target = HashMap<(MemorySpace, bool), u64>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
