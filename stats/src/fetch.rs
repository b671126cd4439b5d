use serde::{Deserialize, Serialize};

/// Instruction fetch port statistics.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fetch {
    /// Number of instruction cache requests sent (including refused ones).
    pub requests: u64,
    /// Number of retry signals received from the instruction port.
    pub retries: u64,
}

impl std::ops::AddAssign for Fetch {
    fn add_assign(&mut self, other: Self) {
        self.requests += other.requests;
        self.retries += other.retries;
    }
}
