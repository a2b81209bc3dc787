use strata_backend::Service;

use crate::error::{Error, Result};

/// Deterministic chunk-to-backend assignment.
///
/// A fixed slot table is indexed by `chunk_index % slots.len()`. The
/// ratios are policy, not structure: any non-empty table works, and the
/// assignment only has to be self-consistent within one upload; downloads
/// read the service from the stored chunk record, never from this table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionTable {
    slots: Vec<Service>,
}

impl PartitionTable {
    pub fn new(slots: Vec<Service>) -> Result<Self> {
        if slots.is_empty() {
            return Err(Error::EmptyPartitionTable);
        }
        Ok(Self { slots })
    }

    /// Drop slots whose service is not in `available`, keeping the
    /// remaining ratios. Used to confine uploads to configured backends.
    pub fn restricted_to(&self, available: &[Service]) -> Result<Self> {
        Self::new(
            self.slots
                .iter()
                .copied()
                .filter(|s| available.contains(s))
                .collect(),
        )
    }

    pub fn service_for(&self, index: u32) -> Service {
        self.slots[index as usize % self.slots.len()]
    }

    pub fn slots(&self) -> &[Service] {
        &self.slots
    }
}

impl Default for PartitionTable {
    /// The stock 40/20/40 split, with pinata on the single 20% slot.
    fn default() -> Self {
        Self {
            slots: vec![
                Service::Web3Storage,
                Service::Web3Storage,
                Service::Pinata,
                Service::NftStorage,
                Service::NftStorage,
            ],
        }
    }
}
