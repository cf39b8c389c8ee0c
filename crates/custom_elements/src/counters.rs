//! Optional counters for instrumentation.

#[derive(Clone, Debug, Default)]
pub struct Counters {
    pub definitions: u64,
    pub upgrades: u64,
    pub batches: u64,
    pub records: u64,
    pub reactions: u64,
    pub reaction_errors: u64,
}
