/// Default fuel level when fuel metering is enabled (100 million instructions)
pub const DEFAULT_FUEL_LEVEL: u64 = 100_000_000;
/// Minimum allowed fuel level (1 million instructions)
pub const MIN_FUEL_LEVEL: u64 = 1_000_000;
/// Maximum allowed fuel level (50 billion instructions); multi-megabyte documents need headroom
pub const MAX_FUEL_LEVEL: u64 = 50_000_000_000;
