// ABOUTME: Version and interpreter limits shared across the crate

/// Version reported by the command line interface.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Largest source file the driver will read, in bytes.
pub const MAX_SOURCE_BYTES: u64 = 10 * 1024 * 1024;

/// Maximum number of parameters a function may declare, and the maximum
/// number of arguments a call may pass.
pub const MAX_CALL_ARGS: usize = 255;
