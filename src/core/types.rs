/*!
 * Core Types
 * Common types used across the crate
 */

/// Signal number type
///
/// Raw POSIX signal numbers, including real-time signals, are kept as plain
/// integers: the filter table is keyed by whatever number the caller
/// configured, not by a closed enum.
pub type Signo = i32;

/// Kernel thread ID type
pub type Tid = u64;

/// Address type for program counters and module bases
pub type Address = usize;

/// Timestamp in microseconds since the UNIX epoch
pub type Timestamp = u64;
