/*!
 * Trace Types
 * Raw (signal-safe) and materialized backtrace representations
 */

use crate::core::types::Address;
use serde::{Deserialize, Serialize};
use std::ffi::CStr;
use std::fmt;
use std::os::raw::c_char;
use std::ptr;

/// Upper bound on captured stack frames
///
/// Unwinding stops here so a fault is resolved in bounded time.
pub const MAX_FRAMES: usize = 64;

/// One raw frame as captured in handler context
///
/// `module` and `symbol` point into the loader's own structures (as returned
/// by `dladdr`) and stay valid while the owning module remains loaded; no
/// allocation is involved. Frame 0 is the innermost frame, closest to the
/// fault.
#[derive(Clone, Copy)]
pub struct RawFrame {
    /// Program counter
    pub pc: Address,
    /// Module path, null if the address resolved to no loaded module
    pub module: *const c_char,
    /// Module load base, 0 if unknown
    pub base: Address,
    /// Nearest dynamic symbol, null if none
    pub symbol: *const c_char,
}

impl RawFrame {
    /// A frame whose pc resolved to nothing
    pub fn unresolved(pc: Address) -> Self {
        Self {
            pc,
            module: ptr::null(),
            base: 0,
            symbol: ptr::null(),
        }
    }

    /// Module path as bytes, without allocating
    pub fn module_bytes(&self) -> Option<&[u8]> {
        if self.module.is_null() {
            return None;
        }
        // SAFETY: non-null module points at a NUL-terminated loader string
        // that outlives the capture.
        Some(unsafe { CStr::from_ptr(self.module) }.to_bytes())
    }

    /// Symbol name as bytes, without allocating
    pub fn symbol_bytes(&self) -> Option<&[u8]> {
        if self.symbol.is_null() {
            return None;
        }
        // SAFETY: as for module_bytes.
        Some(unsafe { CStr::from_ptr(self.symbol) }.to_bytes())
    }

    /// Module-relative offset of the pc, best effort
    pub fn offset(&self) -> Address {
        if self.base == 0 || self.base > self.pc {
            return self.pc;
        }
        self.pc - self.base
    }

    fn materialize(&self) -> Frame {
        Frame {
            pc: self.pc,
            module: self
                .module_bytes()
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default(),
            offset: self.offset(),
            symbol: self
                .symbol_bytes()
                .map(|b| String::from_utf8_lossy(b).into_owned()),
        }
    }
}

/// Fixed-capacity backtrace captured at fault time
///
/// A point-in-time snapshot, innermost frame first. Lives on the handler
/// stack; never allocates.
pub struct RawBacktrace {
    frames: [RawFrame; MAX_FRAMES],
    len: usize,
}

impl RawBacktrace {
    pub fn empty() -> Self {
        Self {
            frames: [RawFrame::unresolved(0); MAX_FRAMES],
            len: 0,
        }
    }

    /// Append a frame; returns false once capacity is reached
    pub fn push(&mut self, frame: RawFrame) -> bool {
        if self.len == MAX_FRAMES {
            return false;
        }
        self.frames[self.len] = frame;
        self.len += 1;
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &RawFrame> {
        self.frames[..self.len].iter()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Materialize into an owned backtrace (allocates; keep off the
    /// propagate path)
    pub fn materialize(&self) -> Backtrace {
        Backtrace {
            frames: self.iter().map(RawFrame::materialize).collect(),
        }
    }
}

impl Default for RawBacktrace {
    fn default() -> Self {
        Self::empty()
    }
}

/// One resolved, owned stack frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Program counter
    pub pc: Address,
    /// Owning module path ("" if unresolved)
    pub module: String,
    /// Module-relative offset of the pc
    pub offset: Address,
    /// Nearest dynamic symbol, if any
    pub symbol: Option<String>,
}

/// Owned backtrace, innermost frame first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backtrace {
    frames: Vec<Frame>,
}

impl Backtrace {
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl fmt::Display for Backtrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, frame) in self.frames.iter().enumerate() {
            writeln!(
                f,
                "  #{} at {}: {:#x}  {}",
                idx,
                frame.module,
                frame.pc,
                frame.symbol.as_deref().unwrap_or("")
            )?;
        }
        Ok(())
    }
}
