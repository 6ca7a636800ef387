/*!
 * Frame Resolution
 * pc → (module, offset, symbol) lookup against loaded images
 */

use super::types::{Backtrace, RawBacktrace, RawFrame, MAX_FRAMES};
use super::unwind;
use crate::core::types::Address;
use std::mem;
use std::os::raw::c_void;

/// Resolve a single program counter against the loaded module images
///
/// Module identity comes from the load-address range (`dli_fname` /
/// `dli_fbase`), so it survives stripped binaries; the symbol is best
/// effort. Returns an unresolved frame when the address belongs to no
/// image. Signal-safe: no allocation, no locking.
pub fn resolve_pc(pc: Address) -> RawFrame {
    // SAFETY: dladdr fills info on success and only reads the address.
    let mut info: libc::Dl_info = unsafe { mem::zeroed() };
    let rc = unsafe { libc::dladdr(pc as *const c_void, &mut info) };
    if rc == 0 {
        return RawFrame::unresolved(pc);
    }
    RawFrame {
        pc,
        module: info.dli_fname,
        base: info.dli_fbase as Address,
        symbol: info.dli_sname,
    }
}

/// Capture and resolve the calling thread's stack into `bt`
///
/// Appends at most [`MAX_FRAMES`] frames, innermost first. A corrupted
/// stack yields an empty backtrace, never an error. Signal-safe.
pub fn capture_into(bt: &mut RawBacktrace) {
    let mut pcs = [0usize; MAX_FRAMES];
    let count = unwind::capture_pcs(&mut pcs);
    for &pc in &pcs[..count] {
        if !bt.push(resolve_pc(pc)) {
            break;
        }
    }
}

/// Capture the calling thread's stack as an owned backtrace
///
/// Convenience for reporting and tests; allocates, so not for handler
/// context.
pub fn capture() -> Backtrace {
    let mut bt = RawBacktrace::empty();
    capture_into(&mut bt);
    bt.materialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_own_stack() {
        let bt = capture();
        assert!(!bt.is_empty());
        assert!(bt.len() <= MAX_FRAMES);
    }

    #[test]
    fn resolves_own_code_to_a_module() {
        let pc = resolves_own_code_to_a_module as usize;
        let frame = resolve_pc(pc);
        // Our own code must resolve to some loaded image.
        assert!(frame.module_bytes().is_some());
    }
}
