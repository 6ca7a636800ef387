/*!
 * Unwinder FFI
 * Program-counter capture via the platform unwinder
 */

use std::os::raw::{c_int, c_void};

/// Opaque unwind context handed to the callback
#[repr(C)]
pub(super) struct UnwindContext {
    _opaque: [u8; 0],
}

const URC_NO_REASON: c_int = 0;
const URC_END_OF_STACK: c_int = 5;

type UnwindCallback = extern "C" fn(*mut UnwindContext, *mut c_void) -> c_int;

extern "C" {
    fn _Unwind_Backtrace(callback: UnwindCallback, arg: *mut c_void) -> c_int;
    fn _Unwind_GetIP(ctx: *mut UnwindContext) -> libc::uintptr_t;
}

struct CaptureState {
    pcs: *mut usize,
    len: usize,
    cap: usize,
}

extern "C" fn collect_frame(ctx: *mut UnwindContext, arg: *mut c_void) -> c_int {
    // SAFETY: arg is the CaptureState passed by capture_pcs on this thread.
    let state = unsafe { &mut *(arg as *mut CaptureState) };
    let pc = unsafe { _Unwind_GetIP(ctx) } as usize;
    if pc == 0 {
        return URC_NO_REASON;
    }
    if state.len == state.cap {
        return URC_END_OF_STACK;
    }
    // SAFETY: len < cap, pcs has cap elements.
    unsafe { *state.pcs.add(state.len) = pc };
    state.len += 1;
    URC_NO_REASON
}

/// Collect up to `buf.len()` program counters for the calling thread
///
/// Walks from the call site outward. Returns the number of frames written;
/// 0 when the stack cannot be walked at all. Does not allocate.
pub(super) fn capture_pcs(buf: &mut [usize]) -> usize {
    let mut state = CaptureState {
        pcs: buf.as_mut_ptr(),
        len: 0,
        cap: buf.len(),
    };
    // SAFETY: collect_frame only writes inside buf while state is live.
    unsafe { _Unwind_Backtrace(collect_frame, &mut state as *mut CaptureState as *mut c_void) };
    state.len
}
