//! AFL++ custom-mutator C ABI.
//!
//! Four `extern "C"` entry points, named and shaped per AFL++'s
//! custom-mutator convention. `afl_custom_init` builds the process
//! singleton; `afl_custom_fuzz` (and its `afl_custom_havoc_mutation`
//! alias) delegate to [`crate::mutate::mutate_stream`]; `afl_custom_deinit`
//! drops the reusable output buffer.

use std::os::raw::c_void;
use std::sync::Mutex;

use crate::mutate::mutate_stream;
use crate::session::Session;

struct FuzzBuffer {
    bytes: Vec<u8>,
}

static OUT_BUFFER: Mutex<Option<FuzzBuffer>> = Mutex::new(None);

/// Construct the mutator singleton. Returns 0 on success; any failure
/// to load config or schema is fatal and aborts the process, since the
/// fuzzer session cannot proceed without a schema.
///
/// # Safety
/// `_afl` is an opaque host pointer; it is never dereferenced here.
#[no_mangle]
pub unsafe extern "C" fn afl_custom_init(_afl: *mut c_void) -> i32 {
    match Session::init() {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("isa-mutator: fatal init error: {err}");
            std::process::abort();
        }
    }
}

/// Mutate `buf[0..n)` into a reused output buffer, writing its pointer
/// to `*out_buf` and returning its length.
///
/// # Safety
/// `buf` must point to at least `n` readable bytes (or be null when
/// `n == 0`); `out_buf` must point to a writable `*mut u8`.
#[no_mangle]
pub unsafe extern "C" fn afl_custom_fuzz(
    _afl: *mut c_void,
    buf: *mut u8,
    n: usize,
    out_buf: *mut *mut u8,
    max: usize,
) -> usize {
    let session = match Session::get() {
        Some(session) => session,
        None => {
            if !out_buf.is_null() {
                *out_buf = std::ptr::null_mut();
            }
            return 0;
        }
    };

    let input: &[u8] = if buf.is_null() || n == 0 {
        &[]
    } else {
        std::slice::from_raw_parts(buf, n)
    };

    let mut guard = OUT_BUFFER.lock().unwrap();
    let slot = guard.get_or_insert_with(|| FuzzBuffer { bytes: Vec::new() });

    let len = session
        .with_prng(|prng| mutate_stream(input, &mut slot.bytes, max, &session.isa, &session.config, prng));
    session.record_out_len(len);

    if !out_buf.is_null() {
        *out_buf = slot.bytes.as_mut_ptr();
    }
    len
}

/// Alias required by the AFL++ custom-mutator ABI.
///
/// # Safety
/// Same contract as [`afl_custom_fuzz`].
#[no_mangle]
pub unsafe extern "C" fn afl_custom_havoc_mutation(
    afl: *mut c_void,
    buf: *mut u8,
    n: usize,
    out_buf: *mut *mut u8,
    max: usize,
) -> usize {
    afl_custom_fuzz(afl, buf, n, out_buf, max)
}

/// Release the reusable output buffer.
#[no_mangle]
pub extern "C" fn afl_custom_deinit() {
    OUT_BUFFER.lock().unwrap().take();
}
