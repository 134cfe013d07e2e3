#![no_main]

use libfuzzer_sys::fuzz_target;
use dirfield::io::off;

fuzz_target!(|data: &[u8]| {
    // Only panics are interesting, errors are fine.
    let _ = off::read(data);
});
