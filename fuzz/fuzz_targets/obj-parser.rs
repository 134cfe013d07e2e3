#![no_main]

use libfuzzer_sys::fuzz_target;
use dirfield::io::obj;

fuzz_target!(|data: &[u8]| {
    // Only panics are interesting, errors are fine.
    let _ = obj::read(data);
});
