#![no_main]

use libfuzzer_sys::fuzz_target;
use ksmscope::KsmFile;

fuzz_target!(|data: &[u8]| {
    let _ = KsmFile::parse(data);
});
