#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use rescert::{Cert, Options};

fuzz_target!(|data: &[u8]| {
    let (which, mut data) = match data.split_first() {
        Some((first, data)) => (*first, data),
        None => return,
    };

    match which % 3 {
        0 => {
            let _ = Cert::decode(
                Bytes::copy_from_slice(data), &Options::default()
            );
        }
        1 => {
            let _ = Cert::decode(
                Bytes::copy_from_slice(data), &Options::default().strict(true)
            );
        }
        2 => { let _ = Cert::parse(&mut data); }
        _ => panic!("what?"),
    }
});
