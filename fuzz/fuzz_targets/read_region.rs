#![no_main]
use libfuzzer_sys::fuzz_target;

use redstone_anvil::Region;
use redstone_nbt::Document;
use std::io::Cursor;

fuzz_target!(|data: Vec<u8>| {
    let mut r = Region::from_stream(Cursor::new(data));
    if let Ok(chunks) = r.present_chunks() {
        for (x, z) in chunks {
            let _ = Document::from_chunk(&mut r, x, z);
        }
    }
});
