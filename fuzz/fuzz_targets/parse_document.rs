#![no_main]
use libfuzzer_sys::fuzz_target;

use redstone_nbt::{Compression, Document, ParseOpts};

fuzz_target!(|data: &[u8]| {
    let compression = Compression::detect(data);
    let doc = Document::parse_with_opts(data, compression, ParseOpts::new().max_depth(64));
    if let Ok(doc) = doc {
        // Walking the tree must not panic on anything the parser accepted.
        let _ = format!("{:?}", doc);
    }
});
