#![no_main]
use bzflow::engine::Format;
use bzflow::engine::store::StoreEngine;
use bzflow::stream::{Decompressor, StreamOptions};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input must only ever produce errors, never panics.
    let opts = StreamOptions {
        buffer_size: 257,
        ..Default::default()
    };
    for format in Format::available() {
        if let Some(engine) = format.engine() {
            let _ = Decompressor::new(&*engine, opts.clone()).run(
                &mut &data[..],
                &mut std::io::sink(),
                None,
            );
        }
    }
    let _ = Decompressor::new(StoreEngine::with_limits(3, 5), opts).run(
        &mut &data[..],
        &mut std::io::sink(),
        None,
    );
});
