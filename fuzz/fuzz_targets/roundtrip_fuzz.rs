#![no_main]
use bzflow::engine::Format;
use bzflow::engine::store::StoreEngine;
use bzflow::stream::{Compressor, Decompressor, StreamOptions};
use bzflow::CodecEngine;
use libfuzzer_sys::fuzz_target;

fn roundtrip(engine: &dyn CodecEngine, opts: &StreamOptions, payload: &[u8]) {
    let mut packed = Vec::new();
    Compressor::new(engine, opts.clone())
        .run(&mut &payload[..], &mut packed, None)
        .unwrap();
    let mut restored = Vec::new();
    Decompressor::new(engine, opts.clone())
        .run(&mut &packed[..], &mut restored, None)
        .unwrap();
    assert_eq!(restored, payload);
}

fuzz_target!(|data: &[u8]| {
    let Some((&control, payload)) = data.split_first() else {
        return;
    };

    // Control byte picks the transfer buffer size.
    let opts = StreamOptions {
        buffer_size: usize::from(control) + 1,
        ..Default::default()
    };

    for format in Format::available() {
        if let Some(engine) = format.engine() {
            roundtrip(&*engine, &opts, payload);
        }
    }
    let limited = StoreEngine::with_limits(usize::from(control % 7) + 1, usize::from(control % 5) + 1);
    roundtrip(&limited, &opts, payload);
});
