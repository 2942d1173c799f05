#![no_main]

use libfuzzer_sys::fuzz_target;
use chapoly::aead::{chacha20_poly1305::decrypt, Tag};

// arbitrary streams and tags must be rejected without panicking
fuzz_target!(|data: &[u8]| {
    if data.len() < Tag::CAPACITY { return }

    let (tag, stream) = data.split_at(Tag::CAPACITY);
    let mut raw_tag = [0u8; Tag::CAPACITY];
    raw_tag.copy_from_slice(tag);

    let mut stream = stream.to_vec();
    let mut out = Vec::new();

    let _ = decrypt(&[7u8; 32], [42u8; 12], &mut stream, Tag::new(raw_tag), &mut out);
});
