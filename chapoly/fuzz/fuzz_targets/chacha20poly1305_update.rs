#![no_main]

use libfuzzer_sys::fuzz_target;
use chapoly::aead::chacha20_poly1305::{ChaCha20Poly1305, Key, sealed_len};

fuzz_target!(|data: &[u8]| {
    let split = data.first().map_or(0, |b| usize::from(*b)).min(data.len());
    let (aad, plain) = data.split_at(split);

    let key = Key::new([7u8; 32]);
    let mut stream = Vec::new();

    let tag = ChaCha20Poly1305::new(key.as_ref(), [42u8; 12], &mut stream)
        .aad(aad).unwrap()
        .update(plain).unwrap()
        .finalize().unwrap();

    assert_eq!(Some(stream.len()), sealed_len(aad.len(), plain.len()));

    let mut out = Vec::new();
    let d_aad = ChaCha20Poly1305::new(key, [42u8; 12], &mut out)
        .decrypt(&mut stream, tag)
        .unwrap();

    assert_eq!(d_aad, aad);
    assert_eq!(out, plain);
});
