use chacha20poly1305::aead::{AeadInPlace, KeyInit};
use criterion::{Criterion, black_box, criterion_group, criterion_main, Throughput};
use chapoly::aead::chacha20_poly1305::{ChaCha20Poly1305, Key};
use chapoly::chacha::ChaCha20;
use chapoly::mac::Poly1305;

fn bench_aead(c: &mut Criterion) {
    let inp = [7u8; 4096];
    let key = Key::new([8u8; 32]);
    let nonce = [3u8; 12];

    let mut g = c.benchmark_group("chacha20-poly1305");
    g.throughput(Throughput::Bytes(inp.len() as u64));

    let mut stream = Vec::with_capacity(inp.len() + 32);

    g.bench_function("chapoly/encrypt", |b| {
        b.iter(|| {
            stream.clear();
            let tag = ChaCha20Poly1305::new(key.as_ref(), nonce, &mut stream)
                .update(black_box(&inp))
                .unwrap()
                .finalize()
                .unwrap();

            black_box(tag)
        })
    });

    let mut in_out = inp;

    g.bench_function("chapoly/encrypt-in-place", |b| {
        b.iter(|| {
            stream.clear();
            let tag = ChaCha20Poly1305::new(key.as_ref(), nonce, &mut stream)
                .update_in_place(black_box(&mut in_out))
                .unwrap()
                .finalize()
                .unwrap();

            black_box(tag)
        })
    });

    let r_c = chacha20poly1305::ChaCha20Poly1305::new_from_slice(&[8u8; 32]).unwrap();

    g.bench_function("rust-crypto/encrypt-in-place", |b| {
        b.iter(|| {
            let tag = r_c
                .encrypt_in_place_detached(
                    chacha20poly1305::Nonce::from_slice(&nonce),
                    b"",
                    black_box(&mut in_out)
                )
                .unwrap();

            black_box(tag)
        })
    });

    g.finish();
}

fn bench_primitives(c: &mut Criterion) {
    let mut buf = [7u8; 4096];

    let mut g = c.benchmark_group("primitives");
    g.throughput(Throughput::Bytes(buf.len() as u64));

    g.bench_function("chacha20/apply-keystream", |b| {
        b.iter(|| {
            ChaCha20::new(&[8u8; 32], [3u8; 12])
                .apply_keystream(black_box(&mut buf))
                .unwrap();
        })
    });

    g.bench_function("poly1305/mac", |b| {
        b.iter(|| black_box(Poly1305::new(&[8u8; 32]).mac(black_box(&buf))))
    });

    g.finish();
}

criterion_group!(benches, bench_aead, bench_primitives);
criterion_main!(benches);
