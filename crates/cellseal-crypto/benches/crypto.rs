use cellseal_crypto::{hash_password, CryptoBox, MacKeyDerivation, PrimaryKey};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

fn make_box(derivation: MacKeyDerivation) -> CryptoBox {
    CryptoBox::builder(PrimaryKey::from_bytes([0xAB; 32]))
        .derivation(derivation)
        .build()
}

#[divan::bench(args = [64, 4096, 65536])]
fn bench_encrypt(bencher: divan::Bencher, size: usize) {
    let cb = make_box(MacKeyDerivation::Legacy);
    let secret = hash_password("bench");
    let data = make_data(size);
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            cb.encrypt(divan::black_box(&data), Some(secret.as_bytes()))
                .unwrap()
        });
}

#[divan::bench(args = [64, 4096, 65536])]
fn bench_decrypt(bencher: divan::Bencher, size: usize) {
    let cb = make_box(MacKeyDerivation::Legacy);
    let secret = hash_password("bench");
    let envelope = cb.encrypt(&make_data(size), Some(secret.as_bytes())).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            cb.decrypt(divan::black_box(&envelope), Some(secret.as_bytes()))
                .unwrap()
        });
}

#[divan::bench]
fn bench_decrypt_hkdf_small(bencher: divan::Bencher) {
    let cb = make_box(MacKeyDerivation::HkdfSha512);
    let envelope = cb.encrypt(&make_data(64), Some(b"bench")).unwrap();
    bencher.bench(|| cb.decrypt(divan::black_box(&envelope), Some(b"bench")).unwrap());
}

fn main() {
    divan::main();
}
