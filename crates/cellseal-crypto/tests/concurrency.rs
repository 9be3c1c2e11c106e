//! One box shared across threads: no cross-talk between calls, and
//! runtime redefinition never yields a torn secret.

use std::sync::Arc;
use std::thread;

use cellseal_crypto::{CryptoBox, OpenErrorKind, PrimaryKey};

const THREADS: usize = 8;
const ROUNDS: usize = 200;

#[test]
fn parallel_encrypt_decrypt_per_call() {
    let cb = Arc::new(CryptoBox::new(PrimaryKey::from_bytes([0x5C; 32])));

    thread::scope(|s| {
        for t in 0..THREADS {
            let cb = Arc::clone(&cb);
            s.spawn(move || {
                let secret = format!("secret-{t}");
                for i in 0..ROUNDS {
                    let plaintext = format!("thread {t} message {i}");
                    let envelope = cb
                        .encrypt(plaintext.as_bytes(), Some(secret.as_bytes()))
                        .unwrap();
                    let decrypted = cb.decrypt(&envelope, Some(secret.as_bytes())).unwrap();
                    assert_eq!(decrypted, plaintext.as_bytes());
                }
            });
        }
    });
}

#[test]
fn redefine_under_concurrent_use() {
    let cb = Arc::new(
        CryptoBox::builder(PrimaryKey::from_bytes([0x6D; 32]))
            .held("generation-0")
            .build(),
    );

    thread::scope(|s| {
        let writer = Arc::clone(&cb);
        s.spawn(move || {
            for g in 1..=50 {
                writer.redefine(format!("generation-{g}")).unwrap();
            }
        });

        for _ in 0..THREADS {
            let cb = Arc::clone(&cb);
            s.spawn(move || {
                for i in 0..ROUNDS {
                    let plaintext = format!("value {i}");
                    let envelope = cb.encrypt(plaintext.as_bytes(), None).unwrap();
                    // The secret may change between seal and open; the only
                    // acceptable outcomes are the plaintext or a clean MAC failure.
                    match cb.decrypt(&envelope, None) {
                        Ok(decrypted) => assert_eq!(decrypted, plaintext.as_bytes()),
                        Err(e) => assert_eq!(e.kind(), OpenErrorKind::Authentication),
                    }
                }
            });
        }
    });

    let envelope = cb.encrypt(b"settled", None).unwrap();
    assert_eq!(cb.decrypt(&envelope, None).unwrap(), b"settled");
}
