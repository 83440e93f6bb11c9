//! Tests for ECDSA signing and signer recovery

use aura_crypto::{recover_address, CryptoError, PrivateKey, PublicKey, Signature};
use aura_types::{Address, SealSignature, H256};

#[test]
fn test_private_key_generation() {
    let key1 = PrivateKey::random();
    let key2 = PrivateKey::random();
    assert_ne!(key1.to_bytes(), key2.to_bytes());
}

#[test]
fn test_private_key_from_hex() {
    let hex = "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
    let key = PrivateKey::from_hex(hex).unwrap();
    assert_eq!(hex::encode(key.to_bytes()), &hex[2..]);
    assert_eq!(PrivateKey::from_bytes(&key.to_bytes()).unwrap().to_bytes(), key.to_bytes());
}

#[test]
fn test_private_key_invalid() {
    assert!(matches!(
        PrivateKey::from_hex("0x1234"),
        Err(CryptoError::InvalidLength { expected: 32, actual: 2 })
    ));
    assert!(PrivateKey::from_bytes(&[0u8; 32]).is_err());
    assert!(PrivateKey::from_hex("zz").is_err());
}

#[test]
fn test_address_derivation() {
    let key =
        PrivateKey::from_hex("4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318")
            .unwrap();
    assert_eq!(
        key.address(),
        Address::from_hex("0x2c7536e3605d9c16a7a3d7b1898e529396a65c23").unwrap()
    );
}

#[test]
fn test_public_key_sec1_roundtrip() {
    let public = PrivateKey::random().public_key();
    let mut sec1 = vec![0x04];
    sec1.extend_from_slice(&public.to_uncompressed());
    assert_eq!(PublicKey::from_sec1_bytes(&sec1).unwrap(), public);
    assert!(PublicKey::from_sec1_bytes(&[0x04; 10]).is_err());
}

#[test]
fn test_sign_and_recover() {
    let key = PrivateKey::random();
    let hash = H256::keccak256(b"seal hash");

    let sig = key.sign_prehash(&hash).unwrap();
    assert!(sig.v <= 1);
    assert_eq!(sig.recover_prehash(&hash).unwrap(), key.public_key());

    // A different digest recovers some other key.
    let other = sig.recover_prehash(&H256::keccak256(b"other")).map(|k| k.to_address());
    assert_ne!(other.ok(), Some(key.address()));
}

#[test]
fn test_recover_address_from_seal_signature() {
    let key = PrivateKey::random();
    let hash = H256::keccak256(b"block");
    let seal: SealSignature = key.sign_prehash(&hash).unwrap().into();
    assert_eq!(recover_address(&hash, &seal).unwrap(), key.address());
}

#[test]
fn test_legacy_v_is_accepted() {
    let key = PrivateKey::random();
    let hash = H256::keccak256(b"legacy");
    let mut sig = key.sign_prehash(&hash).unwrap();
    sig.v += 27;
    assert_eq!(sig.recover_prehash(&hash).unwrap().to_address(), key.address());
}

#[test]
fn test_zero_signature_fails() {
    let seal = SealSignature::new([0u8; 65]);
    assert!(recover_address(&H256::keccak256(b"z"), &seal).is_err());
}

#[test]
fn test_signature_bytes_roundtrip() {
    let key = PrivateKey::random();
    let sig = key.sign_prehash(&H256::keccak256(b"bytes")).unwrap();
    assert_eq!(Signature::from_bytes(&sig.to_bytes()), sig);
}

#[test]
fn test_recover_recorded_block1_signer() {
    // Seal hash and signature of block 1 from a live Aura network.
    let hash =
        H256::from_hex("0x1e1eb0a19950239566988fc61cc981b880df57c25c50d879c1f1f4b8d0ce6a71")
            .unwrap();
    let raw = include_str!("../../types/tests/fixtures/block1_wire_headers.hex");
    let headers = aura_types::AuraHeader::decode_batch(&hex::decode(raw.trim()).unwrap()).unwrap();
    let signature = headers[0].signature().copied().unwrap();

    assert_eq!(
        recover_address(&hash, &signature).unwrap(),
        Address::from_hex("0x70ad1a5fba52e27173d23ad87ad97c9bbe249abf").unwrap()
    );
}
