//! Tests for header and seal verification

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use aura_config::AuraConfig;
use aura_consensus::{
    calc_difficulty, Aura, AuraError, LocalSigner, SealSigner, StateResult, ValidatorSet,
};
use aura_crypto::PrivateKey;
use aura_types::{Address, AuraHeader, Block, Header, H256, H64};

const BLOCK1_SIGNER: &str = "0x70ad1a5fba52e27173d23ad87ad97c9bbe249abf";
const OTHER_AUTHORITY: &str = "0xafe443af9d1504de4c2d486356c421c160fdd7b1";
const BLOCK1_STEP: u64 = 320_136_836;

fn addr(s: &str) -> Address {
    Address::from_hex(s).unwrap()
}

fn fixture(raw: &str) -> Vec<u8> {
    hex::decode(raw.trim()).unwrap()
}

/// Block 1 of a live Aura network, sealed by `BLOCK1_SIGNER`.
fn block1_header() -> Header {
    let raw = fixture(include_str!(
        "../../types/tests/fixtures/block1_wire_headers.hex"
    ));
    AuraHeader::decode_batch(&raw).unwrap().remove(0).into_header()
}

fn engine(period: u64, epoch_length: u64, authorities: Vec<Address>) -> Aura {
    Aura::new(AuraConfig::new(period, epoch_length, authorities)).unwrap()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Unsealed child of `parent` at `step`, with consistent timestamp and difficulty.
fn child_of(parent: &Header, step: u64, period: u64) -> Header {
    Header {
        parent_hash: parent.hash(),
        number: parent.number + 1,
        timestamp: step * period,
        difficulty: calc_difficulty(parent.step().unwrap_or(0), step),
        gas_limit: 8_000_000,
        gas_used: 21_000,
        ..Default::default()
    }
}

fn seal_with(header: &Header, step: u64, key: &PrivateKey) -> Header {
    let signature = LocalSigner::new(key.clone())
        .sign_hash(header.seal_hash())
        .unwrap();
    header.with_seal(step, signature)
}

#[test]
fn test_verify_recorded_block1() {
    let aura = engine(5, 500, vec![addr(BLOCK1_SIGNER), addr(OTHER_AUTHORITY)]);
    let header = block1_header();

    assert_eq!(
        header.hash(),
        H256::from_hex("0x4d286e4f0dbce8d54b27ea70c211bc4b00c8a89ac67f132662c6dc74d9b294e4")
            .unwrap()
    );
    aura.verify_seal(&header).unwrap();
    assert_eq!(aura.author(&header).unwrap(), addr(BLOCK1_SIGNER));
    assert_eq!(aura.signatures().len(), 1);
}

#[test]
fn test_verify_header_recorded_block1() {
    let aura = engine(5, 500, vec![addr(BLOCK1_SIGNER), addr(OTHER_AUTHORITY)]);
    let header = block1_header();

    let mut chain = HashMap::new();
    chain.insert(header.parent_hash, aura.genesis_header(0));

    aura.verify_header(&chain, &header).unwrap();
}

#[test]
fn test_unauthorized_signer() {
    let outsider = Address::new([9; 20]);
    let aura = engine(5, 500, vec![addr(OTHER_AUTHORITY), outsider]);

    match aura.verify_seal(&block1_header()) {
        Err(AuraError::UnauthorizedSigner { signer }) => assert_eq!(signer, addr(BLOCK1_SIGNER)),
        other => panic!("expected UnauthorizedSigner, got {:?}", other),
    }
    assert!(aura.signatures().is_empty());
}

#[test]
fn test_signer_out_of_turn() {
    // Same authorities, opposite order: even steps now belong to the other one.
    let aura = engine(5, 500, vec![addr(OTHER_AUTHORITY), addr(BLOCK1_SIGNER)]);

    match aura.verify_seal(&block1_header()) {
        Err(AuraError::WrongTurn {
            step,
            expected,
            signer,
        }) => {
            assert_eq!(step, BLOCK1_STEP);
            assert_eq!(expected, addr(OTHER_AUTHORITY));
            assert_eq!(signer, addr(BLOCK1_SIGNER));
        }
        other => panic!("expected WrongTurn, got {:?}", other),
    }
}

#[test]
fn test_unsealed_header_rejected() {
    let aura = engine(5, 500, vec![addr(BLOCK1_SIGNER)]);
    let mut header = block1_header();
    header.seal = None;
    assert!(matches!(aura.verify_seal(&header), Err(AuraError::MissingSeal)));
    assert!(matches!(aura.author(&header), Err(AuraError::MissingSeal)));
}

#[test]
fn test_cached_signer_revalidated_after_transition() {
    // Block 1's step is a multiple of 4, so it can start an epoch.
    let aura = engine(5, 4, vec![addr(BLOCK1_SIGNER), addr(OTHER_AUTHORITY)]);
    let header = block1_header();

    aura.verify_seal(&header).unwrap();
    assert_eq!(
        aura.signatures().get(&header.hash()),
        Some(addr(BLOCK1_SIGNER))
    );

    aura.authorities()
        .schedule_transition(
            BLOCK1_STEP,
            ValidatorSet::new(vec![addr(OTHER_AUTHORITY), addr(BLOCK1_SIGNER)]).unwrap(),
        )
        .unwrap();

    // The cache still knows the signer, but the turn now belongs to someone else.
    assert!(matches!(
        aura.verify_seal(&header),
        Err(AuraError::WrongTurn { .. })
    ));
    assert_eq!(aura.signatures().len(), 1);
}

#[test]
fn test_cached_signer_removed_from_set() {
    let aura = engine(5, 4, vec![addr(BLOCK1_SIGNER)]);
    let header = block1_header();
    aura.verify_seal(&header).unwrap();

    aura.authorities()
        .schedule_transition(BLOCK1_STEP, ValidatorSet::new(vec![addr(OTHER_AUTHORITY)]).unwrap())
        .unwrap();

    assert!(matches!(
        aura.verify_seal(&header),
        Err(AuraError::UnauthorizedSigner { .. })
    ));
}

#[test]
fn test_concurrent_verification() {
    let aura = Arc::new(engine(5, 500, vec![addr(BLOCK1_SIGNER), addr(OTHER_AUTHORITY)]));
    let header = block1_header();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let aura = Arc::clone(&aura);
            let header = header.clone();
            std::thread::spawn(move || {
                for _ in 0..4 {
                    aura.verify_seal(&header).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(aura.signatures().len(), 1);
}

#[test]
fn test_sign_then_verify() {
    let (k1, k2) = (PrivateKey::random(), PrivateKey::random());
    let aura = engine(5, 500, vec![k1.address(), k2.address()]);
    let genesis = aura.genesis_header(0);

    let step = 320_000_000;
    let header = child_of(&genesis, step, 5);

    let sealed = seal_with(&header, step, &k1);
    aura.verify_seal(&sealed).unwrap();
    assert_eq!(aura.author(&sealed).unwrap(), k1.address());
    // Sealing does not change what was signed.
    assert_eq!(sealed.seal_hash(), header.seal_hash());
    assert_ne!(sealed.hash(), header.hash());

    let out_of_turn = seal_with(&header, step, &k2);
    assert!(matches!(
        aura.verify_seal(&out_of_turn),
        Err(AuraError::WrongTurn { .. })
    ));
}

#[test]
fn test_verify_header_rules() {
    let key = PrivateKey::random();
    let aura = engine(5, 500, vec![key.address()]);
    let genesis = aura.genesis_header(0);
    let mut chain = HashMap::new();
    chain.insert(genesis.hash(), genesis.clone());

    let step = 320_000_000;
    let good = child_of(&genesis, step, 5);
    aura.verify_header(&chain, &seal_with(&good, step, &key))
        .unwrap();

    let mut bad = good.clone();
    bad.difficulty = calc_difficulty(0, step + 1);
    assert!(matches!(
        aura.verify_header(&chain, &seal_with(&bad, step, &key)),
        Err(AuraError::InvalidDifficulty)
    ));

    assert!(matches!(
        aura.verify_header(&chain, &seal_with(&good, step + 1, &key)),
        Err(AuraError::InvalidStep { .. })
    ));

    let mut bad = good.clone();
    bad.nonce = H64::new([0, 0, 0, 0, 0, 0, 0, 1]);
    assert!(matches!(
        aura.verify_header(&chain, &seal_with(&bad, step, &key)),
        Err(AuraError::InvalidNonce)
    ));

    let mut bad = good.clone();
    bad.mix_hash = H256::keccak256(b"mix");
    assert!(matches!(
        aura.verify_header(&chain, &seal_with(&bad, step, &key)),
        Err(AuraError::InvalidMixDigest)
    ));

    let mut bad = good.clone();
    bad.ommers_hash = H256::ZERO;
    assert!(matches!(
        aura.verify_header(&chain, &seal_with(&bad, step, &key)),
        Err(AuraError::InvalidUncleHash)
    ));

    let mut bad = good.clone();
    bad.gas_used = bad.gas_limit + 1;
    assert!(matches!(
        aura.verify_header(&chain, &seal_with(&bad, step, &key)),
        Err(AuraError::GasUsedExceedsLimit { .. })
    ));

    let mut bad = good.clone();
    bad.number = 5;
    assert!(matches!(
        aura.verify_header(&chain, &seal_with(&bad, step, &key)),
        Err(AuraError::InvalidNumber { number: 5, parent: 0 })
    ));

    let mut bad = good.clone();
    bad.parent_hash = H256::keccak256(b"unknown");
    assert!(matches!(
        aura.verify_header(&chain, &seal_with(&bad, step, &key)),
        Err(AuraError::UnknownAncestor(_))
    ));

    assert!(matches!(
        aura.verify_header(&chain, &good),
        Err(AuraError::MissingSeal)
    ));
}

#[test]
fn test_future_block_rejected() {
    let key = PrivateKey::random();
    let aura = engine(5, 500, vec![key.address()]);
    let genesis = aura.genesis_header(0);
    let mut chain = HashMap::new();
    chain.insert(genesis.hash(), genesis.clone());

    let step = (unix_now() + 3_600) / 5;
    let header = seal_with(&child_of(&genesis, step, 5), step, &key);
    assert!(matches!(
        aura.verify_header(&chain, &header),
        Err(AuraError::FutureBlock { .. })
    ));
}

#[test]
fn test_step_must_increase() {
    let key = PrivateKey::random();
    let aura = engine(5, 500, vec![key.address()]);
    let genesis = aura.genesis_header(0);

    let step = 320_000_000;
    let parent = seal_with(&child_of(&genesis, step, 5), step, &key);
    let mut chain = HashMap::new();
    chain.insert(parent.hash(), parent.clone());

    let mut child = child_of(&parent, step, 5);
    child.difficulty = calc_difficulty(step, step);
    assert!(matches!(
        aura.verify_header(&chain, &seal_with(&child, step, &key)),
        Err(AuraError::StepNotIncreasing { .. })
    ));
}

#[test]
fn test_verify_headers_batch() {
    let (k1, k2) = (PrivateKey::random(), PrivateKey::random());
    let aura = engine(5, 500, vec![k1.address(), k2.address()]);
    let genesis = aura.genesis_header(0);
    let mut chain = HashMap::new();
    chain.insert(genesis.hash(), genesis.clone());

    let step = 320_000_000;
    let h1 = seal_with(&child_of(&genesis, step, 5), step, &k1);
    let h2 = seal_with(&child_of(&h1, step + 1, 5), step + 1, &k2);
    // Skips a step: k1 owns step + 2, k2 would own step + 3.
    let h3 = seal_with(&child_of(&h2, step + 3, 5), step + 3, &k1);

    let results = aura.verify_headers(&chain, &[genesis.clone(), h1, h2, h3]);
    assert_eq!(results.len(), 4);
    assert!(results[0].is_ok());
    assert!(results[1].is_ok());
    assert!(results[2].is_ok());
    assert!(matches!(results[3], Err(AuraError::WrongTurn { .. })));
}

#[test]
fn test_prepare() {
    let key = PrivateKey::random();
    let aura = engine(5, 500, vec![key.address()]);
    aura.authorize(key.address(), LocalSigner::new(key.clone()));

    let genesis = aura.genesis_header(1_000);
    let mut chain = HashMap::new();
    chain.insert(genesis.hash(), genesis.clone());

    let mut header = Header {
        parent_hash: genesis.hash(),
        nonce: H64::new([1; 8]),
        ..Default::default()
    };
    let before = unix_now();
    aura.prepare(&chain, &mut header).unwrap();

    assert_eq!(header.number, 1);
    assert_eq!(header.coinbase, key.address());
    assert!(header.timestamp >= before);
    assert_eq!(header.difficulty, calc_difficulty(0, header.timestamp / 5));
    assert!(header.has_empty_pow_fields());
    assert!(!header.is_sealed());

    let mut orphan = Header::default();
    orphan.parent_hash = H256::keccak256(b"missing");
    assert!(matches!(
        aura.prepare(&chain, &mut orphan),
        Err(AuraError::UnknownAncestor(_))
    ));
}

#[test]
fn test_genesis_uses_configured_difficulty() {
    let aura = engine(5, 500, vec![Address::new([1; 20])]);
    assert_eq!(aura.genesis_header(0).difficulty, aura.config().difficulty);
    assert!(aura
        .verify_header(&HashMap::<H256, Header>::new(), &aura.genesis_header(0))
        .is_ok());
}

#[test]
fn test_finalize_keeps_supplied_state_root() {
    let raw = fixture(include_str!(
        "../../types/tests/fixtures/sealed_canonical_header.hex"
    ));
    let mut header = Header::rlp_decode(&raw).unwrap();
    let expected =
        H256::from_hex("0xcacf4ddf8416347cfd1b2c6e4b0cbaf45e400a89e6282d579e83a1ae561c9bf0")
            .unwrap();
    assert_eq!(header.state_root, expected);

    let aura = engine(5, 500, vec![header.coinbase]);
    let state = StateResult::unchanged(&header);
    aura.finalize(&mut header, state);

    assert_eq!(header.state_root, expected);
}

#[test]
fn test_finalize_commits_state() {
    let aura = engine(5, 500, vec![Address::new([1; 20])]);
    let mut header = Header {
        mix_hash: H256::keccak256(b"pow"),
        ..Default::default()
    };
    let state = StateResult {
        state_root: H256::keccak256(b"state"),
        receipts_root: H256::keccak256(b"receipts"),
        logs_bloom: Default::default(),
        gas_used: 42_000,
    };

    let block: Block = aura.finalize_and_assemble(header.clone(), state.clone(), vec![vec![0xc0]]);
    assert_eq!(block.header.state_root, state.state_root);
    assert_eq!(block.header.receipts_root, state.receipts_root);
    assert_eq!(block.header.gas_used, 42_000);
    assert!(block.header.has_empty_pow_fields());
    assert_eq!(block.transactions, vec![vec![0xc0]]);

    aura.finalize(&mut header, state);
    assert_eq!(header, block.header);
}

#[test]
fn test_parent_at_maximum_number() {
    let key = PrivateKey::random();
    let aura = engine(5, 500, vec![key.address()]);
    aura.authorize(key.address(), LocalSigner::new(key.clone()));

    let step = 320_000_000;
    let parent = Header {
        number: u64::MAX,
        timestamp: step * 5,
        ..Default::default()
    };
    let mut chain = HashMap::new();
    chain.insert(parent.hash(), parent.clone());

    let child = Header {
        parent_hash: parent.hash(),
        number: u64::MAX,
        timestamp: (step + 1) * 5,
        difficulty: calc_difficulty(0, step + 1),
        gas_limit: 8_000_000,
        ..Default::default()
    };
    assert!(matches!(
        aura.verify_header(&chain, &seal_with(&child, step + 1, &key)),
        Err(AuraError::InvalidNumber {
            number: u64::MAX,
            parent: u64::MAX
        })
    ));

    let mut next = Header {
        parent_hash: parent.hash(),
        ..Default::default()
    };
    assert!(matches!(
        aura.prepare(&chain, &mut next),
        Err(AuraError::InvalidNumber { .. })
    ));
}
