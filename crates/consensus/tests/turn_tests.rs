//! Tests for turn scheduling

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use aura_config::AuraConfig;
use aura_consensus::{Aura, AuraError, LocalSigner, TurnWindow};
use aura_crypto::PrivateKey;
use aura_types::Address;

const NOW: u64 = 1_602_588_556;

fn addr(byte: u8) -> Address {
    Address::new([byte; 20])
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Engine with three authorities where the local key holds index 0.
fn create_test_engine() -> Aura {
    let key = PrivateKey::random();
    let config = AuraConfig::new(5, 500, vec![key.address(), addr(1), addr(2)]);
    let aura = Aura::new(config).unwrap();
    aura.authorize(key.address(), LocalSigner::new(key));
    aura
}

fn window(start: u64, end: u64) -> TurnWindow {
    TurnWindow { start, end }
}

#[test]
fn test_check_step_no_tolerance() {
    let aura = create_test_engine();
    let check = aura.check_step(NOW, 0);
    assert!(check.allowed);
    assert_eq!(check.window, window(NOW - 1, NOW + 4));
}

#[test]
fn test_check_step_small_tolerance() {
    let aura = create_test_engine();
    let check = aura.check_step(NOW, NOW);
    assert!(check.allowed);
    assert_eq!(check.window, window(NOW - 1, NOW + 4));
}

#[test]
fn test_check_step_other_turn() {
    let aura = create_test_engine();
    let t = NOW + 6;
    let check = aura.check_step(t, 0);
    assert!(!check.allowed);
    assert_eq!(check.window, window(t - 2, t + 3));
}

#[test]
fn test_check_step_other_turn_with_tolerance() {
    // Tolerance never rescues a step owned by someone else.
    let aura = create_test_engine();
    let t = NOW + 5;
    let check = aura.check_step(t, NOW + 80);
    assert!(!check.allowed);
    assert_eq!(check.window, window(t - 1, t + 4));
}

#[test]
fn test_check_step_tolerance_past_turn_end() {
    let aura = create_test_engine();
    assert!(!aura.check_step(NOW, NOW + 80).allowed);
}

#[test]
fn test_count_closest_turn_current() {
    let aura = create_test_engine();
    assert_eq!(
        aura.count_closest_turn(NOW, 0).unwrap(),
        window(NOW - 1, NOW + 4)
    );
}

#[test]
fn test_count_closest_turn_future() {
    let aura = create_test_engine();
    let t = NOW + 5;
    assert_eq!(aura.count_closest_turn(t, 0).unwrap(), window(t + 9, t + 14));
}

#[test]
fn test_count_closest_turn_with_lead() {
    let aura = create_test_engine();
    // The current turn ends at NOW + 4, too soon for ten seconds of lead.
    assert_eq!(
        aura.count_closest_turn(NOW, 10).unwrap(),
        window(NOW + 14, NOW + 19)
    );
}

#[test]
fn test_count_closest_turn_unauthorized() {
    let config = AuraConfig::new(5, 500, vec![addr(7)]);
    let aura = Aura::new(config).unwrap();
    let other = PrivateKey::random();
    aura.authorize(other.address(), LocalSigner::new(other));

    assert!(matches!(
        aura.count_closest_turn(unix_now(), 0),
        Err(AuraError::InvalidSigner)
    ));
}

#[test]
fn test_count_closest_turn_without_identity() {
    let aura = Aura::new(AuraConfig::new(5, 500, vec![addr(7)])).unwrap();
    assert!(matches!(
        aura.count_closest_turn(NOW, 0),
        Err(AuraError::InvalidSigner)
    ));
}

#[test]
fn test_count_closest_turn_across_transition() {
    let key = PrivateKey::random();
    let local = key.address();
    // Step 320517711 is NOW's step; the new set takes over at 320517720.
    let config = AuraConfig::new(5, 10, vec![local, addr(1)])
        .with_transition(320_517_720, vec![addr(1), addr(2), local]);
    let aura = Aura::new(config).unwrap();
    aura.authorize(local, LocalSigner::new(key));

    // Before the transition the local key owns even steps.
    let before = aura.count_closest_turn(NOW + 20, 0).unwrap();
    assert_eq!(before.start, 320_517_716 * 5);

    // Step 320517720 would be ours under the old set, but the new set has
    // already taken over and gives us index 2.
    let after = aura.count_closest_turn(320_517_719 * 5, 0).unwrap();
    assert_eq!(after, window(320_517_722 * 5, 320_517_723 * 5));
}

#[test]
fn test_count_closest_turn_removed_by_transition() {
    let key = PrivateKey::random();
    let local = key.address();
    let config =
        AuraConfig::new(5, 10, vec![local, addr(1)]).with_transition(320_517_720, vec![addr(1)]);
    let aura = Aura::new(config).unwrap();
    aura.authorize(local, LocalSigner::new(key));

    assert!(aura.count_closest_turn(NOW, 0).is_ok());
    assert!(matches!(
        aura.count_closest_turn(320_517_719 * 5, 0),
        Err(AuraError::InvalidSigner)
    ));
}

#[test]
fn test_runtime_transition_changes_schedule() {
    let aura = create_test_engine();
    let local = aura.signer().unwrap();
    aura.authorities()
        .schedule_transition(
            320_518_000,
            aura_consensus::ValidatorSet::new(vec![addr(1), local]).unwrap(),
        )
        .unwrap();

    // 320518000 is even, so the local key (index 1) waits one more step.
    assert_eq!(
        aura.count_closest_turn(320_518_000 * 5, 0).unwrap().start,
        320_518_001 * 5
    );
    // Earlier steps still use the genesis set.
    assert!(aura.check_step(NOW, 0).allowed);
}

#[tokio::test]
async fn test_wait_fails_fast_when_unauthorized() {
    let aura = Aura::new(AuraConfig::new(5, 500, vec![addr(7)])).unwrap();
    let result = tokio::time::timeout(
        Duration::from_millis(100),
        aura.wait_for_next_sealer_turn(unix_now()),
    )
    .await
    .expect("should not block");
    assert!(matches!(result, Err(AuraError::InvalidSigner)));
}

#[tokio::test]
async fn test_wait_returns_immediately_for_sole_authority() {
    let key = PrivateKey::random();
    let aura = Aura::new(AuraConfig::new(5, 500, vec![key.address()])).unwrap();
    aura.authorize(key.address(), LocalSigner::new(key));

    tokio::time::timeout(
        Duration::from_millis(100),
        aura.wait_for_next_sealer_turn(unix_now()),
    )
    .await
    .expect("current turn is ours")
    .unwrap();
}

#[tokio::test]
async fn test_wait_reaches_turn() {
    let key = PrivateKey::random();
    let aura = Aura::new(AuraConfig::new(1, 500, vec![addr(1), key.address()])).unwrap();
    aura.authorize(key.address(), LocalSigner::new(key));

    let base = unix_now();
    let turn = aura.count_closest_turn(base, 0).unwrap();

    tokio::time::timeout(
        Duration::from_secs(3),
        aura.wait_for_next_sealer_turn(base),
    )
    .await
    .expect("turn within one rotation")
    .unwrap();

    assert!(unix_now() >= turn.start);
}
