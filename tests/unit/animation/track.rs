use super::*;

fn track(samples: &[(f64, f64)]) -> KeyframeTrack<f64> {
    KeyframeTrack {
        keys: samples
            .iter()
            .map(|&(time, value)| Key { time, value })
            .collect(),
    }
}

#[test]
fn empty_track_returns_default() {
    let t = KeyframeTrack::<f64>::empty();
    assert_eq!(t.sample(3.0, &0.0), 0.0);
    assert_eq!(t.sample(3.0, &1.0), 1.0);
}

#[test]
fn sample_clamps_below_first_and_above_last() {
    let t = track(&[(1.0, 10.0), (4.0, 40.0)]);
    assert_eq!(t.sample(0.0, &0.0), 10.0);
    assert_eq!(t.sample(1.0, &0.0), 10.0);
    assert_eq!(t.sample(4.0, &0.0), 40.0);
    assert_eq!(t.sample(100.0, &0.0), 40.0);
}

#[test]
fn sample_interpolates_linearly_between_brackets() {
    let t = track(&[(0.0, 0.0), (10.0, 100.0)]);
    assert_eq!(t.sample(5.0, &0.0), 50.0);
    assert_eq!(t.sample(2.5, &0.0), 25.0);
}

#[test]
fn sample_three_keys_picks_correct_bracket() {
    let t = track(&[(0.0, 0.0), (2.0, 20.0), (4.0, 0.0)]);
    assert_eq!(t.sample(1.0, &0.0), 10.0);
    assert_eq!(t.sample(3.0, &0.0), 10.0);
}

#[test]
fn upsert_within_epsilon_overwrites_in_place() {
    let mut t = track(&[(0.0, 0.0)]);
    t.upsert(2.0, 5.0, EPSILON_LIVE);
    t.upsert(2.005, 7.0, EPSILON_LIVE);
    assert_eq!(t.len(), 2);
    assert_eq!(t.sample(2.0, &0.0), 7.0);
}

#[test]
fn upsert_is_idempotent() {
    let mut t = KeyframeTrack::<f64>::empty();
    t.upsert(1.5, 3.0, EPSILON_LIVE);
    t.upsert(1.5, 3.0, EPSILON_LIVE);
    assert_eq!(t.len(), 1);
}

#[test]
fn upsert_keeps_keys_sorted() {
    let mut t = KeyframeTrack::<f64>::empty();
    t.upsert(5.0, 50.0, EPSILON_LIVE);
    t.upsert(1.0, 10.0, EPSILON_LIVE);
    t.upsert(3.0, 30.0, EPSILON_LIVE);
    let times: Vec<f64> = t.keys.iter().map(|k| k.time).collect();
    assert_eq!(times, vec![1.0, 3.0, 5.0]);
    assert!(t.validate().is_ok());
}

#[test]
fn toggle_removes_existing_and_inserts_missing() {
    let mut t = track(&[(0.0, 1.0), (2.0, 3.0)]);
    t.toggle(2.01, 9.0, EPSILON_DRAG);
    assert_eq!(t.len(), 1);

    t.toggle(2.0, 9.0, EPSILON_DRAG);
    assert_eq!(t.len(), 2);
    assert_eq!(t.sample(2.0, &0.0), 9.0);
}

#[test]
fn remove_near_can_empty_the_track() {
    let mut t = track(&[(0.0, 4.0)]);
    assert!(t.remove_near(0.0, EPSILON_LIVE));
    assert!(t.is_empty());
    assert_eq!(t.sample(0.0, &1.0), 1.0);
    assert!(!t.remove_near(0.0, EPSILON_LIVE));
}

#[test]
fn remove_near_takes_nearest_of_several_candidates() {
    let mut t = track(&[(1.0, 10.0), (1.04, 20.0)]);
    t.remove_near(1.05, EPSILON_DRAG);
    assert_eq!(t.len(), 1);
    assert_eq!(t.keys[0].value, 10.0);
}

#[test]
fn vec2_track_interpolates_componentwise() {
    use crate::foundation::core::Vec2;
    let mut t = KeyframeTrack::<Vec2>::empty();
    t.upsert(0.0, Vec2::new(0.0, 0.0), EPSILON_LIVE);
    t.upsert(2.0, Vec2::new(10.0, -4.0), EPSILON_LIVE);
    let v = t.sample(1.0, &Vec2::ZERO);
    assert_eq!(v, Vec2::new(5.0, -2.0));
}

#[test]
fn validate_rejects_unsorted_and_negative_times() {
    let t = track(&[(2.0, 0.0), (1.0, 0.0)]);
    assert!(t.validate().is_err());
    let t = track(&[(-1.0, 0.0)]);
    assert!(t.validate().is_err());
}
