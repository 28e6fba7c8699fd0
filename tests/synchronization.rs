use tempora::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn at(text: &str) -> Timestamp {
    Timestamp::parse(text).unwrap()
}

#[test]
fn test_linear_operands_meet_at_crossing() {
    init();

    let up: Temporal<f64> = "[0@2000-01-01 00:00:00, 10@2000-01-01 00:00:10]".parse().unwrap();
    let down: Temporal<f64> = "[10@2000-01-01 00:00:00, 0@2000-01-01 00:00:10]".parse().unwrap();

    let (a, b) = up.synchronize(&down, true).unwrap().unwrap();
    let crossing = at("2000-01-01 00:00:05");
    assert_eq!(a.timestamps(), b.timestamps());
    assert!(a.timestamps().contains(&crossing));
    assert_eq!(a.value_at_timestamp(crossing).unwrap(), 5.0);
    assert_eq!(b.value_at_timestamp(crossing).unwrap(), 5.0);

    let (a, _) = up.synchronize(&down, false).unwrap().unwrap();
    assert_eq!(a.num_instants(), 2);
}

#[test]
fn test_result_covers_only_shared_time() {
    init();

    let a: Temporal<f64> = "[1@2000-01-01, 5@2000-01-05]".parse().unwrap();
    let b: Temporal<f64> = "(3@2000-01-03, 3@2000-01-10]".parse().unwrap();

    let (sa, sb) = a.synchronize(&b, false).unwrap().unwrap();
    assert_eq!(sa.period(), sb.period());
    assert_eq!(sa.start_timestamp(), at("2000-01-03"));
    assert_eq!(sa.end_timestamp(), at("2000-01-05"));
    match sa {
        Temporal::Sequence(seq) => assert!(!seq.lower_inc() && seq.upper_inc()),
        other => panic!("expected a sequence, got {:?}", other.subtype()),
    }
    let held: Vec<f64> = sb.instants().iter().map(|inst| *inst.value()).collect();
    assert_eq!(held, vec![3.0, 3.0]);
}

#[test]
fn test_sequence_sets_pair_up_overlapping_pieces() {
    init();

    let a: Temporal<f64> = "{[1@2000-01-01, 1@2000-01-03], [2@2000-01-05, 2@2000-01-07]}".parse().unwrap();
    let b: Temporal<f64> = "[0@2000-01-02, 0@2000-01-06]".parse().unwrap();

    let (sa, sb) = a.synchronize(&b, true).unwrap().unwrap();
    match (&sa, &sb) {
        (Temporal::SequenceSet(x), Temporal::SequenceSet(y)) => {
            assert_eq!(x.num_sequences(), 2);
            assert_eq!(y.num_sequences(), 2);
        }
        _ => panic!("expected sequence sets"),
    }
    assert_eq!(sa.time(), sb.time());
    assert_eq!(sa.start_timestamp(), at("2000-01-02"));
    assert_eq!(sa.end_timestamp(), at("2000-01-06"));
}

#[test]
fn test_discrete_operand_keeps_its_timestamps() {
    init();

    let samples: Temporal<f64> = "{1@2000-01-01, 2@2000-01-03, 3@2000-01-09}".parse().unwrap();
    let line: Temporal<f64> = "[0@2000-01-02, 4@2000-01-06]".parse().unwrap();

    let (a, b) = samples.synchronize(&line, true).unwrap().unwrap();
    assert_eq!(a.timestamps(), vec![at("2000-01-03")]);
    assert_eq!(b.values(), vec![1.0]);
}

#[test]
fn test_disjoint_operands_have_no_result() {
    init();

    let a: Temporal<f64> = "[1@2000-01-01, 2@2000-01-02)".parse().unwrap();
    let b: Temporal<f64> = "[1@2000-01-02, 2@2000-01-03]".parse().unwrap();
    assert!(a.synchronize(&b, true).unwrap().is_none());
}

#[test]
fn test_mixed_srids_are_rejected() {
    init();

    let a: Temporal<GeoPoint> = "SRID=4326;[POINT(0 0)@2000-01-01, POINT(1 1)@2000-01-02]".parse().unwrap();
    let b: Temporal<GeoPoint> = "SRID=3857;[POINT(0 0)@2000-01-01, POINT(1 1)@2000-01-02]".parse().unwrap();
    assert!(matches!(a.synchronize(&b, true), Err(TemporaError::InvalidArgument(_))));
}
