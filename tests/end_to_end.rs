use tempora::ops::{self, spatial};
use tempora::prelude::*;
use tempora::simplify::simplify;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn at(text: &str) -> Timestamp {
    Timestamp::parse(text).unwrap()
}

#[test]
fn test_value_reached_twice() {
    init();

    let seq: Temporal<f64> = "[1@2000-01-01, 2@2000-01-02, 1@2000-01-03]".parse().unwrap();
    let hits = seq.at_value(&1.5).unwrap().unwrap();
    assert_eq!(hits.num_instants(), 2);
    assert_eq!(hits.timestamps(), vec![at("2000-01-01 12:00:00"), at("2000-01-02 12:00:00")]);

    let rest = seq.minus_value(&1.5).unwrap().unwrap();
    assert_eq!(rest.period(), seq.period());
    assert!(!rest.time().contains_value(at("2000-01-01 12:00:00")));
    assert!(seq.at_value(&3.0).unwrap().is_none());
}

#[test]
fn test_restrict_then_lift() {
    init();

    let temp: Temporal<f64> = "[0@2000-01-01, 10@2000-01-11]".parse().unwrap();
    let window = Period::new(at("2000-01-03"), at("2000-01-05"), true, false).unwrap();
    let part = temp.at_period(&window).unwrap();
    assert_eq!(part.values(), vec![2.0, 4.0]);

    let doubled = ops::mul_scalar(&part, 2.0).unwrap();
    assert_eq!(doubled.values(), vec![4.0, 8.0]);

    let above = ops::tgt_scalar(&temp, &5.0).unwrap();
    let switch = at("2000-01-06");
    assert!(!above.value_at_timestamp(switch).unwrap());
    assert!(above.value_at_timestamp(at("2000-01-06 00:00:01")).unwrap());
    assert!(temp.ever_eq(&7.5));
    assert!(!temp.always_gt(&0.0));
}

#[test]
fn test_vehicle_trip() {
    init();

    let trip: Temporal<GeoPoint> = "[POINT(0 0)@2000-01-01 08:00:00, POINT(300 400)@2000-01-01 08:00:50, \
         POINT(300 400)@2000-01-01 08:01:10, POINT(300 0)@2000-01-01 08:02:00]"
        .parse()
        .unwrap();

    assert_eq!(spatial::length(&trip), 900.0);

    let speed = spatial::speed(&trip).unwrap().unwrap();
    assert_eq!(speed.value_at_timestamp(at("2000-01-01 08:00:10")).unwrap(), 10.0);
    assert_eq!(speed.value_at_timestamp(at("2000-01-01 08:01:00")).unwrap(), 0.0);
    assert_eq!(speed.value_at_timestamp(at("2000-01-01 08:01:30")).unwrap(), 8.0);

    let depot = GeoPoint::new(300.0, 400.0);
    let near = spatial::tdwithin_point(&trip, &depot, 1.0).unwrap();
    assert!(near.value_at_timestamp(at("2000-01-01 08:01:00")).unwrap());
    assert!(!near.value_at_timestamp(at("2000-01-01 08:00:00")).unwrap());

    let line = spatial::trajectory(&trip);
    assert_eq!(line.0.len(), 3);

    let simple = simplify(&trip, 1.0, None).unwrap();
    assert_eq!(simple.num_instants(), trip.num_instants());
}

#[test]
fn test_average_and_integral() {
    init();

    let ramp: Temporal<f64> = "[0@2000-01-01 00:00:00, 10@2000-01-01 00:00:10]".parse().unwrap();
    assert_eq!(ops::integral(&ramp), 50.0);
    assert_eq!(ops::twavg(&ramp), 5.0);

    let steps: Temporal<f64> = "Interp=Stepwise;[2@2000-01-01 00:00:00, 4@2000-01-01 00:00:10, 4@2000-01-01 00:00:40]"
        .parse()
        .unwrap();
    assert_eq!(ops::integral(&steps), 140.0);
    assert_eq!(ops::twavg(&steps), 3.5);
}

#[test]
fn test_text_operators() {
    init();

    let name: Temporal<String> = r#"["ab"@2000-01-01, "cd"@2000-01-02]"#.parse().unwrap();
    let tagged = ops::textcat_scalar(&name, "!").unwrap();
    assert_eq!(tagged.values(), vec!["ab!".to_string(), "cd!".to_string()]);
    let shouted = ops::upper(&tagged).unwrap();
    assert_eq!(shouted.values(), vec!["AB!".to_string(), "CD!".to_string()]);
}

#[test]
fn test_shift_keeps_shape() {
    init();

    let temp: Temporal<i32> = "{[1@2000-01-01, 2@2000-01-02], [3@2000-01-04, 3@2000-01-05]}".parse().unwrap();
    let day = 86_400 * 1_000_000;
    let shifted = temp.shift(day);
    assert_eq!(shifted.start_timestamp(), at("2000-01-02"));
    assert_eq!(shifted.values(), temp.values());
    assert_eq!(shifted.duration(), temp.duration());
}

#[test]
fn test_comparisons_at_an_unaligned_crossing() {
    init();

    // The lines meet at 0.3/1.3 seconds, which is not a whole microsecond.
    let a: Temporal<f64> = "[0@2000-01-01 00:00:00, 1@2000-01-01 00:00:01]".parse().unwrap();
    let b: Temporal<f64> = "[0.3@2000-01-01 00:00:00, 0@2000-01-01 00:00:01]".parse().unwrap();

    let eq = ops::teq(&a, &b).unwrap().unwrap();
    assert!(eq.ever_eq(&true));
    assert!(!eq.always_eq(&true));
    let crossing = eq
        .instants()
        .iter()
        .find(|inst| *inst.value())
        .map(|inst| inst.timestamp())
        .unwrap();
    assert_eq!(crossing.micros() - at("2000-01-01").micros(), 230_769);

    let lt = ops::tlt(&a, &b).unwrap().unwrap();
    assert!(lt.value_at_timestamp(at("2000-01-01")).unwrap());
    assert!(!lt.value_at_timestamp(crossing).unwrap());
    assert!(!lt.value_at_timestamp(at("2000-01-01 00:00:01")).unwrap());

    let le = ops::tle(&a, &b).unwrap().unwrap();
    assert!(le.value_at_timestamp(crossing).unwrap());
}

#[test]
fn test_dwithin_at_the_exact_distance() {
    init();

    let origin = GeoPoint::new(0.0, 0.0);

    // Passes straight through: the distance is exactly 3 at 2s and 8s.
    let through: Temporal<GeoPoint> =
        "[POINT(-5 0)@2000-01-01 00:00:00, POINT(5 0)@2000-01-01 00:00:10]".parse().unwrap();
    let within = spatial::tdwithin_point(&through, &origin, 3.0).unwrap();
    assert!(!within.value_at_timestamp(at("2000-01-01 00:00:01")).unwrap());
    assert!(within.value_at_timestamp(at("2000-01-01 00:00:02")).unwrap());
    assert!(within.value_at_timestamp(at("2000-01-01 00:00:05")).unwrap());
    assert!(within.value_at_timestamp(at("2000-01-01 00:00:08")).unwrap());
    assert!(!within.value_at_timestamp(at("2000-01-01 00:00:09")).unwrap());

    // Grazes the circle: only the instant of closest approach is within.
    let tangent: Temporal<GeoPoint> =
        "[POINT(-5 3)@2000-01-01 00:00:00, POINT(5 3)@2000-01-01 00:00:10]".parse().unwrap();
    let touch = spatial::tdwithin_point(&tangent, &origin, 3.0).unwrap();
    assert!(touch.ever_eq(&true));
    assert!(touch.value_at_timestamp(at("2000-01-01 00:00:05")).unwrap());
    assert!(!touch.value_at_timestamp(at("2000-01-01 00:00:04.999")).unwrap());
    assert!(!touch.value_at_timestamp(at("2000-01-01 00:00:05.001")).unwrap());
}

#[test]
fn test_integer_overflow_is_reported() {
    init();

    let big: Temporal<i32> = "[2147483647@2000-01-01, 2147483647@2000-01-02]".parse().unwrap();
    assert!(matches!(ops::add_scalar(&big, 1), Err(TemporaError::OutOfRange(_))));
    assert!(matches!(ops::mul(&big, &big), Err(TemporaError::OutOfRange(_))));

    let min: Temporal<i32> = "-2147483648@2000-01-01".parse().unwrap();
    assert!(matches!(ops::div_scalar(&min, -1), Err(TemporaError::OutOfRange(_))));
}
