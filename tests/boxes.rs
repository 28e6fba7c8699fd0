use rstar::{AABB, RTree, RTreeObject};
use tempora::TemporalBox;
use tempora::boxes::consider_split;
use tempora::prelude::*;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn trip(x: f64, start_min: u32) -> Temporal<GeoPoint> {
    format!(
        "[POINT({} 0)@2000-01-01 08:{:02}:00, POINT({} 10)@2000-01-01 08:{:02}:00]",
        x,
        start_min,
        x + 10.0,
        start_min + 5
    )
    .parse()
    .unwrap()
}

#[test]
fn test_builder_box_only_grows() {
    init();

    let mut builder = SequenceBuilder::new(Interpolation::Linear).unwrap();
    let mut previous: Option<TBox> = None;
    for (i, value) in [3.0, -1.0, 8.0, 2.0, 10.0].into_iter().enumerate() {
        builder.push(TInstant::new(value, Timestamp::from_secs(i as i64 * 60))).unwrap();
        let current = *builder.bbox().unwrap();
        if let Some(prev) = previous {
            assert!(current.contains(&prev), "{} does not contain {}", current, prev);
        }
        previous = Some(current);
    }
    let seq = builder.finish(true).unwrap();
    assert_eq!(seq.bbox().xmin, -1.0);
    assert_eq!(seq.bbox().xmax, 10.0);
}

#[test]
fn test_box_covers_every_instant() {
    init();

    let temp = trip(5.0, 0);
    let bbox = temp.bbox();
    for inst in temp.instants() {
        assert!(bbox.contains_point(inst.value()));
        assert!(bbox.period().contains_value(inst.timestamp()));
    }
    assert_eq!((bbox.xmin, bbox.xmax, bbox.ymin, bbox.ymax), (5.0, 15.0, 0.0, 10.0));
}

#[test]
fn test_expand_is_monotonic() {
    init();

    let mut acc = trip(0.0, 0).bbox();
    for i in 1..6 {
        let next = trip(i as f64 * 20.0, i * 5).bbox();
        let before = acc;
        acc.expand(&next);
        assert!(acc.contains(&before));
        assert!(acc.contains(&next));
    }
}

#[test]
fn test_rtree_over_boxes() {
    init();

    let trips: Vec<Temporal<GeoPoint>> = (0..10).map(|i| trip(i as f64 * 100.0, i * 5)).collect();
    let tree = RTree::bulk_load(trips.iter().map(|t| t.bbox()).collect());
    assert_eq!(tree.size(), 10);

    let probe = trip(190.0, 10).bbox();
    let hits: Vec<&STBox> = tree.locate_in_envelope_intersecting(&probe.envelope()).collect();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].xmin, 200.0);

    let everything = AABB::from_corners([-1.0, -1.0, -1.0, f64::MIN], [1e9, 1e9, 1.0, f64::MAX]);
    assert_eq!(tree.locate_in_envelope_intersecting(&everything).count(), 10);
}

#[test]
fn test_split_separates_clusters() {
    init();

    let boxes: Vec<STBox> = (0..10)
        .map(|i| {
            let x = if i % 2 == 0 { i as f64 } else { 1000.0 + i as f64 };
            trip(x, 0).bbox()
        })
        .collect();
    let split = consider_split(&boxes).unwrap();
    assert_eq!(split.left, vec![0, 2, 4, 6, 8]);
    assert_eq!(split.right, vec![1, 3, 5, 7, 9]);
}
