//! Randomized checks of the record codec over every shape type.

use proptest::prelude::*;
use shp::{
    content_length, decode_record, encode_record, Coordinate, Extent, Shape, ShapeRecord,
    ShapeType,
};

fn shape_type() -> impl Strategy<Value = ShapeType> {
    (0..ShapeType::ALL.len()).prop_map(|i| ShapeType::ALL[i])
}

fn value() -> impl Strategy<Value = f64> {
    -1.0e9..1.0e9f64
}

fn coordinate() -> impl Strategy<Value = Coordinate> {
    (value(), value(), value(), value()).prop_map(|(x, y, z, m)| Coordinate::xyzm(x, y, z, m))
}

// empty lists in the middle make add_point skip part indexes
fn part_lists() -> impl Strategy<Value = Vec<Vec<Coordinate>>> {
    prop::collection::vec(prop::collection::vec(coordinate(), 0..8), 0..5)
}

// parts after the last non-empty list are never created
fn created_parts(parts: &[Vec<Coordinate>]) -> &[Vec<Coordinate>] {
    let used = parts.iter().rposition(|p| !p.is_empty()).map_or(0, |i| i + 1);
    &parts[..used]
}

fn build(shape_type: ShapeType, parts: &[Vec<Coordinate>]) -> Shape {
    let mut shape = Shape::new(shape_type);
    for (i, part) in parts.iter().enumerate() {
        for c in part {
            shape.add_point(*c, i);
        }
    }
    shape
}

fn encode(record: &ShapeRecord) -> Vec<u8> {
    let mut buf = Vec::new();
    encode_record(&mut buf, record).unwrap();
    buf
}

proptest! {
    #[test]
    fn prop_decode_inverts_encode(t in shape_type(), parts in part_lists(), number in 1u32..100_000) {
        let record = ShapeRecord::new(number, build(t, &parts));
        let bytes = encode(&record);
        let decoded = decode_record(&mut bytes.as_slice()).unwrap();
        prop_assert_eq!(decoded.record_number, number);
        prop_assert_eq!(&decoded.shape, &record.shape);

        // bit for bit, including signed zeros
        let before: Vec<u64> = record.shape.coordinates().map(|c| c.x.to_bits()).collect();
        let after: Vec<u64> = decoded.shape.coordinates().map(|c| c.x.to_bits()).collect();
        prop_assert_eq!(before, after);

        // and the same bytes come back out
        prop_assert_eq!(encode(&decoded), bytes);
    }

    #[test]
    fn prop_content_length_matches_bytes(t in shape_type(), parts in part_lists()) {
        let shape = build(t, &parts);
        let words = content_length(&shape).unwrap() as usize;
        let bytes = encode(&ShapeRecord::new(1, shape));
        if t == ShapeType::Null {
            prop_assert_eq!(words, 0);
            prop_assert_eq!(bytes.len(), 12);
        } else {
            // header minus the shape type, which is counted as content
            prop_assert_eq!(words * 2, bytes.len() - 8);
        }
    }

    #[test]
    fn prop_add_point_keeps_invariants(t in shape_type(), parts in part_lists()) {
        let mut shape = Shape::new(t);
        let mut added = 0;
        for (i, part) in parts.iter().enumerate() {
            for c in part {
                shape.add_point(*c, i);
                added += 1;
                if shape.extent().is_some() {
                    prop_assert_eq!(shape.extent().copied(), Extent::from_coordinates(shape.coordinates()));
                }
            }
        }
        match t.family() {
            shp::Family::MultiPoint => prop_assert_eq!(shape.num_points(), added),
            shp::Family::PolyLine | shp::Family::Polygon => {
                prop_assert_eq!(shape.num_points(), added);
                let created = created_parts(&parts);
                prop_assert_eq!(shape.num_parts(), created.len());
                let lens: Vec<usize> = shape.parts().iter().map(|p| p.len()).collect();
                let expected: Vec<usize> = created.iter().map(Vec::len).collect();
                prop_assert_eq!(lens, expected);
            }
            shp::Family::Point => prop_assert_eq!(shape.num_points(), 1),
            shp::Family::Null => prop_assert_eq!(shape.num_points(), 0),
        }
        if added == 0 {
            prop_assert!(shape.extent().is_none());
        }
    }

    #[test]
    fn prop_delete_shrinks_by_one(
        points in prop::collection::vec(coordinate(), 1..16),
        pick in any::<prop::sample::Index>(),
    ) {
        let mut shape = build(ShapeType::MultiPointM, &[points]);
        let before = shape.points().to_vec();
        let idx = pick.index(before.len());
        shape.delete_point(idx, 0);

        let mut expected = before.clone();
        expected.remove(idx);
        prop_assert_eq!(shape.points(), expected.as_slice());
        prop_assert_eq!(shape.num_points(), before.len() - 1);
        prop_assert_eq!(shape.extent().is_none(), expected.is_empty());

        // whatever is left still survives the codec
        let bytes = encode(&ShapeRecord::new(1, shape.clone()));
        prop_assert_eq!(decode_record(&mut bytes.as_slice()).unwrap().shape, shape);
    }
}

#[test]
fn truncated_records_fail_at_every_cut() {
    let mut shape = Shape::new(ShapeType::PolygonZ);
    for i in 0..4 {
        shape.add_point(Coordinate::xyzm(i as f64, 1.0, 2.0, 3.0), i / 2);
    }
    let bytes = encode(&ShapeRecord::new(1, shape));
    for cut in 0..bytes.len() {
        let result = decode_record(&mut &bytes[..cut]);
        assert!(
            matches!(result, Err(shp::Error::TruncatedInput { .. })),
            "cut at {} gave {:?}",
            cut,
            result
        );
    }
}
