//! Generator properties through the public API.

use bitmap_bench::query::{bitmap, intersect, top_n};
use bitmap_bench::{generate_import_csv, ImportSpec, QueryGenerator};
use std::io::Read;

fn small_spec() -> ImportSpec {
    ImportSpec {
        base_bitmap_id: 0,
        max_bitmap_id: 3,
        base_profile_id: 0,
        max_profile_id: 100,
        min_bits_per_map: 1,
        max_bits_per_map: 2,
        seed: 42,
        random_order: false,
    }
}

#[test]
fn test_small_dataset_one_bit_per_bitmap() {
    let mut csv = Vec::new();
    let rows = generate_import_csv(&mut csv, &small_spec()).unwrap();
    let text = String::from_utf8(csv).unwrap();

    assert_eq!(rows, 3);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    for (expected_bitmap, line) in lines.iter().enumerate() {
        let (bitmap_id, profile_id) = line.split_once(',').unwrap();
        assert_eq!(bitmap_id.parse::<i64>().unwrap(), expected_bitmap as i64);
        assert!((0..100).contains(&profile_id.parse::<i64>().unwrap()));
    }
    assert!(text.ends_with('\n'));
}

#[test]
fn test_csv_reproducible_through_file() {
    let mut file = tempfile::tempfile().unwrap();
    let written = generate_import_csv(&mut file, &small_spec()).unwrap();

    let mut in_memory = Vec::new();
    generate_import_csv(&mut in_memory, &small_spec()).unwrap();

    use std::io::Seek;
    file.rewind().unwrap();
    let mut on_disk = Vec::new();
    file.read_to_end(&mut on_disk).unwrap();
    assert_eq!(on_disk, in_memory);
    assert_eq!(written, on_disk.iter().filter(|&&b| b == b'\n').count());
}

#[test]
fn test_row_count_matches_lines() {
    for random_order in [false, true] {
        let spec = ImportSpec {
            max_bitmap_id: 200,
            max_profile_id: 5000,
            min_bits_per_map: 0,
            max_bits_per_map: 20,
            seed: 7,
            random_order,
            ..small_spec()
        };
        let mut csv = Vec::new();
        let rows = generate_import_csv(&mut csv, &spec).unwrap();
        assert_eq!(rows, String::from_utf8(csv).unwrap().lines().count());
        assert_eq!(rows, spec.rows().count());
    }
}

#[test]
fn test_generators_agree_on_seed() {
    let render = |seed| {
        let mut generator = QueryGenerator::new(seed)
            .with_frames(vec!["a".to_string(), "b".to_string()]);
        (0..50)
            .map(|_| generator.random(10, 4, 5, 0, 1000).to_string())
            .collect::<Vec<_>>()
    };
    assert_eq!(render(11), render(11));
    assert_ne!(render(11), render(12));
}

#[test]
fn test_builders_render_as_expected() {
    let query = top_n(
        "stargazer",
        5,
        Some(intersect(vec![bitmap(1, "language"), bitmap(7, "language")])),
        &[],
        None,
        vec![],
    );
    assert_eq!(
        query.to_string(),
        r#"TopN(Intersect(Bitmap(frame="language", rowID=1), Bitmap(frame="language", rowID=7)), frame="stargazer", n=5)"#
    );
}
