//! Property-based tests for splitting and compression.

#[allow(dead_code)]
#[path = "../src/fixtures.rs"]
mod fixtures;

use fixtures::{create_test_pdf, page_numbers};
use docsplit_core::{
    compress, page_count, split_with_budget, Budget, CompressOptions, ParseOptions,
};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn parts_reassemble_the_source(pages in 1u32..=60, per_part in 1u32..=25) {
        let pdf = create_test_pdf(pages);
        let budget = Budget { max_pages_per_part: per_part, ..Budget::default() };
        let result = split_with_budget(&pdf, "doc.pdf", &budget, &ParseOptions::default()).unwrap();

        let reassembled: Vec<u32> = result
            .parts
            .iter()
            .flat_map(|part| page_numbers(&part.bytes))
            .collect();
        prop_assert_eq!(reassembled, (1..=pages).collect::<Vec<_>>());
    }

    #[test]
    fn part_count_law(pages in 1u32..=60, per_part in 1u32..=25) {
        let pdf = create_test_pdf(pages);
        let budget = Budget { max_pages_per_part: per_part, ..Budget::default() };
        let result = split_with_budget(&pdf, "doc.pdf", &budget, &ParseOptions::default()).unwrap();

        if result.was_split {
            prop_assert_eq!(result.parts.len() as u32, pages.div_ceil(per_part));
        } else {
            prop_assert!(pages <= per_part);
            prop_assert_eq!(result.parts.len(), 1);
        }
    }

    #[test]
    fn labels_are_contiguous(pages in 1u32..=60, per_part in 1u32..=25) {
        let pdf = create_test_pdf(pages);
        let budget = Budget { max_pages_per_part: per_part, ..Budget::default() };
        let result = split_with_budget(&pdf, "doc.pdf", &budget, &ParseOptions::default()).unwrap();

        prop_assert_eq!(result.parts.first().unwrap().range.start, 1);
        prop_assert_eq!(result.parts.last().unwrap().range.end, pages);
        for pair in result.parts.windows(2) {
            prop_assert_eq!(pair[0].range.end + 1, pair[1].range.start);
        }
        for (i, part) in result.parts.iter().enumerate() {
            prop_assert_eq!(page_count(&part.bytes).unwrap(), part.range.len());
            if result.was_split {
                let suffix = format!("_parte{}de{}.pdf", i + 1, result.parts.len());
                prop_assert!(part.name.ends_with(&suffix));
            }
        }
    }

    #[test]
    fn compression_preserves_page_count(pages in 1u32..=40, strip in any::<bool>(), streams in any::<bool>()) {
        let pdf = create_test_pdf(pages);
        let options = CompressOptions {
            remove_metadata: strip,
            use_object_streams: streams,
            ..CompressOptions::default()
        };
        let result = compress(&pdf, &options).unwrap();
        prop_assert_eq!(page_count(&result.bytes).unwrap(), pages);
        prop_assert_eq!(result.compressed_size, result.bytes.len());
    }
}
