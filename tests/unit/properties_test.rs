//! Property tests for match offsets, context clamping and result ordering

use docsift::diagnostics::NullSink;
use docsift::{ContextExtractor, ContextStatus, MatchScanner, ResultAggregator};
use proptest::prelude::*;

use crate::helpers::{metadata, page, registry};

fn chars_before(text: &str, offset: usize) -> usize {
    text[..offset].chars().count()
}

fn chars_after(text: &str, offset: usize) -> usize {
    text[offset..].chars().count()
}

proptest! {
    #[test]
    fn raw_matches_agree_with_page_text(text in "[abcé \n]{0,60}") {
        let registry = registry(&[&["ab", "é+"], &["c+a?"]]);
        let raw = MatchScanner::default().scan(&page(1, &text), "doc.pdf", &registry, &NullSink);

        for m in &raw {
            prop_assert!(m.start_offset < m.end_offset);
            prop_assert!(m.end_offset <= text.len());
            prop_assert_eq!(&text[m.start_offset..m.end_offset], m.match_text.as_str());
        }

        // Within one pattern: ascending and non-overlapping
        for tier in 1..=2u8 {
            for index in 0..2usize {
                let spans: Vec<_> = raw
                    .iter()
                    .filter(|m| m.tier == tier && m.pattern_index == index)
                    .map(|m| (m.start_offset, m.end_offset))
                    .collect();
                for pair in spans.windows(2) {
                    prop_assert!(pair[0].1 <= pair[1].0);
                }
            }
        }
    }

    #[test]
    fn context_is_clamped_to_the_page(text in "[abé .]{0,50}", window in 0usize..15) {
        let registry = registry(&[&["b+"]]);
        let raw = MatchScanner::default().scan(&page(1, &text), "doc.pdf", &registry, &NullSink);
        let extractor = ContextExtractor::new(window).preserve_whitespace();

        for m in &raw {
            let ctx = extractor.extract_context(m, &text);
            prop_assert_eq!(&ctx.raw, m);
            prop_assert!(ctx.context_start <= m.start_offset);
            prop_assert!(ctx.context_end >= m.end_offset);
            prop_assert!(ctx.context_end <= text.len());

            let before = chars_before(&text, m.start_offset);
            let after = chars_after(&text, m.end_offset);
            let expected = if before >= window && after >= window {
                ContextStatus::Full
            } else if before.min(window) + after.min(window) > 0 {
                ContextStatus::Partial
            } else {
                ContextStatus::Unavailable
            };
            prop_assert_eq!(ctx.context_status, expected);

            match ctx.context_status {
                ContextStatus::Unavailable => {
                    prop_assert!(ctx.context_text.is_none());
                    prop_assert_eq!(
                        (ctx.context_start, ctx.context_end),
                        (m.start_offset, m.end_offset)
                    );
                }
                _ => {
                    let captured = &text[ctx.context_start..ctx.context_end];
                    prop_assert_eq!(ctx.context_text.as_deref(), Some(captured));
                    let captured_before = chars_before(&text, m.start_offset)
                        - chars_before(&text, ctx.context_start);
                    prop_assert_eq!(captured_before, before.min(window));
                }
            }
        }
    }

    #[test]
    fn finalized_order_ignores_insertion_order(
        keys in proptest::collection::vec((0usize..3, 1u32..4, 1u8..3, 0usize..50), 0..40)
    ) {
        let registry = registry(&[&["x"], &["y"]]);
        let build = |order: &[(usize, u32, u8, usize)]| {
            let aggregator = ResultAggregator::for_registry(&registry);
            for &(doc, page_number, tier, start) in order {
                let mut raw = crate::helpers::raw_match("x", "x");
                raw.document_index = doc;
                raw.page_number = page_number;
                raw.tier = tier;
                raw.start_offset = start;
                raw.end_offset = start + 1;
                let matched = ContextExtractor::new(0).extract_context(&raw, "");
                aggregator.add(matched, &metadata(doc, "doc.pdf")).unwrap();
            }
            aggregator.finalize()
        };

        let forward = build(&keys);
        let mut reversed = keys.clone();
        reversed.reverse();
        let backward = build(&reversed);

        prop_assert_eq!(&forward, &backward);
        prop_assert!(forward.windows(2).all(|w| w[0].order_key() <= w[1].order_key()));
    }
}
