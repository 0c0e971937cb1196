//! Context budgeting: compress an arbitrary-size snapshot into a bounded
//! string for the answer generator.
//!
//! The algorithm is greedy and order-preserving: walk the snapshot in order,
//! render each record as a delimited block with its content capped, and stop
//! at the first block that no longer fits. No skipping ahead, no partial
//! blocks. Determinism over packing optimality: the same snapshot and budget
//! always yield byte-identical output, which keeps answers reproducible and
//! debuggable, and bounds the cost to one pass.
//!
//! Budgets are measured in characters (Unicode scalar values), never bytes,
//! so capping can never split a code point.

use askbase_shared::KnowledgeRecord;

/// Default maximum characters taken from each record's content.
pub const DEFAULT_PER_RECORD_CAP: usize = 500;

/// Default maximum characters in the assembled context.
pub const DEFAULT_TOTAL_BUDGET: usize = 15_000;

/// Budgeting parameters for context assembly.
#[derive(Debug, Clone, Copy)]
pub struct ContextBudget {
    /// Maximum characters taken from each record's content.
    pub per_record_cap: usize,
    /// Maximum characters in the assembled context.
    pub total_budget: usize,
}

impl Default for ContextBudget {
    fn default() -> Self {
        Self {
            per_record_cap: DEFAULT_PER_RECORD_CAP,
            total_budget: DEFAULT_TOTAL_BUDGET,
        }
    }
}

/// Assemble the bounded context string from `records`, in snapshot order.
///
/// A block exactly filling the remaining budget is included (inclusive
/// boundary); a block that would push past it ends the pass. The result can
/// be empty: an empty snapshot, or a first block that alone exceeds the
/// budget, both produce `""` rather than a truncated block.
pub fn build_context(records: &[KnowledgeRecord], budget: &ContextBudget) -> String {
    let mut context = String::new();
    let mut used = 0usize;

    for record in records {
        let block = render_block(record, budget.per_record_cap);
        let block_chars = block.chars().count();

        if used + block_chars > budget.total_budget {
            break;
        }
        context.push_str(&block);
        used += block_chars;
    }

    context
}

/// Render one record as a delimited block with capped content.
fn render_block(record: &KnowledgeRecord, per_record_cap: usize) -> String {
    format!(
        "---\nSOURCE: {}\n{}\n",
        record.source,
        cap_chars(&record.content, per_record_cap)
    )
}

/// The first `cap` characters of `s`, on a char boundary.
fn cap_chars(s: &str, cap: usize) -> &str {
    match s.char_indices().nth(cap) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(source: &str, content: &str) -> KnowledgeRecord {
        KnowledgeRecord::new(source, content)
    }

    #[test]
    fn empty_snapshot_yields_empty_context() {
        let context = build_context(&[], &ContextBudget::default());
        assert!(context.is_empty());
    }

    #[test]
    fn all_records_fit_in_original_order() {
        let records = vec![
            record("https://example.com/a", "first"),
            record("https://example.com/b", "second"),
            record("https://example.com/c", "third"),
        ];
        let context = build_context(&records, &ContextBudget::default());

        let a = context.find("SOURCE: https://example.com/a").unwrap();
        let b = context.find("SOURCE: https://example.com/b").unwrap();
        let c = context.find("SOURCE: https://example.com/c").unwrap();
        assert!(a < b && b < c);
        assert!(context.contains("first"));
        assert!(context.contains("third"));
    }

    #[test]
    fn output_never_exceeds_budget() {
        let records: Vec<KnowledgeRecord> = (0..50)
            .map(|i| record(&format!("https://example.com/{i}"), &"x".repeat(400)))
            .collect();

        for total_budget in [0, 1, 100, 1_000, 5_000, 15_000] {
            let budget = ContextBudget {
                per_record_cap: 500,
                total_budget,
            };
            let context = build_context(&records, &budget);
            assert!(
                context.chars().count() <= total_budget,
                "budget {total_budget} exceeded: {}",
                context.chars().count()
            );
        }
    }

    #[test]
    fn per_record_cap_truncates_content() {
        let records = vec![record("https://example.com/long", &"y".repeat(2_000))];
        let budget = ContextBudget {
            per_record_cap: 100,
            total_budget: 15_000,
        };
        let context = build_context(&records, &budget);
        assert!(context.contains(&"y".repeat(100)));
        assert!(!context.contains(&"y".repeat(101)));
    }

    #[test]
    fn stop_rule_never_skips_ahead() {
        // The second record's block overflows; the third would fit, but the
        // pass must stop at the first overflow rather than cherry-pick.
        let records = vec![
            record("https://example.com/a", "aa"),
            record("https://example.com/b", &"b".repeat(400)),
            record("https://example.com/c", "cc"),
        ];
        let budget = ContextBudget {
            per_record_cap: 500,
            total_budget: 80,
        };
        let context = build_context(&records, &budget);
        assert!(context.contains("example.com/a"));
        assert!(!context.contains("example.com/b"));
        assert!(!context.contains("example.com/c"));
    }

    #[test]
    fn oversized_first_block_yields_empty_context() {
        let records = vec![record("https://example.com/big", &"z".repeat(400))];
        let budget = ContextBudget {
            per_record_cap: 500,
            total_budget: 50,
        };
        let context = build_context(&records, &budget);
        assert!(context.is_empty(), "oversized block must be excluded, never partially emitted");
    }

    #[test]
    fn block_exactly_filling_budget_included() {
        // Inclusive boundary: a block of exactly the total budget fits.
        let rec = record("https://example.com/a", "01234567890123456789");
        let block_chars = format!("---\nSOURCE: {}\n{}\n", rec.source, rec.content)
            .chars()
            .count();

        let budget = ContextBudget {
            per_record_cap: 500,
            total_budget: block_chars,
        };
        let context = build_context(std::slice::from_ref(&rec), &budget);
        assert_eq!(context.chars().count(), block_chars);
        assert!(context.contains("01234567890123456789"));
    }

    #[test]
    fn block_one_over_budget_excluded() {
        let rec = record("https://example.com/a", "01234567890123456789");
        let block_chars = format!("---\nSOURCE: {}\n{}\n", rec.source, rec.content)
            .chars()
            .count();

        let budget = ContextBudget {
            per_record_cap: 500,
            total_budget: block_chars - 1,
        };
        let context = build_context(std::slice::from_ref(&rec), &budget);
        assert!(context.is_empty());
    }

    #[test]
    fn deterministic_across_runs() {
        let records = vec![
            record("https://example.com/a", &"a".repeat(700)),
            record("https://example.com/b", &"b".repeat(300)),
        ];
        let budget = ContextBudget::default();
        assert_eq!(
            build_context(&records, &budget),
            build_context(&records, &budget)
        );
    }

    #[test]
    fn multibyte_content_caps_on_char_boundary() {
        let records = vec![record("https://example.com/fr", &"é".repeat(600))];
        let budget = ContextBudget {
            per_record_cap: 500,
            total_budget: 15_000,
        };
        let context = build_context(&records, &budget);
        assert!(context.contains(&"é".repeat(500)));
        assert!(!context.contains(&"é".repeat(501)));
    }
}
