//! Option-set reconciliation across entities.
//!
//! Option codes are entity-local: the same business choice ("Gold tier",
//! "EMEA") can carry different integer codes on lead, account, and quote.
//! The platform's `stringmap` metadata table holds every admissible
//! (label, code) pair per entity/attribute, which lets the mapper translate
//! a source choice into the equivalent target choice at run time.

use crate::names;
use crate::query::{Condition, Query};
use crate::record::AttributeValue;
use crate::service::{RecordService, ServiceResult};

/// One admissible option on the target attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionCandidate {
    pub label: String,
    pub value: i32,
}

/// Fetch the full candidate set for `(entity, attribute)` in service order.
pub fn option_candidates(
    service: &dyn RecordService,
    entity: &str,
    attribute: &str,
) -> ServiceResult<Vec<OptionCandidate>> {
    let query = Query::new(names::entities::STRINGMAP)
        .columns([names::stringmap::VALUE, names::stringmap::ATTRIBUTE_VALUE])
        .condition(Condition::equal(
            names::stringmap::OBJECT_TYPE_CODE_NAME,
            AttributeValue::String(entity.to_string()),
        ))
        .condition(Condition::equal(
            names::stringmap::ATTRIBUTE_NAME,
            AttributeValue::String(attribute.to_string()),
        ));

    let rows = service.retrieve_multiple(&query)?;
    let mut candidates = Vec::with_capacity(rows.len());
    for row in rows {
        let label = row.get_string(names::stringmap::VALUE).unwrap_or_default();
        let Some(value) = row.get_option(names::stringmap::ATTRIBUTE_VALUE) else {
            // Metadata rows without a code are unusable for reconciliation.
            log::warn!(
                "stringmap row for {}.{} has no attributevalue, skipping",
                entity,
                attribute
            );
            continue;
        };
        candidates.push(OptionCandidate {
            label: label.to_string(),
            value: value.0,
        });
    }
    Ok(candidates)
}

/// Resolve the target code for a source choice.
///
/// Candidates are walked in the order the lookup returned them. A candidate
/// matches when its label equals the source's display label
/// (case-insensitive) or its code equals the source's raw code; the last
/// matching candidate wins, with no early exit. `None` means nothing matched
/// and the caller omits the attribute (best effort, not a failure).
pub fn reconcile(
    candidates: &[OptionCandidate],
    source_label: Option<&str>,
    source_value: i32,
) -> Option<i32> {
    let mut resolved = None;
    for candidate in candidates {
        let label_match =
            source_label.is_some_and(|label| candidate.label.eq_ignore_ascii_case(label));
        if label_match || candidate.value == source_value {
            resolved = Some(candidate.value);
        }
    }
    resolved
}
