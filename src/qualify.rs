//! Lead-to-quote qualification mapping.
//!
//! Converts one lead into one quote: retrieve the lead and its parent
//! account, copy and remap fields onto a fresh quote (option-set values go
//! through stringmap reconciliation because the codes are entity-local),
//! persist it, and hand the id back to the caller. Transitioning the lead
//! to closed/qualified afterwards is the caller's job.

use log::debug;
use uuid::Uuid;

use crate::names::{account, entities, lead, quote};
use crate::query::{Condition, Query, SortDirection};
use crate::record::{AttributeValue, EntityReference, OptionValue, Record};
use crate::service::{RecordService, ServiceResult};
use crate::stringmap;

/// Map `lead_ref` into a new quote.
///
/// Returns `Ok(None)` when the lead has no parent account (qualification is
/// a no-op the caller reports as a failure) or when the post-create
/// re-query comes back empty. Service failures propagate.
pub fn qualify_lead_to_quote(
    service: &dyn RecordService,
    lead_ref: &EntityReference,
) -> ServiceResult<Option<Uuid>> {
    let lead_record = service.retrieve(lead_ref, lead::COLUMNS)?;

    // No parent account, no quote.
    let Some(account_ref) = lead_record.get_reference(lead::PARENT_ACCOUNT) else {
        debug!("lead {} has no parent account, skipping quote", lead_ref.id);
        return Ok(None);
    };
    let account_record = service.retrieve(&account_ref, account::COLUMNS)?;

    let quote_record =
        build_quote(service, lead_ref, &lead_record, &account_ref, &account_record)?;
    service.create(&quote_record)?;

    // Re-query rather than trusting the create response: the newest quote
    // originating from this lead is the one we just made.
    latest_quote_for_lead(service, lead_ref)
}

fn build_quote(
    service: &dyn RecordService,
    lead_ref: &EntityReference,
    lead_record: &Record,
    account_ref: &EntityReference,
    account_record: &Record,
) -> ServiceResult<Record> {
    let mut quote_record = Record::new(entities::QUOTE);

    if let Some(subject) = lead_record.get_string(lead::SUBJECT) {
        quote_record.set(quote::NAME, AttributeValue::String(subject.to_string()));
    }

    // Verbatim copies from the lead.
    copy_attribute(
        lead_record,
        lead::BUSINESS_STREAM,
        &mut quote_record,
        quote::BUSINESS_STREAM,
    );
    copy_attribute(
        lead_record,
        lead::VERTICAL_MARKET_APPLICATION,
        &mut quote_record,
        quote::VERTICAL_MARKET_APPLICATION,
    );
    copy_attribute(lead_record, lead::COUNTRY, &mut quote_record, quote::COUNTRY);
    copy_attribute(
        lead_record,
        lead::PRODUCT_CATEGORY,
        &mut quote_record,
        quote::PRODUCT_CATEGORY,
    );
    copy_attribute(lead_record, lead::TELEPHONE, &mut quote_record, quote::PHONE);
    copy_attribute(lead_record, lead::CREATED_BY, &mut quote_record, quote::OWNER);

    if let Some(contact) = contact_name(lead_record) {
        quote_record.set(quote::CONTACT, AttributeValue::String(contact));
    }

    quote_record.set(
        quote::ORIGINATING_LEAD,
        AttributeValue::Reference(lead_ref.clone()),
    );
    // The customer is the lead's parent account, written as a typed
    // reference (the legacy solution wrote the raw lookup value here; see
    // DESIGN.md for the correction).
    quote_record.set(
        quote::CUSTOMER,
        AttributeValue::Reference(account_ref.clone()),
    );

    // Verbatim copies from the account.
    copy_attribute(
        account_record,
        account::PRICE_LEVEL,
        &mut quote_record,
        quote::PRICE_LEVEL,
    );
    copy_attribute(account_record, account::CURRENCY, &mut quote_record, quote::CURRENCY);
    copy_attribute(
        account_record,
        account::PAYMENT_TERMS,
        &mut quote_record,
        quote::PAYMENT_TERMS,
    );

    // Entity-local option sets need reconciliation against the quote's own
    // option definitions.
    reconcile_option(
        service,
        lead_record,
        lead::REGION_ROLE,
        &mut quote_record,
        quote::REGION_ROLE,
    )?;
    reconcile_option(
        service,
        account_record,
        account::ACCOUNT_CATEGORY,
        &mut quote_record,
        quote::ACCOUNT_CATEGORY,
    )?;
    reconcile_option(
        service,
        account_record,
        account::SUPPLY_AGREEMENT_CATEGORY,
        &mut quote_record,
        quote::SUPPLY_AGREEMENT_CATEGORY,
    )?;

    Ok(quote_record)
}

/// Copy one attribute verbatim when the source holds a value.
fn copy_attribute(source: &Record, source_attr: &str, target: &mut Record, target_attr: &str) {
    if let Some(value) = source.value(source_attr) {
        target.set(target_attr, value.clone());
    }
}

/// "first last" with a single separating space; either part alone stands by
/// itself. `None` when the lead has neither part.
fn contact_name(lead_record: &Record) -> Option<String> {
    let first = lead_record.get_string(lead::FIRST_NAME);
    let last = lead_record.get_string(lead::LAST_NAME);
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (Some(first), None) => Some(first.to_string()),
        (None, Some(last)) => Some(last.to_string()),
        (None, None) => None,
    }
}

/// Translate a source option onto the quote, omitting the attribute when no
/// admissible target option matches (best effort by design).
fn reconcile_option(
    service: &dyn RecordService,
    source: &Record,
    source_attr: &str,
    quote_record: &mut Record,
    target_attr: &str,
) -> ServiceResult<()> {
    let Some(source_value) = source.get_option(source_attr) else {
        return Ok(());
    };
    let candidates = stringmap::option_candidates(service, entities::QUOTE, target_attr)?;
    let source_label = source.formatted(source_attr);

    match stringmap::reconcile(&candidates, source_label, source_value.0) {
        Some(value) => {
            quote_record.set(target_attr, AttributeValue::Option(OptionValue(value)));
        }
        None => {
            debug!(
                "no quote option matches {}={} (label {:?}), omitting {}",
                source_attr, source_value.0, source_label, target_attr
            );
        }
    }
    Ok(())
}

/// Newest quote originating from `lead_ref`, by creation time.
fn latest_quote_for_lead(
    service: &dyn RecordService,
    lead_ref: &EntityReference,
) -> ServiceResult<Option<Uuid>> {
    let query = Query::new(entities::QUOTE)
        .column(quote::QUOTE_ID)
        .condition(Condition::equal(
            quote::ORIGINATING_LEAD,
            AttributeValue::Reference(lead_ref.clone()),
        ))
        .order_by(quote::CREATED_ON, SortDirection::Descending);

    let quotes = service.retrieve_multiple(&query)?;
    Ok(quotes.first().and_then(|q| q.id))
}
