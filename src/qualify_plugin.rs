//! The lead qualification plugin.
//!
//! Bound to the custom `mca_QualifyLeadToQuoteAction` message at the
//! post-operation stage. On success it reports the new quote id through the
//! action's output parameters and transitions the lead to closed/qualified;
//! on mapper failure it aborts the transaction so the platform rolls the
//! quote back.

use log::{error, info};

use crate::error::{PluginError, PluginResult};
use crate::names::{entities, lead, messages, parameters};
use crate::plugin::{LocalContext, PipelineStage, Plugin};
use crate::qualify::qualify_lead_to_quote;
use crate::record::AttributeValue;

/// Error surfaced when qualification produced no quote.
pub const QUOTE_CREATION_FAILED: &str = "There was an issue creating the quote";

/// Build the plugin with its single registration.
pub fn qualify_lead_plugin() -> Plugin {
    Plugin::new("QualifyLeadToQuote").register(
        PipelineStage::PostOperation,
        messages::QUALIFY_LEAD_TO_QUOTE,
        entities::LEAD,
        Box::new(execute_qualify),
    )
}

fn execute_qualify(local: &mut LocalContext) -> PluginResult<()> {
    // A missing or malformed Target is reported through the output
    // parameters, not raised, and the transaction continues.
    let Some(target) = local.target_reference() else {
        local.set_output(parameters::SUCCESS, AttributeValue::Boolean(false));
        local.set_output(
            parameters::RESULT_MESSAGE,
            AttributeValue::String("Unknown Error".to_string()),
        );
        return Ok(());
    };

    local.trace("qualifying lead to quote");
    match qualify_lead_to_quote(local.service, &target) {
        Ok(Some(quote_id)) => {
            info!("lead {} qualified, quote {}", target.id, quote_id);
            local.set_output(parameters::SUCCESS, AttributeValue::Boolean(true));
            local.set_output(
                parameters::RESULT_MESSAGE,
                AttributeValue::String("OK".to_string()),
            );
            local.set_output(
                parameters::EXECUTION_RESULT,
                AttributeValue::String(quote_id.to_string()),
            );
            // Close the lead only once the quote exists.
            local
                .service
                .set_state(&target, lead::STATE_QUALIFIED, lead::STATUS_QUALIFIED)?;
            Ok(())
        }
        Ok(None) => Err(PluginError::Unrecoverable(QUOTE_CREATION_FAILED.to_string())),
        Err(err) => {
            // Trace the underlying cause, then re-raise as the platform's
            // transaction-abort signal with the message preserved.
            error!("qualification failed for lead {}: {}", target.id, err);
            Err(PluginError::Unrecoverable(err.to_string()))
        }
    }
}
