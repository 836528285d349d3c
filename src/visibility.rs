//! Country-driven visibility for the address state inputs.
//!
//! Address forms carry two mutually exclusive state (province) inputs: a
//! lookup into the state entity for countries whose states are modeled, and
//! a free-text input for the rest. The original client script issued a
//! synchronous count request but read the result out of an async callback
//! that had not fired yet, so it always fell back to the text input on the
//! first evaluation. This resolver takes the blocking-call interpretation:
//! the count is returned directly and a transport failure is an error, not
//! a silent "no states" default.

use uuid::Uuid;

use crate::record::EntityReference;
use crate::service::ServiceResult;

/// Which state input the form should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateInput {
    /// Lookup into the state entity.
    Lookup,
    /// Free-text field.
    Text,
}

/// Counts state records referencing a country.
pub trait StateCounter {
    fn count_states_for_country(&self, country_id: Uuid) -> ServiceResult<u64>;
}

/// Decide which state input to show for the selected country.
///
/// A populated external-system identifier forces the text input and skips
/// the count query entirely (externally mastered addresses keep whatever
/// free-text state they came with). No country selected also means text.
pub fn resolve_state_input(
    counter: &dyn StateCounter,
    country: Option<&EntityReference>,
    external_system_id: Option<&str>,
) -> ServiceResult<StateInput> {
    if external_system_id.is_some_and(|id| !id.trim().is_empty()) {
        return Ok(StateInput::Text);
    }
    let Some(country) = country else {
        return Ok(StateInput::Text);
    };

    let count = counter.count_states_for_country(country.id)?;
    Ok(if count > 0 {
        StateInput::Lookup
    } else {
        StateInput::Text
    })
}
