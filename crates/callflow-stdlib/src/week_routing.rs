//! Sample configuration: route the call by calendar week
//!
//! The week number modulo 3 picks one of three extensions, so on-call duty
//! rotates weekly. Each target is reached through a short delayed transfer.

use crate::components::{DisconnectCall, ExecuteCode, Transfer};
use crate::telephony::CallControl;
use callflow_core::{
    ConditionalBranch, CoreError, FlowRegistry, FlowStep, SequenceContainer, Variable,
    VariableStore,
};
use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Variable holding the computed week value
pub const WEEK_VALUE: &str = "weekValue";

/// Week number of `date` within its calendar year
///
/// Weeks start on Monday and week 1 is the first week with four days in the
/// year. Unlike ISO 8601 the count never rolls over into the next year, so
/// the last days of December that ISO assigns to week 1 continue the old
/// year's numbering as week 53.
pub fn week_of_year(date: NaiveDate) -> u32 {
    let iso = date.iso_week();
    if iso.year() <= date.year() {
        return iso.week();
    }
    date.checked_sub_days(Days::new(7))
        .map_or(53, |previous| previous.iso_week().week() + 1)
}

/// Week number of `date` modulo 3
pub fn week_value(date: NaiveDate) -> i64 {
    i64::from(week_of_year(date) % 3)
}

/// Destinations for the three week values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeekRoutingTargets {
    /// Extension for week value 0, 1 and 2, in that order
    pub extensions: [String; 3],

    /// Delay before each transfer, in milliseconds
    pub delay_ms: u64,
}

impl Default for WeekRoutingTargets {
    fn default() -> Self {
        Self {
            extensions: ["1004".to_string(), "1006".to_string(), "1002".to_string()],
            delay_ms: 500,
        }
    }
}

fn week_is(expected: i64) -> impl Fn(&VariableStore) -> Result<bool, CoreError> + Send + Sync {
    move |vars| {
        let value = vars.get(WEEK_VALUE)?;
        value.as_i64().map(|v| v == expected).ok_or_else(|| {
            CoreError::ConditionEvaluationError(format!(
                "{} is not a number: {}",
                WEEK_VALUE,
                value.as_value()
            ))
        })
    }
}

/// Build the week routing lists using today's local date
pub fn build_week_routing_flow(
    call: Arc<dyn CallControl>,
    targets: &WeekRoutingTargets,
) -> FlowRegistry {
    build_week_routing_flow_with_clock(call, targets, || Local::now().date_naive())
}

/// Build the week routing lists with an explicit date source
///
/// Main list: compute the week value, branch on it, transfer, and fall back
/// to a disconnect. Error list: disconnect. Disconnect list: empty.
pub fn build_week_routing_flow_with_clock<C>(
    call: Arc<dyn CallControl>,
    targets: &WeekRoutingTargets,
    today: C,
) -> FlowRegistry
where
    C: Fn() -> NaiveDate + Send + Sync + 'static,
{
    let week_check = ExecuteCode::new("WeekCheckComponent", move |vars| {
        let value = week_value(today());
        vars.set(WEEK_VALUE, value);
        Ok(Variable::new(json!([value == 0, value])))
    });

    let delay = Duration::from_millis(targets.delay_ms);
    let mut routing = ConditionalBranch::new("WeekRoutingCondition");
    let branches = targets.extensions.iter().zip(["A", "B", "C"]).enumerate();
    for (index, (extension, suffix)) in branches {
        let transfer = Transfer::to(
            format!("TransferToExt{}", suffix),
            call.clone(),
            extension.clone(),
        )
        .with_delay(delay);
        routing = routing.when(
            week_is(index as i64),
            SequenceContainer::new(format!("Branch_Week{}", index)).with_leaf(transfer),
        );
    }

    FlowRegistry::builder()
        .main(FlowStep::leaf(week_check))
        .main(routing)
        .main(FlowStep::leaf(DisconnectCall::new("MainDisconnect")))
        .error(FlowStep::leaf(DisconnectCall::new("ErrorDisconnect")))
        .build()
}
