//! Schedules: constants as `Schedule:Constant`, interval series as
//! `Schedule:Compact`.

use os_core::Handle;
use os_idf::{RecordType, Value};
use os_model::{Schedule, ScheduleKind};
use os_schedule::{compact_from_time_series, lines_to_fields};

use super::Context;
use crate::error::{TranslateError, TranslateResult};

pub(crate) fn translate_schedule(
    cx: &mut Context<'_>,
    schedule: Schedule,
) -> TranslateResult<Option<Handle>> {
    let model = cx.model;
    let name = cx.name_of(schedule.id());
    let incomplete = |what| TranslateError::Incomplete {
        object: name.clone(),
        what,
    };

    match schedule.kind(model) {
        Some(ScheduleKind::Constant) => {
            let value = schedule.value(model).ok_or_else(|| incomplete("value"))?;
            let h = cx.new_record(RecordType::ScheduleConstant, &name)?;
            cx.set(h, "Hourly Value", Value::Real(value))?;
            Ok(Some(h))
        }
        Some(ScheduleKind::FixedInterval | ScheduleKind::VariableInterval) => {
            let series = schedule
                .time_series(model)
                .ok_or_else(|| incomplete("time series"))?;
            // encode before creating the record so a failure leaves nothing behind
            let lines = compact_from_time_series(&series, cx.options.compact_out_of_range_value)?;
            let h = cx.new_record(RecordType::ScheduleCompact, &name)?;
            for field in lines_to_fields(&lines) {
                cx.push(h, vec![Value::text(field)])?;
            }
            Ok(Some(h))
        }
        None => Ok(None),
    }
}
