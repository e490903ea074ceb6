//! Time-windowed routines.

use crate::actor::ScheduleRule;

/// Room named by the first rule active at `hour`.
pub fn destination(rules: &[ScheduleRule], hour: u8) -> Option<&str> {
    rules
        .iter()
        .find(|rule| rule.is_active(hour))
        .map(|rule| rule.room.as_str())
}
