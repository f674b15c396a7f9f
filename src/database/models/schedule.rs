use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A schedule slot is either weekly-recurring or pinned to one date,
/// never both. The tagged variant makes the mutual exclusion a type
/// property; the two nullable columns exist only at the row boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ShiftSlot {
    #[serde(rename_all = "camelCase")]
    Recurring { day_of_week: i16 },
    #[serde(rename_all = "camelCase")]
    DateSpecific { date: NaiveDate },
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSchedule {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub company_id: Uuid,
    pub day_of_week: Option<i16>,
    pub slot_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShiftSchedule {
    /// Reconstructs the tagged slot from the row. A row violating the
    /// exclusivity CHECK constraint cannot exist, so this never fails
    /// for persisted data.
    pub fn slot(&self) -> Option<ShiftSlot> {
        match (self.day_of_week, self.slot_date) {
            (Some(dow), None) => Some(ShiftSlot::Recurring { day_of_week: dow }),
            (None, Some(date)) => Some(ShiftSlot::DateSpecific { date }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateShiftScheduleInput {
    pub employee_id: Uuid,
    pub slot: ShiftSlot,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn slot_round_trips_through_json() {
        let recurring = ShiftSlot::Recurring { day_of_week: 2 };
        let json = serde_json::to_string(&recurring).unwrap();
        assert!(json.contains("\"kind\":\"recurring\""));
        assert_eq!(
            serde_json::from_str::<ShiftSlot>(&json).unwrap(),
            recurring
        );

        let dated = ShiftSlot::DateSpecific {
            date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        };
        let json = serde_json::to_string(&dated).unwrap();
        assert_eq!(serde_json::from_str::<ShiftSlot>(&json).unwrap(), dated);
    }
}
