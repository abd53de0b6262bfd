//! Read-side projections joined and aggregated across tables.

use crate::domain::entity::BusinessHour;
use crate::domain::enums::ReservationStatus;
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Weekly opening window used to filter by business hours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekTimeRange {
    /// 1 = Monday .. 7 = Sunday
    pub weekday: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Absolute time window used to filter reservations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateTimeRange {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewStadium {
    pub id: i32,
    pub name: String,
    pub district_id: i32,
    pub owner_id: i32,
    pub contact_number: Option<String>,
    pub description: Option<String>,
    pub long: f64,
    pub lat: f64,
    pub city: String,
    pub district: String,
    pub is_published: bool,
    pub sports: Vec<String>,
    pub business_hours: Vec<BusinessHour>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewMyReservation {
    pub reservation_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub stadium_name: String,
    pub venue_name: String,
    pub is_manager: bool,
    pub vacancy: i32,
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewProviderStadium {
    pub stadium_id: i32,
    pub city_name: String,
    pub district_name: String,
    pub stadium_name: String,
    pub venue_count: i64,
    pub is_published: bool,
}

/// Status of a reservation as seen at `now`. Cancellation wins over time.
pub fn compose_reservation_status(
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    is_cancelled: bool,
    now: DateTime<Utc>,
) -> ReservationStatus {
    if is_cancelled {
        ReservationStatus::Cancelled
    } else if now < start_time {
        ReservationStatus::Upcoming
    } else if now <= end_time {
        ReservationStatus::Ongoing
    } else {
        ReservationStatus::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_compose_reservation_status() {
        let (start, end) = (at(11, 10), at(11, 12));
        assert_eq!(compose_reservation_status(start, end, false, at(10, 0)), ReservationStatus::Upcoming);
        assert_eq!(compose_reservation_status(start, end, false, at(11, 10)), ReservationStatus::Ongoing);
        assert_eq!(compose_reservation_status(start, end, false, at(11, 12)), ReservationStatus::Ongoing);
        assert_eq!(compose_reservation_status(start, end, false, at(30, 0)), ReservationStatus::Finished);
        assert_eq!(compose_reservation_status(start, end, true, at(10, 0)), ReservationStatus::Cancelled);
    }

    #[test]
    fn test_week_time_range_from_json() {
        let range: WeekTimeRange =
            serde_json::from_str(r#"{"weekday": 3, "start_time": "18:00:00", "end_time": "20:00:00"}"#)
                .unwrap();
        assert_eq!(range.weekday, 3);
        assert_eq!(range.start_time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    }
}
