//! Records as stored in their tables.

use crate::domain::enums::{FeeType, GenderType, PlaceType, RoleType, TechnicalType};
use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Opening window of a stadium or venue on one weekday (1 = Monday).
///
/// Also deserializes from a positional JSON array, which is how aggregated child rows
/// arrive: `[id, place_id, type, weekday, start_time, end_time]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessHour {
    pub id: i32,
    pub place_id: i32,
    #[serde(rename = "type")]
    pub place_type: PlaceType,
    pub weekday: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: i32,
    pub email: String,
    pub nickname: String,
    pub gender: GenderType,
    pub role: RoleType,
    pub is_verified: bool,
    pub is_google_login: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    pub id: i32,
    pub stadium_id: i32,
    pub name: String,
    pub floor: String,
    pub reservation_interval: Option<i32>,
    pub is_reservable: bool,
    pub is_chargeable: bool,
    pub fee_rate: Option<f64>,
    pub fee_type: Option<FeeType>,
    pub area: i32,
    pub capacity: i32,
    pub current_user_count: i32,
    pub sport_equipments: Option<String>,
    pub facilities: Option<String>,
    pub court_count: i32,
    pub court_type: String,
    pub sport_id: i32,
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Court {
    pub id: i32,
    pub venue_id: i32,
    pub number: i32,
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservation {
    pub id: i32,
    pub stadium_id: i32,
    pub venue_id: i32,
    pub court_id: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub technical_level: Vec<TechnicalType>,
    pub invitation_code: String,
    pub remark: Option<String>,
    pub member_count: i32,
    pub vacancy: i32,
    pub is_public: bool,
    pub is_cancelled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_hour_from_positional_json() {
        let json = serde_json::json!([3, 7, "stadium", 2, "08:00:00", "22:30:00"]);
        let hour: BusinessHour = serde_json::from_value(json).unwrap();
        assert_eq!(hour.id, 3);
        assert_eq!(hour.place_type, PlaceType::Stadium);
        assert_eq!(hour.end_time, NaiveTime::from_hms_opt(22, 30, 0).unwrap());
    }

    #[test]
    fn test_business_hour_serializes_type_key() {
        let hour = BusinessHour {
            id: 1,
            place_id: 1,
            place_type: PlaceType::Venue,
            weekday: 1,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            end_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
        };
        let json = serde_json::to_value(&hour).unwrap();
        assert_eq!(json["type"], "venue");
        assert_eq!(json["start_time"], "09:00:00");
    }
}
