//! Closed label sets shared by the database, the HTTP layer and the row mappers.
//!
//! Sort keys map to fixed SQL expressions; user text never reaches an ORDER BY.

use crate::sql_enum;

sql_enum! {
    /// Owner kind of a business-hour row.
    pub enum PlaceType {
        Stadium => "stadium",
        Venue => "venue",
    }
}

sql_enum! {
    pub enum GenderType {
        Male => "male",
        Female => "female",
        Unrevealed => "unrevealed",
    }
}

sql_enum! {
    pub enum RoleType {
        Normal => "normal",
        Provider => "provider",
    }
}

sql_enum! {
    pub enum FeeType {
        PerHour => "per_hour",
        PerPerson => "per_person",
        PerPersonPerHour => "per_person_per_hour",
    }
}

sql_enum! {
    pub enum TechnicalType {
        Entry => "entry",
        Intermediate => "intermediate",
        Advanced => "advanced",
    }
}

sql_enum! {
    /// Sort direction.
    pub enum Sorter {
        Asc => "asc",
        Desc => "desc",
    }
}

impl Sorter {
    pub fn sql(&self) -> &'static str {
        match self {
            Sorter::Asc => "ASC",
            Sorter::Desc => "DESC",
        }
    }
}

sql_enum! {
    pub enum ReservationStatus {
        Cancelled => "cancelled",
        Upcoming => "upcoming",
        Ongoing => "ongoing",
        Finished => "finished",
    }
}

sql_enum! {
    pub enum VenueAvailableSortBy {
        CurrentUserCount => "current_user_count",
        Capacity => "capacity",
        ReservationInterval => "reservation_interval",
    }
}

impl VenueAvailableSortBy {
    pub fn sql(&self) -> &'static str {
        match self {
            VenueAvailableSortBy::CurrentUserCount => "current_user_count",
            VenueAvailableSortBy::Capacity => "capacity",
            VenueAvailableSortBy::ReservationInterval => "reservation_interval",
        }
    }
}

sql_enum! {
    pub enum BrowseReservationSortBy {
        Time => "time",
        Vacancy => "vacancy",
    }
}

impl BrowseReservationSortBy {
    pub fn sql(&self) -> &'static str {
        match self {
            BrowseReservationSortBy::Time => "reservation.start_time",
            BrowseReservationSortBy::Vacancy => "reservation.vacancy",
        }
    }
}

sql_enum! {
    pub enum ViewMyReservationSortBy {
        Time => "time",
        StadiumName => "stadium_name",
        Status => "status",
    }
}

impl ViewMyReservationSortBy {
    pub fn sql(&self) -> &'static str {
        match self {
            ViewMyReservationSortBy::Time => "start_time",
            ViewMyReservationSortBy::StadiumName => "stadium_name",
            ViewMyReservationSortBy::Status => "(start_time, is_cancelled)",
        }
    }
}

sql_enum! {
    pub enum ViewProviderStadiumSortBy {
        StadiumName => "stadium_name",
        DistrictName => "district_name",
        VenueCount => "venue_count",
    }
}

impl ViewProviderStadiumSortBy {
    pub fn sql(&self) -> &'static str {
        match self {
            ViewProviderStadiumSortBy::StadiumName => "stadium_name",
            ViewProviderStadiumSortBy::DistrictName => "district_name",
            ViewProviderStadiumSortBy::VenueCount => "venue_count",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_keys_map_to_fixed_sql() {
        assert_eq!(ViewMyReservationSortBy::Status.sql(), "(start_time, is_cancelled)");
        assert_eq!(Sorter::Desc.sql(), "DESC");
        assert_eq!(
            "current_user_count".parse::<VenueAvailableSortBy>().unwrap().sql(),
            "current_user_count"
        );
    }

    #[test]
    fn test_labels_round_trip_through_json() {
        let role: RoleType = serde_json::from_str("\"provider\"").unwrap();
        assert_eq!(role, RoleType::Provider);
        assert_eq!(serde_json::to_value(FeeType::PerHour).unwrap(), "per_hour");
    }
}
