//! Domain records, view projections and label enums.

pub mod entity;
pub mod enums;
pub mod view;

pub use entity::{Account, BusinessHour, Court, Reservation, Venue};
pub use enums::*;
pub use view::{
    compose_reservation_status, DateTimeRange, ViewMyReservation, ViewProviderStadium,
    ViewStadium, WeekTimeRange,
};
