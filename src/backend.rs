use crate::types::{Booking, BookingRequest, Salon};
use chrono::NaiveDate;
use thiserror::Error;
use tokio_stream::wrappers::WatchStream;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Salon does not exist")]
    UnknownSalon,
    #[error("Salon already exists")]
    DuplicateSalon,
    #[error("Staff member \"{0}\" does not work at this salon")]
    UnknownStaff(String),
    #[error("Selection \"{0}\" has no staff member assigned")]
    UnassignedSelection(String),
    #[error("Requested slot was already booked")]
    SlotTaken,
    #[error("Requested slot already passed")]
    SlotInPast,
    #[error("Booking does not exist and can therefore not be removed")]
    UnknownBooking,
}

/// Storage seam between the HTTP layer and whatever holds salons and
/// bookings. The availability engine never talks to this directly; the
/// caller fetches from here and hands the engine plain data.
pub trait SalonBackend: Clone + Send + Sync + 'static {
    fn salons(&self) -> Vec<Salon>;
    fn salon(&self, id: Uuid) -> Option<Salon>;
    fn add_salon(&self, salon: Salon) -> Result<(), BackendError>;
    /// Existing bookings for one staff member on one date.
    fn bookings_on(&self, salon_id: Uuid, staff_name: &str, date: NaiveDate) -> Vec<Booking>;
    /// Creates one booking per involved staff member. Must reject a request
    /// whose interval overlaps an existing booking for the same staff member
    /// on the same date; availability answers are advisory only and two
    /// buyers may race for the same slot.
    fn book(&self, request: BookingRequest) -> Result<Vec<Booking>, BackendError>;
    fn remove_booking(&self, id: Uuid) -> Result<(), BackendError>;
    fn remove_all_bookings(&self);
    fn booking_stream(&self) -> WatchStream<Vec<Booking>>;
}
