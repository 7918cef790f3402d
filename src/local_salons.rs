use crate::{
    backend::{BackendError, SalonBackend},
    types::{Booking, BookingRequest, DayHours, Salon, StaffMember, TimeOfDay, WeeklySchedule},
};
use chrono::{Duration, Local, NaiveDate, Timelike};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::sync::watch::{self, Sender};
use tokio_stream::wrappers::WatchStream;
use tracing::error;
use uuid::Uuid;

/// In-memory salons and bookings. Impersistent; everything is gone on
/// restart.
#[derive(Debug, Clone)]
pub struct LocalSalons {
    salons: Arc<Mutex<HashMap<Uuid, Salon>>>,
    bookings: Arc<Mutex<HashMap<Uuid, Booking>>>,
    sender: Sender<Vec<Booking>>,
}

impl Default for LocalSalons {
    fn default() -> LocalSalons {
        let (sender, _) = watch::channel(vec![]);
        Self {
            salons: Arc::new(Mutex::default()),
            bookings: Arc::new(Mutex::default()),
            sender,
        }
    }
}

impl LocalSalons {
    pub fn insert_example_salon(&self) {
        let weekdays = ["monday", "tuesday", "wednesday", "thursday", "friday"];
        let open = |start: &str, end: &str, days: &[&str]| {
            let mut schedule = HashMap::new();
            for &day in days {
                schedule.insert(
                    day.to_string(),
                    DayHours {
                        open: true,
                        start: start.parse().unwrap_or(TimeOfDay(0)),
                        end: end.parse().unwrap_or(TimeOfDay(0)),
                    },
                );
            }
            WeeklySchedule(schedule)
        };

        let salon = Salon {
            id: Uuid::new_v4(),
            name: "Bella Vista".to_string(),
            weekly_schedule: open("09:00", "17:00", &weekdays),
            holidays: vec![],
            staff: vec![
                StaffMember {
                    name: "Anna".to_string(),
                    weekly_schedule: open("09:00", "13:00", &weekdays),
                    holidays: vec![],
                    services: vec!["Haircut".to_string(), "Coloring".to_string()],
                },
                StaffMember {
                    name: "Berta".to_string(),
                    weekly_schedule: open("10:00", "17:00", &weekdays[..3]),
                    holidays: vec![],
                    services: vec!["Haircut".to_string(), "Manicure".to_string()],
                },
            ],
        };
        if let Err(err) = self.add_salon(salon) {
            error!(?err, "Failed to insert example salon");
        }
    }

    fn cleanup_outdated_bookings(&self, max_age: Duration) {
        let cutoff_date = Local::now().date_naive() - max_age;
        let mut bookings = self.bookings.lock().unwrap();

        bookings.retain(|_, booking| booking.date >= cutoff_date);
    }

    fn bookings(&self) -> Vec<Booking> {
        self.cleanup_outdated_bookings(Duration::days(1));

        let mut bookings: Vec<Booking> = self
            .bookings
            .lock()
            .unwrap()
            .values()
            .cloned()
            .collect();
        bookings.sort_unstable_by(|a, b| (a.date, a.start).cmp(&(b.date, b.start)));
        bookings
    }

    fn send_bookings(&self) {
        let bookings = self.bookings();

        if let Err(err) = self.sender.send(bookings) {
            error!(?err, "Failed to send current bookings");
        }
    }

    fn is_past(date: NaiveDate, start: TimeOfDay) -> bool {
        let now = Local::now();
        let today = now.date_naive();
        let now_minutes = (now.hour() * 60 + now.minute()) as u16;
        date < today || (date == today && start.minutes() < now_minutes)
    }
}

/// Combined workload and service list per assigned staff member. Selections
/// sharing a staff member become one booking record. Durations are summed in
/// u32; they are client-supplied and must not wrap.
fn staff_workloads(
    request: &BookingRequest,
) -> Result<HashMap<String, (u32, Vec<String>)>, BackendError> {
    let mut workloads: HashMap<String, (u32, Vec<String>)> = HashMap::new();
    for selection in &request.selections {
        let staff_name = selection
            .staff_name
            .clone()
            .ok_or_else(|| BackendError::UnassignedSelection(selection.service.clone()))?;
        let entry = workloads.entry(staff_name).or_default();
        entry.0 += u32::from(selection.duration_minutes);
        entry.1.push(selection.service.clone());
    }
    Ok(workloads)
}

impl SalonBackend for LocalSalons {
    fn salons(&self) -> Vec<Salon> {
        let mut salons: Vec<Salon> = self.salons.lock().unwrap().values().cloned().collect();
        salons.sort_unstable_by(|a, b| a.name.cmp(&b.name));
        salons
    }

    fn salon(&self, id: Uuid) -> Option<Salon> {
        self.salons.lock().unwrap().get(&id).cloned()
    }

    fn add_salon(&self, salon: Salon) -> Result<(), BackendError> {
        let mut salons = self.salons.lock().unwrap();
        if salons.contains_key(&salon.id) {
            error!("Salon {} already exists", salon.id);
            return Err(BackendError::DuplicateSalon);
        }
        salons.insert(salon.id, salon);
        Ok(())
    }

    fn bookings_on(&self, salon_id: Uuid, staff_name: &str, date: NaiveDate) -> Vec<Booking> {
        self.bookings()
            .into_iter()
            .filter(|booking| {
                booking.salon_id == salon_id
                    && booking.staff_name == staff_name
                    && booking.date == date
            })
            .collect()
    }

    fn book(&self, request: BookingRequest) -> Result<Vec<Booking>, BackendError> {
        let workloads = staff_workloads(&request)?;

        let salon = self
            .salon(request.salon_id)
            .ok_or(BackendError::UnknownSalon)?;
        for staff_name in workloads.keys() {
            if salon.staff_member(staff_name).is_none() {
                error!("Staff member {staff_name} does not work at {}", salon.name);
                return Err(BackendError::UnknownStaff(staff_name.clone()));
            }
        }

        if Self::is_past(request.date, request.start) {
            error!("Requested slot already passed");
            return Err(BackendError::SlotInPast);
        }

        // Availability answers are advisory; the write is where double
        // bookings get rejected.
        let mut bookings = self.bookings.lock().unwrap();
        let start = u32::from(request.start.minutes());
        for (staff_name, (duration, _)) in &workloads {
            let taken = bookings.values().any(|booking| {
                booking.salon_id == request.salon_id
                    && &booking.staff_name == staff_name
                    && booking.date == request.date
                    && start < booking.end()
                    && start + duration > u32::from(booking.start.minutes())
            });
            if taken {
                error!("Slot at {} was already booked for {staff_name}", request.start);
                return Err(BackendError::SlotTaken);
            }
        }

        let mut created = vec![];
        for (staff_name, (duration, services)) in workloads {
            let booking = Booking {
                id: Uuid::new_v4(),
                salon_id: request.salon_id,
                staff_name,
                date: request.date,
                start: request.start,
                duration_minutes: duration,
                client_name: request.client_name.clone(),
                services,
            };
            bookings.insert(booking.id, booking.clone());
            created.push(booking);
        }
        drop(bookings);

        self.send_bookings();
        created.sort_unstable_by(|a, b| a.staff_name.cmp(&b.staff_name));
        Ok(created)
    }

    fn remove_booking(&self, id: Uuid) -> Result<(), BackendError> {
        if self.bookings.lock().unwrap().remove(&id).is_none() {
            error!("Booking {id} does not exist and can therefore not be removed");
            return Err(BackendError::UnknownBooking);
        }
        self.send_bookings();
        Ok(())
    }

    fn remove_all_bookings(&self) {
        self.bookings.lock().unwrap().clear();
        self.send_bookings();
    }

    fn booking_stream(&self) -> WatchStream<Vec<Booking>> {
        let stream = WatchStream::new(self.sender.subscribe());
        self.send_bookings();
        stream
    }
}
