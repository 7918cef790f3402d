use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use chrono::NaiveDate;
use tokio::sync::watch::{self, Sender};
use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::{
    backend::{BackendError, SalonBackend},
    types::{Booking, BookingRequest, Salon},
};

pub struct MockSalonBackendInner {
    pub success: AtomicBool,
    pub calls_to_salons: AtomicU64,
    pub calls_to_salon: AtomicU64,
    pub calls_to_add_salon: AtomicU64,
    pub calls_to_bookings_on: AtomicU64,
    pub calls_to_book: AtomicU64,
    pub calls_to_remove_booking: AtomicU64,
    pub calls_to_remove_all_bookings: AtomicU64,
    pub salons: Mutex<HashMap<Uuid, Salon>>,
    pub bookings: Mutex<Vec<Booking>>,
    pub sender: Sender<Vec<Booking>>,
}

#[derive(Clone)]
pub struct MockSalonBackend(pub Arc<MockSalonBackendInner>);

impl MockSalonBackendInner {
    fn new() -> Self {
        let (sender, _) = watch::channel(vec![]);
        Self {
            success: AtomicBool::new(true),
            calls_to_salons: AtomicU64::default(),
            calls_to_salon: AtomicU64::default(),
            calls_to_add_salon: AtomicU64::default(),
            calls_to_bookings_on: AtomicU64::default(),
            calls_to_book: AtomicU64::default(),
            calls_to_remove_booking: AtomicU64::default(),
            calls_to_remove_all_bookings: AtomicU64::default(),
            salons: Mutex::default(),
            bookings: Mutex::default(),
            sender,
        }
    }
}

impl MockSalonBackend {
    pub fn new() -> Self {
        Self(Arc::new(MockSalonBackendInner::new()))
    }

    fn result(&self) -> Result<(), BackendError> {
        match self.0.success.load(Ordering::SeqCst) {
            true => Ok(()),
            false => Err(BackendError::SlotTaken),
        }
    }
}

impl SalonBackend for MockSalonBackend {
    fn salons(&self) -> Vec<Salon> {
        self.0.calls_to_salons.fetch_add(1, Ordering::SeqCst);
        self.0.salons.lock().unwrap().values().cloned().collect()
    }

    fn salon(&self, id: Uuid) -> Option<Salon> {
        self.0.calls_to_salon.fetch_add(1, Ordering::SeqCst);
        self.0.salons.lock().unwrap().get(&id).cloned()
    }

    fn add_salon(&self, salon: Salon) -> Result<(), BackendError> {
        self.0.calls_to_add_salon.fetch_add(1, Ordering::SeqCst);
        self.result()?;
        self.0.salons.lock().unwrap().insert(salon.id, salon);
        Ok(())
    }

    fn bookings_on(&self, salon_id: Uuid, staff_name: &str, date: NaiveDate) -> Vec<Booking> {
        self.0.calls_to_bookings_on.fetch_add(1, Ordering::SeqCst);
        self.0
            .bookings
            .lock()
            .unwrap()
            .iter()
            .filter(|booking| {
                booking.salon_id == salon_id
                    && booking.staff_name == staff_name
                    && booking.date == date
            })
            .cloned()
            .collect()
    }

    fn book(&self, _request: BookingRequest) -> Result<Vec<Booking>, BackendError> {
        self.0.calls_to_book.fetch_add(1, Ordering::SeqCst);
        self.result().map(|()| vec![])
    }

    fn remove_booking(&self, _id: Uuid) -> Result<(), BackendError> {
        self.0.calls_to_remove_booking.fetch_add(1, Ordering::SeqCst);
        self.result()
    }

    fn remove_all_bookings(&self) {
        self.0
            .calls_to_remove_all_bookings
            .fetch_add(1, Ordering::SeqCst);
    }

    fn booking_stream(&self) -> WatchStream<Vec<Booking>> {
        let stream = WatchStream::new(self.0.sender.subscribe());
        let bookings = self.0.bookings.lock().unwrap().clone();
        self.0.sender.send(bookings).ok();
        stream
    }
}

pub async fn read_from_booking_stream(stream: &mut WatchStream<Vec<Booking>>) -> Vec<Booking> {
    tokio::time::timeout(Duration::from_secs(1), stream.next())
        .await
        .expect("Timed out waiting for bookings")
        .expect("Booking stream ended unexpectedly")
}
