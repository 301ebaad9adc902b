use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Source of "now" for dates, month labels and identifiers.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a settable instant.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Label used as the billing period of a rent payment, e.g. "October 2023".
pub fn month_label(now: DateTime<Utc>) -> String {
    now.format("%B %Y").to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Property,
    Tenant,
    Payment,
    Complaint,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Property => "prop",
            IdKind::Tenant => "tenant",
            IdKind::Payment => "pay",
            IdKind::Complaint => "comp",
        }
    }
}

static ID_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `<prefix>-<unix millis>-<sequence>-<random>`. The process-wide sequence keeps
/// ids distinct within one millisecond, the random tail across processes.
pub fn new_id(kind: IdKind, now: DateTime<Utc>) -> String {
    let seq = ID_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let tail = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}-{}",
        kind.prefix(),
        now.timestamp_millis(),
        seq,
        &tail[..6]
    )
}

/// The instant a mutation is applied at.
#[derive(Debug, Clone, Copy)]
pub struct Moment {
    now: DateTime<Utc>,
}

impl Moment {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date_naive()
    }

    pub fn month_label(&self) -> String {
        month_label(self.now)
    }

    pub fn new_id(&self, kind: IdKind) -> String {
        new_id(kind, self.now)
    }
}
