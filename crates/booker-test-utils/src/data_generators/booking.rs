use std::fmt;
use std::str::FromStr;

use booker_client::{Booking, BookingDates};
use chrono::{Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};

use crate::error::TestError;
use crate::security::AttackKind;

const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "John", "Patricia", "Robert", "Jennifer", "Michael", "Linda", "William",
    "Elizabeth", "David", "Susan", "Sally", "Jim", "Amara", "Kenji", "Lucia", "Omar",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Wilson",
    "Anderson", "Taylor", "Thomas", "Moore", "Okafor", "Tanaka", "Rossi", "Haddad",
];

const ADDITIONAL_NEEDS: &[Option<&str>] = &[
    Some("Breakfast"),
    Some("Lunch"),
    Some("Dinner"),
    Some("WiFi"),
    None,
];

/// The field a generated invalid booking corrupts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InvalidField {
    Firstname,
    Lastname,
    Totalprice,
    Depositpaid,
    Checkin,
    Checkout,
}

impl InvalidField {
    pub const ALL: [InvalidField; 6] = [
        Self::Firstname,
        Self::Lastname,
        Self::Totalprice,
        Self::Depositpaid,
        Self::Checkin,
        Self::Checkout,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Firstname => "firstname",
            Self::Lastname => "lastname",
            Self::Totalprice => "totalprice",
            Self::Depositpaid => "depositpaid",
            Self::Checkin => "checkin",
            Self::Checkout => "checkout",
        }
    }
}

impl fmt::Display for InvalidField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvalidField {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TestError::Other(format!("Unknown booking field: {s}")))
    }
}

/// Randomized booking records.
///
/// Both the random source and the notion of "today" are injectable, so a
/// seeded factory with a fixed date is fully deterministic.
#[derive(Debug, Clone)]
pub struct BookingFactory {
    rng: StdRng,
    today: NaiveDate,
}

impl Default for BookingFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingFactory {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            today: Utc::now().date_naive(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            today: Utc::now().date_naive(),
        }
    }

    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// A booking the API should accept.
    ///
    /// `checkin` falls within the next 30 days and `checkout` between the day
    /// after checkin and 60 days out.
    pub fn valid(&mut self) -> Booking {
        let checkin = self.today + Duration::days(self.rng.gen_range(0..=30));
        let latest_checkout = self.today + Duration::days(60);
        let max_stay = (latest_checkout - checkin).num_days();
        let checkout = checkin + Duration::days(self.rng.gen_range(1..=max_stay));

        Booking {
            firstname: self.pick(FIRST_NAMES).to_string(),
            lastname: Some(self.pick(LAST_NAMES).to_string()),
            totalprice: self.rng.gen_range(50..=2000_i64).into(),
            depositpaid: self.rng.gen_bool(0.5),
            bookingdates: BookingDates { checkin, checkout },
            additionalneeds: ADDITIONAL_NEEDS
                .choose(&mut self.rng)
                .copied()
                .flatten()
                .map(String::from),
        }
    }

    /// A valid booking with exactly one field corrupted
    pub fn invalid(&mut self, field: InvalidField) -> Value {
        let booking = self.valid();
        let mut data = json!(booking);

        match field {
            InvalidField::Firstname => data["firstname"] = json!(""),
            InvalidField::Lastname => data["lastname"] = Value::Null,
            InvalidField::Totalprice => data["totalprice"] = json!("not_a_number"),
            InvalidField::Depositpaid => data["depositpaid"] = json!("not_boolean"),
            InvalidField::Checkin => data["bookingdates"]["checkin"] = json!("invalid_date"),
            InvalidField::Checkout => {
                let before_checkin = booking.bookingdates.checkin - Duration::days(1);
                data["bookingdates"]["checkout"] = json!(before_checkin.format("%Y-%m-%d").to_string());
            }
        }

        data
    }

    /// A valid booking whose firstname carries an attack payload
    pub fn attack(&mut self, kind: AttackKind) -> Booking {
        Booking {
            firstname: kind.primary_payload().to_string(),
            ..self.valid()
        }
    }

    fn pick(&mut self, values: &[&'static str]) -> &'static str {
        values.choose(&mut self.rng).copied().unwrap_or_default()
    }
}
