//! Wire types of the booking API

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingDates {
    pub checkin: NaiveDate,
    pub checkout: NaiveDate,
}

/// A booking as the harness submits it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Booking {
    pub firstname: String,
    #[serde(default)]
    pub lastname: Option<String>,
    pub totalprice: Number,
    pub depositpaid: bool,
    pub bookingdates: BookingDates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additionalneeds: Option<String>,
}

/// Body returned by `POST /booking`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedBooking {
    pub bookingid: u64,
    pub booking: Booking,
}

/// One entry of the `GET /booking` listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingRef {
    pub bookingid: u64,
}

/// A booking exactly as the API returned it.
///
/// The decoded body is kept whole, so any 200 response yields a record even
/// when it does not fit [`Booking`]. Accessors read fields without narrowing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingRecord(Value);

impl BookingRecord {
    pub fn new(body: Value) -> Self {
        Self(body)
    }

    pub fn body(&self) -> &Value {
        &self.0
    }

    pub fn into_body(self) -> Value {
        self.0
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn firstname(&self) -> Option<&str> {
        self.field("firstname").and_then(Value::as_str)
    }

    pub fn lastname(&self) -> Option<&str> {
        self.field("lastname").and_then(Value::as_str)
    }

    pub fn totalprice(&self) -> Option<&Number> {
        match self.field("totalprice") {
            Some(Value::Number(price)) => Some(price),
            _ => None,
        }
    }

    /// Typed view, when the body has the shape of a [`Booking`]
    pub fn to_booking(&self) -> Option<Booking> {
        serde_json::from_value(self.0.clone()).ok()
    }
}

impl From<Value> for BookingRecord {
    fn from(body: Value) -> Self {
        Self(body)
    }
}

/// A search result: the listed id plus the full record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub bookingid: u64,
    pub booking: BookingRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Query filters for `GET /booking`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingFilter {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub checkin: Option<NaiveDate>,
    pub checkout: Option<NaiveDate>,
}

impl BookingFilter {
    pub fn by_name(firstname: impl Into<String>, lastname: impl Into<String>) -> Self {
        Self {
            firstname: Some(firstname.into()),
            lastname: Some(lastname.into()),
            ..Self::default()
        }
    }

    pub fn by_dates(checkin: NaiveDate, checkout: NaiveDate) -> Self {
        Self {
            checkin: Some(checkin),
            checkout: Some(checkout),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.to_query().is_empty()
    }

    /// Query pairs for the filters that are set
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(firstname) = &self.firstname {
            query.push(("firstname".to_string(), firstname.clone()));
        }
        if let Some(lastname) = &self.lastname {
            query.push(("lastname".to_string(), lastname.clone()));
        }
        if let Some(checkin) = self.checkin {
            query.push(("checkin".to_string(), checkin.format("%Y-%m-%d").to_string()));
        }
        if let Some(checkout) = self.checkout {
            query.push(("checkout".to_string(), checkout.format("%Y-%m-%d").to_string()));
        }
        query
    }
}
