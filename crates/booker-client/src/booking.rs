//! Booking resource operations.
//!
//! Helpers return the raw response next to the decoded 200 body. A record is
//! always the body as sent, never a narrowed or fabricated copy.

use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{error, info, instrument};

use crate::config::BOOKING_PATH;
use crate::error::ClientResult;
use crate::http::{ApiClient, ApiResponse, RequestBody};
use crate::models::{BookingFilter, BookingRecord, BookingRef, SearchHit};

/// How many listed ids a search resolves into full records
pub const SEARCH_FETCH_LIMIT: usize = 5;

fn booking_path(id: u64) -> String {
    format!("{BOOKING_PATH}/{id}")
}

#[derive(Debug, Clone)]
pub struct BookingHelper {
    client: ApiClient,
}

impl BookingHelper {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Create a booking. The id is read from `bookingid` on a 200.
    #[instrument(skip(self, data))]
    pub async fn create<T: Serialize + ?Sized>(&self, data: &T) -> ClientResult<(ApiResponse, Option<u64>)> {
        let body = RequestBody::json(data)?;
        let response = self.client.post(BOOKING_PATH, &body, None).await?;

        if response.status() != StatusCode::OK {
            error!("Booking creation failed with status: {}", response.status_code());
            return Ok((response, None));
        }

        let id = response
            .json_value()
            .ok()
            .and_then(|body| body.get("bookingid").and_then(|id| id.as_u64()));

        match id {
            Some(id) => info!("Booking created successfully with ID: {}", id),
            None => error!("Booking creation returned no id: {}", response.text()),
        }
        Ok((response, id))
    }

    #[instrument(skip(self))]
    pub async fn read(&self, id: u64) -> ClientResult<(ApiResponse, Option<BookingRecord>)> {
        let response = self.client.get(&booking_path(id), None, None).await?;

        if response.status() != StatusCode::OK {
            error!("Failed to get booking {}, status: {}", id, response.status_code());
            return Ok((response, None));
        }

        let record = BookingRecord::new(response.json_value()?);
        info!("Retrieved booking {}", id);
        Ok((response, Some(record)))
    }

    /// Replace (PUT) or patch (PATCH) a booking
    #[instrument(skip(self, data, auth_headers))]
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        id: u64,
        data: &T,
        auth_headers: &HeaderMap,
        partial: bool,
    ) -> ClientResult<(ApiResponse, Option<BookingRecord>)> {
        let body = RequestBody::json(data)?;
        let path = booking_path(id);
        let (method, response) = if partial {
            ("PATCH", self.client.patch(&path, &body, Some(auth_headers)).await?)
        } else {
            ("PUT", self.client.put(&path, &body, Some(auth_headers)).await?)
        };

        if response.status() != StatusCode::OK {
            error!("Failed to update booking {}, status: {}", id, response.status_code());
            return Ok((response, None));
        }

        let record = BookingRecord::new(response.json_value()?);
        info!("Booking {} updated successfully using {}", id, method);
        Ok((response, Some(record)))
    }

    pub async fn delete_with_response(&self, id: u64, auth_headers: &HeaderMap) -> ClientResult<ApiResponse> {
        self.client.delete(&booking_path(id), Some(auth_headers)).await
    }

    /// True iff the API answered 200 or 201
    pub async fn delete(&self, id: u64, auth_headers: &HeaderMap) -> bool {
        match self.delete_with_response(id, auth_headers).await {
            Ok(response) if matches!(response.status_code(), 200 | 201) => {
                info!("Booking {} deleted successfully", id);
                true
            }
            Ok(response) => {
                error!("Failed to delete booking {}, status: {}", id, response.status_code());
                false
            }
            Err(e) => {
                error!("Error deleting booking {}: {}", id, e);
                false
            }
        }
    }

    /// Listed ids, empty on any failure
    pub async fn list_ids(&self, filter: Option<&BookingFilter>) -> Vec<u64> {
        let query = filter.map(BookingFilter::to_query);
        let result = self
            .client
            .get(BOOKING_PATH, None, query.as_deref())
            .await
            .and_then(|response| {
                if response.status() == StatusCode::OK {
                    response.json::<Vec<BookingRef>>().map(Some)
                } else {
                    error!("Failed to get booking IDs, status: {}", response.status_code());
                    Ok(None)
                }
            });

        match result {
            Ok(Some(refs)) => {
                info!("Retrieved {} booking IDs", refs.len());
                refs.into_iter().map(|r| r.bookingid).collect()
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                error!("Error retrieving booking IDs: {}", e);
                Vec::new()
            }
        }
    }

    /// List matching ids and resolve at most [`SEARCH_FETCH_LIMIT`] of them
    #[instrument(skip(self))]
    pub async fn search(&self, filter: &BookingFilter) -> Vec<SearchHit> {
        let ids = self.list_ids(Some(filter)).await;
        let mut hits = Vec::new();

        for id in ids.into_iter().take(SEARCH_FETCH_LIMIT) {
            match self.read(id).await {
                Ok((_, Some(booking))) => hits.push(SearchHit { bookingid: id, booking }),
                Ok((_, None)) => {}
                Err(e) => error!("Error retrieving booking {}: {}", id, e),
            }
        }

        hits
    }
}
