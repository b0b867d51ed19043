//! Lookup doubles shared by the enrichment tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ipinfo_client::ClientError;
use serde_json::{Value, json};

use super::error::LookupError;
use super::resolver::GeoLookup;

type ErrorFactory = Box<dyn Fn() -> LookupError + Send + Sync>;

enum Canned {
    Found(Value),
    Fails(ErrorFactory),
}

/// In-memory [`GeoLookup`] with canned responses and a call counter.
///
/// Addresses without a canned response fail with an HTTP 404 client error.
#[derive(Default)]
pub struct StaticLookup {
    responses: HashMap<String, Canned>,
    calls: AtomicUsize,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, ip: &str, response: Value) -> Self {
        self.responses.insert(ip.to_string(), Canned::Found(response));
        self
    }

    pub fn failing<F>(mut self, ip: &str, error: F) -> Self
    where
        F: Fn() -> LookupError + Send + Sync + 'static,
    {
        self.responses
            .insert(ip.to_string(), Canned::Fails(Box::new(error)));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GeoLookup for StaticLookup {
    async fn details(&self, ip: &str) -> Result<Value, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(ip) {
            Some(Canned::Found(value)) => Ok(value.clone()),
            Some(Canned::Fails(error)) => Err(error()),
            None => Err(ClientError::Status {
                code: 404,
                message: format!("no canned response for {ip}"),
            }
            .into()),
        }
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Lookup response for 8.8.8.8, including the client's derived fields
pub fn google_dns() -> Value {
    json!({
        "ip": "8.8.8.8",
        "hostname": "dns.google",
        "anycast": true,
        "city": "Mountain View",
        "region": "California",
        "country": "US",
        "loc": "37.4056,-122.0775",
        "org": "AS15169 Google LLC",
        "postal": "94043",
        "timezone": "America/Los_Angeles",
        "country_name": "United States",
        "is_eu": false,
        "latitude": "37.4056",
        "longitude": "-122.0775"
    })
}
