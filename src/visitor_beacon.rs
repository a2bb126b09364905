use crate::email_client::{EmailClient, TemplateParams};
use crate::utils::{GeoLocator, VisitorLocation};
use log::{error, info};
use std::collections::HashMap;

pub const VISITOR_NOTIFIED_KEY: &str = "visitor_notified";
pub const VISITOR_ALERT_SUBJECT: &str = "New Organic Visitor Alert";
pub const VISITOR_ALERT_NAME: &str = "New Organic Visitor";
pub const VISITOR_ALERT_EMAIL: &str = "organic_visitor@100solutionz.com";

/// Key/value storage scoped to one visitor session.
#[derive(Debug, Default)]
pub struct SessionStore {
    items: HashMap<String, String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }

    pub fn set_item(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.items.insert(key.into(), value.into());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeaconOutcome {
    AlreadyNotified,
    Sent,
    Failed(String),
}

pub fn visitor_alert_params(location: &VisitorLocation, page_path: &str) -> TemplateParams {
    let message = format!(
        "Visitor Info:\nLocation: {}, {}\nIP Address: {}\nDirect Page: {}",
        location.city_name, location.country_name, location.ip_address, page_path
    );
    let visitor_info = format!(
        "Location: {}, {} | IP: {}",
        location.city_name, location.country_name, location.ip_address
    );

    [
        ("subject", VISITOR_ALERT_SUBJECT.to_string()),
        ("name", VISITOR_ALERT_NAME.to_string()),
        ("email", VISITOR_ALERT_EMAIL.to_string()),
        ("message", message),
        ("visitor_info", visitor_info),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Email the site owner about this visitor, at most once per session.
///
/// Failures are logged and reported, never raised; the session flag is only
/// set once the email went out.
pub async fn track_visitor(
    session: &mut SessionStore,
    geo: &GeoLocator,
    email: &EmailClient,
    page_path: &str,
) -> BeaconOutcome {
    if session.get_item(VISITOR_NOTIFIED_KEY).is_some() {
        return BeaconOutcome::AlreadyNotified;
    }

    let result: Result<(), String> = async {
        let location = geo.lookup().await?;
        email
            .send(&visitor_alert_params(&location, page_path))
            .await
    }
    .await;

    match result {
        Ok(()) => {
            session.set_item(VISITOR_NOTIFIED_KEY, "true");
            info!("Visitor notification sent for {}", page_path);
            BeaconOutcome::Sent
        }
        Err(e) => {
            error!("Visitor tracking failed: {}", e);
            BeaconOutcome::Failed(e)
        }
    }
}
