use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::{Json, WithStatus};
use warp::Filter;

use crate::notify::Notifier;
use crate::storage::PatientStore;
use crate::time;
use crate::webhook::Dispatcher;

pub const SERVICE_NAME: &str = "Pharmacy Voice Agent";
pub const NO_NOTIFICATIONS: &str = "No pharmacy notifications yet";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
pub struct NotificationsResponse {
    pub notifications: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type JsonReply = WithStatus<Json>;

fn ok_json<T: Serialize>(body: &T) -> JsonReply {
    warp::reply::with_status(warp::reply::json(body), StatusCode::OK)
}

fn error_json(message: String) -> JsonReply {
    warp::reply::with_status(
        warp::reply::json(&ErrorResponse { error: message }),
        StatusCode::INTERNAL_SERVER_ERROR,
    )
}

pub struct RestApi {
    dispatcher: Dispatcher,
}

impl RestApi {
    pub fn new(store: Arc<PatientStore>, notifier: Arc<Notifier>) -> Self {
        RestApi {
            dispatcher: Dispatcher::new(store, notifier),
        }
    }

    pub fn routes(&self) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
        self.post_webhook()
            .or(self.get_health())
            .or(self.get_patients())
            .or(self.get_notifications())
            .with(warp::trace::request())
    }

    fn post_webhook(&self) -> impl Filter<Extract = (JsonReply,), Error = warp::Rejection> + Clone {
        let dispatcher = self.dispatcher.clone();

        // Raw bytes so a missing or wrong Content-Type still reaches the
        // handler and fails like any other unparseable body.
        warp::path!("webhook")
            .and(warp::post())
            .and(warp::body::bytes())
            .map(move |body: Bytes| {
                info!(body = %String::from_utf8_lossy(&body), "Received webhook data");

                match dispatcher.handle_body(&body) {
                    Ok(reply) => ok_json(&reply),
                    Err(e) => {
                        let message = format!("Error processing pharmacy webhook: {}", e);
                        error!(error = %e, "{}", message);
                        error_json(message)
                    }
                }
            })
    }

    fn get_health(&self) -> impl Filter<Extract = (JsonReply,), Error = warp::Rejection> + Clone {
        warp::path!("health").and(warp::get()).map(|| {
            ok_json(&HealthResponse {
                status: "healthy",
                timestamp: time::now_iso8601(),
                service: SERVICE_NAME,
            })
        })
    }

    fn get_patients(&self) -> impl Filter<Extract = (JsonReply,), Error = warp::Rejection> + Clone {
        let dispatcher = self.dispatcher.clone();

        warp::path!("patients")
            .and(warp::get())
            .map(move || match dispatcher.store().load_raw() {
                Ok(document) => ok_json(&document),
                Err(e) => {
                    error!(error = %e, "Failed to read patient store");
                    error_json(e.to_string())
                }
            })
    }

    fn get_notifications(&self) -> impl Filter<Extract = (JsonReply,), Error = warp::Rejection> + Clone {
        let dispatcher = self.dispatcher.clone();

        warp::path!("notifications")
            .and(warp::get())
            .map(move || match dispatcher.notifier().read_log() {
                Ok(log) => ok_json(&NotificationsResponse {
                    notifications: log.unwrap_or_else(|| NO_NOTIFICATIONS.to_string()),
                }),
                Err(e) => {
                    error!(error = %e, "Failed to read notification log");
                    error_json(e.to_string())
                }
            })
    }
}
