//! Execute channel
//!
//! Calls a method on a running module. Core multiplexes three outcomes over
//! the status code of the answer:
//!
//! - `200`: the call returned; the body is the raw result
//! - `203`: the driver's code raised; the body is a [`RemoteException`]
//! - anything else: a status the channel does not know
//!
//! The request is sent with `raises` off, so neither 200 nor 203 ever reaches
//! the pipeline's non-2xx failure branch. Only transport failures are retried.

use crate::client::Client;
use crate::error::{ClientError, Error, Result, declared_response_code};
use crate::request::EndpointRequest;
use crate::resources::segment;
use bytes::Bytes;
use corelink_protocol::headers::USER_ID;
use corelink_protocol::{ExecEnvelope, RemoteException};
use corelink_transport::HttpResponse;
use serde::de::DeserializeOwned;

/// Status Core uses for a successful call.
pub const STATUS_RETURNED: u16 = 200;

/// Status Core uses when the driver's code raised.
pub const STATUS_RAISED: u16 = 203;

/// Tagged outcome of one execute call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The method returned.
    Success {
        /// Raw response body
        payload: Bytes,
        /// Declared response code, 200 when absent
        response_code: u16,
    },
    /// The driver's code raised.
    RemoteException {
        /// Exception message
        message: String,
        /// Remote stack trace, when Core sent one
        backtrace: Option<Vec<String>>,
        /// Declared response code, 500 when absent
        response_code: u16,
    },
    /// Core answered with a status this channel does not know.
    UnexpectedStatus {
        /// Transport status of the answer
        status: u16,
    },
}

impl ExecOutcome {
    /// Classify an execute answer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedException`] when a 203 body is not a readable
    /// exception payload.
    pub fn from_response(response: &HttpResponse) -> Result<Self> {
        match response.status {
            STATUS_RETURNED => Ok(ExecOutcome::Success {
                payload: response.body.clone(),
                response_code: declared_response_code(response).unwrap_or(200),
            }),
            STATUS_RAISED => {
                let response_code = declared_response_code(response).unwrap_or(500);
                let exception = RemoteException::from_slice(&response.body).map_err(|source| {
                    Error::MalformedException {
                        response_code,
                        source,
                    }
                })?;
                Ok(ExecOutcome::RemoteException {
                    message: exception.error,
                    backtrace: exception.backtrace,
                    response_code,
                })
            }
            status => Ok(ExecOutcome::UnexpectedStatus { status }),
        }
    }

    /// Whether the method returned.
    pub fn is_success(&self) -> bool {
        matches!(self, ExecOutcome::Success { .. })
    }
}

/// Result of a successful execute call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    /// Raw response body
    pub payload: Bytes,
    /// Declared response code, 200 when absent
    pub response_code: u16,
}

impl ExecResult {
    /// The payload as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }

    /// Decode the payload as JSON
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.payload)
    }
}

impl Client {
    /// Call `method` on module `module_id` and return the raw tagged outcome.
    ///
    /// `user_id`, when given, is sent in the `User-Id` header.
    ///
    /// # Errors
    ///
    /// Transport failures (after retries), an invalid method name, or a
    /// malformed 203 body. Remote exceptions and unknown statuses are
    /// outcomes, not errors.
    pub async fn execute_outcome(
        &self,
        module_id: &str,
        method: &str,
        arguments: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<ExecOutcome> {
        let (_, response) = self
            .send_execute(module_id, method, arguments, user_id)
            .await?;
        ExecOutcome::from_response(&response)
    }

    /// Call `method` on module `module_id`.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use corelink::{Client, ClientConfig, ClientErrorKind};
    /// use serde_json::json;
    ///
    /// # async fn example() -> corelink::Result<()> {
    /// let client = Client::new(ClientConfig::default())?;
    ///
    /// match client.execute("m-42", "set_level", json!({"level": 3}), None).await {
    ///     Ok(result) => println!("returned {}", result.text()),
    ///     Err(corelink::Error::Client(err)) if err.kind == ClientErrorKind::DriverRaised => {
    ///         println!("driver raised: {}", err.message);
    ///     }
    ///     Err(other) => return Err(other),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// - [`DriverRaised`](crate::ClientErrorKind::DriverRaised) on 203
    /// - [`Error::MalformedException`] on a 203 with an unreadable body
    /// - [`UnexpectedFailure`](crate::ClientErrorKind::UnexpectedFailure) on any status but 200/203
    /// - transport errors once retries are exhausted
    pub async fn execute(
        &self,
        module_id: &str,
        method: &str,
        arguments: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<ExecResult> {
        let (path, response) = self
            .send_execute(module_id, method, arguments, user_id)
            .await?;

        match ExecOutcome::from_response(&response)? {
            ExecOutcome::Success {
                payload,
                response_code,
            } => Ok(ExecResult {
                payload,
                response_code,
            }),
            ExecOutcome::RemoteException {
                message,
                backtrace,
                response_code,
            } => Err(ClientError::driver_raised(
                &path,
                response.status,
                response_code,
                RemoteException {
                    error: message,
                    backtrace,
                },
            )
            .into()),
            ExecOutcome::UnexpectedStatus { .. } => {
                Err(ClientError::unexpected_failure(&response, &path).into())
            }
        }
    }

    async fn send_execute(
        &self,
        module_id: &str,
        method: &str,
        arguments: serde_json::Value,
        user_id: Option<&str>,
    ) -> Result<(String, HttpResponse)> {
        let envelope = ExecEnvelope::new(method, arguments)?;
        let path = format!("/modules/{}/execute", segment(module_id));

        let mut request = EndpointRequest::post(path.as_str())
            .json_bytes(envelope.to_bytes()?)
            .raises(false);
        if let Some(user_id) = user_id {
            request = request.header(USER_ID, user_id)?;
        }

        let response = self.request(request).await?;
        Ok((path, response))
    }
}
