//! HTTP client construction and request building helpers.
//!
//! The client is rebuilt from [`BackendOptions`] per call site so that
//! connection settings always reflect the current options.

use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;

use crate::options::BackendOptions;

/// Build a configured HTTP client from backend options.
///
/// # Example
/// ```ignore
/// let client = build_http_client(&options)?;
/// ```
pub fn build_http_client(options: &BackendOptions) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();

    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }

    builder.build()
}

/// Add extra headers to a request if the options carry any.
///
/// # Example
/// ```ignore
/// let mut req = client.post(url);
/// req = add_extra_headers(req, &options.extra_headers);
/// ```
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}
