//! HTTP transport seam.
//!
//! Fetchers only ever see [`HttpTransport`]; the production implementation
//! is a blocking reqwest client. One request per call, no retries: a
//! non-2xx status or connection failure is returned to the caller as-is.

use crate::error::{IngestError, IngestResult};

pub trait HttpTransport {
    /// GET `url` with `query` appended, returning the body text of a 2xx response.
    fn get(&self, url: &str, query: &[(&str, String)]) -> IngestResult<String>;
}

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new() -> IngestResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("crimestat/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    fn get(&self, url: &str, query: &[(&str, String)]) -> IngestResult<String> {
        log::debug!("GET {url} ({} params)", query.len());
        let res = self.client.get(url).query(query).send()?;
        let status = res.status();
        if !status.is_success() {
            return Err(IngestError::HttpStatus {
                status: status.as_u16(),
                url:    url.to_string(),
            });
        }
        Ok(res.text()?)
    }
}
