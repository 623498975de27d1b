use crate::error::{InstallerError, Result};
use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use std::io::Read;

const USER_AGENT_VALUE: &str = concat!("vinstall/", env!("CARGO_PKG_VERSION"));

/// A single blocking GET of a remote resource.
///
/// The returned reader yields the response body; dropping it closes the
/// underlying connection.
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>>;
}

pub struct HttpFetcher {
    client: Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Box<dyn Read>> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .send()
            .map_err(|source| InstallerError::Fetch {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallerError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(Box::new(response))
    }
}
