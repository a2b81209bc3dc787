use std::fmt;

use crate::http::HttpError;
use crate::service::Service;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{service} is not configured (missing credentials)")]
    NotConfigured { service: Service },

    #[error("no storage backends are configured")]
    NoBackendsConfigured,

    #[error("object of {size} bytes exceeds the {service} limit of {max} bytes")]
    SizeExceeded { service: Service, size: u64, max: u64 },

    #[error("upload to {service} failed after {attempts} attempts: {source}")]
    UploadFailed {
        service: Service,
        attempts: u32,
        #[source]
        source: HttpError,
    },

    #[error("download of {cid} from {service} failed, all {routes} gateways exhausted: {source}")]
    DownloadFailed {
        service: Service,
        cid: String,
        routes: usize,
        #[source]
        source: HttpError,
    },

    #[error("unexpected response from {service}: {reason}")]
    BadResponse { service: Service, reason: String },

    #[error("all backends failed during {op}: {attempts}")]
    AllBackendsFailed {
        op: &'static str,
        attempts: FailedAttempts,
    },
}

/// The per-backend failure trail kept by the fallback paths.
///
/// Every attempted backend appears with its last error so an operator can
/// tell which services were unreachable, not just the final one.
#[derive(Debug)]
pub struct FailedAttempts(pub Vec<(Service, String)>);

impl fmt::Display for FailedAttempts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (service, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{service}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_attempts_lists_every_backend() {
        let err = Error::AllBackendsFailed {
            op: "upload",
            attempts: FailedAttempts(vec![
                (Service::Web3Storage, "timed out".into()),
                (Service::Pinata, "status 500".into()),
            ]),
        };
        let text = err.to_string();
        assert!(text.contains("web3storage: timed out"));
        assert!(text.contains("pinata: status 500"));
    }
}
