use std::time::Duration;

pub mod accumulator;
pub mod cf_light;
pub mod error;
pub mod graphite_tcp;

pub use accumulator::AccumulatorRateFetcher;
pub use cf_light::CfLightAppInfoStore;
pub use error::ClientError;
pub use graphite_tcp::TcpGraphiteClient;

/// Builds the HTTP client shared by the accumulator and Cloud Controller
/// clients.
pub fn build_http_client(
    timeout: Duration,
    skip_cert_verify: bool,
) -> Result<reqwest::Client, ClientError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(skip_cert_verify)
        .build()?;
    Ok(client)
}

/// Removes trailing slashes and checks that the address parses.
pub(crate) fn normalize_address(address: &str) -> Result<String, ClientError> {
    let address = address.trim().trim_end_matches('/');
    url::Url::parse(address)?;
    Ok(address.to_string())
}

/// Reads the body of a non-200 response into a [`ClientError`].
pub(crate) async fn unexpected_status(url: &str, response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    ClientError::UnexpectedStatus {
        url: url.to_string(),
        status,
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_address() {
        assert_eq!(
            normalize_address("http://api.addr.com/").unwrap(),
            "http://api.addr.com"
        );
        assert_eq!(
            normalize_address(" https://acc:8080 ").unwrap(),
            "https://acc:8080"
        );
        assert!(matches!(
            normalize_address("not a url"),
            Err(ClientError::InvalidAddress(_))
        ));
    }
}
