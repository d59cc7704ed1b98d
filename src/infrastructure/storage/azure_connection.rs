use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::str::FromStr;

use crate::application::backend_config::{keys, ConfigError};

const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Parsed Azure Storage connection string
///
/// Accepts the `Key=Value;Key=Value` form issued by the Azure portal as well
/// as `UseDevelopmentStorage=true` for the local emulator.
#[derive(Clone, PartialEq, Eq)]
pub struct AzureConnectionString {
    pub account_name: String,
    /// Base64 account key
    pub account_key: String,
    /// Blob service URL without a trailing slash
    pub blob_endpoint: String,
    /// True when the endpoint came from `BlobEndpoint` or the emulator
    pub custom_endpoint: bool,
}

impl AzureConnectionString {
    /// Decoded account key bytes used for SharedKey signing
    pub fn key_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        STANDARD.decode(&self.account_key).map_err(|_| {
            ConfigError::invalid(
                keys::AZURE_CONNECTION_STRING,
                "AccountKey is not valid base64",
            )
        })
    }

    /// Public URL of a container
    pub fn container_url(&self, container: &str) -> String {
        format!("{}/{}", self.blob_endpoint, container)
    }

    fn development() -> Self {
        Self {
            account_name: DEV_ACCOUNT_NAME.to_string(),
            account_key: DEV_ACCOUNT_KEY.to_string(),
            blob_endpoint: DEV_BLOB_ENDPOINT.to_string(),
            custom_endpoint: true,
        }
    }
}

impl std::fmt::Debug for AzureConnectionString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureConnectionString")
            .field("account_name", &self.account_name)
            .field("account_key", &"<redacted>")
            .field("blob_endpoint", &self.blob_endpoint)
            .finish()
    }
}

impl FromStr for AzureConnectionString {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ConfigError::invalid(keys::AZURE_CONNECTION_STRING, reason);

        let mut account_name = None;
        let mut account_key = None;
        let mut protocol = None;
        let mut suffix = None;
        let mut blob_endpoint = None;
        let mut development = false;

        for pair in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            // Values may contain '=' (base64 padding)
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| invalid("expected Key=Value pairs separated by ';'"))?;
            let value = value.trim().to_string();

            match key.trim().to_ascii_lowercase().as_str() {
                "accountname" => account_name = Some(value),
                "accountkey" => account_key = Some(value),
                "defaultendpointsprotocol" => protocol = Some(value),
                "endpointsuffix" => suffix = Some(value),
                "blobendpoint" => blob_endpoint = Some(value),
                "usedevelopmentstorage" => development = value.eq_ignore_ascii_case("true"),
                _ => {}
            }
        }

        if development {
            return Ok(Self::development());
        }

        let account_name = account_name
            .filter(|v| !v.is_empty())
            .ok_or_else(|| invalid("AccountName is required"))?;
        let account_key = account_key
            .filter(|v| !v.is_empty())
            .ok_or_else(|| invalid("AccountKey is required"))?;

        let (blob_endpoint, custom_endpoint) = match blob_endpoint {
            Some(endpoint) => {
                if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                    return Err(invalid("BlobEndpoint must be an http(s) URL"));
                }
                (endpoint.trim_end_matches('/').to_string(), true)
            }
            None => {
                let protocol = protocol.unwrap_or_else(|| "https".to_string());
                if protocol != "http" && protocol != "https" {
                    return Err(invalid("DefaultEndpointsProtocol must be http or https"));
                }
                let suffix = suffix.unwrap_or_else(|| DEFAULT_ENDPOINT_SUFFIX.to_string());
                (
                    format!("{}://{}.blob.{}", protocol, account_name, suffix),
                    false,
                )
            }
        };

        let parsed = Self {
            account_name,
            account_key,
            blob_endpoint,
            custom_endpoint,
        };
        parsed.key_bytes()?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_portal_connection_string() {
        let parsed: AzureConnectionString = "DefaultEndpointsProtocol=https;AccountName=acme;AccountKey=dGVzdC1hY2NvdW50LWtleQ==;EndpointSuffix=core.windows.net"
            .parse()
            .unwrap();

        assert_eq!(parsed.account_name, "acme");
        assert_eq!(parsed.account_key, "dGVzdC1hY2NvdW50LWtleQ==");
        assert_eq!(parsed.blob_endpoint, "https://acme.blob.core.windows.net");
        assert!(!parsed.custom_endpoint);
        assert_eq!(
            parsed.container_url("remotes"),
            "https://acme.blob.core.windows.net/remotes"
        );
        assert_eq!(parsed.key_bytes().unwrap(), b"test-account-key");
    }

    #[test]
    fn test_parse_custom_blob_endpoint() {
        let parsed: AzureConnectionString =
            "AccountName=acme;AccountKey=dGVzdC1hY2NvdW50LWtleQ==;BlobEndpoint=http://azurite:10000/acme/"
                .parse()
                .unwrap();

        assert_eq!(parsed.blob_endpoint, "http://azurite:10000/acme");
        assert!(parsed.custom_endpoint);
    }

    #[test]
    fn test_development_storage() {
        let parsed: AzureConnectionString = "UseDevelopmentStorage=true".parse().unwrap();
        assert_eq!(parsed.account_name, "devstoreaccount1");
        assert_eq!(parsed.blob_endpoint, "http://127.0.0.1:10000/devstoreaccount1");
        assert!(parsed.key_bytes().is_ok());
    }

    #[test]
    fn test_rejects_incomplete_strings() {
        assert!("AccountName=acme".parse::<AzureConnectionString>().is_err());
        assert!("AccountKey=dGVzdA==".parse::<AzureConnectionString>().is_err());
        assert!("garbage".parse::<AzureConnectionString>().is_err());
        assert!("AccountName=acme;AccountKey=***not base64***"
            .parse::<AzureConnectionString>()
            .is_err());
    }

    #[test]
    fn test_debug_redacts_key() {
        let parsed: AzureConnectionString = "UseDevelopmentStorage=true".parse().unwrap();
        let debug = format!("{:?}", parsed);
        assert!(!debug.contains(DEV_ACCOUNT_KEY));
        assert!(debug.contains("<redacted>"));
    }
}
