use aws_sdk_s3::config::Credentials;
use tracing::{debug, info};

use crate::config::AwsBaseConfig;

/// Build an AWS SDK configuration from the given [`AwsBaseConfig`].
///
/// Static credentials take precedence over the standard environment chain.
/// The endpoint override, when set, applies to every client built from the
/// returned config.
pub async fn build_sdk_config(config: &AwsBaseConfig) -> aws_config::SdkConfig {
    let mut loader = aws_config::from_env().region(aws_config::Region::new(config.region.clone()));

    if let Some(endpoint) = &config.endpoint_url {
        debug!(endpoint = %endpoint, "using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint);
    }

    if let Some((access_key_id, secret_access_key)) = config.static_credentials() {
        info!("using static AWS credentials");
        loader = loader.credentials_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "inkwell-static",
        ));
    }

    loader.load().await
}

#[cfg(all(test, feature = "integration"))]
mod integration_tests {
    use super::*;

    // The AWS SDK panics on `load()` without system root certificates, so
    // these only run in integration mode.

    #[tokio::test]
    async fn build_sdk_config_sets_region() {
        let config = AwsBaseConfig::new("ap-northeast-1");
        let sdk_config = build_sdk_config(&config).await;
        assert_eq!(
            sdk_config.region().map(|r| r.as_ref()),
            Some("ap-northeast-1")
        );
    }

    #[tokio::test]
    async fn build_sdk_config_with_static_credentials() {
        let config = AwsBaseConfig::new("us-west-2")
            .with_endpoint_url("http://localhost:4566")
            .with_static_credentials("test", "test");
        let sdk_config = build_sdk_config(&config).await;
        assert!(sdk_config.credentials_provider().is_some());
        assert_eq!(sdk_config.endpoint_url(), Some("http://localhost:4566"));
    }
}
