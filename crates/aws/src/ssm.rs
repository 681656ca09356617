//! AWS Systems Manager Parameter Store client

use crate::{ParameterQuery, ParameterSource, ParameterStoreConfig, ParameterStoreError};
use async_trait::async_trait;
use aws_sdk_ssm::Client;
use aws_sdk_ssm::config::Region;
use aws_sdk_ssm::error::DisplayErrorContext;
use aws_sdk_ssm::types::{Parameter as SsmParameter, ParameterStringFilter};
use futures::future::join_all;
use paramguard_secrets::{Parameter, ParameterType};

/// Fetches parameters from AWS SSM Parameter Store.
///
/// Credentials come from the SDK's default provider chain. All values are
/// requested decrypted.
///
/// Fetching is best effort: a failed page or a failed parameter is logged
/// with `tracing::warn!` and skipped, and whatever was fetched is returned.
pub struct AwsParameterStore {
    client: Client,
    region: String,
}

impl std::fmt::Debug for AwsParameterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsParameterStore")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}

impl AwsParameterStore {
    /// Create a client for `region`
    pub async fn new(region: impl Into<String>) -> Self {
        let region = region.into();
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.clone()))
            .load()
            .await;
        Self {
            client: Client::new(&config),
            region,
        }
    }

    /// Create a client for the region a job configuration resolves to
    pub async fn from_config(config: &ParameterStoreConfig) -> Self {
        Self::new(config.region()).await
    }

    /// Use an already configured SDK client
    #[must_use]
    pub fn from_client(client: Client) -> Self {
        let region = client
            .config()
            .region()
            .map(|region| region.to_string())
            .unwrap_or_default();
        Self { client, region }
    }

    /// Fetch a hierarchy with `GetParametersByPath`, following `NextToken`.
    async fn fetch_by_path(&self, path: &str, recursive: bool) -> Vec<Parameter> {
        tracing::debug!(path, recursive, "Fetching parameters by path");
        collect_pages("GetParametersByPath", |next_token| {
            let request = self
                .client
                .get_parameters_by_path()
                .path(path)
                .recursive(recursive)
                .with_decryption(true)
                .set_next_token(next_token);
            async move {
                request
                    .send()
                    .await
                    .map(|page| {
                        let parameters = page.parameters().iter().filter_map(convert).collect();
                        (parameters, page.next_token().map(String::from))
                    })
                    .map_err(DisplayErrorContext)
            }
        })
        .await
    }

    /// List parameter names with `DescribeParameters`, following `NextToken`.
    async fn describe_names(
        &self,
        prefixes: &[String],
        option: &str,
    ) -> Result<Vec<String>, ParameterStoreError> {
        let filters = if prefixes.is_empty() {
            None
        } else {
            let filter = ParameterStringFilter::builder()
                .key("Name")
                .option(option)
                .set_values(Some(prefixes.to_vec()))
                .build()
                .map_err(|e| ParameterStoreError::InvalidFilter {
                    message: e.to_string(),
                })?;
            Some(vec![filter])
        };

        let names = collect_pages("DescribeParameters", |next_token| {
            let request = self
                .client
                .describe_parameters()
                .set_parameter_filters(filters.clone())
                .set_next_token(next_token);
            async move {
                request
                    .send()
                    .await
                    .map(|page| {
                        let names = page
                            .parameters()
                            .iter()
                            .filter_map(|metadata| metadata.name())
                            .map(String::from)
                            .collect();
                        (names, page.next_token().map(String::from))
                    })
                    .map_err(DisplayErrorContext)
            }
        })
        .await;

        Ok(names)
    }

    /// Fetch named parameters one by one, concurrently.
    async fn fetch_by_name(
        &self,
        prefixes: &[String],
        option: &str,
    ) -> Result<Vec<Parameter>, ParameterStoreError> {
        let names = self.describe_names(prefixes, option).await?;

        let parameters = fetch_each(&names, |name| {
            let request = self
                .client
                .get_parameter()
                .name(name)
                .with_decryption(true);
            async move {
                request
                    .send()
                    .await
                    .map(|output| output.parameter().and_then(convert))
                    .map_err(DisplayErrorContext)
            }
        })
        .await;

        Ok(parameters)
    }
}

/// Follow a paginated listing until it runs out of pages.
///
/// A failed page ends the listing; what was gathered before it is returned.
async fn collect_pages<T, E, F, Fut>(operation: &str, mut fetch_page: F) -> Vec<T>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<(Vec<T>, Option<String>), E>>,
    E: std::fmt::Display,
{
    let mut items = Vec::new();
    let mut next_token = None;

    loop {
        match fetch_page(next_token.take()).await {
            Ok((page, token)) => {
                items.extend(page);
                match token {
                    Some(token) => next_token = Some(token),
                    None => break,
                }
            }
            Err(e) => {
                tracing::warn!(
                    operation,
                    fetched = items.len(),
                    error = %e,
                    "Parameter store request failed, keeping results so far"
                );
                break;
            }
        }
    }

    items
}

/// Fetch every name concurrently, skipping those that fail or have no value.
async fn fetch_each<E, F, Fut>(names: &[String], fetch_one: F) -> Vec<Parameter>
where
    F: Fn(&str) -> Fut,
    Fut: Future<Output = Result<Option<Parameter>, E>>,
    E: std::fmt::Display,
{
    let fetches = names.iter().map(|name| {
        let fetch = fetch_one(name.as_str());
        async move {
            match fetch.await {
                Ok(parameter) => parameter,
                Err(e) => {
                    tracing::warn!(name = %name, error = %e, "Cannot fetch parameter");
                    None
                }
            }
        }
    });

    join_all(fetches).await.into_iter().flatten().collect()
}

#[async_trait]
impl ParameterSource for AwsParameterStore {
    async fn fetch(&self, query: &ParameterQuery) -> Result<Vec<Parameter>, ParameterStoreError> {
        match query {
            ParameterQuery::ByPath { path, recursive } => {
                Ok(self.fetch_by_path(path, *recursive).await)
            }
            ParameterQuery::ByName { prefixes, option } => {
                self.fetch_by_name(prefixes, option).await
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "aws-ssm"
    }
}

fn convert(parameter: &SsmParameter) -> Option<Parameter> {
    to_parameter(
        parameter.name(),
        parameter.value(),
        parameter.r#type().map(|kind| kind.as_str()),
    )
}

/// Build a record from the fields the SDK returns.
///
/// Nameless parameters are dropped. Unknown type tags are treated as plain
/// strings, so only `SecureString` values are ever registered for redaction.
fn to_parameter(name: Option<&str>, value: Option<&str>, tag: Option<&str>) -> Option<Parameter> {
    let name = name?;
    let kind = match tag.map(|tag| (tag, ParameterType::from_tag(tag))) {
        Some((_, Some(kind))) => kind,
        Some((tag, None)) => {
            tracing::debug!(name, tag, "Unknown parameter type, treating as String");
            ParameterType::String
        }
        None => ParameterType::String,
    };
    Some(Parameter::new(name, value.unwrap_or_default(), kind))
}
