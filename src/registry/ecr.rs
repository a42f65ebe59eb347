// ABOUTME: Amazon ECR backend. Tags and push times come from one paged call.
// ABOUTME: Includes the aws-sdk-ecr describer used in production.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

use super::{RegistryBackend, RegistryError, TagRecord, order_newest_first};

/// Stop paging once at least this many image records were collected.
pub const MAX_DESCRIBED_IMAGES: usize = 100;

static ECR_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.dkr\.ecr\.([^.]+)\.amazonaws\.com/([^:]+)(?::(.+))?$")
        .expect("ECR reference pattern is valid")
});

/// Region and repository extracted from an ECR reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcrRepository {
    pub region: String,
    pub repository: String,
}

/// Parse `<account>.dkr.ecr.<region>.amazonaws.com/<repo>[:tag]`.
///
/// The account id is discarded. Returns `None` unless both region and
/// repository are present.
pub fn parse_ecr_reference(reference: &str) -> Option<EcrRepository> {
    let captures = ECR_REFERENCE.captures(reference)?;
    let region = captures.get(2)?.as_str();
    let repository = captures.get(3)?.as_str();
    if region.is_empty() || repository.is_empty() {
        return None;
    }
    Some(EcrRepository {
        region: region.to_string(),
        repository: repository.to_string(),
    })
}

/// One image record from a describe-images page.
#[derive(Debug, Clone, Default)]
pub struct ImageDetail {
    pub tags: Vec<String>,
    pub pushed_at: Option<DateTime<Utc>>,
}

/// A page of image records and the token for the next page, if any.
#[derive(Debug, Clone, Default)]
pub struct ImageDetailPage {
    pub images: Vec<ImageDetail>,
    pub next_token: Option<String>,
}

/// The bulk "describe images" capability of an ECR-style registry.
#[async_trait]
pub trait ImageDescriber: Send + Sync {
    async fn describe_images(
        &self,
        repository: &EcrRepository,
        next_token: Option<String>,
    ) -> Result<ImageDetailPage, RegistryError>;
}

/// Backend for `*.dkr.ecr.*.amazonaws.com` references.
pub struct EcrBackend<D> {
    describer: D,
}

impl EcrBackend<AwsEcrDescriber> {
    pub fn aws() -> Self {
        Self::new(AwsEcrDescriber)
    }
}

impl<D: ImageDescriber> EcrBackend<D> {
    pub fn new(describer: D) -> Self {
        Self { describer }
    }

    async fn describe_all(
        &self,
        repository: &EcrRepository,
    ) -> Result<Vec<ImageDetail>, RegistryError> {
        let mut images = Vec::new();
        let mut next_token = None;

        loop {
            let page = self.describer.describe_images(repository, next_token).await?;
            images.extend(page.images);

            if images.len() >= MAX_DESCRIBED_IMAGES {
                break;
            }
            match page.next_token {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(images)
    }
}

#[async_trait]
impl<D: ImageDescriber> RegistryBackend for EcrBackend<D> {
    fn name(&self) -> &str {
        "AWS ECR"
    }

    fn supports(&self, reference: &str) -> bool {
        parse_ecr_reference(reference).is_some()
    }

    async fn list_tags_with_time(&self, reference: &str) -> Result<Vec<TagRecord>, RegistryError> {
        let repository = parse_ecr_reference(reference).ok_or_else(|| {
            RegistryError::InvalidReference(
                reference.to_string(),
                "expected <account-id>.dkr.ecr.<region>.amazonaws.com/<repository>[:tag]"
                    .to_string(),
            )
        })?;

        let images = self.describe_all(&repository).await?;
        let now = Utc::now();

        let records: Vec<TagRecord> = images
            .into_iter()
            .flat_map(|image| {
                let pushed_at = image.pushed_at.unwrap_or(now);
                image
                    .tags
                    .into_iter()
                    .filter(|tag| !tag.is_empty())
                    .map(move |tag| TagRecord::new(tag, pushed_at))
            })
            .collect();

        if records.is_empty() {
            return Err(RegistryError::NoTags(format!(
                "{} (ECR, {})",
                repository.repository, repository.region
            )));
        }

        Ok(order_newest_first(records))
    }
}

/// Describer backed by `aws-sdk-ecr` and the default AWS credential chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsEcrDescriber;

#[async_trait]
impl ImageDescriber for AwsEcrDescriber {
    async fn describe_images(
        &self,
        repository: &EcrRepository,
        next_token: Option<String>,
    ) -> Result<ImageDetailPage, RegistryError> {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(repository.region.clone()))
            .load()
            .await;
        let client = aws_sdk_ecr::Client::new(&config);

        let output = client
            .describe_images()
            .repository_name(&repository.repository)
            .max_results(MAX_DESCRIBED_IMAGES as i32)
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| {
                RegistryError::ListFailed(
                    repository.repository.clone(),
                    aws_sdk_ecr::error::DisplayErrorContext(e).to_string(),
                )
            })?;

        let images = output
            .image_details()
            .iter()
            .map(|detail| ImageDetail {
                tags: detail.image_tags().to_vec(),
                pushed_at: detail
                    .image_pushed_at()
                    .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
            })
            .collect();

        Ok(ImageDetailPage {
            images,
            next_token: output.next_token().map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_region_and_repository() {
        let parsed =
            parse_ecr_reference("123456789012.dkr.ecr.us-west-2.amazonaws.com/team/app:v1")
                .unwrap();
        assert_eq!(parsed.region, "us-west-2");
        assert_eq!(parsed.repository, "team/app");
    }

    #[test]
    fn rejects_missing_repository() {
        assert!(parse_ecr_reference("123456789012.dkr.ecr.us-west-2.amazonaws.com/").is_none());
        assert!(parse_ecr_reference("dkr.ecr.us-west-2.amazonaws.com/app").is_none());
    }
}
