use crate::error::FetchError;
use crate::service::ResourceRestService;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Remote source of FHIR resources and search bundles.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn get_resource(&self, reference: &str, token: &str) -> Result<Value, FetchError>;

    async fn get_resources(
        &self,
        resource_type: &str,
        query: &str,
        token: &str,
    ) -> Result<Value, FetchError>;
}

#[async_trait]
impl ResourceFetcher for ResourceRestService {
    async fn get_resource(&self, reference: &str, token: &str) -> Result<Value, FetchError> {
        ResourceRestService::get_resource(self, reference, token).await
    }

    async fn get_resources(
        &self,
        resource_type: &str,
        query: &str,
        token: &str,
    ) -> Result<Value, FetchError> {
        ResourceRestService::get_resources(self, resource_type, query, token).await
    }
}

#[async_trait]
impl<F> ResourceFetcher for Arc<F>
where
    F: ResourceFetcher + ?Sized,
{
    async fn get_resource(&self, reference: &str, token: &str) -> Result<Value, FetchError> {
        (**self).get_resource(reference, token).await
    }

    async fn get_resources(
        &self,
        resource_type: &str,
        query: &str,
        token: &str,
    ) -> Result<Value, FetchError> {
        (**self).get_resources(resource_type, query, token).await
    }
}
