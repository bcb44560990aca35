// Model Invoker trait: the swap-ready abstraction over a language model.
//
// A call takes a prompt plus the schema the answer must follow, and returns a
// parsed JSON value or an InvocationError. Retries, pacing and credentials all
// live behind this trait; callers only see success or failure.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::schema::SchemaDescriptor;
use crate::error::InvocationError;
use crate::persona::ModelRequest;

/// A parsed structured answer from the model.
pub type StructuredValue = serde_json::Value;

/// Trait for issuing one structured model call.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Send `request` and parse the answer as JSON conforming to `schema`.
    async fn invoke(
        &self,
        request: &ModelRequest,
        schema: &SchemaDescriptor,
    ) -> Result<StructuredValue, InvocationError>;
}

#[async_trait]
impl<T: ModelInvoker + ?Sized> ModelInvoker for Arc<T> {
    async fn invoke(
        &self,
        request: &ModelRequest,
        schema: &SchemaDescriptor,
    ) -> Result<StructuredValue, InvocationError> {
        (**self).invoke(request, schema).await
    }
}

/// Invoke and deserialize the answer into `T`.
///
/// A value that parsed as JSON but does not fit `T` is reported as a schema
/// error, same as malformed JSON.
pub async fn invoke_typed<T: DeserializeOwned>(
    invoker: &(impl ModelInvoker + ?Sized),
    request: &ModelRequest,
    schema: &SchemaDescriptor,
) -> Result<T, InvocationError> {
    let value = invoker.invoke(request, schema).await?;
    serde_json::from_value(value).map_err(|e| InvocationError::schema(schema.name(), e.to_string()))
}

/// Invoker used where no model is configured.
/// Fails every call so nothing silently produces fake output.
pub struct NoopInvoker;

#[async_trait]
impl ModelInvoker for NoopInvoker {
    async fn invoke(
        &self,
        _request: &ModelRequest,
        _schema: &SchemaDescriptor,
    ) -> Result<StructuredValue, InvocationError> {
        Err(InvocationError::Provider(
            "no model configured, set TITLER_API_KEY".to_string(),
        ))
    }
}
