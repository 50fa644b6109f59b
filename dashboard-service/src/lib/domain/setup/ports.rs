use async_trait::async_trait;

/// Rebuilds the running auth service from the credential store.
#[async_trait]
pub trait ServiceReloader: Send + Sync + 'static {
    /// Re-read credentials and swap in a fresh service.
    ///
    /// # Errors
    /// Returns a description of why no usable service could be built.
    async fn reload(&self) -> Result<(), String>;
}
