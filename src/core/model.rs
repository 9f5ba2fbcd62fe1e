use async_trait::async_trait;

use crate::error::Result;

/// Mime type assumed for uploaded images when the client does not say otherwise
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// A hosted text/vision model the assistant can prompt
#[async_trait]
pub trait GenerativeModel: Send + Sync + std::fmt::Debug {
    /// Model identifier, for logs
    fn name(&self) -> &str;

    /// Generate a free-text reply to a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate a free-text reply to a prompt about an image
    async fn generate_from_image(
        &self,
        image: &[u8],
        mime_type: &str,
        prompt: &str,
    ) -> Result<String>;
}
