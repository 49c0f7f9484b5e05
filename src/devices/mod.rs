// User → device (shadow thing) mapping

use anyhow::Result;
use async_trait::async_trait;

mod store;

pub use store::SqliteDeviceMappingStore;


/// Resolves which device a voice user controls.
#[async_trait]
pub trait UserDeviceMapping: Send + Sync {
    /// Thing name assigned to the user, if any
    async fn device_for_user(&self, user_id: &str) -> Result<Option<String>>;
}
