//! Model catalog listing.
//!
//! Maps the provider's raw model ids onto the models this deployment knows
//! how to plan with. Ids without a catalog entry are dropped, not reported.

use stepwise_core::credential::Credential;
use stepwise_core::error::Error;
use stepwise_core::model::{ModelCatalog, ModelSpec};
use stepwise_core::provider::Provider;
use tracing::{debug, error};

/// List the known models visible to `credential`.
pub async fn list_known_models(
    provider: &dyn Provider,
    catalog: &ModelCatalog,
    credential: &Credential,
) -> Result<Vec<ModelSpec>, Error> {
    let raw = provider.list_models(credential).await.map_err(|e| {
        error!(provider = provider.name(), error = %e, "Model listing failed");
        Error::from(e)
    })?;

    let known = catalog.map_known(raw.iter().map(String::as_str));
    debug!(
        provider = provider.name(),
        raw = raw.len(),
        known = known.len(),
        "Model listing"
    );
    Ok(known)
}
