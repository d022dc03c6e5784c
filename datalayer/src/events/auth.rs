use tracing::instrument;

use super::{DataLayerEvent, EventAggregator};
use crate::errors::DataLayerResult;
use crate::staging::ViewStaging;

impl EventAggregator<'_> {
    /// `thelia_auth_success` for a staged login or registration.
    ///
    /// Consumes the staged action. `None` when nothing was staged.
    #[instrument(skip(self, staging))]
    pub async fn auth_success(
        &self,
        staging: &ViewStaging<'_>,
    ) -> DataLayerResult<Option<DataLayerEvent>> {
        let Some(auth_action) = staging.take_auth_action().await? else {
            return Ok(None);
        };
        Ok(Some(DataLayerEvent::AuthSuccess {
            auth_action,
            user: self.visitor(false),
        }))
    }
}
