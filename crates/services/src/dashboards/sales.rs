use std::sync::Arc;

use olympiad_core::model::{
    ActiveStatus, Capability, SalesPerson, SalesPersonDraft, SalesPersonId, SessionUser,
};
use storage::repository::SalesRepository;
use tracing::info;

use super::authorize;
use crate::error::DashboardError;

const ADMIN_ONLY: &str = "Only admins can manage the sales team";

#[derive(Clone)]
pub struct SalesTeamService {
    sales: Arc<dyn SalesRepository>,
}

impl SalesTeamService {
    #[must_use]
    pub fn new(sales: Arc<dyn SalesRepository>) -> Self {
        Self { sales }
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` for non-admins or `DashboardError::Api`.
    pub async fn list(&self, viewer: &SessionUser) -> Result<Vec<SalesPerson>, DashboardError> {
        authorize(viewer, Capability::ManageSalesTeam, ADMIN_ONLY)?;
        Ok(self.sales.list_sales_people().await?)
    }

    /// # Errors
    ///
    /// Returns `DashboardError::Invalid` when the draft fails validation, plus
    /// the errors of `list`.
    pub async fn register(
        &self,
        viewer: &SessionUser,
        draft: SalesPersonDraft,
    ) -> Result<SalesPerson, DashboardError> {
        authorize(viewer, Capability::ManageSalesTeam, ADMIN_ONLY)?;
        let valid = draft.validate()?;
        let person = self.sales.register_sales_person(&valid).await?;
        info!(sales_id = %person.id, "sales person registered");
        Ok(person)
    }

    /// Set a sales person's status and return it for the local patch.
    ///
    /// # Errors
    ///
    /// Returns `DashboardError::Forbidden` for non-admins or `DashboardError::Api`.
    pub async fn set_status(
        &self,
        viewer: &SessionUser,
        id: SalesPersonId,
        status: ActiveStatus,
    ) -> Result<ActiveStatus, DashboardError> {
        authorize(viewer, Capability::ManageSalesTeam, ADMIN_ONLY)?;
        self.sales.set_sales_status(id, status).await?;
        info!(sales_id = %id, %status, "sales status changed");
        Ok(status)
    }
}
