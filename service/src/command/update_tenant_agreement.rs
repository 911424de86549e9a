//! [`Command`] for updating a [`Tenant`]'s rental [`Agreement`].
//!
//! [`Agreement`]: tenant::Agreement

use common::operations::{
    By, Commit, Lock, Select, Transact, Transacted, Update,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::tenant::{Agreement, Media, StartDateTime, Tenure};
use crate::{
    domain::{owner, tenant, Tenant},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating a [`Tenant`]'s rental [`Agreement`].
///
/// Changing the [`StartDateTime`] or the [`Tenure`] re-arms the expiry
/// reminder, so the [`Tenant`] gets notified about the new expiry again.
#[derive(Clone, Debug)]
pub struct UpdateTenantAgreement {
    /// ID of the [`Tenant`] whose [`Agreement`] should be updated.
    pub tenant_id: tenant::Id,

    /// ID of the [`owner`] the [`Tenant`] is expected to rent from.
    pub owner_id: owner::Id,

    /// New [`StartDateTime`] of the [`Agreement`].
    pub start: Option<tenant::StartDateTime>,

    /// New [`Tenure`] of the [`Agreement`].
    pub tenure: Option<tenant::Tenure>,

    /// New scanned rental agreement document, as an already uploaded
    /// [`Media`] file.
    ///
    /// Inner [`None`] indicating the document deletion.
    pub agreement_file: Option<Option<tenant::Media>>,
}

impl<Db, Nt> Command<UpdateTenantAgreement> for Service<Db, Nt>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Tenant>, tenant::Id>>,
            Ok = Option<Tenant>,
            Err = Traced<database::Error>,
        > + Database<
            Lock<By<Tenant, tenant::Id>>,
            Ok = (),
            Err = Traced<database::Error>,
        > + Database<Update<Tenant>, Ok = (), Err = Traced<database::Error>>
        + Database<Commit, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Tenant;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: UpdateTenantAgreement,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateTenantAgreement {
            tenant_id,
            owner_id,
            start,
            tenure,
            agreement_file,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Avoid concurrent actions upon the same `Tenant`.
        tx.execute(Lock(By::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        let mut tenant = tx
            .execute(Select(By::<Option<Tenant>, _>::new(tenant_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .filter(|t| t.owner_id == owner_id)
            .ok_or(E::TenantNotExists(tenant_id))
            .map_err(tracerr::wrap!())?;

        if start.is_some() || tenure.is_some() {
            tenant.expiry_reminder_sent = false;
        }
        if let Some(start) = start {
            tenant.agreement.start = start;
        }
        if let Some(tenure) = tenure {
            tenant.agreement.tenure = tenure;
        }
        if let Some(agreement_file) = agreement_file {
            tenant.agreement_file = agreement_file;
        }

        tx.execute(Update(tenant.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(tenant)
    }
}

/// Error of [`UpdateTenantAgreement`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Tenant`] doesn't exist.
    #[display("`Tenant(id: {_0})` does not exist")]
    #[from(ignore)]
    TenantNotExists(#[error(not(source))] tenant::Id),
}
