//! [`Command`] definition.

pub mod authorize_session;
pub mod create_tenant;
pub mod delete_tenant;
pub mod generate_rents;
pub mod pay_rent;
pub mod record_meter_reading;
pub mod send_reminders;
pub mod settle_rent;
pub mod sweep_rent_statuses;
pub mod sync_tenant_rents;
pub mod update_tenant;
pub mod update_tenant_agreement;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    authorize_session::AuthorizeSession, create_tenant::CreateTenant,
    delete_tenant::DeleteTenant, generate_rents::GenerateRents,
    pay_rent::PayRent, record_meter_reading::RecordMeterReading,
    send_reminders::SendReminders, settle_rent::SettleRent,
    sweep_rent_statuses::SweepRentStatuses,
    sync_tenant_rents::SyncTenantRents, update_tenant::UpdateTenant,
    update_tenant_agreement::UpdateTenantAgreement,
};
