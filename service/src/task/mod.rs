//! Background [`Task`]s definitions.

mod background;
pub mod generate_rents;
pub mod send_reminders;
pub mod sweep_rent_statuses;

pub use common::Handler as Task;

pub use self::{
    background::Background, generate_rents::GenerateRents,
    send_reminders::SendReminders, sweep_rent_statuses::SweepRentStatuses,
};
