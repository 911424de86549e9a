//! In-memory [`Database`] implementation for tests.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use common::operations::{
    By, Commit, Delete, Insert, Lock, Select, Transact, Update,
};
use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{rent, tenant, Rent, Tenant},
    infra::{database, Database},
    read,
};

/// In-memory [`Database`] backed by [`HashMap`]s.
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// Stored values.
    state: Arc<Mutex<State>>,
}

/// Inner state of a [`Memory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`Tenant`]s.
    tenants: HashMap<tenant::Id, Tenant>,

    /// Stored [`Rent`]s.
    rents: HashMap<rent::Id, Rent>,

    /// [`tenant::Id`]s any [`Insert`] of a [`Rent`] for which fails.
    broken_rent_inserts: Vec<tenant::Id>,
}

impl Memory {
    /// Locks the inner [`State`] of this [`Memory`] database.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    /// Marks any [`Insert`] of a [`Rent`] of the provided [`Tenant`] as
    /// failing.
    pub fn break_rent_inserts_for(&self, id: tenant::Id) {
        self.state().broken_rent_inserts.push(id);
    }
}

impl Database<Transact> for Memory {
    type Ok = Self;
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Transact) -> Result<Self::Ok, Self::Err> {
        Ok(self.clone())
    }
}

impl Database<Commit> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(&self, _: Commit) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Tenant, tenant::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Tenant, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Lock<By<Rent, rent::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Lock<By<Rent, rent::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

impl Database<Select<By<Option<Tenant>, tenant::Id>>> for Memory {
    type Ok = Option<Tenant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Tenant>, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().tenants.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Vec<Tenant>, ()>>> for Memory {
    type Ok = Vec<Tenant>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Tenant>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().tenants.values().cloned().collect())
    }
}

impl Database<Insert<Tenant>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(tenant): Insert<Tenant>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().tenants.insert(tenant.id, tenant));
        Ok(())
    }
}

impl Database<Update<Tenant>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(tenant): Update<Tenant>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().tenants.insert(tenant.id, tenant));
        Ok(())
    }
}

impl Database<Delete<By<Tenant, tenant::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Tenant, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().tenants.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Select<By<Option<Rent>, rent::Id>>> for Memory {
    type Ok = Option<Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rent>, rent::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(self.state().rents.get(&by.into_inner()).cloned())
    }
}

impl Database<Select<By<Option<Rent>, read::rent::TenantPeriod>>> for Memory {
    type Ok = Option<Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Rent>, read::rent::TenantPeriod>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sel = by.into_inner();
        Ok(self
            .state()
            .rents
            .values()
            .find(|r| {
                r.tenant_id == sel.tenant_id
                    && r.month == sel.period.month
                    && r.year == sel.period.year
            })
            .cloned())
    }
}

impl Database<Select<By<Vec<Rent>, tenant::Id>>> for Memory {
    type Ok = Vec<Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rent>, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self
            .state()
            .rents
            .values()
            .filter(|r| r.tenant_id == id)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Vec<Rent>, read::rent::Period>>> for Memory {
    type Ok = Vec<Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rent>, read::rent::Period>>,
    ) -> Result<Self::Ok, Self::Err> {
        let period = by.into_inner();
        Ok(self
            .state()
            .rents
            .values()
            .filter(|r| r.month == period.month && r.year == period.year)
            .cloned()
            .collect())
    }
}

impl Database<Select<By<Vec<Rent>, read::rent::Unpaid>>> for Memory {
    type Ok = Vec<Rent>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Rent>, read::rent::Unpaid>>,
    ) -> Result<Self::Ok, Self::Err> {
        let sel = by.into_inner();
        Ok(self
            .state()
            .rents
            .values()
            .filter(|r| {
                matches!(
                    r.status,
                    rent::Status::Pending | rent::Status::Overdue,
                ) && sel.owner.map_or(true, |o| r.owner_id == o)
            })
            .cloned()
            .collect())
    }
}

impl Database<Insert<Rent>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(rent): Insert<Rent>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state();
        if state.broken_rent_inserts.contains(&rent.tenant_id) {
            return Err(tracerr::new!(database::Error::Memory(
                Error::InsertRefused,
            )));
        }
        if state.rents.values().any(|r| {
            r.id != rent.id
                && r.tenant_id == rent.tenant_id
                && r.month == rent.month
                && r.year == rent.year
        }) {
            return Err(tracerr::new!(database::Error::Memory(
                Error::UniqueViolation,
            )));
        }
        drop(state.rents.insert(rent.id, rent));
        Ok(())
    }
}

impl Database<Update<Rent>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(rent): Update<Rent>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().rents.insert(rent.id, rent));
        Ok(())
    }
}

impl Database<Delete<By<Rent, rent::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Rent, rent::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state().rents.remove(&by.into_inner()));
        Ok(())
    }
}

impl Database<Delete<By<Rent, tenant::Id>>> for Memory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Rent, tenant::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.state().rents.retain(|_, r| r.tenant_id != id);
        Ok(())
    }
}

/// [`Memory`] database [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// [`Insert`] refused for a broken [`Tenant`].
    #[display("`Insert` refused")]
    InsertRefused,

    /// Unique key is occupied already.
    #[display("unique key is occupied")]
    UniqueViolation,
}
