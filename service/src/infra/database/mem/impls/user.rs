//! [`User`]-related [`Database`] operations.

use common::operations::{By, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::database::{self, mem::Mem, Database},
};

impl Database<Insert<User>> for Mem {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut store = self.0.write().await;
        if store.users.values().any(|u| u.login == user.login) {
            return Err(tracerr::new!(database::Error::from(
                database::mem::Error::UniqueViolation("user_login_key"),
            )));
        }
        _ = store.users.insert(user.id, user);
        Ok(())
    }
}

impl Database<Select<By<Option<User>, user::Id>>> for Mem {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let store = self.0.read().await;
        Ok(store.users.get(&by.into_inner()).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Login>>> for Mem {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Login>>,
    ) -> Result<Self::Ok, Self::Err> {
        let login = by.into_inner();
        let store = self.0.read().await;
        Ok(store.users.values().find(|u| &u.login == login).cloned())
    }
}

impl Database<Select<By<Vec<User>, user::Role>>> for Mem {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, user::Role>>,
    ) -> Result<Self::Ok, Self::Err> {
        let role = by.into_inner();
        let store = self.0.read().await;
        Ok(store
            .users
            .values()
            .filter(|u| u.role == role && u.deleted_at.is_none())
            .cloned()
            .collect())
    }
}
