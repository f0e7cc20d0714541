use super::models::ExtensionItem;
use super::sqlite::Database;
use crate::error::Error;
use crate::grants::AccessGrant;
use std::rc::Rc;

/// Persistence boundary for access grant records. Queryable before any
/// presentation layer exists, so the working set can be rebuilt at cold
/// start.
pub trait GrantStore {
    fn list(&self) -> Result<Vec<AccessGrant>, Error>;
    fn insert(&mut self, grant: &AccessGrant) -> Result<(), Error>;
    fn delete(&mut self, path: &str) -> Result<(), Error>;
    fn save(&mut self) -> Result<(), Error>;
}

/// Persistence boundary for extension filter preferences. Same shape as
/// [`GrantStore`], separate namespace.
pub trait PreferenceStore {
    fn list(&self) -> Result<Vec<ExtensionItem>, Error>;
    fn insert(&mut self, name: &str) -> Result<(), Error>;
    fn delete(&mut self, name: &str) -> Result<(), Error>;
    fn save(&mut self) -> Result<(), Error>;
}

/// SQLite-backed grant store. Shares one database handle with the
/// preference store; all access stays on the control thread.
pub struct SqliteGrantStore {
    db: Rc<Database>,
}

impl SqliteGrantStore {
    pub fn new(db: Rc<Database>) -> Self {
        Self { db }
    }
}

impl GrantStore for SqliteGrantStore {
    fn list(&self) -> Result<Vec<AccessGrant>, Error> {
        Ok(self.db.list_grants()?)
    }

    fn insert(&mut self, grant: &AccessGrant) -> Result<(), Error> {
        Ok(self.db.insert_grant(grant)?)
    }

    fn delete(&mut self, path: &str) -> Result<(), Error> {
        Ok(self.db.delete_grant(path)?)
    }

    fn save(&mut self) -> Result<(), Error> {
        Ok(self.db.checkpoint()?)
    }
}

pub struct SqlitePreferenceStore {
    db: Rc<Database>,
}

impl SqlitePreferenceStore {
    pub fn new(db: Rc<Database>) -> Self {
        Self { db }
    }
}

impl PreferenceStore for SqlitePreferenceStore {
    fn list(&self) -> Result<Vec<ExtensionItem>, Error> {
        Ok(self.db.list_extensions()?)
    }

    fn insert(&mut self, name: &str) -> Result<(), Error> {
        Ok(self.db.insert_extension(name)?)
    }

    fn delete(&mut self, name: &str) -> Result<(), Error> {
        Ok(self.db.delete_extension(name)?)
    }

    fn save(&mut self) -> Result<(), Error> {
        Ok(self.db.checkpoint()?)
    }
}
