//! Local and remote record sets

use modman_types::{PackageRecord, PackageState};

/// The two catalogs the resolver works against
///
/// Records are matched across catalogs by `name`. The local catalog holds
/// installed packages plus anything queued for install during this session;
/// it is kept sorted by name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    local: Vec<PackageRecord>,
    remote: Vec<PackageRecord>,
}

impl Catalog {
    #[must_use]
    pub fn new(local: Vec<PackageRecord>, remote: Vec<PackageRecord>) -> Self {
        let mut catalog = Self::default();
        catalog.set_local(local);
        catalog.set_remote(remote);
        catalog
    }

    #[must_use]
    pub fn local(&self) -> &[PackageRecord] {
        &self.local
    }

    #[must_use]
    pub fn remote(&self) -> &[PackageRecord] {
        &self.remote
    }

    pub fn set_local(&mut self, mut local: Vec<PackageRecord>) {
        local.sort_by(PackageRecord::cmp_by_name);
        self.local = local;
    }

    pub fn set_remote(&mut self, remote: Vec<PackageRecord>) {
        self.remote = remote;
    }

    #[must_use]
    pub fn find_local(&self, name: &str) -> Option<&PackageRecord> {
        self.local.iter().find(|r| r.name == name)
    }

    pub fn find_local_mut(&mut self, name: &str) -> Option<&mut PackageRecord> {
        self.local.iter_mut().find(|r| r.name == name)
    }

    #[must_use]
    pub fn find_remote(&self, name: &str) -> Option<&PackageRecord> {
        self.remote.iter().find(|r| r.name == name)
    }

    pub fn find_remote_mut(&mut self, name: &str) -> Option<&mut PackageRecord> {
        self.remote.iter_mut().find(|r| r.name == name)
    }

    /// Insert a record into the local catalog, keeping name order
    ///
    /// A record with the same name is replaced.
    pub fn upsert_local(&mut self, record: PackageRecord) {
        match self
            .local
            .binary_search_by(|probe| probe.name.as_str().cmp(record.name.as_str()))
        {
            Ok(pos) => self.local[pos] = record,
            Err(pos) => self.local.insert(pos, record),
        }
    }

    pub fn remove_local(&mut self, name: &str) -> Option<PackageRecord> {
        let pos = self.local.iter().position(|r| r.name == name)?;
        Some(self.local.remove(pos))
    }

    /// Names of local records, other than `name` itself, that depend on `name`
    ///
    /// Records already queued for removal are not counted.
    #[must_use]
    pub fn local_dependents(&self, name: &str) -> Vec<String> {
        self.local
            .iter()
            .filter(|r| {
                r.name != name && r.depends_on(name) && r.state != PackageState::QueuedUninstall
            })
            .map(|r| r.name.clone())
            .collect()
    }
}
