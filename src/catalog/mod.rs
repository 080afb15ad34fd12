//! Dataset catalog.
//!
//! A [`Dataset`] is the in-memory metadata of one file: a tree of groups,
//! each with its own dimensions, variables, user types and global
//! attributes, all kept in [`ListIndex`]es. Persistence, name rules and
//! definition-mode state are delegated to the collaborators in
//! [`crate::core`].
//!
//! ## Example
//!
//! ```ignore
//! use nc4meta::prelude::*;
//!
//! let mut ds = Dataset::create("obs.nc", DatasetOptions::default());
//! let time = ds.def_dim(ROOT_GROUP, "time", 0)?;
//! let t = ds.def_var(ROOT_GROUP, "t", NcType::Float, &[time])?;
//! ds.put_att_text(Container::Var(ROOT_GROUP, t), "units", "K")?;
//! ds.enddef()?;
//! ```

mod group;
mod dim;
mod var;
mod types;

pub use group::{Group, GroupLink};
pub use dim::Dimension;
pub use var::Variable;
pub use types::{CompoundField, EnumMember, UserType};

use std::fmt;

use tracing::{debug, info};

use crate::attr::{AttributeRecord, Container};
use crate::core::{
    global_provenance, Backend, ClassicNameValidator, DefineFlag, DefineMode, NameValidator,
    NullBackend, ProvenanceInfo,
};
use crate::index::{DynamicVector, ListIndex};
use crate::util::{Error, Result};

/// Id of the root group.
pub const ROOT_GROUP: usize = 0;

/// Name reported for the root group.
pub const ROOT_NAME: &str = "/";

// ============================================================================
// Options
// ============================================================================

/// Creation options of a [`Dataset`].
#[derive(Clone, Debug, Default)]
pub struct DatasetOptions {
    /// Enforce the strict classic data model.
    pub classic_model: bool,
    /// Refuse every modification.
    pub read_only: bool,
    /// Initial capacity of new indexes (0 selects the default).
    pub index_capacity: usize,
    /// Reported through `_SuperblockVersion`.
    pub superblock_version: u32,
    /// Provenance record; the process-wide record is used when unset.
    pub provenance: Option<ProvenanceInfo>,
}

impl DatasetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_classic_model(mut self, classic: bool) -> Self {
        self.classic_model = classic;
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn with_index_capacity(mut self, capacity: usize) -> Self {
        self.index_capacity = capacity;
        self
    }

    pub fn with_superblock_version(mut self, version: u32) -> Self {
        self.superblock_version = version;
        self
    }

    pub fn with_provenance(mut self, info: ProvenanceInfo) -> Self {
        self.provenance = Some(info);
        self
    }
}

/// Where a dataset-wide id lives: owning group and position in its index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct GlobalRef {
    pub group: usize,
    pub position: usize,
}

// ============================================================================
// Dataset
// ============================================================================

/// In-memory metadata catalog of one file.
pub struct Dataset {
    name: String,
    options: DatasetOptions,
    provenance: ProvenanceInfo,
    pub(crate) groups: DynamicVector<Group>,
    pub(crate) dims: DynamicVector<GlobalRef>,
    pub(crate) types: DynamicVector<GlobalRef>,
    pub(crate) backend: Box<dyn Backend>,
    names: Box<dyn NameValidator>,
    define: Box<dyn DefineMode>,
}

impl Dataset {
    /// Create an empty dataset in definition mode with default collaborators.
    pub fn create(name: impl Into<String>, options: DatasetOptions) -> Self {
        let define = DefineFlag::new(!options.read_only);
        Self::with_collaborators(
            name,
            options,
            Box::new(NullBackend),
            Box::new(ClassicNameValidator),
            Box::new(define),
        )
    }

    /// Create an empty dataset wired to the given collaborators.
    pub fn with_collaborators(
        name: impl Into<String>,
        options: DatasetOptions,
        backend: Box<dyn Backend>,
        names: Box<dyn NameValidator>,
        define: Box<dyn DefineMode>,
    ) -> Self {
        let name = name.into();
        let provenance = options.provenance.clone().unwrap_or_else(global_provenance);
        let mut groups = DynamicVector::new();
        groups.append(Group::new(ROOT_GROUP, None, options.index_capacity));
        info!(name = %name, classic = options.classic_model, read_only = options.read_only, "dataset created");
        Self {
            name,
            options,
            provenance,
            groups,
            dims: DynamicVector::new(),
            types: DynamicVector::new(),
            backend,
            names,
            define,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    /// True if the strict classic model is enforced.
    #[inline]
    pub fn is_classic(&self) -> bool {
        self.options.classic_model
    }

    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.options.read_only
    }

    #[inline]
    pub fn provenance(&self) -> &ProvenanceInfo {
        &self.provenance
    }

    #[inline]
    pub fn superblock_version(&self) -> u32 {
        self.options.superblock_version
    }

    /// True if the dataset relies on anything beyond the classic model.
    pub fn is_netcdf4(&self) -> bool {
        if !self.options.classic_model {
            return true;
        }
        self.groups.len() > 1 || !self.types.is_empty()
    }

    // ------------------------------------------------------------------------
    // Definition mode
    // ------------------------------------------------------------------------

    #[inline]
    pub fn in_define_mode(&self) -> bool {
        self.define.in_define_mode()
    }

    /// Enter definition mode.
    pub fn redef(&mut self) -> Result<()> {
        self.check_writable()?;
        if self.define.in_define_mode() {
            return Err(Error::invalid("already in definition mode"));
        }
        self.define.enter_define_mode()
    }

    /// Leave definition mode.
    pub fn enddef(&mut self) -> Result<()> {
        if !self.define.in_define_mode() {
            return Err(Error::NotInDefineMode);
        }
        self.define.leave_define_mode()
    }

    /// Make sure a definition may be added: strict datasets must already be
    /// in definition mode, the others enter it.
    pub(crate) fn require_define_mode(&mut self) -> Result<()> {
        if self.define.in_define_mode() {
            return Ok(());
        }
        if self.options.classic_model {
            return Err(Error::NotInDefineMode);
        }
        debug!(dataset = %self.name, "entering definition mode");
        self.define.enter_define_mode()
    }

    /// Enter definition mode regardless of the data model.
    pub(crate) fn enter_define_mode(&mut self) -> Result<()> {
        if self.define.in_define_mode() {
            return Ok(());
        }
        debug!(dataset = %self.name, "entering definition mode");
        self.define.enter_define_mode()
    }

    #[inline]
    pub(crate) fn check_writable(&self) -> Result<()> {
        if self.options.read_only {
            return Err(Error::Permission);
        }
        Ok(())
    }

    /// Canonical form of a caller-supplied name.
    #[inline]
    pub(crate) fn normalize(&self, raw: &str) -> Result<String> {
        self.names.normalize(raw)
    }

    // ------------------------------------------------------------------------
    // Containers
    // ------------------------------------------------------------------------

    pub fn group(&self, gid: usize) -> Result<&Group> {
        self.groups.get(gid).ok_or(Error::BadGroup(gid))
    }

    pub(crate) fn group_mut(&mut self, gid: usize) -> Result<&mut Group> {
        self.groups.get_mut(gid).ok_or(Error::BadGroup(gid))
    }

    /// Attribute index of a container.
    pub fn atts(&self, container: Container) -> Result<&ListIndex<AttributeRecord>> {
        match container {
            Container::Group(gid) => Ok(&self.group(gid)?.atts),
            Container::Var(gid, varid) => Ok(&self.var(gid, varid)?.atts),
        }
    }

    pub(crate) fn atts_mut(&mut self, container: Container) -> Result<&mut ListIndex<AttributeRecord>> {
        match container {
            Container::Group(gid) => Ok(&mut self.group_mut(gid)?.atts),
            Container::Var(gid, varid) => Ok(&mut self.var_mut(gid, varid)?.atts),
        }
    }

    /// Flag a container's attribute list as needing a flush.
    pub(crate) fn mark_atts_dirty(&mut self, container: Container) -> Result<()> {
        match container {
            Container::Group(gid) => self.group_mut(gid)?.atts_dirty = true,
            Container::Var(gid, varid) => self.var_mut(gid, varid)?.attr_dirty = true,
        }
        Ok(())
    }

    /// Check every index of the dataset.
    pub fn verify(&self) -> Result<()> {
        for group in &self.groups {
            group.children.verify()?;
            group.dims.verify()?;
            group.types.verify()?;
            group.vars.verify()?;
            group.atts.verify()?;
            for var in &group.vars {
                var.atts.verify()?;
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Flush every dirty attribute to the backend.
    ///
    /// Records are marked committed one by one, so a backend failure leaves
    /// the records already written clean and the rest dirty.
    pub fn sync(&mut self) -> Result<()> {
        self.check_writable()?;
        let mut flushed = 0usize;
        for group in self.groups.iter_mut() {
            flushed += flush_index(self.backend.as_mut(), &mut group.atts)?;
            group.atts_dirty = false;
            for var in group.vars.iter_mut() {
                flushed += flush_index(self.backend.as_mut(), &mut var.atts)?;
                var.attr_dirty = false;
                var.created = true;
            }
        }
        debug!(dataset = %self.name, flushed, "synced");
        Ok(())
    }
}

fn flush_index(backend: &mut dyn Backend, atts: &mut ListIndex<AttributeRecord>) -> Result<usize> {
    let mut flushed = 0;
    for att in atts.iter_mut().filter(|a| a.is_dirty()) {
        backend.flush(att)?;
        att.mark_committed();
        flushed += 1;
    }
    Ok(flushed)
}

impl fmt::Debug for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dataset")
            .field("name", &self.name)
            .field("options", &self.options)
            .field("groups", &self.groups.len())
            .field("dims", &self.dims.len())
            .field("types", &self.types.len())
            .field("define_mode", &self.define.in_define_mode())
            .finish()
    }
}
