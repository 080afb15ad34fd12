//! Dimensions.

use tracing::debug;

use super::{Dataset, GlobalRef};
use crate::index::{Indexed, NcObject, Sort};
use crate::util::{Error, Result};

/// A named axis. Ids are unique across the dataset.
#[derive(Clone, Debug)]
pub struct Dimension {
    hdr: NcObject,
    group: usize,
    len: usize,
    unlimited: bool,
}

impl Dimension {
    /// Global dimension id.
    #[inline]
    pub fn dimid(&self) -> usize {
        self.hdr.id
    }

    /// Group the dimension was defined in.
    #[inline]
    pub fn group(&self) -> usize {
        self.group
    }

    /// Current length; 0 for an unlimited dimension without records.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn is_unlimited(&self) -> bool {
        self.unlimited
    }
}

impl Indexed for Dimension {
    fn header(&self) -> &NcObject {
        &self.hdr
    }

    fn header_mut(&mut self) -> &mut NcObject {
        &mut self.hdr
    }
}

impl Dataset {
    /// Define a dimension in `gid`. A length of 0 makes it unlimited.
    pub fn def_dim(&mut self, gid: usize, name: &str, len: usize) -> Result<usize> {
        self.check_writable()?;
        let name = self.normalize(name)?;
        if self.group(gid)?.dims.position(&name).is_some() {
            return Err(Error::NameInUse(name));
        }
        let unlimited = len == 0;
        if unlimited && self.is_classic() && self.has_unlimited() {
            return Err(Error::NotAllowed("a second unlimited dimension in the classic model".into()));
        }
        self.require_define_mode()?;

        let dimid = self.dims.len();
        let dim = Dimension {
            hdr: NcObject::new(Sort::Dimension, name.as_str(), dimid),
            group: gid,
            len,
            unlimited,
        };
        let position = self.group_mut(gid)?.dims.add(dim)?;
        self.dims.append(GlobalRef { group: gid, position });
        debug!(dim = %name, dimid, len, unlimited, "defined dimension");
        Ok(dimid)
    }

    fn has_unlimited(&self) -> bool {
        self.dims
            .iter()
            .any(|r| self.dim_at(*r).is_some_and(Dimension::is_unlimited))
    }

    fn dim_at(&self, r: GlobalRef) -> Option<&Dimension> {
        self.groups.get(r.group)?.dims.ith(r.position)
    }

    /// Dimension by global id.
    pub fn inq_dim(&self, dimid: usize) -> Result<&Dimension> {
        self.dims
            .get(dimid)
            .and_then(|r| self.dim_at(*r))
            .ok_or_else(|| Error::BadDim(format!("id {dimid}")))
    }

    /// Id of the dimension `name` visible from `gid`, searching enclosing
    /// groups outward.
    pub fn inq_dimid(&self, gid: usize, name: &str) -> Result<usize> {
        for g in self.ancestry(gid)? {
            if let Some(dim) = self.group(g)?.dims.lookup(name) {
                return Ok(dim.dimid());
            }
        }
        Err(Error::BadDim(name.to_string()))
    }

    /// True if `dimid` is defined in `gid` or one of its ancestors.
    pub(crate) fn dim_visible(&self, gid: usize, dimid: usize) -> Result<bool> {
        let owner = self.inq_dim(dimid)?.group;
        Ok(self.ancestry(gid)?.contains(&owner))
    }

    /// Ids of the dimensions defined in `gid`.
    pub fn dims_of(&self, gid: usize) -> Result<Vec<usize>> {
        Ok(self.group(gid)?.dims.iter().map(Dimension::dimid).collect())
    }

    /// Rename a dimension. Outside definition mode a strict dataset only
    /// accepts names that are not longer than the current one.
    pub fn rename_dim(&mut self, dimid: usize, new_name: &str) -> Result<()> {
        self.check_writable()?;
        let new_name = self.normalize(new_name)?;
        let r = *self
            .dims
            .get(dimid)
            .ok_or_else(|| Error::BadDim(format!("id {dimid}")))?;
        let old = self.inq_dim(dimid)?.name().to_string();
        if self.group(r.group)?.dims.position(&new_name).is_some() {
            return Err(Error::NameInUse(new_name));
        }
        if !self.in_define_mode() && self.is_classic() && new_name.len() > old.len() {
            return Err(Error::NotInDefineMode);
        }
        self.group_mut(r.group)?.dims.rename(&old, &new_name)?;
        debug!(old = %old, new = %new_name, dimid, "renamed dimension");
        Ok(())
    }
}
