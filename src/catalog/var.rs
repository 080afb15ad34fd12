//! Variables and their fill-value policy.

use smallvec::SmallVec;
use tracing::debug;

use super::Dataset;
use crate::attr::{AttrData, AttributeRecord};
use crate::core::{fill, TypeOracle};
use crate::index::{Indexed, ListIndex, NcObject, Sort};
use crate::util::{Error, NcType, Result};

/// A typed, dimensioned array and its attributes.
#[derive(Clone, Debug)]
pub struct Variable {
    hdr: NcObject,
    xtype: NcType,
    dimids: SmallVec<[usize; 4]>,
    pub(crate) atts: ListIndex<AttributeRecord>,
    pub(crate) attr_dirty: bool,
    /// Cached `_FillValue`.
    pub(crate) fill_value: Option<AttrData>,
    no_fill: bool,
    written_to: bool,
    /// Exists in the backing store.
    pub(crate) created: bool,
    pub(crate) fill_val_changed: bool,
}

impl Variable {
    /// Id within the owning group.
    #[inline]
    pub fn varid(&self) -> usize {
        self.hdr.id
    }

    #[inline]
    pub fn xtype(&self) -> NcType {
        self.xtype
    }

    pub fn dimids(&self) -> &[usize] {
        &self.dimids
    }

    pub fn atts(&self) -> &ListIndex<AttributeRecord> {
        &self.atts
    }

    #[inline]
    pub fn is_attr_dirty(&self) -> bool {
        self.attr_dirty
    }

    #[inline]
    pub fn is_written(&self) -> bool {
        self.written_to
    }

    #[inline]
    pub fn is_created(&self) -> bool {
        self.created
    }

    /// True if `_FillValue` changed after the variable was persisted.
    #[inline]
    pub fn fill_val_changed(&self) -> bool {
        self.fill_val_changed
    }

    #[inline]
    pub fn no_fill(&self) -> bool {
        self.no_fill
    }
}

impl Indexed for Variable {
    fn header(&self) -> &NcObject {
        &self.hdr
    }

    fn header_mut(&mut self) -> &mut NcObject {
        &mut self.hdr
    }
}

impl Dataset {
    /// Define a variable in `gid` over the dimensions `dimids`.
    pub fn def_var(&mut self, gid: usize, name: &str, xtype: NcType, dimids: &[usize]) -> Result<usize> {
        self.check_writable()?;
        let name = self.normalize(name)?;
        self.group(gid)?.check_name_free(&name)?;
        self.type_info(xtype)?;
        if self.is_classic() && !xtype.is_classic() {
            return Err(Error::StrictModeViolation(xtype));
        }
        for &dimid in dimids {
            if !self.dim_visible(gid, dimid)? {
                return Err(Error::BadDim(format!("id {dimid} is not visible from group {gid}")));
            }
        }
        self.require_define_mode()?;

        let capacity = self.options().index_capacity;
        let group = self.group_mut(gid)?;
        let varid = group.vars.len();
        group.vars.add(Variable {
            hdr: NcObject::new(Sort::Variable, name.as_str(), varid),
            xtype,
            dimids: SmallVec::from_slice(dimids),
            atts: ListIndex::with_capacity(capacity),
            attr_dirty: false,
            fill_value: None,
            no_fill: false,
            written_to: false,
            created: false,
            fill_val_changed: false,
        })?;
        debug!(var = %name, gid, varid, %xtype, ndims = dimids.len(), "defined variable");
        Ok(varid)
    }

    pub fn var(&self, gid: usize, varid: usize) -> Result<&Variable> {
        self.group(gid)?.vars.ith(varid).ok_or(Error::NotVar(varid))
    }

    pub(crate) fn var_mut(&mut self, gid: usize, varid: usize) -> Result<&mut Variable> {
        self.group_mut(gid)?.vars.ith_mut(varid).ok_or(Error::NotVar(varid))
    }

    pub fn inq_varid(&self, gid: usize, name: &str) -> Result<usize> {
        self.group(gid)?
            .vars
            .lookup(name)
            .map(Variable::varid)
            .ok_or_else(|| Error::NotFound(format!("variable {name:?}")))
    }

    /// Ids of the variables of `gid` in definition order.
    pub fn vars_of(&self, gid: usize) -> Result<Vec<usize>> {
        Ok(self.group(gid)?.vars.iter().map(Variable::varid).collect())
    }

    pub fn rename_var(&mut self, gid: usize, varid: usize, new_name: &str) -> Result<()> {
        self.check_writable()?;
        let new_name = self.normalize(new_name)?;
        let old = self.var(gid, varid)?.name().to_string();
        self.group(gid)?.check_name_free(&new_name)?;
        if !self.in_define_mode() && self.is_classic() && new_name.len() > old.len() {
            return Err(Error::NotInDefineMode);
        }
        self.group_mut(gid)?.vars.rename(&old, &new_name)?;
        debug!(old = %old, new = %new_name, gid, varid, "renamed variable");
        Ok(())
    }

    /// Record that data has been written; the fill value is frozen from now on.
    pub fn mark_written(&mut self, gid: usize, varid: usize) -> Result<()> {
        self.check_writable()?;
        self.var_mut(gid, varid)?.written_to = true;
        Ok(())
    }

    /// Turn fill mode off or on for a variable.
    pub fn set_no_fill(&mut self, gid: usize, varid: usize, no_fill: bool) -> Result<()> {
        self.check_writable()?;
        let var = self.var(gid, varid)?;
        if var.written_to {
            return Err(Error::LateFillValue(var.name().to_string()));
        }
        self.require_define_mode()?;
        self.var_mut(gid, varid)?.no_fill = no_fill;
        Ok(())
    }

    /// Fill value in effect: the explicit `_FillValue`, else the default of
    /// the variable's type. `None` for user types without an explicit fill.
    pub fn fill_value(&self, gid: usize, varid: usize) -> Result<Option<AttrData>> {
        let var = self.var(gid, varid)?;
        if let Some(fill) = &var.fill_value {
            return Ok(Some(fill.clone()));
        }
        Ok(match var.xtype {
            NcType::String => Some(AttrData::strings([fill::FILL_STRING])),
            t => fill::default_fill_bytes(t).map(AttrData::Raw),
        })
    }
}
