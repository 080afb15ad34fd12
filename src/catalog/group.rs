//! Group tree.

use tracing::debug;

use super::{Dataset, Dimension, UserType, Variable, ROOT_GROUP, ROOT_NAME};
use crate::attr::AttributeRecord;
use crate::index::{Indexed, ListIndex, NcObject, Sort};
use crate::util::{Error, Result};

/// Entry of a child group in its parent's index. The child's name lives
/// here and nowhere else.
#[derive(Clone, Debug)]
pub struct GroupLink {
    hdr: NcObject,
}

impl GroupLink {
    /// Global id of the child group.
    #[inline]
    pub fn gid(&self) -> usize {
        self.hdr.id
    }
}

impl Indexed for GroupLink {
    fn header(&self) -> &NcObject {
        &self.hdr
    }

    fn header_mut(&mut self) -> &mut NcObject {
        &mut self.hdr
    }
}

/// One group: child groups, dimensions, variables, types and attributes.
#[derive(Clone, Debug)]
pub struct Group {
    id: usize,
    parent: Option<usize>,
    pub(crate) children: ListIndex<GroupLink>,
    pub(crate) dims: ListIndex<Dimension>,
    pub(crate) vars: ListIndex<Variable>,
    pub(crate) types: ListIndex<UserType>,
    pub(crate) atts: ListIndex<AttributeRecord>,
    pub(crate) atts_dirty: bool,
}

impl Group {
    pub(crate) fn new(id: usize, parent: Option<usize>, capacity: usize) -> Self {
        Self {
            id,
            parent,
            children: ListIndex::with_capacity(capacity),
            dims: ListIndex::with_capacity(capacity),
            vars: ListIndex::with_capacity(capacity),
            types: ListIndex::with_capacity(capacity),
            atts: ListIndex::with_capacity(capacity),
            atts_dirty: false,
        }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn children(&self) -> &ListIndex<GroupLink> {
        &self.children
    }

    pub fn dims(&self) -> &ListIndex<Dimension> {
        &self.dims
    }

    pub fn vars(&self) -> &ListIndex<Variable> {
        &self.vars
    }

    pub fn types(&self) -> &ListIndex<UserType> {
        &self.types
    }

    /// Global attributes.
    pub fn atts(&self) -> &ListIndex<AttributeRecord> {
        &self.atts
    }

    /// True if global attributes changed since the last flush.
    #[inline]
    pub fn is_atts_dirty(&self) -> bool {
        self.atts_dirty
    }

    /// Variables, types and child groups share one namespace.
    pub(crate) fn check_name_free(&self, name: &str) -> Result<()> {
        if self.vars.position(name).is_some()
            || self.types.position(name).is_some()
            || self.children.position(name).is_some()
        {
            return Err(Error::NameInUse(name.to_string()));
        }
        Ok(())
    }
}

impl Dataset {
    /// Define a child group of `parent`. Returns its global id.
    pub fn def_group(&mut self, parent: usize, name: &str) -> Result<usize> {
        self.check_writable()?;
        if self.is_classic() {
            return Err(Error::NotAllowed("groups in the classic model".into()));
        }
        let name = self.normalize(name)?;
        self.group(parent)?.check_name_free(&name)?;
        self.require_define_mode()?;

        let gid = self.groups.len();
        let capacity = self.options().index_capacity;
        self.group_mut(parent)?
            .children
            .add(GroupLink { hdr: NcObject::new(Sort::Group, name.as_str(), gid) })?;
        self.groups.append(Group::new(gid, Some(parent), capacity));
        debug!(group = %name, gid, parent, "defined group");
        Ok(gid)
    }

    /// Name of a group; the root is `/`.
    pub fn group_name(&self, gid: usize) -> Result<&str> {
        let group = self.group(gid)?;
        let Some(parent) = group.parent else {
            return Ok(ROOT_NAME);
        };
        let parent = self.group(parent)?;
        let position = parent
            .children
            .find_id(gid)
            .ok_or_else(|| Error::internal(format!("group {gid} missing from its parent")))?;
        parent
            .children
            .ith(position)
            .map(|link| link.name())
            .ok_or_else(|| Error::internal(format!("group {gid} missing from its parent")))
    }

    /// Absolute path of a group, such as `/forecast/surface`.
    pub fn full_group_name(&self, gid: usize) -> Result<String> {
        let mut parts = Vec::new();
        let mut current = gid;
        while let Some(parent) = self.group(current)?.parent {
            parts.push(self.group_name(current)?);
            current = parent;
        }
        parts.reverse();
        Ok(format!("{ROOT_NAME}{}", parts.join("/")))
    }

    /// Child group of `parent` named `name`.
    pub fn inq_grp_named(&self, parent: usize, name: &str) -> Result<usize> {
        self.group(parent)?
            .children
            .lookup(name)
            .map(GroupLink::gid)
            .ok_or_else(|| Error::NotFound(format!("group {name:?}")))
    }

    /// Ids of the child groups in definition order.
    pub fn groups_of(&self, gid: usize) -> Result<Vec<usize>> {
        Ok(self.group(gid)?.children.iter().map(GroupLink::gid).collect())
    }

    /// Groups from `gid` up to the root.
    pub(crate) fn ancestry(&self, gid: usize) -> Result<Vec<usize>> {
        let mut chain = vec![gid];
        let mut current = self.group(gid)?;
        while let Some(parent) = current.parent {
            chain.push(parent);
            current = self.group(parent)?;
        }
        Ok(chain)
    }

    /// Total number of groups, the root included.
    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn root(&self) -> Result<&Group> {
        self.group(ROOT_GROUP)
    }
}
