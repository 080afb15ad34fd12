//! User-defined types and the type catalog.

use smallvec::SmallVec;
use tracing::debug;

use super::{Dataset, GlobalRef};
use crate::attr::Vlen;
use crate::core::TypeOracle;
use crate::index::{Indexed, NcObject, Sort};
use crate::util::{Error, NcType, Result, TypeClass, TypeInfo, FIRST_USER_TYPE_ID};

/// Field of a compound type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompoundField {
    pub name: String,
    /// Byte offset within the compound.
    pub offset: usize,
    pub xtype: NcType,
    /// Array shape of the field; empty for a scalar.
    pub dims: SmallVec<[usize; 4]>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMember {
    pub name: String,
    pub value: i64,
}

/// A user-defined type.
#[derive(Clone, Debug)]
pub struct UserType {
    hdr: NcObject,
    group: usize,
    size: usize,
    class: TypeClass,
    base: Option<NcType>,
    fields: Vec<CompoundField>,
    members: Vec<EnumMember>,
}

impl UserType {
    /// Type tag of this type.
    #[inline]
    pub fn nc_type(&self) -> NcType {
        NcType::User(FIRST_USER_TYPE_ID + self.hdr.id as u32)
    }

    #[inline]
    pub fn group(&self) -> usize {
        self.group
    }

    /// Memory size of one element.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn class(&self) -> TypeClass {
        self.class
    }

    /// Element type of a vlen, integer type of an enum.
    #[inline]
    pub fn base(&self) -> Option<NcType> {
        self.base
    }

    pub fn fields(&self) -> &[CompoundField] {
        &self.fields
    }

    pub fn members(&self) -> &[EnumMember] {
        &self.members
    }

    pub fn info(&self) -> TypeInfo {
        TypeInfo {
            size: self.size,
            class: self.class,
            base: self.base,
        }
    }
}

impl Indexed for UserType {
    fn header(&self) -> &NcObject {
        &self.hdr
    }

    fn header_mut(&mut self) -> &mut NcObject {
        &mut self.hdr
    }
}

/// Global index of a user type tag.
fn user_index(t: NcType) -> Option<usize> {
    match t {
        NcType::User(id) if id >= FIRST_USER_TYPE_ID => Some((id - FIRST_USER_TYPE_ID) as usize),
        _ => None,
    }
}

impl Dataset {
    fn def_type(
        &mut self,
        gid: usize,
        name: &str,
        size: usize,
        class: TypeClass,
        base: Option<NcType>,
    ) -> Result<NcType> {
        self.check_writable()?;
        if self.is_classic() {
            return Err(Error::NotAllowed("user-defined types in the classic model".into()));
        }
        let name = self.normalize(name)?;
        self.group(gid)?.check_name_free(&name)?;
        self.require_define_mode()?;

        let index = self.types.len();
        let ut = UserType {
            hdr: NcObject::new(Sort::Type, name.as_str(), index),
            group: gid,
            size,
            class,
            base,
            fields: Vec::new(),
            members: Vec::new(),
        };
        let t = ut.nc_type();
        let position = self.group_mut(gid)?.types.add(ut)?;
        self.types.append(GlobalRef { group: gid, position });
        debug!(name = %name, %t, ?class, size, "defined type");
        Ok(t)
    }

    /// Define an opaque type of `size` bytes.
    pub fn def_opaque(&mut self, gid: usize, size: usize, name: &str) -> Result<NcType> {
        if size == 0 {
            return Err(Error::BadValue("opaque size must be positive".into()));
        }
        self.def_type(gid, name, size, TypeClass::Opaque, None)
    }

    /// Define a variable-length array of `base`.
    pub fn def_vlen(&mut self, gid: usize, name: &str, base: NcType) -> Result<NcType> {
        self.type_info(base)?;
        self.def_type(gid, name, std::mem::size_of::<Vlen>(), TypeClass::VariableLength, Some(base))
    }

    /// Define an enum over the integer type `base`.
    pub fn def_enum(&mut self, gid: usize, base: NcType, name: &str) -> Result<NcType> {
        let size = match base {
            NcType::Byte
            | NcType::UByte
            | NcType::Short
            | NcType::UShort
            | NcType::Int
            | NcType::UInt
            | NcType::Int64
            | NcType::UInt64 => base.atomic_size().unwrap_or(0),
            other => return Err(Error::BadType(format!("{other} cannot back an enum"))),
        };
        self.def_type(gid, name, size, TypeClass::Enum, Some(base))
    }

    /// Define a compound of `size` bytes; fields are added afterwards.
    pub fn def_compound(&mut self, gid: usize, size: usize, name: &str) -> Result<NcType> {
        if size == 0 {
            return Err(Error::BadValue("compound size must be positive".into()));
        }
        self.def_type(gid, name, size, TypeClass::Compound, None)
    }

    pub fn insert_enum_member(&mut self, t: NcType, name: &str, value: i64) -> Result<()> {
        self.check_writable()?;
        let name = self.normalize(name)?;
        let ut = self.user_type_mut(t)?;
        if ut.class != TypeClass::Enum {
            return Err(Error::BadType(format!("{t} is not an enum")));
        }
        if ut.members.iter().any(|m| m.name == name || m.value == value) {
            return Err(Error::NameInUse(name));
        }
        ut.members.push(EnumMember { name, value });
        Ok(())
    }

    pub fn insert_compound_field(
        &mut self,
        t: NcType,
        name: &str,
        offset: usize,
        field_type: NcType,
        dims: &[usize],
    ) -> Result<()> {
        self.check_writable()?;
        let name = self.normalize(name)?;
        let count = dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d));
        let field_size = self.type_size(field_type)?;
        let end = count
            .and_then(|n| n.checked_mul(field_size))
            .and_then(|n| n.checked_add(offset))
            .ok_or_else(|| Error::invalid("field extent overflows"))?;
        let ut = self.user_type_mut(t)?;
        if ut.class != TypeClass::Compound {
            return Err(Error::BadType(format!("{t} is not a compound")));
        }
        if end > ut.size {
            return Err(Error::BadValue(format!("field {name:?} ends at {end}, past {}", ut.size)));
        }
        if ut.fields.iter().any(|f| f.name == name) {
            return Err(Error::NameInUse(name));
        }
        ut.fields.push(CompoundField {
            name,
            offset,
            xtype: field_type,
            dims: SmallVec::from_slice(dims),
        });
        Ok(())
    }

    /// User type behind a type tag.
    pub fn inq_user_type(&self, t: NcType) -> Result<&UserType> {
        let r = user_index(t)
            .and_then(|i| self.types.get(i))
            .ok_or_else(|| Error::BadType(format!("unknown {t}")))?;
        self.group(r.group)?
            .types
            .ith(r.position)
            .ok_or_else(|| Error::internal(format!("{t} missing from group {}", r.group)))
    }

    fn user_type_mut(&mut self, t: NcType) -> Result<&mut UserType> {
        let r = *user_index(t)
            .and_then(|i| self.types.get(i))
            .ok_or_else(|| Error::BadType(format!("unknown {t}")))?;
        self.group_mut(r.group)?
            .types
            .ith_mut(r.position)
            .ok_or_else(|| Error::internal(format!("{t} missing from group {}", r.group)))
    }

    /// Type named `name` visible from `gid`, searching enclosing groups.
    pub fn inq_typeid(&self, gid: usize, name: &str) -> Result<NcType> {
        if let Some(t) = NcType::ATOMIC.into_iter().find(|t| t.name() == name) {
            return Ok(t);
        }
        for g in self.ancestry(gid)? {
            if let Some(ut) = self.group(g)?.types.lookup(name) {
                return Ok(ut.nc_type());
            }
        }
        Err(Error::BadType(format!("no type named {name:?}")))
    }
}

impl TypeOracle for Dataset {
    fn type_info(&self, t: NcType) -> Result<TypeInfo> {
        if let Some(info) = t.atomic_info() {
            return Ok(info);
        }
        self.inq_user_type(t).map(UserType::info)
    }
}
