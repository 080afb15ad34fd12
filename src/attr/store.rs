//! Attribute operations on a [`Dataset`].
//!
//! Every attribute belongs to a [`Container`]: the global attributes of a
//! group or the attributes of one variable. Writes are validated in full
//! before anything is touched, so a failed `put_att` leaves the container
//! exactly as it was.

use tracing::{debug, trace};

use super::record::{AttrData, AttrValue, AttributeRecord, Container, Payload, PutOutcome, Vlen};
use super::reserved::is_reserved;
use crate::catalog::Dataset;
use crate::core::{convert, is_char_alias, TypeOracle};
use crate::index::Indexed;
use crate::util::{Error, NcPod, NcType, RangeWarning, Result, TypeClass, TypeInfo};

/// Per-variable fill value attribute.
pub const FILL_VALUE_ATT: &str = "_FillValue";

/// Largest element count of one attribute.
pub const MAX_ATT_LEN: usize = i32::MAX as usize;

// ============================================================================
// Payload helpers
// ============================================================================

fn byte_len(len: usize, size: usize) -> Result<usize> {
    len.checked_mul(size)
        .ok_or_else(|| Error::invalid(format!("{len} elements of {size} bytes overflow")))
}

fn copy_bytes(src: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    out.try_reserve_exact(src.len())
        .map_err(|_| Error::OutOfMemory(src.len()))?;
    out.extend_from_slice(src);
    Ok(out)
}

fn copy_items<T: Clone>(src: &[T]) -> Result<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(src.len())
        .map_err(|_| Error::OutOfMemory(src.len().saturating_mul(std::mem::size_of::<T>())))?;
    out.extend_from_slice(src);
    Ok(out)
}

fn short_data(len: usize, got: usize, what: &str) -> Error {
    Error::invalid(format!("{len} values requested, only {got} {what} supplied"))
}

/// Empty value of the representation used by `class`.
fn empty_data(class: TypeClass) -> AttrData {
    match class {
        TypeClass::String => AttrData::Strings(Vec::new()),
        TypeClass::VariableLength => AttrData::VarLen(Vec::new()),
        _ => AttrData::Raw(Vec::new()),
    }
}

/// How a put stores its values.
struct PutPlan {
    file_type: NcType,
    file: TypeInfo,
    mem_type: NcType,
    /// Base element size of a vlen file type.
    base_size: Option<usize>,
    len: usize,
    strict: bool,
}

impl PutPlan {
    /// Copy `data` into an owned payload of the file type.
    fn build(&self, data: &AttrData) -> Result<(Payload, Option<RangeWarning>)> {
        let len = self.len;
        if len == 0 {
            return Ok((Payload::None, None));
        }
        match (self.file.class, data) {
            (TypeClass::String, AttrData::Strings(items)) => {
                let items = items
                    .get(..len)
                    .ok_or_else(|| short_data(len, items.len(), "strings"))?;
                Ok((Payload::StringArray(copy_items(items)?), None))
            }
            (TypeClass::VariableLength, AttrData::VarLen(items)) => {
                let items = items
                    .get(..len)
                    .ok_or_else(|| short_data(len, items.len(), "vlen elements"))?;
                let base = self.base_size.unwrap_or(0);
                let mut out = Vec::new();
                out.try_reserve_exact(len)
                    .map_err(|_| Error::OutOfMemory(len.saturating_mul(std::mem::size_of::<Vlen>())))?;
                for (i, item) in items.iter().enumerate() {
                    let need = byte_len(item.len, base)?;
                    let bytes = item
                        .data
                        .get(..need)
                        .ok_or_else(|| Error::invalid(format!("vlen element {i} holds {} of {need} bytes", item.data.len())))?;
                    out.push(Vlen::new(item.len, copy_bytes(bytes)?));
                }
                Ok((Payload::VarLenArray(out), None))
            }
            (class, AttrData::Raw(bytes))
                if class.is_raw() || matches!(class, TypeClass::Numeric | TypeClass::Character) =>
            {
                if self.file_type == self.mem_type {
                    let need = byte_len(len, self.file.size)?;
                    let bytes = bytes
                        .get(..need)
                        .ok_or_else(|| short_data(len, bytes.len() / self.file.size.max(1), "values"))?;
                    return Ok((Payload::RawBytes(copy_bytes(bytes)?), None));
                }
                let converted = convert(bytes, self.mem_type, self.file_type, len, self.strict)?;
                Ok((Payload::RawBytes(converted.data), converted.range_warning))
            }
            (_, other) => Err(Error::invalid(format!(
                "{} attribute cannot be built from {}",
                self.file_type,
                other.kind()
            ))),
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

impl Dataset {
    /// Read an attribute, converting to `requested` when given.
    ///
    /// `None` reads the values in their stored type.
    pub fn get_att(&self, container: Container, name: &str, requested: Option<NcType>) -> Result<AttrValue> {
        let name = self.normalize(name)?;
        if is_reserved(container, &name) {
            return self.get_reserved_att(&name, requested);
        }
        let att = self
            .atts(container)?
            .lookup(&name)
            .ok_or_else(|| Error::NotFound(name.clone()))?;

        let stored = att.xtype();
        let mem = requested.unwrap_or(stored);
        let text_mismatch = (stored.is_char() != mem.is_char() && !is_char_alias(stored, mem))
            || stored.is_string() != mem.is_string();
        if text_mismatch {
            return Err(Error::CharTypeMismatch { stored, requested: mem });
        }

        let value = |data, range_warning| AttrValue {
            xtype: stored,
            len: att.len(),
            mem_type: mem,
            data,
            range_warning,
        };
        if att.is_empty() {
            let class = self.type_info(stored)?.class;
            return Ok(value(empty_data(class), None));
        }

        let (data, range_warning) = match att.payload() {
            Payload::RawBytes(bytes) => {
                if mem == stored || is_char_alias(stored, mem) {
                    (AttrData::Raw(bytes.clone()), None)
                } else {
                    let converted = convert(bytes, stored, mem, att.len(), self.is_classic())?;
                    (AttrData::Raw(converted.data), converted.range_warning)
                }
            }
            Payload::StringArray(items) => (AttrData::Strings(items.clone()), None),
            Payload::VarLenArray(items) if mem == stored => (AttrData::VarLen(items.clone()), None),
            Payload::VarLenArray(_) => {
                return Err(Error::BadType(format!("cannot convert {stored} to {mem}")));
            }
            Payload::None => {
                return Err(Error::internal(format!("{name:?} has {} values but no payload", att.len())));
            }
        };
        if let Some(w) = range_warning {
            debug!(att = %name, %stored, %mem, out_of_range = w.count, "lossy attribute read");
        }
        Ok(value(data, range_warning))
    }

    /// Stored type and length of an attribute.
    pub fn inq_att(&self, container: Container, name: &str) -> Result<(NcType, usize)> {
        let name = self.normalize(name)?;
        if is_reserved(container, &name) {
            let v = self.get_reserved_att(&name, None)?;
            return Ok((v.xtype, v.len));
        }
        self.atts(container)?
            .lookup(&name)
            .map(|a| (a.xtype(), a.len()))
            .ok_or(Error::NotFound(name))
    }

    /// Numeric id of an attribute. Virtual attributes have none.
    pub fn inq_attid(&self, container: Container, name: &str) -> Result<usize> {
        let name = self.normalize(name)?;
        if is_reserved(container, &name) {
            return Err(Error::AttMeta(name));
        }
        self.atts(container)?
            .lookup(&name)
            .map(Indexed::id)
            .ok_or(Error::NotFound(name))
    }

    /// Name of attribute number `attnum`.
    pub fn inq_attname(&self, container: Container, attnum: usize) -> Result<&str> {
        self.atts(container)?
            .ith(attnum)
            .map(Indexed::name)
            .ok_or_else(|| Error::NotFound(format!("attribute {attnum} of {container}")))
    }

    pub fn num_atts(&self, container: Container) -> Result<usize> {
        Ok(self.atts(container)?.len())
    }

    /// Attribute names in id order.
    pub fn att_names(&self, container: Container) -> Result<Vec<String>> {
        Ok(self.atts(container)?.names().map(str::to_string).collect())
    }
}

// ============================================================================
// Mutations
// ============================================================================

impl Dataset {
    /// Write `len` values of `mem_type` as an attribute of type `file_type`.
    ///
    /// Creates the attribute or replaces its type, length and values.
    /// Numeric values are converted; values that do not fit are stored
    /// best-effort and reported in the outcome.
    pub fn put_att(
        &mut self,
        container: Container,
        name: &str,
        file_type: NcType,
        mem_type: NcType,
        len: usize,
        data: &AttrData,
    ) -> Result<PutOutcome> {
        self.check_writable()?;
        self.atts(container)?;
        if len > MAX_ATT_LEN {
            return Err(Error::invalid(format!("attribute length {len} exceeds {MAX_ATT_LEN}")));
        }
        let name = self.normalize(name)?;
        if is_reserved(container, &name) {
            return Err(Error::NameInUse(name));
        }

        let file = self.type_info(file_type)?;
        let mem = self.type_info(mem_type)?;
        if file_type != mem_type {
            if file_type.is_char() || mem_type.is_char() || file_type.is_string() || mem_type.is_string() {
                return Err(Error::CharTypeMismatch {
                    stored: file_type,
                    requested: mem_type,
                });
            }
            if file.class != TypeClass::Numeric || mem.class != TypeClass::Numeric {
                return Err(Error::BadType(format!("cannot convert {mem_type} to {file_type}")));
            }
        }
        if self.is_classic() && !file_type.is_classic() {
            return Err(Error::StrictModeViolation(file_type));
        }

        let fill_target = match container {
            Container::Var(gid, varid) if name == FILL_VALUE_ATT => Some((gid, varid)),
            _ => None,
        };
        if let Some((gid, varid)) = fill_target {
            self.check_fill_value(gid, varid, file_type, len)?;
        }

        let base_size = match (file.class, file.base) {
            (TypeClass::VariableLength, Some(base)) => Some(self.type_size(base)?),
            _ => None,
        };
        let plan = PutPlan {
            file_type,
            file,
            mem_type,
            base_size,
            len,
            strict: self.is_classic(),
        };
        let (payload, range_warning) = plan.build(data)?;

        let existing = self
            .atts(container)?
            .lookup(&name)
            .map(|a| (a.id(), a.xtype(), a.len()));
        if !self.in_define_mode() {
            let grows = match existing {
                None => true,
                Some((_, old_type, old_len)) => {
                    byte_len(len, file.size)? > byte_len(old_len, self.type_size(old_type)?)?
                }
            };
            if grows {
                self.require_define_mode()?;
            }
        }

        let fill_cache = fill_target.and_then(|_| payload.to_data());
        let atts = self.atts_mut(container)?;
        let id = match existing {
            Some((id, ..)) => id,
            None => {
                let id = atts.len();
                atts.add(AttributeRecord::new(name.clone(), id, container))?;
                id
            }
        };
        atts.lookup_mut(&name)
            .ok_or_else(|| Error::internal(format!("{name:?} vanished from {container}")))?
            .store(file_type, len, payload);
        self.mark_atts_dirty(container)?;

        if let Some((gid, varid)) = fill_target {
            let var = self.var_mut(gid, varid)?;
            var.fill_value = fill_cache;
            if var.created {
                var.fill_val_changed = true;
            }
        }

        debug!(att = %name, %container, %file_type, len, created = existing.is_none(), "put attribute");
        Ok(PutOutcome { id, range_warning })
    }

    fn check_fill_value(&self, gid: usize, varid: usize, file_type: NcType, len: usize) -> Result<()> {
        let var = self.var(gid, varid)?;
        if var.is_written() {
            return Err(Error::LateFillValue(var.name().to_string()));
        }
        if file_type != var.xtype() {
            return Err(Error::BadValue(format!(
                "{FILL_VALUE_ATT} of {:?} must be {}, not {file_type}",
                var.name(),
                var.xtype()
            )));
        }
        if len != 1 {
            return Err(Error::BadValue(format!(
                "{FILL_VALUE_ATT} of {:?} must hold one value, not {len}",
                var.name()
            )));
        }
        Ok(())
    }

    /// Rename an attribute; its id does not change.
    pub fn rename_att(&mut self, container: Container, old_name: &str, new_name: &str) -> Result<()> {
        self.check_writable()?;
        let new_name = self.normalize(new_name)?;
        let old_name = self.normalize(old_name)?;
        if is_reserved(container, &new_name) {
            return Err(Error::NameInUse(new_name));
        }
        if is_reserved(container, &old_name) {
            return Err(Error::NotAllowed(format!("renaming {old_name}")));
        }

        let atts = self.atts(container)?;
        if atts.position(&new_name).is_some() {
            return Err(Error::NameInUse(new_name));
        }
        let persisted = atts
            .lookup(&old_name)
            .ok_or_else(|| Error::NotFound(old_name.clone()))?
            .is_persisted();
        if !self.in_define_mode() && self.is_classic() && new_name.len() > old_name.len() {
            return Err(Error::NotInDefineMode);
        }

        // The stored copy is keyed by name; drop it and let the next flush
        // write the record under its new name.
        if persisted {
            self.backend.remove_from_store(container, &old_name)?;
        }
        let atts = self.atts_mut(container)?;
        let position = atts.rename(&old_name, &new_name)?;
        if let Some(att) = atts.ith_mut(position) {
            att.mark_unpersisted();
        }
        self.mark_atts_dirty(container)?;
        debug!(old = %old_name, new = %new_name, %container, "renamed attribute");
        Ok(())
    }

    /// Delete an attribute. Attributes with higher ids move down by one.
    pub fn del_att(&mut self, container: Container, name: &str) -> Result<()> {
        self.check_writable()?;
        let name = self.normalize(name)?;
        if is_reserved(container, &name) {
            return Err(Error::NotAllowed(format!("deleting {name}")));
        }
        let persisted = self
            .atts(container)?
            .lookup(&name)
            .ok_or_else(|| Error::NotFound(name.clone()))?
            .is_persisted();

        self.enter_define_mode()?;
        if persisted {
            self.backend.remove_from_store(container, &name)?;
        }
        self.atts_mut(container)?.remove(&name)?;
        self.mark_atts_dirty(container)?;
        debug!(att = %name, %container, "deleted attribute");
        Ok(())
    }

    /// Mark an attribute for rewrite on the next flush.
    pub fn touch_att(&mut self, container: Container, name: &str) -> Result<()> {
        let name = self.normalize(name)?;
        self.atts_mut(container)?
            .lookup_mut(&name)
            .ok_or_else(|| Error::NotFound(name.clone()))?
            .mark_dirty();
        trace!(att = %name, %container, "touched attribute");
        self.mark_atts_dirty(container)
    }
}

// ============================================================================
// Typed helpers
// ============================================================================

impl Dataset {
    /// Write a slice of numbers as an attribute of `file_type`.
    pub fn put_att_values<T: NcPod>(
        &mut self,
        container: Container,
        name: &str,
        file_type: NcType,
        values: &[T],
    ) -> Result<PutOutcome> {
        self.put_att(container, name, file_type, T::NC_TYPE, values.len(), &AttrData::from_values(values))
    }

    /// Read an attribute as numbers of `T`, with any range warning.
    pub fn get_att_values<T: NcPod>(
        &self,
        container: Container,
        name: &str,
    ) -> Result<(Vec<T>, Option<RangeWarning>)> {
        let value = self.get_att(container, name, Some(T::NC_TYPE))?;
        Ok((value.values()?, value.range_warning))
    }

    /// Write a text attribute.
    pub fn put_att_text(&mut self, container: Container, name: &str, text: &str) -> Result<PutOutcome> {
        self.put_att(container, name, NcType::Char, NcType::Char, text.len(), &AttrData::text(text))
    }

    /// Read a text attribute. Invalid UTF-8 is replaced.
    pub fn get_att_text(&self, container: Container, name: &str) -> Result<String> {
        let value = self.get_att(container, name, Some(NcType::Char))?;
        let bytes = value.data.as_bytes().unwrap_or_default();
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    /// Write a string-array attribute.
    pub fn put_att_strings(&mut self, container: Container, name: &str, items: &[&str]) -> Result<PutOutcome> {
        let data = AttrData::strings(items.iter().copied());
        self.put_att(container, name, NcType::String, NcType::String, items.len(), &data)
    }

    /// Read a string-array attribute. Null entries come back as `None`.
    pub fn get_att_strings(&self, container: Container, name: &str) -> Result<Vec<Option<String>>> {
        match self.get_att(container, name, Some(NcType::String))?.data {
            AttrData::Strings(items) => Ok(items),
            other => Err(Error::internal(format!("string attribute held {}", other.kind()))),
        }
    }
}
