//! Attribute store behavior through the public dataset API.

use nc4meta::attr::{FILL_VALUE_ATT, IS_NETCDF4_ATT, NC_PROPERTIES_ATT, SUPERBLOCK_VERSION_ATT};
use nc4meta::core::ProvenanceInfo;
use nc4meta::prelude::*;

const GLOBAL: Container = Container::Group(ROOT_GROUP);

fn dataset() -> Dataset {
    nc4meta::util::init_test_tracing();
    Dataset::create("attributes.nc", DatasetOptions::default())
}

fn strict() -> Dataset {
    Dataset::create("classic.nc", DatasetOptions::new().with_classic_model(true))
}

// ============================================================================
// Round trips
// ============================================================================

#[test]
fn test_numeric_roundtrip_every_atomic_type() {
    let mut ds = dataset();
    ds.put_att_values(GLOBAL, "b", NcType::Byte, &[-3i8, 4]).unwrap();
    ds.put_att_values(GLOBAL, "ub", NcType::UByte, &[250u8]).unwrap();
    ds.put_att_values(GLOBAL, "s", NcType::Short, &[-300i16]).unwrap();
    ds.put_att_values(GLOBAL, "us", NcType::UShort, &[60000u16]).unwrap();
    ds.put_att_values(GLOBAL, "i", NcType::Int, &[i32::MIN, i32::MAX]).unwrap();
    ds.put_att_values(GLOBAL, "ui", NcType::UInt, &[u32::MAX]).unwrap();
    ds.put_att_values(GLOBAL, "l", NcType::Int64, &[i64::MIN]).unwrap();
    ds.put_att_values(GLOBAL, "ul", NcType::UInt64, &[u64::MAX]).unwrap();
    ds.put_att_values(GLOBAL, "f", NcType::Float, &[1.25f32]).unwrap();
    ds.put_att_values(GLOBAL, "d", NcType::Double, &[-0.5f64, 1e300]).unwrap();

    assert_eq!(ds.get_att_values::<i8>(GLOBAL, "b").unwrap().0, vec![-3, 4]);
    assert_eq!(ds.get_att_values::<u8>(GLOBAL, "ub").unwrap().0, vec![250]);
    assert_eq!(ds.get_att_values::<i16>(GLOBAL, "s").unwrap().0, vec![-300]);
    assert_eq!(ds.get_att_values::<u16>(GLOBAL, "us").unwrap().0, vec![60000]);
    assert_eq!(ds.get_att_values::<i32>(GLOBAL, "i").unwrap().0, vec![i32::MIN, i32::MAX]);
    assert_eq!(ds.get_att_values::<u32>(GLOBAL, "ui").unwrap().0, vec![u32::MAX]);
    assert_eq!(ds.get_att_values::<i64>(GLOBAL, "l").unwrap().0, vec![i64::MIN]);
    assert_eq!(ds.get_att_values::<u64>(GLOBAL, "ul").unwrap().0, vec![u64::MAX]);
    assert_eq!(ds.get_att_values::<f32>(GLOBAL, "f").unwrap().0, vec![1.25]);
    assert_eq!(ds.get_att_values::<f64>(GLOBAL, "d").unwrap().0, vec![-0.5, 1e300]);
    assert_eq!(ds.num_atts(GLOBAL).unwrap(), 10);
}

#[test]
fn test_single_string_and_string_array() {
    let mut ds = dataset();
    ds.put_att_strings(GLOBAL, "history", &["created"]).unwrap();
    ds.put_att_strings(GLOBAL, "sources", &["station a", "", "station c"]).unwrap();

    assert_eq!(
        ds.get_att_strings(GLOBAL, "history").unwrap(),
        vec![Some("created".to_string())]
    );
    let sources = ds.get_att_strings(GLOBAL, "sources").unwrap();
    assert_eq!(sources.len(), 3);
    assert_eq!(sources[1].as_deref(), Some(""));
    assert_eq!(ds.inq_att(GLOBAL, "sources").unwrap(), (NcType::String, 3));
}

#[test]
fn test_null_strings_survive() {
    let mut ds = dataset();
    let data = AttrData::Strings(vec![Some("a".into()), None]);
    ds.put_att(GLOBAL, "s", NcType::String, NcType::String, 2, &data).unwrap();
    assert_eq!(ds.get_att(GLOBAL, "s", None).unwrap().data, data);
}

#[test]
fn test_string_never_converts() {
    let mut ds = dataset();
    ds.put_att_strings(GLOBAL, "s", &["1"]).unwrap();
    assert!(matches!(
        ds.get_att(GLOBAL, "s", Some(NcType::Int)),
        Err(Error::CharTypeMismatch { .. })
    ));
    assert!(matches!(
        ds.get_att(GLOBAL, "s", Some(NcType::Char)),
        Err(Error::CharTypeMismatch { .. })
    ));
}

#[test]
fn test_variable_length_roundtrip() {
    let mut ds = dataset();
    let ragged = ds.def_vlen(ROOT_GROUP, "ragged_t", NcType::Short).unwrap();
    let data = AttrData::VarLen(vec![
        Vlen::from_values(&[1i16, 2, 3]),
        Vlen::from_values::<i16>(&[]),
        Vlen::from_values(&[-7i16]),
    ]);
    ds.put_att(GLOBAL, "counts", ragged, ragged, 3, &data).unwrap();

    let value = ds.get_att(GLOBAL, "counts", None).unwrap();
    assert_eq!((value.xtype, value.len), (ragged, 3));
    let items = value.data.as_vlens().unwrap();
    assert_eq!(items[0].len, 3);
    assert_eq!(items[1].len, 0);
    assert_eq!(bytemuck::pod_collect_to_vec::<u8, i16>(&items[2].data), vec![-7]);
}

#[test]
fn test_enum_and_compound_are_raw() {
    let mut ds = dataset();
    let quality = ds.def_enum(ROOT_GROUP, NcType::Byte, "quality_t").unwrap();
    ds.insert_enum_member(quality, "good", 0).unwrap();
    ds.insert_enum_member(quality, "bad", 1).unwrap();
    let pair = ds.def_compound(ROOT_GROUP, 8, "pair_t").unwrap();
    ds.insert_compound_field(pair, "a", 0, NcType::Int, &[]).unwrap();
    ds.insert_compound_field(pair, "b", 4, NcType::Float, &[]).unwrap();

    ds.put_att(GLOBAL, "q", quality, quality, 2, &AttrData::Raw(vec![1, 0])).unwrap();
    let mut bytes = 5i32.to_ne_bytes().to_vec();
    bytes.extend_from_slice(&0.5f32.to_ne_bytes());
    ds.put_att(GLOBAL, "p", pair, pair, 1, &AttrData::Raw(bytes.clone())).unwrap();

    assert_eq!(ds.get_att(GLOBAL, "q", None).unwrap().data, AttrData::Raw(vec![1, 0]));
    assert_eq!(ds.get_att(GLOBAL, "p", None).unwrap().data, AttrData::Raw(bytes));
    assert!(matches!(ds.get_att(GLOBAL, "p", Some(NcType::Double)), Err(Error::BadType(_))));
}

// ============================================================================
// Conversion
// ============================================================================

#[test]
fn test_range_warning_travels_with_data() {
    let mut ds = dataset();
    ds.put_att_values(GLOBAL, "big", NcType::Int, &[300i32, -1, 1]).unwrap();

    let value = ds.get_att(GLOBAL, "big", Some(NcType::Byte)).unwrap();
    assert_eq!(value.values::<i8>().unwrap(), vec![44, -1, 1]);
    assert_eq!(value.range_warning, Some(RangeWarning { count: 1 }));

    let (unsigned, warning) = ds.get_att_values::<u8>(GLOBAL, "big").unwrap();
    assert_eq!(unsigned, vec![44, 255, 1]);
    assert_eq!(warning, Some(RangeWarning { count: 2 }));
}

#[test]
fn test_put_into_byte_wraps_and_warns() {
    let mut ds = dataset();
    let data = AttrData::from_values(&[300i32]);
    let out = ds.put_att(GLOBAL, "b", NcType::Byte, NcType::Int, 1, &data).unwrap();
    assert_eq!(out.range_warning, Some(RangeWarning { count: 1 }));

    let (values, warning) = ds.get_att_values::<u8>(GLOBAL, "b").unwrap();
    assert_eq!(values, vec![44]);
    assert!(warning.is_none());
}

#[test]
fn test_values_reject_other_types() {
    let mut ds = dataset();
    ds.put_att_values(GLOBAL, "f", NcType::Float, &[1.5f32, -2.0]).unwrap();
    let value = ds.get_att(GLOBAL, "f", None).unwrap();
    assert_eq!(value.mem_type, NcType::Float);
    assert_eq!(value.values::<f32>().unwrap(), vec![1.5, -2.0]);
    assert!(matches!(value.values::<f64>(), Err(Error::BadType(_))));
    assert!(matches!(value.values::<i32>(), Err(Error::BadType(_))));
}

#[test]
fn test_float_to_int_saturates() {
    let mut ds = dataset();
    ds.put_att_values(GLOBAL, "x", NcType::Double, &[1e10f64, 2.9]).unwrap();
    let (values, warning) = ds.get_att_values::<i32>(GLOBAL, "x").unwrap();
    assert_eq!(values, vec![i32::MAX, 2]);
    assert_eq!(warning, Some(RangeWarning { count: 1 }));
}

#[test]
fn test_strict_ignores_byte_pair_ranges_only() {
    let mut ds = strict();
    ds.put_att_values(GLOBAL, "b", NcType::Byte, &[-5i8]).unwrap();
    ds.put_att_values(GLOBAL, "i", NcType::Int, &[300i32]).unwrap();

    let (values, warning) = ds.get_att_values::<u8>(GLOBAL, "b").unwrap();
    assert_eq!(values, vec![251]);
    assert!(warning.is_none());

    let (_, warning) = ds.get_att_values::<i8>(GLOBAL, "i").unwrap();
    assert_eq!(warning, Some(RangeWarning { count: 1 }));

    let mut relaxed = dataset();
    relaxed.put_att_values(GLOBAL, "b", NcType::Byte, &[-5i8]).unwrap();
    let (_, warning) = relaxed.get_att_values::<u8>(GLOBAL, "b").unwrap();
    assert_eq!(warning, Some(RangeWarning { count: 1 }));
}

// ============================================================================
// Deletion and renumbering
// ============================================================================

#[test]
fn test_delete_renumbers() {
    let mut ds = dataset();
    for name in ["a0", "a1", "a2", "a3"] {
        ds.put_att_text(GLOBAL, name, name).unwrap();
    }
    ds.del_att(GLOBAL, "a1").unwrap();

    assert_eq!(ds.att_names(GLOBAL).unwrap(), vec!["a0", "a2", "a3"]);
    assert_eq!(ds.inq_attid(GLOBAL, "a0").unwrap(), 0);
    assert_eq!(ds.inq_attid(GLOBAL, "a2").unwrap(), 1);
    assert_eq!(ds.inq_attid(GLOBAL, "a3").unwrap(), 2);
    assert_eq!(ds.inq_attname(GLOBAL, 2).unwrap(), "a3");
    ds.verify().unwrap();

    // the next attribute takes the next free id
    let out = ds.put_att_text(GLOBAL, "a4", "x").unwrap();
    assert_eq!(out.id, 3);
}

#[test]
fn test_delete_absent_changes_nothing() {
    let mut ds = dataset();
    ds.put_att_text(GLOBAL, "a", "1").unwrap();
    ds.put_att_text(GLOBAL, "b", "2").unwrap();
    let before = ds.att_names(GLOBAL).unwrap();

    for _ in 0..2 {
        assert!(matches!(ds.del_att(GLOBAL, "missing"), Err(Error::NotFound(_))));
    }
    assert_eq!(ds.att_names(GLOBAL).unwrap(), before);
    assert_eq!(ds.inq_attid(GLOBAL, "b").unwrap(), 1);
}

#[test]
fn test_delete_outside_define_mode() {
    let mut ds = strict();
    ds.put_att_text(GLOBAL, "a", "1").unwrap();
    ds.enddef().unwrap();
    ds.del_att(GLOBAL, "a").unwrap();
    assert!(ds.in_define_mode());
    assert_eq!(ds.num_atts(GLOBAL).unwrap(), 0);
}

#[test]
fn test_variable_attributes_are_separate() {
    let mut ds = dataset();
    let v = ds.def_var(ROOT_GROUP, "temp", NcType::Float, &[]).unwrap();
    let var = Container::Var(ROOT_GROUP, v);
    ds.put_att_text(var, "units", "K").unwrap();
    ds.put_att_text(GLOBAL, "units", "none").unwrap();

    ds.del_att(GLOBAL, "units").unwrap();
    assert_eq!(ds.get_att_text(var, "units").unwrap(), "K");
    assert!(ds.var(ROOT_GROUP, v).unwrap().is_attr_dirty());
}

// ============================================================================
// Reserved names
// ============================================================================

#[test]
fn test_reserved_names_are_read_only() {
    let mut ds = dataset();
    for name in [NC_PROPERTIES_ATT, IS_NETCDF4_ATT, SUPERBLOCK_VERSION_ATT] {
        assert!(matches!(ds.put_att_text(GLOBAL, name, "x"), Err(Error::NameInUse(_))), "{name}");
        assert!(matches!(ds.del_att(GLOBAL, name), Err(Error::NotAllowed(_))), "{name}");
        assert!(matches!(ds.rename_att(GLOBAL, name, "other"), Err(Error::NotAllowed(_))), "{name}");
        assert!(matches!(ds.inq_attid(GLOBAL, name), Err(Error::AttMeta(_))), "{name}");
    }
    ds.put_att_text(GLOBAL, "title", "x").unwrap();
    assert!(matches!(ds.rename_att(GLOBAL, "title", IS_NETCDF4_ATT), Err(Error::NameInUse(_))));

    // never materialized
    assert_eq!(ds.num_atts(GLOBAL).unwrap(), 1);
}

#[test]
fn test_reserved_values() {
    let mut info = ProvenanceInfo::new();
    info.set("nc4meta", "test");
    let ds = Dataset::create(
        "reserved.nc",
        DatasetOptions::new().with_superblock_version(2).with_provenance(info),
    );

    assert_eq!(ds.get_att_text(GLOBAL, NC_PROPERTIES_ATT).unwrap(), "version=2,nc4meta=test");
    assert_eq!(ds.get_att_values::<i32>(GLOBAL, IS_NETCDF4_ATT).unwrap().0, vec![1]);
    assert_eq!(ds.get_att_values::<u16>(GLOBAL, SUPERBLOCK_VERSION_ATT).unwrap().0, vec![2]);
    assert_eq!(ds.inq_att(GLOBAL, SUPERBLOCK_VERSION_ATT).unwrap(), (NcType::Int, 1));
}

#[test]
fn test_reserved_names_are_ordinary_elsewhere() {
    let mut ds = dataset();
    let v = ds.def_var(ROOT_GROUP, "v", NcType::Int, &[]).unwrap();
    let var = Container::Var(ROOT_GROUP, v);
    ds.put_att_values(var, IS_NETCDF4_ATT, NcType::Int, &[7i32]).unwrap();
    assert_eq!(ds.get_att_values::<i32>(var, IS_NETCDF4_ATT).unwrap().0, vec![7]);
    assert_eq!(ds.inq_attid(var, IS_NETCDF4_ATT).unwrap(), 0);
}

// ============================================================================
// Fill values
// ============================================================================

#[test]
fn test_fill_value_updates_variable() {
    let mut ds = dataset();
    let v = ds.def_var(ROOT_GROUP, "t", NcType::Float, &[]).unwrap();
    let var = Container::Var(ROOT_GROUP, v);
    ds.put_att_values(var, FILL_VALUE_ATT, NcType::Float, &[-999.0f32]).unwrap();

    let fill = ds.fill_value(ROOT_GROUP, v).unwrap().unwrap();
    assert_eq!(fill.to_values::<f32>(), Some(vec![-999.0]));
    assert!(!ds.var(ROOT_GROUP, v).unwrap().fill_val_changed());
}

#[test]
fn test_fill_value_rules() {
    let mut ds = dataset();
    let v = ds.def_var(ROOT_GROUP, "t", NcType::Int, &[]).unwrap();
    let var = Container::Var(ROOT_GROUP, v);

    assert!(matches!(
        ds.put_att_values(var, FILL_VALUE_ATT, NcType::Int, &[1i32, 2]),
        Err(Error::BadValue(_))
    ));
    assert!(matches!(
        ds.put_att_values(var, FILL_VALUE_ATT, NcType::Short, &[1i16]),
        Err(Error::BadValue(_))
    ));
    assert_eq!(ds.num_atts(var).unwrap(), 0);

    ds.mark_written(ROOT_GROUP, v).unwrap();
    assert!(matches!(
        ds.put_att_values(var, FILL_VALUE_ATT, NcType::Int, &[1i32]),
        Err(Error::LateFillValue(_))
    ));
    // Once data is written the late-fill error wins over the length check.
    assert!(matches!(
        ds.put_att_values(var, FILL_VALUE_ATT, NcType::Int, &[1i32, 2]),
        Err(Error::LateFillValue(_))
    ));
    assert_eq!(ds.num_atts(var).unwrap(), 0);
}

#[test]
fn test_fill_value_change_after_flush() {
    let mut ds = dataset();
    let v = ds.def_var(ROOT_GROUP, "t", NcType::Double, &[]).unwrap();
    let var = Container::Var(ROOT_GROUP, v);
    ds.put_att_values(var, FILL_VALUE_ATT, NcType::Double, &[0.0f64]).unwrap();
    ds.sync().unwrap();
    ds.put_att_values(var, FILL_VALUE_ATT, NcType::Double, &[1.0f64]).unwrap();
    assert!(ds.var(ROOT_GROUP, v).unwrap().fill_val_changed());
}

#[test]
fn test_global_fill_value_is_ordinary() {
    let mut ds = dataset();
    ds.put_att_values(GLOBAL, FILL_VALUE_ATT, NcType::Int, &[1i32, 2, 3]).unwrap();
    assert_eq!(ds.inq_att(GLOBAL, FILL_VALUE_ATT).unwrap(), (NcType::Int, 3));
}

// ============================================================================
// Definition mode and the classic model
// ============================================================================

#[test]
fn test_strict_new_attribute_needs_define_mode() {
    let mut ds = strict();
    ds.enddef().unwrap();
    assert!(matches!(ds.put_att_text(GLOBAL, "a", "x"), Err(Error::NotInDefineMode)));
    assert_eq!(ds.num_atts(GLOBAL).unwrap(), 0);
}

#[test]
fn test_strict_overwrite_may_not_grow() {
    let mut ds = strict();
    ds.put_att_values(GLOBAL, "a", NcType::Int, &[1i32, 2]).unwrap();
    ds.enddef().unwrap();

    // same footprint is fine
    ds.put_att_values(GLOBAL, "a", NcType::Short, &[1i16, 2, 3, 4]).unwrap();
    assert!(matches!(
        ds.put_att_values(GLOBAL, "a", NcType::Double, &[1.0f64, 2.0]),
        Err(Error::NotInDefineMode)
    ));
    assert_eq!(ds.inq_att(GLOBAL, "a").unwrap(), (NcType::Short, 4));
}

#[test]
fn test_relaxed_growth_enters_define_mode() {
    let mut ds = dataset();
    ds.put_att_values(GLOBAL, "a", NcType::Int, &[1i32]).unwrap();
    ds.enddef().unwrap();
    ds.put_att_values(GLOBAL, "a", NcType::Int, &[1i32, 2]).unwrap();
    assert!(ds.in_define_mode());
}

#[test]
fn test_strict_rejects_extended_types() {
    let mut ds = strict();
    assert!(matches!(
        ds.put_att_values(GLOBAL, "u", NcType::UInt, &[1u32]),
        Err(Error::StrictModeViolation(NcType::UInt))
    ));
    assert!(matches!(
        ds.put_att_strings(GLOBAL, "s", &["x"]),
        Err(Error::StrictModeViolation(NcType::String))
    ));
    // extended memory types are fine when the file type is classic
    ds.put_att_values(GLOBAL, "i", NcType::Int, &[7u64]).unwrap();
}

#[test]
fn test_strict_rename_may_not_grow() {
    let mut ds = strict();
    ds.put_att_text(GLOBAL, "abc", "x").unwrap();
    ds.enddef().unwrap();
    assert!(matches!(ds.rename_att(GLOBAL, "abc", "abcd"), Err(Error::NotInDefineMode)));
    ds.rename_att(GLOBAL, "abc", "xy").unwrap();
    assert_eq!(ds.att_names(GLOBAL).unwrap(), vec!["xy"]);
}

#[test]
fn test_name_validation() {
    let mut ds = dataset();
    assert!(matches!(ds.put_att_text(GLOBAL, "", "x"), Err(Error::BadName(_))));
    assert!(matches!(ds.put_att_text(GLOBAL, "a/b", "x"), Err(Error::BadName(_))));
    let long = "n".repeat(nc4meta::core::MAX_NAME + 1);
    assert!(matches!(ds.put_att_text(GLOBAL, &long, "x"), Err(Error::MaxName { .. })));
}
