//! Catalog structure, collaborators and backend interaction.

use std::sync::Arc;

use parking_lot::Mutex;

use nc4meta::core::{BackendLog, ClassicNameValidator, DefineFlag, MemoryBackend};
use nc4meta::index::{Indexed, ListIndex, NcObject, Sort};
use nc4meta::prelude::*;

const GLOBAL: Container = Container::Group(ROOT_GROUP);

fn with_backend(backend: &MemoryBackend, options: DatasetOptions) -> Dataset {
    Dataset::with_collaborators(
        "backend.nc",
        options,
        Box::new(backend.clone()),
        Box::new(ClassicNameValidator),
        Box::new(DefineFlag::new(true)),
    )
}

// ============================================================================
// Backend
// ============================================================================

#[test]
fn test_delete_unpersisted_skips_backend() {
    let backend = MemoryBackend::new();
    let mut ds = with_backend(&backend, DatasetOptions::default());
    ds.put_att_text(GLOBAL, "a", "1").unwrap();
    ds.del_att(GLOBAL, "a").unwrap();
    assert!(backend.log().removed.is_empty());
}

#[test]
fn test_delete_persisted_calls_backend() {
    let backend = MemoryBackend::new();
    let mut ds = with_backend(&backend, DatasetOptions::default());
    let v = ds.def_var(ROOT_GROUP, "v", NcType::Int, &[]).unwrap();
    let var = Container::Var(ROOT_GROUP, v);
    ds.put_att_text(var, "units", "m").unwrap();
    ds.put_att_text(var, "long_name", "height").unwrap();
    ds.sync().unwrap();

    ds.del_att(var, "units").unwrap();
    let log = backend.log();
    assert_eq!(log.flushed.len(), 2);
    assert_eq!(log.removed, vec![(var, "units".to_string())]);
    assert_eq!(ds.inq_attid(var, "long_name").unwrap(), 0);
}

#[test]
fn test_backend_failure_keeps_attribute() {
    let backend = MemoryBackend::new();
    let mut ds = with_backend(&backend, DatasetOptions::default());
    ds.put_att_text(GLOBAL, "a", "1").unwrap();
    ds.sync().unwrap();

    backend.fail_next("store offline");
    assert!(matches!(ds.del_att(GLOBAL, "a"), Err(Error::Backend(_))));
    assert_eq!(ds.num_atts(GLOBAL).unwrap(), 1);
    assert!(ds.atts(GLOBAL).unwrap().lookup("a").unwrap().is_persisted());
}

#[test]
fn test_sync_failure_leaves_records_dirty() {
    let backend = MemoryBackend::new();
    let mut ds = with_backend(&backend, DatasetOptions::default());
    ds.put_att_text(GLOBAL, "a", "1").unwrap();
    backend.fail_next("disk full");
    assert!(matches!(ds.sync(), Err(Error::Backend(_))));
    assert!(ds.atts(GLOBAL).unwrap().lookup("a").unwrap().is_dirty());

    ds.sync().unwrap();
    assert!(!ds.atts(GLOBAL).unwrap().lookup("a").unwrap().is_dirty());
}

#[test]
fn test_overwrite_after_sync_is_dirty_again() {
    let backend = MemoryBackend::new();
    let mut ds = with_backend(&backend, DatasetOptions::default());
    ds.put_att_values(GLOBAL, "n", NcType::Int, &[1i32]).unwrap();
    ds.sync().unwrap();
    ds.put_att_values(GLOBAL, "n", NcType::Int, &[2i32]).unwrap();
    ds.sync().unwrap();

    let log = backend.log();
    assert_eq!(log.flushed.len(), 2);
    assert!(log.removed.is_empty());
}

// ============================================================================
// Collaborators
// ============================================================================

/// Validator that folds names to lower case.
struct Lowercase;

impl NameValidator for Lowercase {
    fn normalize(&self, raw: &str) -> Result<String> {
        if raw.is_empty() {
            return Err(Error::BadName(raw.to_string()));
        }
        Ok(raw.to_ascii_lowercase())
    }
}

#[test]
fn test_names_go_through_validator() {
    let mut ds = Dataset::with_collaborators(
        "names.nc",
        DatasetOptions::default(),
        Box::new(MemoryBackend::new()),
        Box::new(Lowercase),
        Box::new(DefineFlag::new(true)),
    );
    ds.put_att_text(GLOBAL, "Units", "K").unwrap();
    assert_eq!(ds.att_names(GLOBAL).unwrap(), vec!["units"]);
    assert_eq!(ds.get_att_text(GLOBAL, "UNITS").unwrap(), "K");
}

/// Definition-mode state shared with the test.
#[derive(Clone, Default)]
struct SharedDefine(Arc<Mutex<(bool, usize)>>);

impl DefineMode for SharedDefine {
    fn in_define_mode(&self) -> bool {
        self.0.lock().0
    }

    fn enter_define_mode(&mut self) -> Result<()> {
        let mut state = self.0.lock();
        state.0 = true;
        state.1 += 1;
        Ok(())
    }

    fn leave_define_mode(&mut self) -> Result<()> {
        self.0.lock().0 = false;
        Ok(())
    }
}

#[test]
fn test_define_mode_entered_once() {
    let define = SharedDefine::default();
    let mut ds = Dataset::with_collaborators(
        "define.nc",
        DatasetOptions::default(),
        Box::new(MemoryBackend::new()),
        Box::new(ClassicNameValidator),
        Box::new(define.clone()),
    );
    ds.put_att_text(GLOBAL, "a", "1").unwrap();
    ds.put_att_text(GLOBAL, "b", "2").unwrap();
    ds.del_att(GLOBAL, "a").unwrap();
    assert_eq!(define.0.lock().1, 1);
}

#[test]
fn test_backend_log_default_is_empty() {
    let log = BackendLog::default();
    assert!(log.flushed.is_empty() && log.removed.is_empty());
}

// ============================================================================
// Structure
// ============================================================================

#[test]
fn test_nested_groups_keep_their_own_attributes() {
    let mut ds = Dataset::create("groups.nc", DatasetOptions::default());
    let model = ds.def_group(ROOT_GROUP, "model").unwrap();
    let run = ds.def_group(model, "run1").unwrap();
    let time = ds.def_dim(ROOT_GROUP, "time", 0).unwrap();
    let t = ds.def_var(run, "t", NcType::Double, &[time]).unwrap();

    ds.put_att_text(Container::Group(run), "title", "first run").unwrap();
    ds.put_att_text(Container::Var(run, t), "units", "days").unwrap();

    assert_eq!(ds.full_group_name(run).unwrap(), "/model/run1");
    assert_eq!(ds.inq_dimid(run, "time").unwrap(), time);
    assert_eq!(ds.get_att_text(Container::Group(run), "title").unwrap(), "first run");
    assert_eq!(ds.num_atts(GLOBAL).unwrap(), 0);
    assert_eq!(ds.num_groups(), 3);
    ds.verify().unwrap();
}

#[test]
fn test_many_attributes_stay_indexed() {
    let mut ds = Dataset::create("many.nc", DatasetOptions::new().with_index_capacity(1));
    for i in 0..500i32 {
        ds.put_att_values(GLOBAL, &format!("att_{i}"), NcType::Int, &[i]).unwrap();
    }
    for i in (0..500).step_by(3) {
        ds.del_att(GLOBAL, &format!("att_{i}")).unwrap();
    }
    ds.verify().unwrap();

    let names = ds.att_names(GLOBAL).unwrap();
    assert_eq!(names.len(), 333);
    for (id, name) in names.iter().enumerate() {
        assert_eq!(ds.inq_attid(GLOBAL, name).unwrap(), id);
    }
    assert_eq!(ds.get_att_values::<i32>(GLOBAL, "att_499").unwrap().0, vec![499]);
}

#[test]
fn test_list_index_public_surface() {
    let mut index = ListIndex::new();
    for (i, name) in ["lat", "lon", "time"].iter().enumerate() {
        index.add(NcObject::new(Sort::Attribute, *name, i)).unwrap();
    }
    assert!(matches!(
        index.add(NcObject::new(Sort::Attribute, "lat", 3)),
        Err(Error::NameConflict(_))
    ));
    index.rename("lon", "longitude").unwrap();
    let removed = index.remove("lat").unwrap();
    assert_eq!(removed.name(), "lat");
    assert_eq!(index.lookup("longitude").map(|o| o.id()), Some(0));
    assert_eq!(index.lookup("time").map(|o| o.id()), Some(1));
    index.verify().unwrap();
}

#[test]
fn test_type_oracle_through_dataset() {
    let mut ds = Dataset::create("types.nc", DatasetOptions::default());
    let blob = ds.def_opaque(ROOT_GROUP, 5, "blob_t").unwrap();
    assert_eq!(ds.type_size(blob).unwrap(), 5);
    assert_eq!(ds.type_info(NcType::Double).unwrap().class, TypeClass::Numeric);
    assert_eq!(ds.type_info(NcType::Char).unwrap().class, TypeClass::Character);
}
