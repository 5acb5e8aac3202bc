use tensorgraph::{DType, GraphError, Tensor, TensorSpec, Variable, VariableSpace};

fn f32_tensor(dims: &[usize]) -> Tensor {
    Tensor::zeros(TensorSpec::new(DType::F32, dims.to_vec()))
}

#[test]
fn test_plain_id_aliases_slot_zero() {
    let mut space = VariableSpace::new();
    space
        .put_by_id(1, Variable::new(f32_tensor(&[3])))
        .expect("put by id");

    assert!(space.has(1));
    assert!(space.has_pair(1, 0), "id form is pair (id, 0)");
    assert!(space.get(1).is_some());
    assert!(space.get_pair(1, 0).is_some());
}

#[test]
fn test_nonzero_slot_is_invisible_to_id_form() {
    let mut space = VariableSpace::new();
    space
        .put((2, 3), Variable::new(f32_tensor(&[3])))
        .expect("put pair");

    assert!(space.has_pair(2, 3));
    assert!(!space.has(2), "pair (2, 3) must not answer for id 2");
    assert!(space.get(2).is_none());
    assert!(space.get_pair(2, 3).is_some());
}

#[test]
fn test_name_index() {
    let mut space = VariableSpace::new();
    space
        .put_by_id(1, Variable::with_name(f32_tensor(&[2]), "alpha"))
        .expect("put named");
    space
        .put_by_id(2, Variable::new(f32_tensor(&[2])))
        .expect("put anonymous");

    assert!(space.has_name("alpha"));
    assert!(!space.has_name("beta"));
    let var = space.get_name("alpha").expect("named lookup");
    assert_eq!(var.name(), Some("alpha"));
    assert_eq!(space.get(1).expect("id lookup").name(), Some("alpha"));
}

#[test]
fn test_put_named_indexes_by_both_forms() {
    let mut space = VariableSpace::new();
    space
        .put_named((4, 1), "bias", Variable::new(f32_tensor(&[2])))
        .expect("put named pair");

    let var = space.get_name("bias").expect("name lookup");
    assert_eq!(var.name(), Some("bias"));
    assert!(space.has_pair(4, 1));
    assert!(!space.has(4), "nonzero slot stays invisible to the id form");

    // put_named overrides a name the variable already carries.
    space
        .put_named((5, 0), "gamma", Variable::with_name(f32_tensor(&[2]), "old"))
        .expect("put renamed");
    assert!(space.has_name("gamma"));
    assert!(!space.has_name("old"));
}

#[test]
fn test_duplicate_keys_are_rejected() {
    let mut space = VariableSpace::new();
    space
        .put_by_id(1, Variable::new(f32_tensor(&[2])))
        .expect("first put");

    let err = space
        .put_by_id(1, Variable::new(f32_tensor(&[2])))
        .expect_err("duplicate pair");
    assert!(matches!(err, GraphError::VariableAlreadyExists { .. }));

    space
        .put_by_id(2, Variable::with_name(f32_tensor(&[2]), "x"))
        .expect("named put");
    let err = space
        .put_by_id(3, Variable::with_name(f32_tensor(&[2]), "x"))
        .expect_err("duplicate name");
    assert!(matches!(err, GraphError::VariableAlreadyExists { .. }));
    assert_eq!(space.len(), 2, "failed puts must not register anything");
}

#[test]
fn test_memory_accounting_splits_external_and_internal() {
    let mut space = VariableSpace::new();
    // 5x5 f32 = 100 bytes, caller-owned.
    space
        .put_by_id(-1, Variable::new(f32_tensor(&[5, 5])).mark_external(true))
        .expect("external put");
    assert_eq!(space.external_memory(), 100);
    assert_eq!(space.internal_memory(), 0);

    // 3x3 f32 = 36 bytes, produced during execution.
    space
        .put_by_id(1, Variable::new(f32_tensor(&[3, 3])))
        .expect("internal put");
    assert_eq!(space.external_memory(), 100);
    assert_eq!(space.internal_memory(), 36);
}

#[test]
fn test_clone_deep_copies_and_preserves_keys() {
    let mut tensor = f32_tensor(&[2, 2]);
    tensor.fill_f32(1.0).expect("fill");
    let mut space = VariableSpace::new();
    space
        .put_by_id(1, Variable::with_name(tensor, "weights"))
        .expect("put");
    space
        .put((2, 3), Variable::new(f32_tensor(&[4])))
        .expect("put pair");

    let cloned = space.clone();
    assert_eq!(cloned.len(), 2);
    assert!(cloned.has(1));
    assert!(cloned.has_pair(2, 3));
    assert!(!cloned.has(2), "key forms survive cloning unchanged");
    assert!(cloned.has_name("weights"));
    assert_eq!(cloned.external_memory(), space.external_memory());
    assert_eq!(cloned.internal_memory(), space.internal_memory());

    // Mutating the original must not show through the clone.
    space
        .get_mut(1)
        .expect("original variable")
        .tensor_mut()
        .fill_f32(9.0)
        .expect("fill original");
    let values = cloned
        .get(1)
        .expect("cloned variable")
        .tensor()
        .to_f32_vec()
        .expect("f32 readback");
    assert_eq!(values, vec![1.0; 4]);
}

#[test]
fn test_require_pair_reports_missing_keys() {
    let space = VariableSpace::new();
    let err = space.require_pair(4, 0).expect_err("missing variable");
    assert!(matches!(err, GraphError::VariableNotFound { .. }));
}

#[test]
fn test_iteration_follows_insertion_order() {
    let mut space = VariableSpace::new();
    space
        .put_by_id(3, Variable::new(f32_tensor(&[1])))
        .expect("put");
    space
        .put((1, 2), Variable::new(f32_tensor(&[1])))
        .expect("put");
    space
        .put_by_id(2, Variable::new(f32_tensor(&[1])))
        .expect("put");

    let pairs: Vec<_> = space.pairs().collect();
    assert_eq!(pairs, vec![(3, 0), (1, 2), (2, 0)]);
    assert_eq!(space.variables().count(), 3);
}
