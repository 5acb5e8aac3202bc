use tensorgraph::ops::opcode;
use tensorgraph::{DType, NodeRecord, OpCategory, OpRegistry, Tensor};

fn sample_record() -> NodeRecord {
    let mut record = NodeRecord::new(7, OpCategory::ReduceFloat, 3);
    record.name = Some("mean_pool".to_owned());
    record.scope_id = 2;
    record.scope_name = Some("encoder".to_owned());
    record.scalar = Some(Tensor::scalar_f32(0.25));
    record.input = vec![-1, 4];
    record.dimensions = vec![0, 1];
    record.extra_params = vec![1.5];
    record.extra_integer = vec![8];
    record.extra_bools = vec![false, true];
    record.extra_types = vec![DType::F32];
    record
}

#[test]
fn test_json_round_trip() {
    let record = sample_record();
    let json = record.to_json_string().expect("encode json");
    let decoded = NodeRecord::from_json_str(&json).expect("decode json");
    assert_eq!(decoded, record);
}

#[test]
fn test_bincode_round_trip() {
    let record = sample_record();
    let bytes = record.to_bincode_bytes().expect("encode bincode");
    let decoded = NodeRecord::from_bincode_slice(&bytes).expect("decode bincode");
    assert_eq!(decoded, record);
}

#[test]
fn test_paired_record_round_trip() {
    let mut record = NodeRecord::new(3, OpCategory::Custom, 12345);
    record.input_paired = vec![(1, 0), (2, 1)];
    record.output = vec![4];

    let bytes = record.to_bincode_bytes().expect("encode");
    let decoded = NodeRecord::from_bincode_slice(&bytes).expect("decode");
    assert_eq!(decoded.input_paired, vec![(1, 0), (2, 1)]);
    assert_eq!(decoded.output, vec![4], "output survives the codec untouched");
}

#[test]
fn test_minimal_json_fills_defaults() {
    // Only the identity triple on the wire; everything else defaults.
    let json = r#"{"id": 2, "op_type": "TransformSame", "op_num": 6}"#;
    let decoded = NodeRecord::from_json_str(json).expect("decode minimal json");
    assert_eq!(decoded, NodeRecord::new(2, OpCategory::TransformSame, 6));
}

#[test]
fn test_decoded_record_builds_equivalent_node() {
    use tensorgraph::GraphNode;

    let record = sample_record();
    let bytes = record.to_bincode_bytes().expect("encode");
    let decoded = NodeRecord::from_bincode_slice(&bytes).expect("decode");

    let registry = OpRegistry::new();
    let node = GraphNode::from_record(&decoded, &registry).expect("node from decoded record");
    assert_eq!(node.id(), 7);
    assert_eq!(node.name(), Some("mean_pool"));
    assert_eq!(node.scope_id(), 2);
    assert_eq!(node.scope_name(), Some("encoder"));
    assert_eq!(node.scalar().expect("scalar"), 0.25);
    assert_eq!(node.dimensions(), &[0, 1]);
}

#[test]
fn test_enter_frame_id_survives_codec() {
    let mut record = NodeRecord::new(1, OpCategory::Logic, opcode::LOGIC_ENTER);
    record.input = vec![2];
    record.extra_integer = vec![99];

    let json = record.to_json_string().expect("encode");
    let decoded = NodeRecord::from_json_str(&json).expect("decode");

    use tensorgraph::GraphNode;
    let registry = OpRegistry::new();
    let node = GraphNode::from_record(&decoded, &registry).expect("Enter node");
    assert_eq!(node.frame_id(), Some(99));
}

#[test]
fn test_hash_name_is_stable_and_non_negative() {
    let first = OpRegistry::hash_name("matmul");
    let second = OpRegistry::hash_name("matmul");
    assert_eq!(first, second);
    assert!(first >= 0, "hashes land in the non-negative opcode space");
    assert_ne!(first, OpRegistry::hash_name("matmul_t"));
}
