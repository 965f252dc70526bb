use annotrack::ir::io_json::{from_json_str, to_json_string};
use proptest::prelude::*;

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn ir_json_roundtrip_is_lossless(ir in proptest_helpers::arb_ir(4, 6, 6)) {
        let json = to_json_string(&ir).expect("serialize ir json");
        let restored = from_json_str(&json).expect("parse ir json");

        prop_assert_eq!(ir, restored);
    }

    #[test]
    fn materialized_views_are_valid_json(ir in proptest_helpers::arb_ir(4, 6, 6)) {
        let options = annotrack::ir::ShapeViewOptions {
            end_frame: proptest_helpers::MAX_FRAME,
            ..Default::default()
        };
        let shapes = ir.to_shapes(&options).expect("materialize");
        let json = serde_json::to_string(&shapes).expect("serialize shapes");
        let value: serde_json::Value = serde_json::from_str(&json).expect("parse shapes");

        prop_assert_eq!(value.as_array().map(Vec::len), Some(shapes.len()));
    }
}
