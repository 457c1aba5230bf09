use hostrpc::rpc::{FromRpcValue, RpcValue, RpcValueError, take_arg};
use std::collections::BTreeMap;

#[test]
fn scalars_convert_into_values() {
    assert_eq!(RpcValue::from(3), RpcValue::Int(3));
    assert_eq!(RpcValue::from(2.5), RpcValue::Float(2.5));
    assert_eq!(RpcValue::from(true), RpcValue::Bool(true));
    assert_eq!(RpcValue::from("hi"), RpcValue::String("hi".into()));
    assert_eq!(RpcValue::from(()), RpcValue::Null);
    assert_eq!(RpcValue::from(None::<i64>), RpcValue::Null);
}

#[test]
fn vectors_become_lists() {
    let value = RpcValue::from(vec![1.0, 4.0, 9.0]);
    assert_eq!(
        value,
        RpcValue::List(vec![
            RpcValue::Float(1.0),
            RpcValue::Float(4.0),
            RpcValue::Float(9.0)
        ])
    );

    let back: Vec<f64> = value.decode().unwrap();
    assert_eq!(back, vec![1.0, 4.0, 9.0]);
}

#[test]
fn ints_widen_to_floats_but_not_the_reverse() {
    assert_eq!(f64::from_rpc_value(RpcValue::Int(2)), Ok(2.0));
    assert_eq!(
        i64::from_rpc_value(RpcValue::Float(2.0)),
        Err(RpcValueError::TypeMismatch {
            expected: "int",
            found: "float"
        })
    );
}

#[test]
fn narrowing_out_of_range_fails() {
    let err = u32::from_rpc_value(RpcValue::Int(-1)).unwrap_err();
    assert!(matches!(err, RpcValueError::Custom(_)));
}

#[test]
fn wide_unsigned_ints_convert_while_in_range() {
    assert_eq!(RpcValue::try_from(5u64).unwrap(), RpcValue::Int(5));
    assert_eq!(
        RpcValue::try_from(i64::MAX as u64).unwrap(),
        RpcValue::Int(i64::MAX)
    );

    let err = RpcValue::try_from(u64::MAX).unwrap_err();
    assert!(matches!(err, RpcValueError::Custom(_)));

    let value = RpcValue::try_from(42usize).unwrap();
    assert_eq!(usize::from_rpc_value(value).unwrap(), 42);
}

#[test]
fn maps_decode_per_entry() {
    let mut map = BTreeMap::new();
    map.insert("a".to_string(), 1);
    map.insert("b".to_string(), 2);

    let value = RpcValue::from(map.clone());
    let decoded: BTreeMap<String, i64> = value.decode().unwrap();
    assert_eq!(decoded.len(), 2);
    assert_eq!(decoded["b"], 2);
}

#[test]
fn take_arg_reports_missing_position() {
    let mut args = vec![RpcValue::Int(2)].into_iter();

    let first: i64 = take_arg(&mut args, 0).unwrap();
    assert_eq!(first, 2);

    let second: Result<i64, _> = take_arg(&mut args, 1);
    assert_eq!(second, Err(RpcValueError::MissingArgument { position: 1 }));
}

#[test]
fn display_renders_nested_values() {
    let value = RpcValue::List(vec![RpcValue::Int(1), RpcValue::String("x".into())]);
    assert_eq!(value.to_string(), "[1, \"x\"]");
    assert_eq!(RpcValue::Bytes(vec![0; 4]).to_string(), "<4 bytes>");
}
