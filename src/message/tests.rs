use serde::Deserialize;
use serde_json::{Value, json, value::RawValue};

use crate::{DispatchError, ParameterError, RequestMessage, ResponseMessage};

#[test]
fn request_message_parse() -> anyhow::Result<()> {
    let input = br#"{"jsonrpc":"2.0","id":1,"method":"Arith.Add","params":[40, 2]}"#;
    let m = RequestMessage::parse(input)?;
    assert_eq!(to_value(m.id)?, json!(1));
    assert_eq!(m.method, "Arith.Add");
    assert_eq!(m.service_method(), Some(("Arith", "Add")));
    let params: Vec<_> = m.params().iter().map(|p| p.get()).collect();
    assert_eq!(params, ["40", "2"]);
    Ok(())
}

#[test]
fn request_message_parse_no_params() -> anyhow::Result<()> {
    let m = RequestMessage::parse(br#"{"id":"a","method":"Arith.Zero"}"#)?;
    assert!(m.params().is_empty());
    let m = RequestMessage::parse(br#"{"id":"a","method":"Arith.Zero","params":null}"#)?;
    assert!(m.params().is_empty());
    Ok(())
}

#[test]
fn request_message_parse_no_id() -> anyhow::Result<()> {
    let m = RequestMessage::parse(br#"{"method":"Arith.Add","params":[]}"#)?;
    assert!(m.id.is_none());
    let m = RequestMessage::parse(br#"{"id":null,"method":"Arith.Add","params":[]}"#)?;
    assert!(m.id.is_none());
    Ok(())
}

#[test]
fn request_message_parse_id_verbatim() -> anyhow::Result<()> {
    let m = RequestMessage::parse(br#"{"id": {"seq": 1.50}, "method":"A.B"}"#)?;
    assert_eq!(m.id.map(RawValue::get), Some(r#"{"seq": 1.50}"#));
    Ok(())
}

#[test]
fn request_message_parse_escaped() -> anyhow::Result<()> {
    let m = RequestMessage::parse(br#"{"id":1,"method":"\u3042.\u3044","params":[]}"#)?;
    assert_eq!(m.service_method(), Some(("あ", "い")));
    Ok(())
}

#[test]
fn request_message_parse_trailing_data() -> anyhow::Result<()> {
    let m = RequestMessage::parse(br#"{"id":1,"method":"A.B","params":[]} trailing"#)?;
    assert_eq!(m.method, "A.B");
    Ok(())
}

#[test]
fn request_message_parse_invalid() {
    let inputs: [&[u8]; 7] = [
        br#"{"id":1,"method":"A.B","params":[40, 2]"#,
        b"",
        b"   ",
        b"[1, \"A.B\", []]",
        b"42",
        br#"{"id":1,"method":"A.B","params":{"a":1}}"#,
        br#"{"id":1,"method":7,"params":[]}"#,
    ];
    for input in inputs {
        let e = RequestMessage::parse(input).unwrap_err();
        assert!(
            matches!(e, DispatchError::InvalidRequest),
            "{}",
            String::from_utf8_lossy(input)
        );
    }
}

#[test]
fn request_message_service_method_split() -> anyhow::Result<()> {
    let m = RequestMessage::parse(br#"{"method":"Arith"}"#)?;
    assert_eq!(m.service_method(), None);
    let m = RequestMessage::parse(br#"{"method":"Arith.Add.More"}"#)?;
    assert_eq!(m.service_method(), Some(("Arith", "Add.More")));
    let m = RequestMessage::parse(br#"{"params":[]}"#)?;
    assert_eq!(m.service_method(), None);
    Ok(())
}

#[test]
fn response_message_success() -> anyhow::Result<()> {
    let id = RawValue::from_string("0".to_string())?;
    let m = ResponseMessage::from_result(Some(&*id), Ok(json!(42.0)));
    assert_eq!(serde_json::to_string(&m)?, r#"{"id":0,"result":42.0}"#);
    Ok(())
}

#[test]
fn response_message_unit_result() -> anyhow::Result<()> {
    let m = ResponseMessage::from_result(None, Ok(Value::Null));
    assert_eq!(serde_json::to_string(&m)?, r#"{"id":null,"result":null}"#);
    Ok(())
}

#[test]
fn response_message_error() -> anyhow::Result<()> {
    let id = RawValue::from_string(r#""req-7""#.to_string())?;
    let m = ResponseMessage::from_result(
        Some(&*id),
        Err(ParameterError::TypeMismatch(2).into()),
    );
    assert_eq!(
        serde_json::to_string(&m)?,
        r#"{"id":"req-7","error":"Type mismatch parameter 2."}"#
    );
    Ok(())
}

fn to_value(x: Option<&RawValue>) -> Result<Value, serde_json::Error> {
    match x {
        Some(v) => Value::deserialize(v),
        None => Ok(Value::Null),
    }
}
