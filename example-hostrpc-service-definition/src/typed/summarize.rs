use bitcode::{Decode, Encode};
use hostrpc::rpc::{RpcValue, RpcValueError};
use hostrpc_service::{RpcMethodDefinition, expect_arity};

#[derive(Encode, Decode, PartialEq, Debug, Clone)]
pub struct SummaryRequest {
    pub label: String,
    pub values: Vec<f64>,
}

#[derive(Encode, Decode, PartialEq, Debug, Clone)]
pub struct Summary {
    pub label: String,
    pub count: u64,
    pub total: f64,
    pub mean: Option<f64>,
}

/// `DataService.summarize(bytes) -> bytes`
///
/// Both payloads are `bitcode`-encoded structs carried as `RpcValue::Bytes`.
pub struct Summarize;

fn expect_bytes(value: RpcValue) -> Result<Vec<u8>, RpcValueError> {
    match value {
        RpcValue::Bytes(bytes) => Ok(bytes),
        other => Err(RpcValueError::TypeMismatch {
            expected: "bytes",
            found: other.type_name(),
        }),
    }
}

impl RpcMethodDefinition for Summarize {
    const HOST_NAME: &'static str = "DataService";
    const METHOD_NAME: &'static str = "summarize";

    type Input = SummaryRequest;
    type Output = Summary;

    fn encode_args(request: Self::Input) -> Result<Vec<RpcValue>, RpcValueError> {
        Ok(vec![RpcValue::Bytes(bitcode::encode(&request))])
    }

    fn decode_args(args: Vec<RpcValue>) -> Result<Self::Input, RpcValueError> {
        expect_arity(&args, 1)?;
        let bytes = args
            .into_iter()
            .next()
            .map(expect_bytes)
            .ok_or(RpcValueError::MissingArgument { position: 0 })??;

        bitcode::decode::<SummaryRequest>(&bytes)
            .map_err(|e| RpcValueError::Custom(format!("invalid summary request: {e}")))
    }

    fn encode_return(summary: Self::Output) -> Result<RpcValue, RpcValueError> {
        Ok(RpcValue::Bytes(bitcode::encode(&summary)))
    }

    fn decode_return(value: RpcValue) -> Result<Self::Output, RpcValueError> {
        let bytes = expect_bytes(value)?;

        bitcode::decode::<Summary>(&bytes)
            .map_err(|e| RpcValueError::Custom(format!("invalid summary: {e}")))
    }
}
