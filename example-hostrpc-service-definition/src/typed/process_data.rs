use hostrpc::rpc::{RpcValue, RpcValueError};
use hostrpc_service::{RpcMethodDefinition, expect_arity};

/// `DataService.processData(values) -> sum`
pub struct ProcessData;

impl RpcMethodDefinition for ProcessData {
    const HOST_NAME: &'static str = "DataService";
    const METHOD_NAME: &'static str = "processData";

    type Input = Vec<f64>;
    type Output = f64;

    fn encode_args(values: Self::Input) -> Result<Vec<RpcValue>, RpcValueError> {
        Ok(vec![RpcValue::from(values)])
    }

    fn decode_args(args: Vec<RpcValue>) -> Result<Self::Input, RpcValueError> {
        expect_arity(&args, 1)?;
        args.into_iter()
            .next()
            .ok_or(RpcValueError::MissingArgument { position: 0 })?
            .decode()
    }

    fn encode_return(sum: Self::Output) -> Result<RpcValue, RpcValueError> {
        Ok(RpcValue::Float(sum))
    }

    fn decode_return(value: RpcValue) -> Result<Self::Output, RpcValueError> {
        value.decode()
    }
}
