use crate::typed::{ProcessData, Summarize, Summary, SummaryRequest};
use futures::FutureExt;
use futures::future;
use hostrpc::rpc::RpcValue;
use hostrpc_service::RpcMethodDefinition;
use hostrpc_service_endpoint::{RpcHost, RpcHostError, RpcHostFuture, RpcHostResult};

/// The service exposed over RPC: sums and summarizes lists of numbers.
#[derive(Debug, Default, Clone)]
pub struct DataService;

impl DataService {
    pub fn process_data(&self, values: &[f64]) -> f64 {
        values.iter().sum()
    }

    pub fn summarize(&self, request: SummaryRequest) -> Summary {
        let count = request.values.len() as u64;
        let total = self.process_data(&request.values);
        let mean = (count > 0).then(|| total / count as f64);

        Summary {
            label: request.label,
            count,
            total,
            mean,
        }
    }

    fn call_process_data(&self, args: Vec<RpcValue>) -> RpcHostResult {
        let values = ProcessData::decode_args(args)?;
        Ok(ProcessData::encode_return(self.process_data(&values))?)
    }

    fn call_summarize(&self, args: Vec<RpcValue>) -> RpcHostResult {
        let request = Summarize::decode_args(args)?;
        if request.label.is_empty() {
            return Err(RpcHostError::failure("summary label must not be empty"));
        }
        Ok(Summarize::encode_return(self.summarize(request))?)
    }
}

impl RpcHost for DataService {
    fn invoke(&self, method_name: &str, args: Vec<RpcValue>) -> Option<RpcHostFuture> {
        let result = if method_name == ProcessData::METHOD_NAME {
            self.call_process_data(args)
        } else if method_name == Summarize::METHOD_NAME {
            self.call_summarize(args)
        } else {
            return None;
        };

        Some(future::ready(result).boxed())
    }

    fn method_names(&self) -> Vec<String> {
        vec![
            ProcessData::METHOD_NAME.to_string(),
            Summarize::METHOD_NAME.to_string(),
        ]
    }
}
