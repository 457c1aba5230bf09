use example_hostrpc_service_definition::DataService;
use example_hostrpc_service_definition::typed::{ProcessData, Summarize, SummaryRequest};
use example_hostrpc_worker_app::ChannelTransport;
use hostrpc::rpc::RpcValue;
use hostrpc_service_caller::typed::RpcCallTyped;
use hostrpc_service_node::{RpcServiceNode, RpcServiceNodeConfig};
use std::time::Duration;
use tokio::join;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let (main_end, worker_end) = ChannelTransport::pair();

    // The main context hosts the service.
    let main_node = RpcServiceNode::new(RpcServiceNodeConfig::new().with_host_transport(main_end))
        .expect("failed to create main node");
    main_node
        .register_host("DataService", DataService)
        .expect("failed to register DataService");

    // The worker only calls into it.
    let worker_node =
        RpcServiceNode::new(RpcServiceNodeConfig::new().with_caller_transport(worker_end))
            .expect("failed to create worker node");

    let data_service = worker_node.create_proxy("DataService");

    // `join!` will await all responses before proceeding
    let (res1, res2, res3) = join!(
        ProcessData::call(&worker_node, vec![1.0, 4.0, 9.0]),
        Summarize::call(
            &worker_node,
            SummaryRequest {
                label: "squares".into(),
                values: vec![1.0, 4.0, 9.0],
            }
        ),
        data_service.invoke("processData", vec![RpcValue::from(vec![2.5, 2.5])]),
    );

    println!("Result from processData(): {:?}", res1);
    println!("Result from summarize(): {:?}", res2);
    println!("Result from proxied processData(): {:?}", res3);

    let missing = data_service
        .call("reticulateSplines", vec![])
        .map(|call| call.with_timeout(Duration::from_secs(1)));
    match missing {
        Ok(call) => println!("Result from reticulateSplines(): {:?}", call.await),
        Err(err) => tracing::error!(error = %err, "failed to issue request"),
    }

    tracing::info!(
        aborted = worker_node.abort_pending_requests(),
        "worker finished"
    );
}
