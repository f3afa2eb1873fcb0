//! Generated gRPC bindings for inter-service calls.

pub mod dispatch {
    tonic::include_proto!("relay.dispatch");
}
