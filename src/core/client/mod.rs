pub mod stream_forwarder;
pub mod upstream_client;
