use crate::net::NetworkClient;
use std::sync::Arc;
use tinydi::inject;

#[derive(Debug)]
pub struct Repository1 {
    net: Arc<NetworkClient>,
}

impl Repository1 {
    #[inject]
    pub fn new(net: Arc<NetworkClient>) -> Self {
        Self { net }
    }

    pub fn net(&self) -> &Arc<NetworkClient> {
        &self.net
    }
}

#[derive(Debug)]
pub struct Repository2 {
    net: Arc<NetworkClient>,
}

impl Repository2 {
    #[inject]
    pub fn new(net: Arc<crate::net::NetworkClient>) -> Repository2 {
        Self { net }
    }

    pub fn net(&self) -> &Arc<NetworkClient> {
        &self.net
    }
}

include!(concat!(env!("OUT_DIR"), "/repository/repository1_factory.rs"));
include!(concat!(env!("OUT_DIR"), "/repository/repository2_factory.rs"));
