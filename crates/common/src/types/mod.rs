use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Serialize, Debug)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
}
