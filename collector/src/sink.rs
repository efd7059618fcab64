//! Hands a finished collection cycle to its consumer.

use crate::metrics::{
    CollectedData,
    EntityData,
};
use eyre::{
    Context as _,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::io::Write;

pub const INTEGRATION_NAME: &str = "com.consul-fleet-metrics";
pub const PROTOCOL_VERSION: &str = "3";

/// Everything one run reports, in the order entities were collected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntegrationPayload {
    pub name: String,
    pub protocol_version: String,
    pub integration_version: String,
    pub data: Vec<EntityData>,
}

impl IntegrationPayload {
    pub fn new(data: Vec<EntityData>) -> Self {
        Self {
            name: INTEGRATION_NAME.to_string(),
            protocol_version: PROTOCOL_VERSION.to_string(),
            integration_version: env!("CARGO_PKG_VERSION").to_string(),
            data,
        }
    }
}

impl From<CollectedData> for IntegrationPayload {
    fn from(collected: CollectedData) -> Self {
        Self::new(collected.entities)
    }
}

pub trait PublishingSink {
    fn publish(&mut self, payload: &IntegrationPayload) -> Result<()>;
}

/// Writes each payload as one JSON document.
#[derive(Debug)]
pub struct JsonSink<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonSink<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> PublishingSink for JsonSink<W> {
    fn publish(&mut self, payload: &IntegrationPayload) -> Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, payload)
        } else {
            serde_json::to_writer(&mut self.writer, payload)
        }
        .wrap_err("Failed to serialize payload")?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}
