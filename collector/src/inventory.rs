//! Configuration inventory reported for each agent.

use crate::{
    client::AgentSelf,
    metrics::Inventory,
};
use serde_json::{
    Map,
    Value,
};
use tracing::debug;

const CONFIG_PREFIXES: [&str; 2] = ["Config", "DebugConfig"];
const ROLE_KEY: &str = "Member/Tags/role";

/// A single entry of an agent's configuration object.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Text(String),
    List(Vec<Value>),
    Object(Map<String, Value>),
    Scalar(Value),
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => ConfigValue::Text(text),
            Value::Array(items) => ConfigValue::List(items),
            Value::Object(map) => ConfigValue::Object(map),
            other => ConfigValue::Scalar(other),
        }
    }
}

impl ConfigValue {
    /// Value to record, if this entry is recorded at all.
    pub fn inventory_value(&self, key: &str) -> Option<Value> {
        match self {
            ConfigValue::Text(text) if text.is_empty() => None,
            ConfigValue::Text(text) => Some(Value::String(text.clone())),
            ConfigValue::List(items) if items.is_empty() => None,
            ConfigValue::List(items) => {
                let strings: Option<Vec<&str>> = items.iter().map(Value::as_str).collect();
                match strings {
                    Some(strings) => Some(Value::String(strings.join(","))),
                    None => {
                        debug!("Skipping inventory item '{key}': list contains non-string values");
                        None
                    }
                }
            }
            ConfigValue::Object(_) => None,
            ConfigValue::Scalar(value) => Some(value.clone()),
        }
    }
}

fn set_item(inventory: &mut Inventory, key: String, value: Value) {
    inventory.entry(key).or_default().insert("value".to_string(), value);
}

/// Records every top-level entry of `config` under `<prefix>/<key>`.
pub fn process_config(inventory: &mut Inventory, prefix: &str, config: &Map<String, Value>) {
    for (key, value) in config {
        let item_key = format!("{prefix}/{key}");
        if let Some(value) = ConfigValue::from(value.clone()).inventory_value(&item_key) {
            set_item(inventory, item_key, value);
        }
    }
}

/// Inventory of one agent from its `/v1/agent/self` answer.
pub fn collect_inventory(agent_self: &AgentSelf) -> Inventory {
    let mut inventory = Inventory::new();

    for prefix in CONFIG_PREFIXES {
        match agent_self.get(prefix) {
            Some(Value::Object(config)) => process_config(&mut inventory, prefix, config),
            Some(_) => debug!("'{prefix}' is not an object"),
            None => debug!("Agent did not report '{prefix}'"),
        }
    }

    let role = agent_self
        .get("Member")
        .and_then(|member| member.get("Tags"))
        .and_then(|tags| tags.get("role"))
        .and_then(Value::as_str);
    match role {
        Some(role) => set_item(&mut inventory, ROLE_KEY.to_string(), Value::String(role.to_string())),
        None => debug!("Agent did not report a member role"),
    }

    inventory
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn item(inventory: &Inventory, key: &str) -> Option<Value> {
        inventory.get(key).and_then(|fields| fields.get("value")).cloned()
    }

    #[test]
    fn variants_follow_their_policy() {
        let mut inventory = Inventory::new();
        let config = object(json!({
            "Datacenter": "dc1",
            "NodeName": "",
            "Server": true,
            "Bootstrap": 3,
            "RetryJoin": ["consul-0", "consul-1"],
            "Mixed": ["a", 1],
            "Empty": [],
            "Telemetry": { "Disable": false },
            "Unset": null
        }));

        process_config(&mut inventory, "Config", &config);

        assert_eq!(item(&inventory, "Config/Datacenter"), Some(json!("dc1")));
        assert_eq!(item(&inventory, "Config/Server"), Some(json!(true)));
        assert_eq!(item(&inventory, "Config/Bootstrap"), Some(json!(3)));
        assert_eq!(item(&inventory, "Config/RetryJoin"), Some(json!("consul-0,consul-1")));
        assert_eq!(item(&inventory, "Config/Unset"), Some(Value::Null));
        for skipped in ["Config/NodeName", "Config/Mixed", "Config/Empty", "Config/Telemetry"] {
            assert!(!inventory.contains_key(skipped), "{skipped} should be skipped");
        }
    }

    #[test]
    fn collects_both_config_objects_and_the_role() {
        let info = object(json!({
            "Config": { "Datacenter": "dc1" },
            "DebugConfig": { "Bootstrap": false, "DataDir": "/consul/data" },
            "Member": { "Name": "consul-0", "Tags": { "role": "consul" } }
        }));

        let inventory = collect_inventory(&info);

        assert_eq!(
            inventory.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["Config/Datacenter", "DebugConfig/Bootstrap", "DebugConfig/DataDir", "Member/Tags/role"]
        );
        assert_eq!(item(&inventory, "Member/Tags/role"), Some(json!("consul")));
    }

    #[test]
    fn missing_sections_give_an_empty_inventory() {
        assert!(collect_inventory(&AgentSelf::new()).is_empty());
    }
}
