//! Crate-level integration and BDD tests.

use std::sync::Arc;

use mockall::mock;

use crate::capability::{Capabilities, WebhookSupport};
use crate::extension::ScmExtension;
use crate::model::{Material, PropertyConfiguration};
use crate::plugin_info::PluginInfoBuilder;
use crate::poller::RevisionPoller;
use crate::registry::{PluginDescriptor, PluginRegistry};
use crate::transport::test_support::ScriptedTransport;
use crate::transport::{PluginTransport, TransportError, TransportRequest, TransportResponse};
use crate::version::ProtocolVersion;
use crate::wire::WebhookEvent;

mod behaviour;

mock! {
    pub Transport {}
    impl PluginTransport for Transport {
        fn submit(&self, request: &TransportRequest) -> Result<TransportResponse, TransportError>;
    }
}

/// Builds a shared registry holding one plugin.
pub(crate) fn registry_with(plugin_id: &str, versions: &[ProtocolVersion]) -> Arc<PluginRegistry> {
    let registry = Arc::new(PluginRegistry::new());
    registry
        .register(PluginDescriptor::new(plugin_id, versions.to_vec()))
        .expect("register plugin");
    registry
}

pub(crate) const CONFIGURATION_RESPONSE: &str =
    r#"{"url":{"part-of-identity":true,"required":true,"display-name":"URL","display-order":0},"branch":{"default-value":"main","display-order":1}}"#;
pub(crate) const VIEW_RESPONSE: &str = r#"{"displayValue":"Git","template":"<div>git</div>"}"#;
pub(crate) const CAPABILITIES_RESPONSE: &str =
    r#"{"supported_webhooks":[{"provider":"github","events":["pull","push"]}]}"#;

pub(crate) fn material(id: &str, url: &str) -> Material {
    Material::new(id, PropertyConfiguration::from_values([("url", url)]))
}

#[test]
fn loading_a_plugin_then_handling_a_webhook() {
    let registry = registry_with("git", &[ProtocolVersion::V1, ProtocolVersion::V2]);
    let transport = ScriptedTransport::new()
        .respond("scm-configuration", CONFIGURATION_RESPONSE)
        .respond("scm-view", VIEW_RESPONSE)
        .respond("get-capabilities", CAPABILITIES_RESPONSE)
        .respond("should-update", r#"[{"url":{"value":"https://example.com/b.git"}}]"#);
    let extension = ScmExtension::new(transport, Arc::clone(&registry));

    PluginInfoBuilder::new(&extension)
        .publish("git", &registry)
        .expect("publish info");
    let record = registry.get("git").expect("record");
    let info = record.info().expect("info");
    assert_eq!(info.display_name(), "Git");
    assert_eq!(
        info.capabilities(),
        &Capabilities::new(vec![WebhookSupport::new("github", ["pull", "push"])])
    );

    let materials = [
        material("a", "https://example.com/a.git"),
        material("b", "https://example.com/b.git"),
    ];
    let poller = RevisionPoller::new(&extension, &registry);
    let event = WebhookEvent::new("github", "push", "{}");
    let selected = poller
        .materials_to_update("git", &event, &materials)
        .expect("select materials");
    let ids: Vec<&str> = selected.iter().map(Material::id).collect();
    assert_eq!(ids, ["b"]);

    let requests = extension.transport().requests();
    assert!(requests.iter().all(|request| request.version() == ProtocolVersion::V2));
    assert!(requests.iter().all(|request| request.extension() == "scm"));
}
