//! Behaviour-driven tests for protocol version negotiation.

use std::sync::Arc;

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::capability::CapabilityDiscovery;
use crate::error::ProtocolError;
use crate::extension::ScmExtension;
use crate::model::PropertyConfiguration;
use crate::registry::{PluginDescriptor, PluginRegistry};
use crate::settings::ExtensionSettings;
use crate::transport::TransportRequest;
use crate::transport::test_support::ScriptedTransport;
use crate::version::ProtocolVersion;
use crate::wire::WebhookEvent;

use super::{CAPABILITIES_RESPONSE, VIEW_RESPONSE};

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

#[derive(Default)]
struct NegotiationWorld {
    registry: Arc<PluginRegistry>,
    ceiling: Option<ProtocolVersion>,
    outcome: Option<Result<(), ProtocolError>>,
    discovery: Option<CapabilityDiscovery>,
    requests: Vec<TransportRequest>,
}

#[fixture]
fn world() -> NegotiationWorld {
    NegotiationWorld::default()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unquote(value: &str) -> &str {
    value.trim_matches('"')
}

fn parse_versions(list: &str) -> Vec<ProtocolVersion> {
    unquote(list)
        .split(',')
        .map(|version| version.parse().expect("version"))
        .collect()
}

fn extension(world: &NegotiationWorld) -> ScmExtension<ScriptedTransport, Arc<PluginRegistry>> {
    let transport = ScriptedTransport::new()
        .respond("scm-view", VIEW_RESPONSE)
        .respond("get-capabilities", CAPABILITIES_RESPONSE)
        .respond("should-update", "[]");
    ScmExtension::new(transport, Arc::clone(&world.registry))
        .with_settings(ExtensionSettings::new("scm", world.ceiling))
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a plugin {plugin} declaring versions {versions}")]
fn given_plugin(world: &mut NegotiationWorld, plugin: String, versions: String) {
    world
        .registry
        .register(PluginDescriptor::new(unquote(&plugin), parse_versions(&versions)))
        .expect("register plugin");
}

#[given("the server ceiling is {version}")]
fn given_ceiling(world: &mut NegotiationWorld, version: String) {
    world.ceiling = Some(unquote(&version).parse().expect("version"));
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("the view of {plugin} is requested")]
fn when_view_requested(world: &mut NegotiationWorld, plugin: String) {
    let extension = extension(world);
    world.outcome = Some(extension.get_view(unquote(&plugin)).map(|_| ()));
    world.requests = extension.transport().requests();
}

#[when("the capabilities of {plugin} are requested")]
fn when_capabilities_requested(world: &mut NegotiationWorld, plugin: String) {
    let extension = extension(world);
    let result = extension.get_capabilities(unquote(&plugin));
    world.requests = extension.transport().requests();
    match result {
        Ok(discovery) => {
            world.discovery = Some(discovery);
            world.outcome = Some(Ok(()));
        }
        Err(error) => world.outcome = Some(Err(error)),
    }
}

#[when("{plugin} is asked about a {provider} {event} webhook")]
fn when_webhook_asked(world: &mut NegotiationWorld, plugin: String, provider: String, event: String) {
    let extension = extension(world);
    let webhook = WebhookEvent::new(unquote(&provider), unquote(&event), "{}");
    let configurations = [PropertyConfiguration::from_values([("url", "https://example.com/a.git")])];
    world.outcome = Some(
        extension
            .should_react_to_webhook(unquote(&plugin), &webhook, &configurations)
            .map(|_| ()),
    );
    world.requests = extension.transport().requests();
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the request was sent with version {version}")]
fn then_sent_with_version(world: &mut NegotiationWorld, version: String) {
    let expected: ProtocolVersion = unquote(&version).parse().expect("version");
    assert!(
        matches!(world.outcome, Some(Ok(()))),
        "call did not succeed: {:?}",
        world.outcome
    );
    let request = world.requests.first().expect("a request was sent");
    assert_eq!(request.version(), expected);
}

#[then("the call fails with {kind}")]
fn then_call_fails(world: &mut NegotiationWorld, kind: String) {
    let error = world
        .outcome
        .as_ref()
        .expect("no outcome captured")
        .as_ref()
        .expect_err("expected error but got success");
    match unquote(&kind) {
        "no_compatible_version" => assert!(
            matches!(error, ProtocolError::NoCompatibleVersion { .. }),
            "expected NoCompatibleVersion, got: {error}"
        ),
        "plugin_not_found" => assert!(
            matches!(error, ProtocolError::PluginNotFound { .. }),
            "expected PluginNotFound, got: {error}"
        ),
        "unsupported_operation" => assert!(
            matches!(error, ProtocolError::UnsupportedOperation { .. }),
            "expected UnsupportedOperation, got: {error}"
        ),
        other => panic!(
            "unsupported error kind: '{other}' (supported: no_compatible_version, plugin_not_found, unsupported_operation)"
        ),
    }
}

#[then("no request was sent")]
fn then_no_request(world: &mut NegotiationWorld) {
    assert!(
        world.requests.is_empty(),
        "unexpected requests: {:?}",
        world.requests
    );
}

#[then("the capabilities are unsupported")]
fn then_capabilities_unsupported(world: &mut NegotiationWorld) {
    let discovery = world.discovery.as_ref().expect("no discovery captured");
    assert!(!discovery.is_supported(), "unexpected discovery: {discovery:?}");
}

// ---------------------------------------------------------------------------
// Scenario registration
// ---------------------------------------------------------------------------

#[scenario(path = "tests/features/version_negotiation.feature")]
fn version_negotiation_behaviour(world: NegotiationWorld) {
    let _ = world;
}
