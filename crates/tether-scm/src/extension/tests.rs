//! Unit tests for version resolution and operation routing.

use std::sync::Arc;

use mockall::predicate::function;
use rstest::{fixture, rstest};
use time::macros::datetime;

use super::*;
use crate::registry::{PluginDescriptor, PluginRegistry};
use crate::tests::{CAPABILITIES_RESPONSE, MockTransport, registry_with};
use crate::transport::test_support::ScriptedTransport;
use crate::transport::{TransportError, TransportRequest, TransportResponse};
use crate::wire::{Constraint, PayloadKind};

type Scripted = ScmExtension<ScriptedTransport, Arc<PluginRegistry>>;

fn configuration() -> PropertyConfiguration {
    PropertyConfiguration::from_values([("url", "https://example.com/repo.git")])
}

fn extension_for(versions: &[ProtocolVersion], transport: ScriptedTransport) -> Scripted {
    ScmExtension::new(transport, registry_with("git", versions))
}

#[fixture]
fn both_versions() -> Vec<ProtocolVersion> {
    vec![ProtocolVersion::V1, ProtocolVersion::V2]
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

#[rstest]
#[case::both(vec![ProtocolVersion::V1, ProtocolVersion::V2], ProtocolVersion::V2)]
#[case::v1_only(vec![ProtocolVersion::V1], ProtocolVersion::V1)]
#[case::v2_only(vec![ProtocolVersion::V2], ProtocolVersion::V2)]
#[case::future_and_v1(vec![ProtocolVersion::new(3, 0), ProtocolVersion::V1], ProtocolVersion::V1)]
fn resolves_highest_shared_version(
    #[case] declared: Vec<ProtocolVersion>,
    #[case] expected: ProtocolVersion,
) {
    let extension = extension_for(&declared, ScriptedTransport::new());
    assert_eq!(extension.resolve("git").expect("resolve"), expected);
}

#[test]
fn unknown_plugin_is_not_found() {
    let extension = extension_for(&[ProtocolVersion::V2], ScriptedTransport::new());
    let error = extension.get_view("svn").expect_err("unknown plugin");
    assert!(matches!(error, ProtocolError::PluginNotFound { ref plugin_id } if plugin_id == "svn"));
    assert!(extension.transport().requests().is_empty());
}

#[test]
fn disjoint_versions_fail_without_contacting_plugin() {
    let extension = extension_for(&[ProtocolVersion::new(3, 0)], ScriptedTransport::new());
    let error = extension.get_configuration("git").expect_err("no overlap");
    match error {
        ProtocolError::NoCompatibleVersion {
            plugin_versions,
            server_versions,
            ..
        } => {
            assert_eq!(plugin_versions.to_string(), "3.0");
            assert_eq!(server_versions.to_string(), "1.0, 2.0");
        }
        other => panic!("expected NoCompatibleVersion, got {other}"),
    }
    assert!(extension.transport().requests().is_empty());
}

#[rstest]
fn ceiling_caps_negotiation(both_versions: Vec<ProtocolVersion>) {
    let settings = ExtensionSettings::new("scm", Some(ProtocolVersion::V1));
    let extension =
        extension_for(&both_versions, ScriptedTransport::new()).with_settings(settings);
    assert_eq!(extension.resolve("git").expect("resolve"), ProtocolVersion::V1);
    assert_eq!(extension.server_versions(), [ProtocolVersion::V1]);
}

#[test]
fn ceiling_below_plugin_versions_reports_offered_set() {
    let settings = ExtensionSettings::new("scm", Some(ProtocolVersion::V1));
    let extension =
        extension_for(&[ProtocolVersion::V2], ScriptedTransport::new()).with_settings(settings);
    let error = extension.resolve("git").expect_err("no overlap");
    assert!(
        matches!(&error, ProtocolError::NoCompatibleVersion { server_versions, .. } if server_versions.to_string() == "1.0"),
        "unexpected error: {error}"
    );
}

#[test]
fn resolution_follows_re_registration() {
    let registry = registry_with("git", &[ProtocolVersion::V2]);
    let extension = ScmExtension::new(ScriptedTransport::new(), Arc::clone(&registry));
    assert_eq!(extension.resolve("git").expect("resolve"), ProtocolVersion::V2);

    registry
        .register(PluginDescriptor::new("git", vec![ProtocolVersion::V1]))
        .expect("re-register");
    assert_eq!(extension.resolve("git").expect("resolve"), ProtocolVersion::V1);
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[rstest]
#[case::v1(ProtocolVersion::V1)]
#[case::v2(ProtocolVersion::V2)]
fn requests_carry_negotiated_version_and_extension(#[case] version: ProtocolVersion) {
    let transport = ScriptedTransport::new().respond("check-scm-connection", r#"{"status":"success"}"#);
    let extension = extension_for(&[version], transport)
        .with_settings(ExtensionSettings::new("scm-test", None));

    let result = extension
        .check_connection("git", &configuration())
        .expect("check");
    assert!(result.is_successful());

    let requests = extension.transport().requests();
    let request = requests.first().expect("one request");
    assert_eq!(request.plugin_id(), "git");
    assert_eq!(request.extension(), "scm-test");
    assert_eq!(request.version(), version);
    assert_eq!(request.operation(), "check-scm-connection");
    assert_eq!(
        request.body(),
        Some(r#"{"scm-configuration":{"url":{"value":"https://example.com/repo.git"}}}"#)
    );
}

#[rstest]
fn configuration_and_view_send_no_body(both_versions: Vec<ProtocolVersion>) {
    let transport = ScriptedTransport::new()
        .respond("scm-configuration", r#"{"url":{}}"#)
        .respond("scm-view", r#"{"displayValue":"Git","template":"<div/>"}"#);
    let extension = extension_for(&both_versions, transport);

    assert_eq!(extension.get_configuration("git").expect("configuration").len(), 1);
    assert_eq!(extension.get_view("git").expect("view").template(), "<div/>");
    assert!(extension
        .transport()
        .requests()
        .iter()
        .all(|request| request.body().is_none()));
}

#[rstest]
fn validation_with_empty_body_succeeds(both_versions: Vec<ProtocolVersion>) {
    let transport = ScriptedTransport::new().respond_empty("validate-scm-configuration");
    let extension = extension_for(&both_versions, transport);
    let outcome = extension
        .validate_configuration("git", &configuration())
        .expect("validate");
    assert!(outcome.is_successful());
}

#[rstest]
fn polling_operations_route_by_name(both_versions: Vec<ProtocolVersion>) {
    let transport = ScriptedTransport::new()
        .respond(
            "latest-revision",
            r#"{"revision":{"revision":"r2","timestamp":"2011-07-14T19:43:37.100Z"}}"#,
        )
        .respond("latest-revisions-since", r#"{"revisions":[]}"#)
        .respond("checkout", r#"{"status":"failure","messages":["disk full"]}"#);
    let extension = extension_for(&both_versions, transport);
    let data = MaterialData::new();
    let checkpoint = Revision::new("r1", datetime!(2011-07-13 19:43:37.100 UTC));

    let latest = extension
        .get_latest_revision("git", &configuration(), &data, "/flyweight")
        .expect("latest");
    assert_eq!(latest.latest_revision().map(Revision::id), Some("r2"));

    let since = extension
        .get_revisions_since("git", &configuration(), &data, "/flyweight", &checkpoint)
        .expect("since");
    assert_eq!(since.revisions().map(<[_]>::len), Some(0));

    let checkout = extension
        .checkout("git", &configuration(), "/work", &checkpoint)
        .expect("checkout");
    assert_eq!(checkout.messages_for_display(), "disk full");

    let operations: Vec<&str> = extension
        .transport()
        .requests()
        .iter()
        .map(TransportRequest::operation)
        .collect();
    assert_eq!(operations, ["latest-revision", "latest-revisions-since", "checkout"]);
}

// ---------------------------------------------------------------------------
// Version-specific behaviour
// ---------------------------------------------------------------------------

#[test]
fn v1_capabilities_are_unsupported_without_a_call() {
    let extension = extension_for(&[ProtocolVersion::V1], ScriptedTransport::new());
    let discovery = extension.get_capabilities("git").expect("capabilities");
    assert_eq!(
        discovery,
        CapabilityDiscovery::Unsupported {
            version: ProtocolVersion::V1
        }
    );
    assert!(extension.transport().requests().is_empty());
}

#[test]
fn v2_capabilities_are_declared() {
    let transport = ScriptedTransport::new().respond("get-capabilities", CAPABILITIES_RESPONSE);
    let extension = extension_for(&[ProtocolVersion::V2], transport);
    let capabilities = extension
        .get_capabilities("git")
        .expect("capabilities")
        .into_capabilities();
    assert!(capabilities.supports_webhook("github", "push"));
}

#[test]
fn v2_empty_capabilities_body_declares_nothing() {
    let transport = ScriptedTransport::new().respond_empty("get-capabilities");
    let extension = extension_for(&[ProtocolVersion::V2], transport);
    let discovery = extension.get_capabilities("git").expect("capabilities");
    assert!(discovery.is_supported());
    assert!(discovery.into_capabilities().is_empty());
}

#[test]
fn v1_webhooks_are_unsupported_even_with_unresolved_secrets() {
    let extension = extension_for(&[ProtocolVersion::V1], ScriptedTransport::new());
    let event = WebhookEvent::new("github", "push", "{}");
    let secret = PropertyConfiguration::from_values([("token", "{{SECRET:[vault][token]}}")]);
    let error = extension
        .should_react_to_webhook("git", &event, &[secret])
        .expect_err("unsupported");
    assert!(matches!(
        error,
        ProtocolError::UnsupportedOperation {
            operation: ScmOperation::ShouldUpdate,
            version: ProtocolVersion::V1,
            ..
        }
    ));
    assert!(extension.transport().requests().is_empty());
}

#[test]
fn v2_webhooks_return_selected_configurations() {
    let transport = ScriptedTransport::new()
        .respond("should-update", r#"[{"url":{"value":"https://example.com/repo.git"}}]"#);
    let extension = extension_for(&[ProtocolVersion::V2], transport);
    let event = WebhookEvent::new("github", "push", "{}");
    let selected = extension
        .should_react_to_webhook("git", &event, &[configuration()])
        .expect("should update");
    assert_eq!(selected, [configuration()]);
}

#[test]
fn operation_tables_differ_only_in_webhook_operations() {
    for operation in ScmOperation::ALL {
        let v1 = VersionedExtension::V1.operation_name(operation);
        let v2 = VersionedExtension::V2.operation_name(operation);
        assert_eq!(v2, Some(operation.name()));
        match operation {
            ScmOperation::GetCapabilities | ScmOperation::ShouldUpdate => assert_eq!(v1, None),
            _ => assert_eq!(v1, v2),
        }
    }
}

#[rstest]
#[case::v1(ProtocolVersion::V1, 7)]
#[case::v2(ProtocolVersion::V2, 9)]
fn operation_tables_name_operations_through_the_enum(
    #[case] version: ProtocolVersion,
    #[case] expected_len: usize,
) {
    let table = operation_table(version).expect("known version");
    assert_eq!(table.len(), expected_len);
    let implementation = VersionedExtension::for_version(version).expect("implementation");
    for operation in table {
        assert_eq!(implementation.operation_name(*operation), Some(operation.name()));
    }
    assert_eq!(operation_table(ProtocolVersion::new(3, 0)), None);
}

#[rstest]
#[case::v1(ProtocolVersion::V1, Some(VersionedExtension::V1))]
#[case::v2(ProtocolVersion::V2, Some(VersionedExtension::V2))]
#[case::unknown(ProtocolVersion::new(1, 5), None)]
fn selects_implementation_for_version(
    #[case] version: ProtocolVersion,
    #[case] expected: Option<VersionedExtension>,
) {
    assert_eq!(VersionedExtension::for_version(version), expected);
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn transport_errors_are_returned_unchanged() {
    let mut transport = MockTransport::new();
    transport
        .expect_submit()
        .with(function(|request: &TransportRequest| {
            request.operation() == "checkout"
        }))
        .once()
        .returning(|request| {
            Err(TransportError::Status {
                plugin_id: request.plugin_id().to_owned(),
                operation: request.operation().to_owned(),
                status: 500,
            })
        });
    let extension = ScmExtension::new(transport, registry_with("git", &[ProtocolVersion::V2]));
    let revision = Revision::new("r1", datetime!(2011-07-13 19:43:37.100 UTC));

    let error = extension
        .checkout("git", &configuration(), "/work", &revision)
        .expect_err("transport failure");
    assert!(matches!(
        error,
        ProtocolError::Transport(TransportError::Status { status: 500, .. })
    ));
}

#[test]
fn malformed_responses_name_plugin_and_rule() {
    let mut transport = MockTransport::new();
    transport
        .expect_submit()
        .once()
        .returning(|_| Ok(TransportResponse::with_body(r#"{"url":{"secure":"yes"}}"#)));
    let extension = ScmExtension::new(transport, registry_with("git", &[ProtocolVersion::V2]));

    match extension.get_configuration("git").expect_err("malformed") {
        ProtocolError::MalformedPluginResponse { plugin_id, source } => {
            assert_eq!(plugin_id, "git");
            assert_eq!(source.payload(), PayloadKind::ScmConfiguration);
            assert_eq!(source.field(), Some("secure"));
        }
        other => panic!("expected MalformedPluginResponse, got {other}"),
    }
}

#[test]
fn empty_check_connection_body_is_malformed() {
    let transport = ScriptedTransport::new().respond_empty("check-scm-connection");
    let extension = extension_for(&[ProtocolVersion::V2], transport);
    let error = extension
        .check_connection("git", &configuration())
        .expect_err("empty body");
    assert!(matches!(
        &error,
        ProtocolError::MalformedPluginResponse { source, .. }
            if source.constraint() == &Constraint::EmptyBody
    ));
}

#[test]
fn unresolved_secrets_are_never_sent() {
    let mut transport = MockTransport::new();
    transport.expect_submit().never();
    let extension = ScmExtension::new(transport, registry_with("git", &[ProtocolVersion::V2]));
    let secret = PropertyConfiguration::from_values([("password", "{{SECRET:[vault][pw]}}")]);

    let error = extension
        .validate_configuration("git", &secret)
        .expect_err("unresolved secret");
    assert!(matches!(error, ProtocolError::EncodeRequest { .. }));
}
