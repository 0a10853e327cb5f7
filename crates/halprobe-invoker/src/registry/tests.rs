//! Unit tests for the driver registry.

use halprobe_types::InterfaceSpecification;
use rstest::{fixture, rstest};

use super::*;
use crate::invoker::MockFunctionInvoker;

fn nfc_key() -> DriverKey {
    DriverKey::new(
        ComponentClass::HalHidl,
        Some("loopback.nfc"),
        0,
        1.0,
        "INfc",
    )
}

fn mock_factory(_: &TargetComponent) -> Result<Box<dyn FunctionInvoker>, DriverError> {
    Ok(Box::new(MockFunctionInvoker::new()))
}

#[fixture]
fn registry() -> DriverRegistry {
    let mut registry = DriverRegistry::new();
    registry
        .register(nfc_key(), mock_factory)
        .expect("register mock driver");
    registry
}

#[test]
fn new_registry_is_empty() {
    let registry = DriverRegistry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
}

#[rstest]
fn duplicate_registration_is_rejected(mut registry: DriverRegistry) {
    let err = registry
        .register(nfc_key(), mock_factory)
        .expect_err("duplicate");
    assert!(matches!(err, DriverError::Duplicate { .. }));
    assert_eq!(registry.len(), 1);
}

#[rstest]
fn open_uses_registered_factory(registry: DriverRegistry) {
    assert!(registry.contains(&nfc_key()));
    registry
        .open(&nfc_key(), &TargetComponent::service("default"))
        .expect("open registered driver");
}

#[rstest]
fn version_is_part_of_identity(registry: DriverRegistry) {
    let other = DriverKey::new(ComponentClass::HalHidl, Some("loopback.nfc"), 0, 1.1, "INfc");
    let err = registry
        .open(&other, &TargetComponent::service("default"))
        .err()
        .expect("1.1 is not registered");
    assert!(matches!(err, DriverError::NotRegistered { ref key } if key == "loopback.nfc@1.1::INfc"));
}

#[test]
fn key_follows_interface_identity() {
    let spec = InterfaceSpecification {
        component_class: ComponentClass::HalHidl,
        component_type: 0,
        component_type_version: 1.0,
        package: Some("loopback.nfc".to_owned()),
        component_name: "INfc".to_owned(),
        functions: Vec::new(),
        attributes: Vec::new(),
    };
    assert_eq!(DriverKey::for_interface(&spec), nfc_key());
    assert_eq!(nfc_key().to_string(), "loopback.nfc@1.0::INfc");
}

#[rstest]
#[case(TargetComponent::service("default"), None)]
#[case(
    TargetComponent::library("/vendor/lib/hw/lights.so", "default"),
    Some("/vendor/lib/hw/lights.so")
)]
fn target_library_path(#[case] target: TargetComponent, #[case] expected: Option<&str>) {
    assert_eq!(target.library_path().map(Utf8Path::as_str), expected);
}
