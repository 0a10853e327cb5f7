//! Tests for specification lookup and the production builder.

use std::fs;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use halprobe_invoker::loopback::{self, NfcStatus};
use halprobe_invoker::marshal::{pack_enum, pack_scalar, pack_vector};
use halprobe_invoker::{CallbackChannel, DriverError, InvokeError};
use halprobe_types::{
    ComponentClass, FunctionSpecDescription, InterfaceSpecification, LoadRequest, VariableValue,
};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use crate::bootstrap::default_registry;
use crate::tests::support::{loopback_request, write_loopback_spec};

use super::*;

struct SpecFixture {
    _dir: TempDir,
    spec_dir: Utf8PathBuf,
    loopback_spec: Utf8PathBuf,
}

impl SpecFixture {
    fn builder(&self) -> ComponentSpecificationBuilder {
        let settings = BuilderSettings {
            spec_dir: self.spec_dir.clone(),
            service_name: "default".to_owned(),
            callbacks: CallbackChannel::disconnected(),
        };
        let registry = default_registry().expect("built-in drivers register");
        ComponentSpecificationBuilder::new(settings, Arc::new(registry))
    }

    fn write_flat_spec(&self, name: &str, spec: &InterfaceSpecification) {
        let text = serde_json::to_string(spec).expect("encode specification");
        fs::write(self.spec_dir.join(name), text).expect("write specification");
    }
}

#[fixture]
fn specs() -> SpecFixture {
    let dir = tempfile::tempdir().expect("temp dir");
    let spec_dir = Utf8PathBuf::from_path_buf(dir.path().join("specs")).expect("utf8 temp path");
    let loopback_spec = write_loopback_spec(&spec_dir);
    SpecFixture {
        _dir: dir,
        spec_dir,
        loopback_spec,
    }
}

fn lights_spec() -> InterfaceSpecification {
    InterfaceSpecification {
        component_class: ComponentClass::HalConventional,
        component_type: 7,
        component_type_version: 1.0,
        package: None,
        component_name: "lights".to_owned(),
        functions: Vec::new(),
        attributes: Vec::new(),
    }
}

fn lights_request(path: &Utf8Path) -> LoadRequest {
    LoadRequest {
        path: path.to_string(),
        class: ComponentClass::HalConventional.id(),
        component_type: 7,
        version: 1.0,
        module_name: String::new(),
    }
}

fn same_path_request() -> LoadRequest {
    LoadRequest {
        path: "/vendor/lib/hw/nfc.so".to_owned(),
        ..loopback_request()
    }
}

fn with_module(module: &str) -> LoadRequest {
    LoadRequest {
        module_name: module.to_owned(),
        ..loopback_request()
    }
}

fn open_call(expected: NfcStatus) -> FunctionSpecDescription {
    FunctionSpecDescription::call(
        "open",
        vec![VariableValue::Callback {
            name: "client".to_owned(),
        }],
    )
    .expecting(vec![pack_enum(expected)])
}

#[rstest]
#[case("loopback.nfc")]
#[case("loopback.nfc::INfc")]
#[case("loopback.nfc@1.0::INfc")]
#[case(" loopback.nfc :: INfc ")]
fn service_module_names_accept_optional_version_and_interface(
    specs: SpecFixture,
    #[case] module: &str,
) {
    let mut builder = specs.builder();
    builder
        .load_component(&with_module(module))
        .unwrap_or_else(|error| panic!("load {module}: {error}"));
    assert!(builder.interface_specification().is_some());
}

#[rstest]
#[case("")]
#[case("::INfc")]
#[case("@1.0::INfc")]
fn service_module_names_require_a_package(#[case] module: &str) {
    let error = ComponentQuery::from_request(&with_module(module)).expect_err("missing package");
    assert!(matches!(error, LoadError::MissingPackage { .. }));
}

#[rstest]
fn packaged_specifications_live_under_versioned_directories(specs: SpecFixture) {
    let query = ComponentQuery::from_request(&loopback_request()).expect("query");
    let spec = find_component_specification(&specs.spec_dir, &query).expect("find specification");
    assert_eq!(spec, loopback::interface());
}

#[rstest]
fn malformed_specification_files_are_skipped(specs: SpecFixture) {
    let dir = specs.loopback_spec.parent().expect("spec parent");
    fs::write(dir.join("AAA.spec.json"), "{ not json").expect("write malformed file");
    fs::write(dir.join("notes.txt"), "ignored").expect("write unrelated file");

    let query = ComponentQuery::from_request(&loopback_request()).expect("query");
    let spec = find_component_specification(&specs.spec_dir, &query).expect("find specification");
    assert_eq!(spec.component_name, loopback::INTERFACE);
}

#[rstest]
fn interface_names_must_match(specs: SpecFixture) {
    let query = ComponentQuery::from_request(&with_module("loopback.nfc::INfcTag")).expect("query");
    let error = find_component_specification(&specs.spec_dir, &query).expect_err("no match");
    assert!(matches!(error, LoadError::SpecNotFound { .. }));
}

#[rstest]
fn loading_the_loopback_controller_exposes_its_interface(specs: SpecFixture) {
    let mut builder = specs.builder();
    assert!(builder.interface_specification().is_none());

    builder
        .load_component(&loopback_request())
        .expect("load loopback");

    let spec = builder.interface_specification().expect("loaded spec");
    assert_eq!(spec.package.as_deref(), Some(loopback::PACKAGE));
    assert!(spec.function("write").is_some());
}

#[rstest]
fn unknown_versions_have_no_specification_directory(specs: SpecFixture) {
    let mut builder = specs.builder();
    let request = LoadRequest {
        version: 2.0,
        ..loopback_request()
    };

    let error = builder.load_component(&request).expect_err("version 2.0 is absent");
    assert!(matches!(error, LoadError::SpecDirectory { .. }));
}

#[rstest]
fn unknown_component_classes_are_rejected(specs: SpecFixture) {
    let mut builder = specs.builder();
    let request = LoadRequest {
        class: 99,
        ..loopback_request()
    };

    let error = builder.load_component(&request).expect_err("class 99 is unknown");
    assert!(matches!(error, LoadError::UnknownClass(_)));
}

#[rstest]
#[case(ComponentClass::HalConventional)]
#[case(ComponentClass::HalHidlWrappedConventional)]
fn library_components_must_exist(specs: SpecFixture, #[case] class: ComponentClass) {
    let spec = InterfaceSpecification {
        component_class: class,
        ..lights_spec()
    };
    specs.write_flat_spec("lights.spec.json", &spec);
    let mut builder = specs.builder();

    let missing = specs.spec_dir.join("missing").join("lights.so");
    let request = LoadRequest {
        class: class.id(),
        ..lights_request(&missing)
    };
    let error = builder
        .load_component(&request)
        .expect_err("library is absent");
    assert!(matches!(error, LoadError::MissingTarget { .. }));
}

#[rstest]
fn library_components_need_a_registered_driver(specs: SpecFixture) {
    specs.write_flat_spec("lights.spec.json", &lights_spec());
    let library = specs.spec_dir.join("lights.so");
    fs::write(&library, b"\x7fELF").expect("write library stand-in");
    let mut builder = specs.builder();

    let error = builder
        .load_component(&lights_request(&library))
        .expect_err("no lights driver");
    assert!(matches!(
        error,
        LoadError::Driver(DriverError::NotRegistered { .. })
    ));
}

#[rstest]
fn failed_loads_keep_the_previous_component(specs: SpecFixture) {
    let mut builder = specs.builder();
    builder
        .load_component(&loopback_request())
        .expect("load loopback");

    builder
        .load_component(&with_module("missing.vendor::IFoo"))
        .expect_err("unknown package");

    let spec = builder.interface_specification().expect("still loaded");
    assert_eq!(spec.component_name, loopback::INTERFACE);
}

#[rstest]
fn reloading_the_same_path_keeps_the_component(specs: SpecFixture) {
    let mut builder = specs.builder();
    let request = LoadRequest {
        path: "/vendor/lib/hw/nfc.so".to_owned(),
        ..loopback_request()
    };
    builder.load_component(&request).expect("first load");
    builder
        .invoke_function(&open_call(NfcStatus::Ok))
        .expect("open");

    builder.load_component(&request).expect("reload is a no-op");

    // A reopened driver would start closed and accept nothing.
    let write = FunctionSpecDescription::call("write", vec![pack_vector(&[9_u8])]);
    let result = builder.invoke_function(&write).expect("write");
    assert_eq!(result.results, vec![pack_scalar(1_u32)]);
}

#[rstest]
#[case::unknown_class(LoadRequest { class: 999, ..same_path_request() })]
#[case::unknown_package(LoadRequest {
    module_name: "no.such.pkg@9.9::IBogus".to_owned(),
    ..same_path_request()
})]
#[case::unknown_version(LoadRequest { version: 9.9, ..same_path_request() })]
fn reloading_the_same_path_still_checks_the_identity(
    specs: SpecFixture,
    #[case] bogus: LoadRequest,
) {
    let mut builder = specs.builder();
    builder
        .load_component(&same_path_request())
        .expect("first load");

    builder
        .load_component(&bogus)
        .expect_err("an unknown identity must not reuse the loaded component");

    let listed = builder.interface_specification().expect("still loaded");
    assert_eq!(listed, loopback::interface());
}

#[rstest]
fn reloading_the_same_path_needs_the_specification(specs: SpecFixture) {
    let mut builder = specs.builder();
    builder
        .load_component(&same_path_request())
        .expect("first load");
    fs::remove_file(&specs.loopback_spec).expect("remove specification");

    let error = builder
        .load_component(&same_path_request())
        .expect_err("specification is gone");
    assert!(matches!(error, LoadError::SpecNotFound { .. }));
}

#[rstest]
fn calls_before_loading_fail(specs: SpecFixture) {
    let mut builder = specs.builder();
    let error = builder
        .invoke_function(&FunctionSpecDescription::call("open", Vec::new()))
        .expect_err("nothing loaded");
    assert!(matches!(error, CallError::NothingLoaded));
}

#[rstest]
#[case(NfcStatus::Ok, true)]
#[case(NfcStatus::Failed, false)]
fn expected_results_are_verified(
    specs: SpecFixture,
    #[case] expected: NfcStatus,
    #[case] verified: bool,
) {
    let mut builder = specs.builder();
    builder
        .load_component(&loopback_request())
        .expect("load loopback");

    let result = builder
        .invoke_function(&open_call(expected))
        .expect("open");

    assert_eq!(result.name, "open");
    assert_eq!(result.results, vec![pack_enum(NfcStatus::Ok)]);
    assert_eq!(result.verified, Some(verified));
}

#[rstest]
fn calls_without_expectations_are_not_verified(specs: SpecFixture) {
    let mut builder = specs.builder();
    builder
        .load_component(&loopback_request())
        .expect("load loopback");

    let result = builder
        .invoke_function(&FunctionSpecDescription::call("prediscover", Vec::new()))
        .expect("prediscover");

    assert_eq!(result.results, vec![pack_enum(NfcStatus::Failed)]);
    assert_eq!(result.verified, None);
}

#[rstest]
fn attribute_reads_report_no_elapsed_time(specs: SpecFixture) {
    let mut builder = specs.builder();
    builder
        .load_component(&loopback_request())
        .expect("load loopback");

    let result = builder
        .invoke_function(&FunctionSpecDescription::attribute("max_payload"))
        .expect("read attribute");

    assert_eq!(result.results, vec![pack_scalar(loopback::DEFAULT_MAX_PAYLOAD)]);
    assert_eq!(result.elapsed_ns, 0);
}

#[rstest]
fn unknown_functions_surface_invoke_errors(specs: SpecFixture) {
    let mut builder = specs.builder();
    builder
        .load_component(&loopback_request())
        .expect("load loopback");

    let error = builder
        .invoke_function(&FunctionSpecDescription::call("selfTest", Vec::new()))
        .expect_err("unknown function");
    assert!(matches!(
        error,
        CallError::Invoke(InvokeError::NotFound { .. })
    ));
}
