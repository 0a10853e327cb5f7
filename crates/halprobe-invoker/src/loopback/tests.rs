//! Unit tests for the loopback controller.

use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixListener;

use camino::Utf8PathBuf;
use halprobe_types::{CallbackRequest, FunctionSpecDescription, ScalarValue};
use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;
use crate::error::VerifyError;

#[fixture]
fn driver() -> Box<dyn FunctionInvoker> {
    let mut registry = DriverRegistry::new();
    register(&mut registry).expect("register loopback");
    registry
        .open(&driver_key(), &TargetComponent::service("default"))
        .expect("open loopback")
}

fn client() -> VariableValue {
    VariableValue::Callback {
        name: "client-7".to_owned(),
    }
}

fn invoke(
    driver: &mut dyn FunctionInvoker,
    name: &str,
    args: Vec<VariableValue>,
) -> Vec<VariableValue> {
    driver
        .call(
            &FunctionSpecDescription::call(name, args),
            &CallbackChannel::disconnected(),
        )
        .unwrap_or_else(|error| panic!("{name} failed: {error}"))
        .results
}

#[rstest]
fn lifecycle_reports_status(mut driver: Box<dyn FunctionInvoker>) {
    assert_eq!(invoke(&mut *driver, "prediscover", Vec::new()), [pack_enum(NfcStatus::Failed)]);
    assert_eq!(invoke(&mut *driver, "open", vec![client()]), [pack_enum(NfcStatus::Ok)]);
    assert_eq!(invoke(&mut *driver, "prediscover", Vec::new()), [pack_enum(NfcStatus::Ok)]);
    assert_eq!(invoke(&mut *driver, "close", Vec::new()), [pack_enum(NfcStatus::Ok)]);
    assert_eq!(invoke(&mut *driver, "close", Vec::new()), [pack_enum(NfcStatus::Failed)]);
}

#[rstest]
fn write_counts_accepted_bytes(mut driver: Box<dyn FunctionInvoker>) {
    let payload = pack_vector(&[0x20_u8, 0x00, 0x01]);
    assert_eq!(invoke(&mut *driver, "write", vec![payload.clone()]), [pack_scalar(0_u32)]);
    invoke(&mut *driver, "open", vec![client()]);
    assert_eq!(invoke(&mut *driver, "write", vec![payload]), [pack_scalar(3_u32)]);
}

#[rstest]
fn oversized_write_is_refused(mut driver: Box<dyn FunctionInvoker>) {
    invoke(&mut *driver, "open", vec![client()]);
    let payload = pack_vector(&[0_u8; 256]);
    assert_eq!(invoke(&mut *driver, "write", vec![payload]), [pack_scalar(0_u32)]);
}

#[rstest]
fn max_payload_attribute(driver: Box<dyn FunctionInvoker>) {
    assert_eq!(
        driver.attribute("max_payload").expect("attribute"),
        pack_scalar(DEFAULT_MAX_PAYLOAD)
    );
    assert!(driver.attribute("firmware").is_err());
}

#[rstest]
fn status_results_verify_through_native_enum(driver: Box<dyn FunctionInvoker>) {
    let expected = halprobe_types::VerificationDescription {
        name: "close".to_owned(),
        expected: vec![pack_enum(NfcStatus::Failed)],
    };
    assert_eq!(driver.verify(&expected, &[pack_enum(NfcStatus::Failed)]), Ok(()));
    assert_eq!(
        driver.verify(&expected, &[pack_enum(NfcStatus::Ok)]),
        Err(VerifyError::ValueMismatch { index: 0 })
    );
    let foreign = VariableValue::enumerated("other::Status", ScalarValue::Uint32(1));
    assert!(matches!(
        driver.verify(&expected, &[foreign]),
        Err(VerifyError::Undecodable { index: 0, .. })
    ));
}

#[rstest]
fn interface_lists_every_function(driver: Box<dyn FunctionInvoker>) {
    let interface = driver.interface();
    assert_eq!(interface.package.as_deref(), Some(PACKAGE));
    for name in [
        "open",
        "write",
        "coreInitialized",
        "prediscover",
        "close",
        "controlGranted",
        "powerCycle",
    ] {
        assert!(interface.function(name).is_some(), "{name} missing");
    }
    assert_eq!(DriverKey::for_interface(interface), driver_key());
}

#[rstest]
fn events_reach_the_agent_socket(mut driver: Box<dyn FunctionInvoker>) {
    let dir = TempDir::new().expect("temp dir");
    let path = Utf8PathBuf::from_path_buf(dir.path().join("agent.sock")).expect("utf8 path");
    let listener = UnixListener::bind(&path).expect("bind agent socket");
    let channel = CallbackChannel::socket(path);

    driver
        .call(&FunctionSpecDescription::call("open", vec![client()]), &channel)
        .expect("open");

    let (stream, _) = listener.accept().expect("accept event");
    let mut line = String::new();
    BufReader::new(stream).read_line(&mut line).expect("read event");
    let request: CallbackRequest = serde_json::from_str(&line).expect("decode event");
    assert_eq!(request.id, "client-7");
    assert_eq!(request.name, "sendEvent");
    assert_eq!(
        request.args,
        [pack_enum(NfcEvent::OpenCplt), pack_enum(NfcStatus::Ok)]
    );
}
