//! Interface specification files for the loopback driver.

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use halprobe_invoker::loopback;
use halprobe_types::{ComponentClass, LoadRequest};

/// Writes the loopback specification where `LOAD_HAL` looks for it.
pub(crate) fn write_loopback_spec(spec_dir: &Utf8Path) -> Utf8PathBuf {
    let dir = spec_dir.join("loopback").join("nfc").join("1.0");
    fs::create_dir_all(&dir).expect("create specification directory");
    let path = dir.join("INfc.spec.json");
    let text = serde_json::to_string_pretty(&loopback::interface()).expect("encode specification");
    fs::write(&path, text).expect("write specification");
    path
}

/// `LOAD_HAL` parameters naming the loopback controller.
pub(crate) fn loopback_request() -> LoadRequest {
    LoadRequest {
        path: String::new(),
        class: ComponentClass::HalHidl.id(),
        component_type: 0,
        version: loopback::VERSION,
        module_name: format!("{}::{}", loopback::PACKAGE, loopback::INTERFACE),
    }
}
