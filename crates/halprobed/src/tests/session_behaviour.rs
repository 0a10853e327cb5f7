//! Behavioural tests for agent sessions served by a running daemon.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;

use halprobe_config::IsolationMode;
use halprobe_invoker::loopback::{self, NfcStatus};
use halprobe_invoker::marshal::{pack_enum, pack_scalar, pack_vector};
use halprobe_types::{
    CommandRecord, FunctionResult, FunctionSpecDescription, InterfaceSpecification, LoadRequest,
    ResponseCode, ResponseRecord, VariableValue,
};
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};

use crate::bootstrap::default_registry;
use crate::dispatch::FixedStatusProbe;
use crate::process::LaunchError;
use crate::process::launch::{LaunchPlan, ProcessControl, ServiceDeps, run_daemon_with};

use super::support::{
    AgentClient, RecordingHealthReporter, TestConfigLoader, TestShutdownSignal, loopback_request,
};

// ---------------------------------------------------------------------------
// Test world
// ---------------------------------------------------------------------------

struct SessionWorld {
    loader: TestConfigLoader,
    shutdown: TestShutdownSignal,
    daemon: Option<thread::JoinHandle<Result<(), LaunchError>>>,
    agents: HashMap<String, AgentClient>,
    response: Option<ResponseRecord>,
    status: i32,
}

impl SessionWorld {
    fn new() -> Self {
        Self {
            loader: TestConfigLoader::new(),
            shutdown: TestShutdownSignal::new(),
            daemon: None,
            agents: HashMap::new(),
            response: None,
            status: 0,
        }
    }

    fn start(&mut self) {
        let plan = LaunchPlan {
            process: ProcessControl {
                shutdown: self.shutdown.clone(),
            },
            services: ServiceDeps {
                loader: self.loader.clone(),
                reporter: Arc::new(RecordingHealthReporter::default()),
                registry: default_registry().expect("built-in drivers register"),
                status: Arc::new(FixedStatusProbe::new(self.status)),
            },
        };
        self.daemon = Some(thread::spawn(move || run_daemon_with(plan)));
    }

    fn agent(&mut self, name: &str) -> &mut AgentClient {
        self.agents
            .get_mut(name.trim_matches('"'))
            .expect("agent not connected")
    }

    fn send(&mut self, name: &str, command: &CommandRecord) {
        let response = self.agent(name).send(command);
        self.response = Some(response);
    }

    fn call(&mut self, name: &str, call: &FunctionSpecDescription) {
        let arg = serde_json::to_string(call).expect("encode call");
        self.send(name, &CommandRecord::call_function(arg));
    }

    fn response(&self) -> &ResponseRecord {
        self.response.as_ref().expect("no response received")
    }

    fn function_result(&self) -> FunctionResult {
        let message = self
            .response()
            .return_message
            .as_deref()
            .expect("response carries a function result");
        serde_json::from_str(message).expect("decode function result")
    }
}

impl Drop for SessionWorld {
    fn drop(&mut self) {
        self.agents.clear();
        self.shutdown.trigger();
        if let Some(daemon) = self.daemon.take() {
            let _ = daemon.join();
        }
    }
}

#[fixture]
fn world() -> RefCell<SessionWorld> {
    RefCell::new(SessionWorld::new())
}

// ---------------------------------------------------------------------------
// Given steps
// ---------------------------------------------------------------------------

#[given("a running daemon")]
fn given_running_daemon(world: &RefCell<SessionWorld>) {
    world.borrow_mut().start();
}

#[given("a running daemon reporting status {status}")]
fn given_daemon_reporting_status(world: &RefCell<SessionWorld>, status: i32) {
    let mut world = world.borrow_mut();
    world.status = status;
    world.start();
}

#[given("a running daemon isolating sessions in processes")]
fn given_forking_daemon(world: &RefCell<SessionWorld>) {
    let mut world = world.borrow_mut();
    world.loader = world.loader.clone().with_isolation(IsolationMode::Process);
    world.start();
}

#[given("agent {name} is connected")]
fn given_agent_connected(world: &RefCell<SessionWorld>, name: String) {
    let mut world = world.borrow_mut();
    let client = AgentClient::connect(&world.loader.socket_path());
    world.agents.insert(name.trim_matches('"').to_owned(), client);
}

#[given("agent {name} has opened the loopback controller")]
fn given_agent_opened_controller(world: &RefCell<SessionWorld>, name: String) {
    let mut world = world.borrow_mut();
    world.send(&name, &CommandRecord::load_hal(loopback_request()));
    assert_eq!(world.response().return_value, Some(0), "load failed");
    let open = FunctionSpecDescription::call(
        "open",
        vec![VariableValue::Callback {
            name: "agent-callback".to_owned(),
        }],
    )
    .expecting(vec![pack_enum(NfcStatus::Ok)]);
    world.call(&name, &open);
    assert_eq!(world.function_result().verified, Some(true), "open failed");
}

// ---------------------------------------------------------------------------
// When steps
// ---------------------------------------------------------------------------

#[when("agent {name} requests status")]
fn when_agent_requests_status(world: &RefCell<SessionWorld>, name: String) {
    world.borrow_mut().send(&name, &CommandRecord::get_status(0));
}

#[when("agent {name} loads the loopback controller")]
fn when_agent_loads_loopback(world: &RefCell<SessionWorld>, name: String) {
    world
        .borrow_mut()
        .send(&name, &CommandRecord::load_hal(loopback_request()));
}

#[when("agent {name} loads module {module}")]
fn when_agent_loads_module(world: &RefCell<SessionWorld>, name: String, module: String) {
    let request = LoadRequest {
        module_name: module.trim_matches('"').to_owned(),
        ..loopback_request()
    };
    world
        .borrow_mut()
        .send(&name, &CommandRecord::load_hal(request));
}

#[when("agent {name} calls {function}")]
fn when_agent_calls(world: &RefCell<SessionWorld>, name: String, function: String) {
    let call = match function.trim_matches('"') {
        "prediscover" => FunctionSpecDescription::call("prediscover", Vec::new())
            .expecting(vec![pack_enum(NfcStatus::Ok)]),
        other => FunctionSpecDescription::call(other, Vec::new()),
    };
    world.borrow_mut().call(&name, &call);
}

#[when("agent {name} writes bytes {bytes}")]
fn when_agent_writes(world: &RefCell<SessionWorld>, name: String, bytes: String) {
    let values: Vec<u8> = bytes
        .trim_matches('"')
        .split(',')
        .map(|byte| byte.trim().parse().expect("byte literal"))
        .collect();
    let call = FunctionSpecDescription::call("write", vec![pack_vector(values.as_slice())]);
    world.borrow_mut().call(&name, &call);
}

#[when("agent {name} lists functions")]
fn when_agent_lists(world: &RefCell<SessionWorld>, name: String) {
    world
        .borrow_mut()
        .send(&name, &CommandRecord::list_functions());
}

#[when("agent {name} sends exit")]
fn when_agent_exits(world: &RefCell<SessionWorld>, name: String) {
    world.borrow_mut().send(&name, &CommandRecord::exit());
}

// ---------------------------------------------------------------------------
// Then steps
// ---------------------------------------------------------------------------

#[then("the response succeeds with value {value}")]
fn then_response_value(world: &RefCell<SessionWorld>, value: i32) {
    let world = world.borrow();
    let response = world.response();
    assert_eq!(response.response_code, ResponseCode::Success);
    assert_eq!(response.return_value, Some(value));
}

#[then("the response succeeds")]
fn then_response_succeeds(world: &RefCell<SessionWorld>) {
    assert!(world.borrow().response().is_success());
}

#[then("the response fails")]
fn then_response_fails(world: &RefCell<SessionWorld>) {
    assert_eq!(
        world.borrow().response().response_code,
        ResponseCode::Fail
    );
}

#[then("the response succeeds without a message")]
fn then_response_without_message(world: &RefCell<SessionWorld>) {
    let world = world.borrow();
    let response = world.response();
    assert!(response.is_success());
    assert_eq!(response.return_message, None);
}

#[then("the response succeeds with a result of {count} bytes accepted")]
fn then_bytes_accepted(world: &RefCell<SessionWorld>, count: u32) {
    let world = world.borrow();
    assert!(world.response().is_success());
    let result = world.function_result();
    assert_eq!(result.name, "write");
    assert_eq!(result.results, vec![pack_scalar(count)]);
}

#[then("the response succeeds with a verified status")]
fn then_verified_status(world: &RefCell<SessionWorld>) {
    let world = world.borrow();
    assert!(world.response().is_success());
    assert_eq!(world.function_result().verified, Some(true));
}

#[then("the listed functions include {function}")]
fn then_listed_functions(world: &RefCell<SessionWorld>, function: String) {
    let world = world.borrow();
    let message = world
        .response()
        .return_message
        .as_deref()
        .expect("listing carries a specification");
    let spec: InterfaceSpecification = serde_json::from_str(message).expect("decode listing");
    assert_eq!(spec.package.as_deref(), Some(loopback::PACKAGE));
    assert!(spec.function(function.trim_matches('"')).is_some());
}

#[then("agent {name} is disconnected")]
fn then_agent_disconnected(world: &RefCell<SessionWorld>, name: String) {
    let mut world = world.borrow_mut();
    assert!(world.agent(&name).receive().is_none());
}

#[scenario(path = "tests/features/agent_session.feature")]
fn agent_session(world: RefCell<SessionWorld>) {
    let _ = world;
}
