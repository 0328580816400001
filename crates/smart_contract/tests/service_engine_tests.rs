//! Dispatch tests for the service engine.
//!
//! A small token contract is registered with an in-memory registry, state
//! backend and event sink, and driven through `ServiceEngine::invoke`.

use num_bigint::BigInt;
use parking_lot::Mutex;
use score_config::{ServiceConfig, StepType};
use score_core::{Address, DeclaredType, ExceptionCode, RawValue, ScoreError, ScoreResult, TypedValue};
use score_engine::{
    classify, Arguments, ContextContainer, Contract, EngineProxy, EventLogDescriptor, ExecutionContext,
    FunctionDescriptor, InvocationRequest, InvokeResult, MemoryEventLogSink, MemoryStateFactory,
    MethodTable, ScoreApi, ScoreMapper, ServiceEngine, Severity, Status,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const TOKEN_ADDRESS: &str = "cx0000000000000000000000000000000000000001";
const MAX_TRANSFER: i64 = 1_000;

struct Token {
    api: ScoreApi,
    table: MethodTable<Token>,
    transfer_event: EventLogDescriptor,
    calls: AtomicUsize,
}

impl Token {
    fn new() -> Self {
        let transfer_event = EventLogDescriptor::new("Transfer")
            .param("to", DeclaredType::Address, true)
            .param("value", DeclaredType::Int, false);
        let api = ScoreApi::new()
            .with_function(
                FunctionDescriptor::writable("transfer")
                    .param("to", DeclaredType::Address)
                    .param("value", DeclaredType::Int)
                    .returns(DeclaredType::Bool),
            )
            .with_function(
                FunctionDescriptor::readonly("balanceOf")
                    .param("owner", DeclaredType::Address)
                    .returns(DeclaredType::Int),
            )
            .with_function(
                FunctionDescriptor::writable("echo")
                    .param("to", DeclaredType::Address)
                    .param("value", DeclaredType::Int),
            )
            .with_function(FunctionDescriptor::readonly("sneakyWrite"))
            .with_function(FunctionDescriptor::writable("crash"))
            .with_function(FunctionDescriptor::readonly("depth"))
            .with_function(FunctionDescriptor::writable("store").param("data", DeclaredType::Any))
            .with_event(transfer_event.clone());

        let table = MethodTable::new()
            .with("transfer", Token::transfer)
            .with("balanceOf", Token::balance_of)
            .with("echo", Token::echo)
            .with("sneakyWrite", Token::sneaky_write)
            .with("crash", Token::crash)
            .with("depth", Token::depth)
            .with("store", Token::store);

        Self {
            api,
            table,
            transfer_event,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn transfer(&self, ctx: &ExecutionContext, args: Arguments) -> ScoreResult<TypedValue> {
        let to = args
            .require("to")?
            .as_address()
            .cloned()
            .ok_or_else(|| ScoreError::invalid_params("to"))?;
        let value = args
            .require("value")?
            .as_int()
            .cloned()
            .ok_or_else(|| ScoreError::invalid_params("value"))?;

        if value > BigInt::from(MAX_TRANSFER) {
            return Err(ScoreError::revert("insufficient balance", 0));
        }

        ctx.set(to.body(), &value.to_signed_bytes_be())?;
        ctx.emit_event(
            &self.transfer_event,
            vec![TypedValue::Address(to), TypedValue::Int(value)],
        )?;
        Ok(TypedValue::Bool(true))
    }

    fn balance_of(&self, ctx: &ExecutionContext, args: Arguments) -> ScoreResult<TypedValue> {
        let owner = args
            .require("owner")?
            .as_address()
            .cloned()
            .ok_or_else(|| ScoreError::invalid_params("owner"))?;
        let balance = ctx
            .get(owner.body())?
            .map(|bytes| BigInt::from_signed_bytes_be(&bytes))
            .unwrap_or_default();
        Ok(TypedValue::Int(balance))
    }

    fn echo(&self, _: &ExecutionContext, args: Arguments) -> ScoreResult<TypedValue> {
        match args {
            Arguments::Keyword(kw) => Ok(TypedValue::Struct(kw)),
            Arguments::Positional(items) => Ok(TypedValue::Int(BigInt::from(items.len()))),
        }
    }

    fn sneaky_write(&self, ctx: &ExecutionContext, _: Arguments) -> ScoreResult<TypedValue> {
        ctx.set(b"owner", b"me")?;
        Ok(TypedValue::Null)
    }

    fn crash(&self, _: &ExecutionContext, _: Arguments) -> ScoreResult<TypedValue> {
        panic!("contract bug");
    }

    fn store(&self, _: &ExecutionContext, args: Arguments) -> ScoreResult<TypedValue> {
        Ok(args.require("data")?.clone())
    }

    fn depth(&self, ctx: &ExecutionContext, _: Arguments) -> ScoreResult<TypedValue> {
        let current = ContextContainer::current().ok_or_else(|| ScoreError::internal("no context"))?;
        assert_eq!(current.method(), ctx.method());
        Ok(TypedValue::Int(BigInt::from(ContextContainer::depth())))
    }
}

impl Contract for Token {
    fn api(&self) -> &ScoreApi {
        &self.api
    }

    fn invoke(&self, context: &ExecutionContext, method: &str, args: Arguments) -> ScoreResult<TypedValue> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.table.dispatch(self, context, method, args)
    }
}

struct Fixture {
    engine: ServiceEngine,
    token: Arc<Token>,
    state: MemoryStateFactory,
    events: Arc<MemoryEventLogSink>,
}

impl Fixture {
    fn new() -> Self {
        let token = Arc::new(Token::new());
        let mapper = Arc::new(ScoreMapper::new());
        mapper.register_instance("token", token.clone());

        let state = MemoryStateFactory::new();
        let events = Arc::new(MemoryEventLogSink::new());
        let proxy = EngineProxy::in_memory(mapper)
            .with_state_factory(Arc::new(state.clone()))
            .with_event_sink(events.clone());
        let engine = ServiceEngine::open(ServiceConfig::default(), proxy).unwrap();

        Self {
            engine,
            token,
            state,
            events,
        }
    }

    fn invoke(&self, method: &str, params: RawValue) -> InvokeResult {
        let request = InvocationRequest::new(token_address(), "token", method, params)
            .with_from("hx00000000000000000000000000000000000000aa".parse().unwrap());
        self.engine.invoke(self.engine.new_context(request))
    }

    fn contract_call_cost(&self) -> u64 {
        self.engine.config().step_costs.cost(StepType::ContractCall)
    }
}

fn token_address() -> Address {
    TOKEN_ADDRESS.parse().unwrap()
}

fn nested_list(levels: usize) -> RawValue {
    let mut value = RawValue::from(1);
    for _ in 0..levels {
        value = RawValue::List(vec![value]);
    }
    value
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Runs `f` with a thread-local subscriber and returns the formatted logs.
fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .without_time()
        .with_max_level(tracing::Level::INFO)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock()).into_owned();
    (result, logs)
}

fn failure_code(result: &InvokeResult) -> i32 {
    result.result.failure().expect("expected a failure").code
}

// ============================================================================
// Success paths
// ============================================================================

/// Byte-keyed params are decoded and converted to the declared types.
#[test]
fn test_keyword_params_are_converted() {
    let fixture = Fixture::new();
    let params = RawValue::map(vec![
        (RawValue::from(b"to"), RawValue::from(b"hx1234")),
        (RawValue::from(b"value"), RawValue::from(b"100")),
    ]);

    let result = fixture.invoke("echo", params);

    assert_eq!(result.status, Status::Success);
    assert_eq!(result.step_used, fixture.contract_call_cost());
    match result.result.value() {
        Some(TypedValue::Struct(kw)) => {
            assert_eq!(kw["to"], TypedValue::Address("hx1234".parse().unwrap()));
            assert_eq!(kw["value"], TypedValue::Int(BigInt::from(100)));
        }
        other => panic!("unexpected result {:?}", other),
    }
    assert_eq!(ContextContainer::depth(), 0);
}

#[test]
fn test_positional_params_pass_through() {
    let fixture = Fixture::new();
    let result = fixture.invoke("echo", RawValue::list(vec![RawValue::from(1), RawValue::from("x")]));

    assert_eq!(result.status, Status::Success);
    assert_eq!(result.result.value(), Some(&TypedValue::Int(BigInt::from(2))));
}

#[test]
fn test_transfer_writes_state_and_emits_event() {
    let fixture = Fixture::new();
    let to = "hx00000000000000000000000000000000000000bb";
    let params = RawValue::map(vec![("to", to), ("value", "0x64")]);

    let result = fixture.invoke("transfer", params);

    assert_eq!(result.status, Status::Success);
    assert!(result.step_used > fixture.contract_call_cost());

    let to: Address = to.parse().unwrap();
    assert_eq!(
        fixture.state.peek(&token_address(), to.body()),
        Some(BigInt::from(100).to_signed_bytes_be())
    );

    let logs = fixture.events.take();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].score_address, token_address());
    assert_eq!(logs[0].signature(), Some("Transfer(Address,int)"));

    let balance = fixture.invoke("balanceOf", RawValue::map(vec![("owner", to.to_string())]));
    assert_eq!(balance.result.value(), Some(&TypedValue::Int(BigInt::from(100))));
}

#[test]
fn test_context_is_current_during_call() {
    let fixture = Fixture::new();
    let result = fixture.invoke("depth", RawValue::list(Vec::<RawValue>::new()));

    assert_eq!(result.result.value(), Some(&TypedValue::Int(BigInt::from(1))));
    assert_eq!(ContextContainer::depth(), 0);
}

// ============================================================================
// Failure paths
// ============================================================================

/// A scalar is neither keyword nor positional params.
#[test]
fn test_scalar_params_are_rejected_before_the_call() {
    let fixture = Fixture::new();
    let result = fixture.invoke("echo", RawValue::from(5));

    assert_eq!(result.status, Status::Failure);
    assert_eq!(failure_code(&result), ExceptionCode::InvalidParameter.as_i32());
    assert_eq!(result.step_used, 0);
    assert_eq!(fixture.token.calls(), 0);
    assert_eq!(ContextContainer::depth(), 0);
}

/// Params are measured before anything walks them recursively.
#[test]
fn test_deeply_nested_params_are_rejected_before_the_call() {
    let fixture = Fixture::new();
    let params = RawValue::map(vec![(RawValue::from("data"), nested_list(5_000))]);

    let result = fixture.invoke("store", params);

    assert_eq!(result.status, Status::Failure);
    assert_eq!(failure_code(&result), ExceptionCode::InvalidParameter.as_i32());
    assert_eq!(result.step_used, 0);
    assert_eq!(fixture.token.calls(), 0);
    assert_eq!(ContextContainer::depth(), 0);

    let positional = fixture.invoke("echo", nested_list(5_000));
    assert_eq!(failure_code(&positional), ExceptionCode::InvalidParameter.as_i32());
    assert_eq!(positional.step_used, 0);
}

#[test]
fn test_nesting_within_limit_is_accepted() {
    let fixture = Fixture::new();
    let limit = fixture.engine.config().max_param_depth;
    // The mapping itself is one level.
    let params = RawValue::map(vec![(RawValue::from("data"), nested_list(limit - 2))]);
    assert_eq!(params.depth(), limit);

    let result = fixture.invoke("store", params);
    assert_eq!(result.status, Status::Success);

    let params = RawValue::map(vec![(RawValue::from("data"), nested_list(limit - 1))]);
    let result = fixture.invoke("store", params);
    assert_eq!(failure_code(&result), ExceptionCode::InvalidParameter.as_i32());
}

#[test]
fn test_business_fault_keeps_contract_code() {
    let fixture = Fixture::new();
    let params = RawValue::map(vec![
        ("to", "hx00000000000000000000000000000000000000bb"),
        ("value", "5000"),
    ]);

    let result = fixture.invoke("transfer", params);

    assert_eq!(result.status, Status::Failure);
    let failure = result.result.failure().unwrap();
    assert_eq!(failure.code, 32);
    assert_eq!(failure.message, "insufficient balance");
    assert!(result.step_used >= fixture.contract_call_cost());
    assert_eq!(
        result.result.to_json(),
        serde_json::json!({"error": {"code": 32, "message": "insufficient balance"}})
    );
}

/// Business faults are logged as warnings, host faults as errors.
#[test]
fn test_failure_log_severity() {
    let fixture = Fixture::new();
    let params = RawValue::map(vec![
        ("to", "hx00000000000000000000000000000000000000bb"),
        ("value", "5000"),
    ]);

    let (result, logs) = capture_logs(|| fixture.invoke("transfer", params));

    assert_eq!(failure_code(&result), 32);
    assert_eq!(
        classify(&ScoreError::revert("insufficient balance", 0)).severity,
        Severity::Warning
    );
    assert!(
        logs.lines()
            .any(|line| line.contains("WARN") && line.contains("insufficient balance")),
        "{}",
        logs
    );
    assert!(!logs.contains("ERROR"), "{}", logs);

    let (result, logs) =
        capture_logs(|| fixture.invoke("crash", RawValue::list(Vec::<RawValue>::new())));

    assert_eq!(failure_code(&result), ExceptionCode::SERVER_ERROR.as_i32());
    assert!(
        logs.lines()
            .any(|line| line.contains("ERROR") && line.contains("contract bug")),
        "{}",
        logs
    );
    assert!(!logs.contains("WARN"), "{}", logs);
}

#[test]
fn test_missing_contract_is_not_found() {
    let fixture = Fixture::new();
    let request = InvocationRequest::new(
        "cx0000000000000000000000000000000000000002".parse().unwrap(),
        "missing",
        "transfer",
        RawValue::map(vec![("value", "1")]),
    );

    let result = fixture.engine.invoke(fixture.engine.new_context(request));

    assert_eq!(result.status, Status::Failure);
    assert_eq!(failure_code(&result), ExceptionCode::ContractNotFound.as_i32());
    assert_eq!(result.step_used, 0);
    assert_eq!(ContextContainer::depth(), 0);
}

#[test]
fn test_account_address_is_not_a_contract() {
    let fixture = Fixture::new();
    let request = InvocationRequest::new(
        "hx0000000000000000000000000000000000000001".parse().unwrap(),
        "token",
        "echo",
        RawValue::list(Vec::<RawValue>::new()),
    );

    let result = fixture.engine.invoke(fixture.engine.new_context(request));
    assert_eq!(failure_code(&result), ExceptionCode::ContractNotFound.as_i32());
}

#[test]
fn test_unknown_method() {
    let fixture = Fixture::new();
    let result = fixture.invoke("mint", RawValue::list(Vec::<RawValue>::new()));

    assert_eq!(failure_code(&result), ExceptionCode::MethodNotFound.as_i32());
    assert_eq!(result.step_used, 0);
    assert_eq!(fixture.token.calls(), 0);
}

#[test]
fn test_unknown_param_is_invalid() {
    let fixture = Fixture::new();
    let params = RawValue::map(vec![
        ("to", "hx1234"),
        ("value", "1"),
        ("memo", "hi"),
    ]);

    let result = fixture.invoke("echo", params);
    assert_eq!(failure_code(&result), ExceptionCode::InvalidParameter.as_i32());
    assert_eq!(fixture.token.calls(), 0);
}

#[test]
fn test_unexpected_key_type_is_server_error() {
    let fixture = Fixture::new();
    let params = RawValue::map(vec![(RawValue::from(1), RawValue::from("x"))]);

    let result = fixture.invoke("echo", params);
    assert_eq!(failure_code(&result), ExceptionCode::SERVER_ERROR.as_i32());
}

#[test]
fn test_panic_is_server_error() {
    let fixture = Fixture::new();
    let result = fixture.invoke("crash", RawValue::list(Vec::<RawValue>::new()));

    assert_eq!(result.status, Status::Failure);
    let failure = result.result.failure().unwrap();
    assert_eq!(failure.code, ExceptionCode::SERVER_ERROR.as_i32());
    assert_eq!(failure.message, "contract bug");
    assert_eq!(result.step_used, fixture.contract_call_cost());
    assert_eq!(ContextContainer::depth(), 0);
}

#[test]
fn test_readonly_method_cannot_write() {
    let fixture = Fixture::new();
    let result = fixture.invoke("sneakyWrite", RawValue::list(Vec::<RawValue>::new()));

    assert_eq!(failure_code(&result), ExceptionCode::AccessDenied.as_i32());
    assert_eq!(fixture.state.peek(&token_address(), b"owner"), None);
}

#[test]
fn test_out_of_step_bills_whole_budget() {
    let fixture = Fixture::new();
    let limit = fixture.contract_call_cost() - 1;
    let request = InvocationRequest::new(
        token_address(),
        "token",
        "echo",
        RawValue::list(Vec::<RawValue>::new()),
    );

    let context = fixture.engine.new_context_with_step_limit(request, limit);
    let result = fixture.engine.invoke(context);

    assert_eq!(failure_code(&result), ExceptionCode::OutOfStep.as_i32());
    assert_eq!(result.step_used, limit);
    assert_eq!(fixture.token.calls(), 0);
}

/// Every outcome leaves the context stack as it found it.
#[test]
fn test_stack_depth_is_restored_for_every_outcome() {
    let fixture = Fixture::new();
    let cases = vec![
        ("echo", RawValue::map(vec![("to", "hx1234"), ("value", "1")])),
        ("echo", RawValue::from(true)),
        ("mint", RawValue::Null),
        ("crash", RawValue::list(Vec::<RawValue>::new())),
        ("sneakyWrite", RawValue::list(Vec::<RawValue>::new())),
        ("transfer", RawValue::map(vec![("to", "hx1234"), ("value", "99999")])),
    ];

    for (method, params) in cases {
        let before = ContextContainer::depth();
        fixture.invoke(method, params);
        assert_eq!(ContextContainer::depth(), before, "{}", method);
    }
}

// ============================================================================
// API introspection
// ============================================================================

#[test]
fn test_get_score_api() {
    let fixture = Fixture::new();
    let api = fixture.engine.get_score_api("token").unwrap();

    assert!(api.function("transfer").is_some());
    assert!(api.function("balanceOf").unwrap().readonly);
    assert_eq!(ContextContainer::depth(), 0);
    assert_eq!(fixture.token.calls(), 0);

    let json = api.to_json();
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap().to_string())
        .collect();
    assert!(names.contains(&"transfer".to_string()));
    assert!(names.contains(&"Transfer".to_string()));
}

#[test]
fn test_get_score_api_for_unknown_code() {
    let fixture = Fixture::new();
    let err = fixture.engine.get_score_api("nope").unwrap_err();
    assert!(matches!(err, ScoreError::ContractNotFound(_)));
}
