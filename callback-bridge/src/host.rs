//! Host-side value model
//!
//! The bridge talks to an external caller through a small dynamically-typed
//! value model. Callbacks registered by the caller are [`HostFunction`]s; the
//! data handed to them is marshalled into [`HostValue`]s.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Signature every host callback implements
pub type HostFn =
    dyn Fn(&InvocationContext, &[HostValue]) -> std::result::Result<HostValue, HostException>
        + Send
        + Sync;

/// A value in the external calling convention
#[derive(Clone, Default)]
pub enum HostValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Int32(i32),
    Number(f64),
    String(String),
    Array(Vec<HostValue>),
    Function(HostFunction),
}

impl HostValue {
    /// Name of the value's type, as used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Bool(_) => "boolean",
            HostValue::Int32(_) | HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Array(_) => "array",
            HostValue::Function(_) => "function",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, HostValue::Function(_))
    }

    /// Numeric view of the value, if it is a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::Int32(v) => Some(*v as f64),
            HostValue::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view of the value, if it is an integral number
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HostValue::Int32(v) => Some(*v as i64),
            HostValue::Number(v) if v.fract() == 0.0 => Some(*v as i64),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[HostValue]> {
        match self {
            HostValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (HostValue::Undefined, HostValue::Undefined) => true,
            (HostValue::Null, HostValue::Null) => true,
            (HostValue::Bool(a), HostValue::Bool(b)) => a == b,
            (HostValue::Int32(a), HostValue::Int32(b)) => a == b,
            (HostValue::Number(a), HostValue::Number(b)) => a == b,
            (HostValue::String(a), HostValue::String(b)) => a == b,
            (HostValue::Array(a), HostValue::Array(b)) => a == b,
            (HostValue::Function(a), HostValue::Function(b)) => a.same_as(b),
            _ => false,
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => write!(f, "Undefined"),
            HostValue::Null => write!(f, "Null"),
            HostValue::Bool(v) => write!(f, "Bool({})", v),
            HostValue::Int32(v) => write!(f, "Int32({})", v),
            HostValue::Number(v) => write!(f, "Number({})", v),
            HostValue::String(v) => write!(f, "String({:?})", v),
            HostValue::Array(items) => f.debug_list().entries(items).finish(),
            HostValue::Function(func) => write!(f, "{:?}", func),
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Undefined => write!(f, "undefined"),
            HostValue::Null => write!(f, "null"),
            HostValue::Bool(v) => write!(f, "{}", v),
            HostValue::Int32(v) => write!(f, "{}", v),
            HostValue::Number(v) => write!(f, "{}", v),
            HostValue::String(v) => write!(f, "{}", v),
            HostValue::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            HostValue::Function(func) => write!(f, "[Function: {}]", func.name()),
        }
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::String(value)
    }
}

impl From<i32> for HostValue {
    fn from(value: i32) -> Self {
        HostValue::Int32(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Number(value)
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Bool(value)
    }
}

impl From<HostFunction> for HostValue {
    fn from(value: HostFunction) -> Self {
        HostValue::Function(value)
    }
}

/// An exception raised by a host callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostException {
    pub message: String,
    pub stack: Option<String>,
}

impl HostException {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}

impl fmt::Display for HostException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.stack {
            Some(stack) => write!(f, "{}\n{}", self.message, stack),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for HostException {}

/// The object a callback is invoked on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receiver {
    /// Top level of the host environment, not bound to any instance
    Global,
}

/// Opaque token identifying a host environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnvToken(u64);

static NEXT_ENV: AtomicU64 = AtomicU64::new(1);

impl EnvToken {
    /// Allocate a token for a fresh environment
    pub fn fresh() -> Self {
        EnvToken(NEXT_ENV.fetch_add(1, Ordering::Relaxed))
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Everything a callback needs to run in the environment that registered it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvocationContext {
    env: EnvToken,
    receiver: Receiver,
}

impl InvocationContext {
    /// Context bound to `env` with the global receiver
    pub fn global(env: EnvToken) -> Self {
        Self {
            env,
            receiver: Receiver::Global,
        }
    }

    pub fn env(&self) -> EnvToken {
        self.env
    }

    pub fn receiver(&self) -> Receiver {
        self.receiver
    }
}

/// A callable supplied by the external caller
///
/// Clones share the same underlying closure.
#[derive(Clone)]
pub struct HostFunction {
    name: Arc<str>,
    func: Arc<HostFn>,
}

impl HostFunction {
    /// Wrap a closure as a host function
    ///
    /// # Example
    /// ```
    /// use callback_bridge::{HostFunction, HostValue};
    ///
    /// let f = HostFunction::new("onNumbers", |_ctx, args| {
    ///     Ok(HostValue::Int32(args.len() as i32))
    /// });
    /// assert_eq!(f.name(), "onNumbers");
    /// ```
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&InvocationContext, &[HostValue]) -> std::result::Result<HostValue, HostException>
            + Send
            + Sync
            + 'static,
    {
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call the function in the given context
    pub fn call(
        &self,
        ctx: &InvocationContext,
        args: &[HostValue],
    ) -> std::result::Result<HostValue, HostException> {
        (self.func)(ctx, args)
    }

    /// True if both handles refer to the same closure
    pub fn same_as(&self, other: &HostFunction) -> bool {
        Arc::ptr_eq(&self.func, &other.func)
    }

    /// Number of live references to the underlying closure
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.func)
    }
}

impl fmt::Debug for HostFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostFunction({})", self.name)
    }
}
