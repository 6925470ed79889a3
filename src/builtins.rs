//! Native functions bound into the global environment.
//!
//! Natives are ordinary values: adding one is a matter of binding another
//! [`Value::Callable`] in [`register_builtins`].

use crate::env::Environment;
use crate::error::RuntimeErrorKind;
use crate::value::{Callable, NativeFunction, Value};
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock seconds since the Unix epoch. Arguments are ignored.
pub fn native_clock(_args: &[Value]) -> Result<Value, RuntimeErrorKind> {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0);
    Ok(Value::Number(seconds))
}

/// Binds every native function into the global frame.
pub fn register_builtins(env: &mut Environment) {
    env.define(
        "clock".to_string(),
        Value::Callable(Callable::Native(NativeFunction {
            name: "clock",
            func: native_clock,
        })),
    );
}
