//! Method and property-slot bodies.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::core::instance::Instance;

type Body = dyn Fn(&mut Instance, &[Value]) -> anyhow::Result<Value> + Send + Sync;

/// A callable member body.
///
/// Bodies compare by identity: clones of one `Callable` are the same body,
/// two separately constructed closures never are, even if they behave alike.
#[derive(Clone)]
pub struct Callable {
    body: Arc<Body>,
}

impl Callable {
    pub fn new<F>(body: F) -> Self
    where
        F: Fn(&mut Instance, &[Value]) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
        }
    }

    /// Body that ignores its arguments and returns `value`.
    pub fn constant(value: Value) -> Self {
        Self::new(move |_, _| Ok(value.clone()))
    }

    pub fn call(&self, instance: &mut Instance, args: &[Value]) -> anyhow::Result<Value> {
        (self.body)(instance, args)
    }

    /// True if both handles point at the same body.
    pub fn same_as(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({:p})", Arc::as_ptr(&self.body) as *const ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_identity() {
        let body = Callable::constant(Value::Null);
        assert!(body.same_as(&body.clone()));
    }

    /// Equal behavior does not make two bodies identical.
    #[test]
    fn separate_bodies_differ() {
        let a = Callable::constant(Value::from(1));
        let b = Callable::constant(Value::from(1));
        assert!(!a.same_as(&b));
    }
}
