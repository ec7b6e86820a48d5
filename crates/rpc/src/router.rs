//! The procedure table.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{RouterError, RpcError};
use crate::procedure::{Erased, Handler, Procedure, ProcedureKind};

/// Separator between a namespace and a procedure name.
pub const NAMESPACE_SEPARATOR: char = '.';

/// Maps unique procedure names to their handlers.
///
/// The table is built once at startup and then shared read-only between
/// requests; cloning is cheap.
#[derive(Clone, Default)]
pub struct Router {
    procedures: HashMap<String, Arc<dyn Handler>>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `procedure` under `name`.
    ///
    /// # Panics
    ///
    /// Panics if the name is invalid or already taken. Use
    /// [`Router::try_procedure`] to handle that case.
    pub fn procedure<P: Procedure>(self, name: impl Into<String>, procedure: P) -> Self {
        match self.try_procedure(name, procedure) {
            Ok(router) => router,
            Err(err) => panic!("{err}"),
        }
    }

    /// Registers `procedure` under `name`, failing on an invalid or duplicate name.
    pub fn try_procedure<P: Procedure>(
        mut self,
        name: impl Into<String>,
        procedure: P,
    ) -> Result<Self, RouterError> {
        let name = name.into();
        validate_name(&name)?;
        self.insert(name, Arc::new(Erased(procedure)))?;
        Ok(self)
    }

    /// Merges `other` into this table, prefixing each of its names with
    /// `prefix.`.
    ///
    /// # Panics
    ///
    /// Panics on an invalid prefix or a resulting name collision. Use
    /// [`Router::try_nest`] to handle that case.
    pub fn nest(self, prefix: &str, other: Router) -> Self {
        match self.try_nest(prefix, other) {
            Ok(router) => router,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn try_nest(mut self, prefix: &str, other: Router) -> Result<Self, RouterError> {
        validate_name(prefix)?;
        for (name, handler) in other.procedures {
            self.insert(format!("{prefix}{NAMESPACE_SEPARATOR}{name}"), handler)?;
        }
        Ok(self)
    }

    fn insert(&mut self, name: String, handler: Arc<dyn Handler>) -> Result<(), RouterError> {
        if self.procedures.contains_key(&name) {
            return Err(RouterError::DuplicateProcedure(name));
        }
        self.procedures.insert(name, handler);
        Ok(())
    }

    /// Returns the kind of the procedure registered under `name`.
    pub fn kind_of(&self, name: &str) -> Option<ProcedureKind> {
        self.procedures.get(name).map(|h| h.kind())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.procedures.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.procedures.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Resolves `path` and invokes it as a procedure of kind `kind`.
    pub async fn call(
        &self,
        path: &str,
        kind: ProcedureKind,
        input: Option<Value>,
    ) -> Result<Value, RpcError> {
        let handler = self.procedures.get(path).ok_or_else(|| {
            RpcError::not_found(format!("No \"{kind}\"-procedure on path \"{path}\""))
        })?;

        if handler.kind() != kind {
            return Err(RpcError::method_not_supported(format!(
                "Unsupported {kind} call on {} procedure \"{path}\"",
                handler.kind()
            )));
        }

        handler.invoke(input).await
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("procedures", &self.names())
            .finish()
    }
}

fn validate_name(name: &str) -> Result<(), RouterError> {
    let reason = if name.is_empty() {
        "name is empty"
    } else if name.contains(',') {
        "',' separates batched calls"
    } else if name.contains('/') {
        "'/' is a path separator"
    } else {
        return Ok(());
    };

    Err(RouterError::InvalidName {
        name: name.to_string(),
        reason,
    })
}
