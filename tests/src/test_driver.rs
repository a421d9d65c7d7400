use std::{
    borrow::Cow,
    sync::{Arc, Mutex},
};
use strata::driver::{Capability, Connection, Driver, Operation, Response};
use strata_core::{async_trait, stmt::Value, Result};

/// Wraps the driver under test. Records every operation sent through any of
/// its connections and fails operations matching an armed fault.
#[derive(Debug)]
pub struct TestDriver {
    inner: Box<dyn Driver>,
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
    faults: Arc<Mutex<Vec<String>>>,
}

#[derive(Debug, Clone)]
pub struct DriverOp {
    pub sql: String,
    pub params: Vec<Value>,

    /// The operation was failed by an injected fault.
    pub injected: bool,
}

impl TestDriver {
    pub fn new(
        inner: Box<dyn Driver>,
        ops_log: Arc<Mutex<Vec<DriverOp>>>,
        faults: Arc<Mutex<Vec<String>>>,
    ) -> Self {
        Self {
            inner,
            ops_log,
            faults,
        }
    }
}

#[async_trait]
impl Driver for TestDriver {
    fn url(&self) -> Cow<'_, str> {
        self.inner.url()
    }

    fn capability(&self) -> &'static Capability {
        self.inner.capability()
    }

    async fn connect(&self) -> Result<Box<dyn Connection>> {
        Ok(Box::new(TestConnection {
            inner: self.inner.connect().await?,
            ops_log: self.ops_log.clone(),
            faults: self.faults.clone(),
        }))
    }
}

#[derive(Debug)]
struct TestConnection {
    inner: Box<dyn Connection>,
    ops_log: Arc<Mutex<Vec<DriverOp>>>,
    faults: Arc<Mutex<Vec<String>>>,
}

impl TestConnection {
    /// Disarms and reports the first fault matching `sql`.
    fn trip(&self, sql: &str) -> bool {
        let mut faults = self.faults.lock().unwrap();
        match faults.iter().position(|pattern| sql.contains(pattern.as_str())) {
            Some(index) => {
                faults.remove(index);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl Connection for TestConnection {
    async fn exec(&mut self, op: Operation) -> Result<Response> {
        let sql = op.sql().to_string();
        let params = match &op {
            Operation::Execute(op) => op.params.clone(),
            Operation::Query(op) => op.params.clone(),
            Operation::Transaction(_) => vec![],
        };

        let injected = self.trip(&sql);
        self.ops_log.lock().unwrap().push(DriverOp {
            sql: sql.clone(),
            params,
            injected,
        });

        if injected {
            return Err(strata_core::err!("injected fault"));
        }

        self.inner.exec(op).await
    }
}
