//! Recording port for unit tests

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::vec::Vec;

use super::BitbangPort;
use crate::error::{Error, Result};

/// One call made on a [`MockPort`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOp {
    Direction(u8),
    Write(u8),
    Read,
    Delay(u32),
}

#[derive(Default)]
struct Inner {
    ops: Vec<PortOp>,
    reads: VecDeque<u8>,
    idle_read: u8,
    fail_writes: bool,
}

/// Port that records every call; clones share the same log
#[derive(Clone, Default)]
pub struct MockPort {
    inner: Rc<RefCell<Inner>>,
}

impl MockPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue values returned by subsequent reads
    pub fn push_reads(&self, values: &[u8]) {
        self.inner.borrow_mut().reads.extend(values.iter().copied());
    }

    /// Value returned once the read queue is empty
    pub fn set_idle_read(&self, value: u8) {
        self.inner.borrow_mut().idle_read = value;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.inner.borrow_mut().fail_writes = fail;
    }

    pub fn ops(&self) -> Vec<PortOp> {
        self.inner.borrow().ops.clone()
    }

    pub fn writes(&self) -> Vec<u8> {
        self.inner
            .borrow()
            .ops
            .iter()
            .filter_map(|op| match op {
                PortOp::Write(v) => Some(*v),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.inner.borrow_mut().ops.clear();
    }
}

impl BitbangPort for MockPort {
    fn set_direction(&mut self, output_mask: u8) -> Result<()> {
        self.inner
            .borrow_mut()
            .ops
            .push(PortOp::Direction(output_mask));
        Ok(())
    }

    fn write_byte(&mut self, value: u8) -> Result<()> {
        let mut inner = self.inner.borrow_mut();
        if inner.fail_writes {
            return Err(Error::PortError);
        }
        inner.ops.push(PortOp::Write(value));
        Ok(())
    }

    fn read_byte(&mut self) -> Result<u8> {
        let mut inner = self.inner.borrow_mut();
        inner.ops.push(PortOp::Read);
        let idle = inner.idle_read;
        Ok(inner.reads.pop_front().unwrap_or(idle))
    }

    fn delay_us(&mut self, us: u32) {
        self.inner.borrow_mut().ops.push(PortOp::Delay(us));
    }
}
