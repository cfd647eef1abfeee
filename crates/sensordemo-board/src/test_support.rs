//! Hand-written bus fakes shared by the driver tests.

use core::convert::Infallible;
use std::{collections::VecDeque, vec::Vec};

use embedded_hal::{
    delay::DelayNs,
    i2c::{ErrorType, I2c, Operation},
};

/// I2C fake: records every write and answers reads from a queue, in order.
#[derive(Debug, Default)]
pub struct ScriptedI2c {
    pub writes: Vec<(u8, Vec<u8>)>,
    pub reads: VecDeque<Vec<u8>>,
}

impl ScriptedI2c {
    pub fn with_reads<I>(reads: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            writes: Vec::new(),
            reads: reads.into_iter().collect(),
        }
    }

    pub fn queue(&mut self, bytes: &[u8]) {
        self.reads.push_back(bytes.to_vec());
    }

    /// Register writes as `(register, value)` pairs for single-byte writes.
    pub fn register_writes(&self) -> Vec<(u8, u8)> {
        self.writes
            .iter()
            .filter(|(_, bytes)| bytes.len() == 2)
            .map(|(_, bytes)| (bytes[0], bytes[1]))
            .collect()
    }
}

impl ErrorType for ScriptedI2c {
    type Error = Infallible;
}

impl I2c for ScriptedI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations {
            match op {
                Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                Operation::Read(buf) => {
                    let response = self
                        .reads
                        .pop_front()
                        .unwrap_or_else(|| panic!("unscripted read from {address:#04x}"));
                    assert_eq!(response.len(), buf.len(), "read length mismatch");
                    buf.copy_from_slice(&response);
                }
            }
        }
        Ok(())
    }
}

/// Delay that returns immediately but remembers how long it was asked to wait.
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += ns as u64;
    }
}
