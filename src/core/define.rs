//! In-process definition-mode state.

use super::DefineMode;
use crate::util::Result;

/// Plain flag implementation of [`DefineMode`].
#[derive(Clone, Copy, Debug, Default)]
pub struct DefineFlag {
    in_define: bool,
}

impl DefineFlag {
    pub fn new(in_define: bool) -> Self {
        Self { in_define }
    }
}

impl DefineMode for DefineFlag {
    fn in_define_mode(&self) -> bool {
        self.in_define
    }

    fn enter_define_mode(&mut self) -> Result<()> {
        self.in_define = true;
        Ok(())
    }

    fn leave_define_mode(&mut self) -> Result<()> {
        self.in_define = false;
        Ok(())
    }
}
