/// Link-port registers SB/SC.
///
/// No peer is emulated. An internally clocked transfer completes at once:
/// the outgoing byte is captured in `output` and the serial interrupt is
/// requested. Test ROMs use this to print their results.
#[derive(Default)]
pub(super) struct Serial {
    sb: u8,
    sc: u8,
    output: Vec<u8>,
}

impl Serial {
    pub(super) fn read(&self, addr: u16) -> u8 {
        match addr {
            0xFF01 => self.sb,
            0xFF02 => self.sc | 0x7E,
            _ => 0,
        }
    }

    /// Returns true when a transfer completed and the serial interrupt
    /// should be raised.
    pub(super) fn write(&mut self, addr: u16, value: u8) -> bool {
        match addr {
            0xFF01 => {
                self.sb = value;
                false
            }
            0xFF02 => {
                self.sc = value & 0x81;
                // Internal clock & start bit set?
                if self.sc == 0x81 {
                    self.output.push(self.sb);
                    // With no peer connected the shifted-in byte is all ones.
                    self.sb = 0xFF;
                    self.sc &= !0x80;
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    pub(super) fn output(&self) -> &[u8] {
        &self.output
    }

    pub(super) fn reset(&mut self) {
        self.sb = 0;
        self.sc = 0;
        self.output.clear();
    }
}
