use super::super::Interrupt;
use super::GameboyBus;

impl GameboyBus {
    /// Low nibble of P1 for the current selection: each selected group
    /// pulls its pressed lines low.
    fn joyp_lines(&self) -> u8 {
        let mut low = 0x0F;
        // D-pad group selected?
        if self.joyp_select & 0x10 == 0 {
            low &= self.joyp_direction;
        }
        // Buttons group selected?
        if self.joyp_select & 0x20 == 0 {
            low &= self.joyp_action;
        }
        low & 0x0F
    }

    pub(super) fn read_joyp(&self) -> u8 {
        0xC0 | self.joyp_select | self.joyp_lines()
    }

    pub(super) fn write_joyp(&mut self, value: u8) {
        let before = self.joyp_lines();
        self.joyp_select = value & 0x30;
        self.raise_joypad_on_falling_edge(before);
    }

    /// Update both button groups from active-low masks (bit clear = pressed).
    pub(crate) fn set_buttons_pressed(&mut self, action: u8, direction: u8) {
        let before = self.joyp_lines();
        self.joyp_action = action & 0x0F;
        self.joyp_direction = direction & 0x0F;
        self.raise_joypad_on_falling_edge(before);
    }

    fn raise_joypad_on_falling_edge(&mut self, before: u8) {
        let after = self.joyp_lines();
        if before & !after != 0 {
            self.request_interrupt(Interrupt::JOYPAD);
        }
    }
}
