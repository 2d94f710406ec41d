use bitflags::bitflags;

mod apu;
mod bus;
mod cartridge;
mod gameboy;
mod ppu;
mod serial;
mod timer;

pub(crate) use bus::GameboyBus;
pub use cartridge::CartridgeError;
pub use gameboy::Gameboy;
pub use ppu::Frame;

bitflags! {
    /// Interrupt request/enable bits as laid out in IF (FF0F) and IE (FFFF).
    ///
    /// Bit order is also service priority: V-blank first, joypad last.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Interrupt: u8 {
        const VBLANK = 1 << 0;
        const STAT = 1 << 1;
        const TIMER = 1 << 2;
        const SERIAL = 1 << 3;
        const JOYPAD = 1 << 4;
    }
}

bitflags! {
    /// Joypad buttons, set = pressed.
    ///
    /// The low nibble is the action group and the high nibble the
    /// direction group, each in P1 line order.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Buttons: u8 {
        const A = 1 << 0;
        const B = 1 << 1;
        const SELECT = 1 << 2;
        const START = 1 << 3;
        const RIGHT = 1 << 4;
        const LEFT = 1 << 5;
        const UP = 1 << 6;
        const DOWN = 1 << 7;
    }
}

impl Buttons {
    /// Active-low action mask (bit clear = pressed) for P1.
    pub fn action_mask(self) -> u8 {
        !self.bits() & 0x0F
    }

    /// Active-low direction mask (bit clear = pressed) for P1.
    pub fn direction_mask(self) -> u8 {
        !(self.bits() >> 4) & 0x0F
    }
}
