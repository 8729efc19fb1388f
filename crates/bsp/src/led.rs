// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::board::Board;
use crate::mmio::Mmio;
use core::convert::Infallible;
use embedded_hal::digital::{ErrorType, OutputPin, StatefulOutputPin};

/// One GPIO line borrowed from a [`Board`] as an output pin.
pub struct Led<'a, M: Mmio> {
    board: &'a mut Board<M>,
    line: u32,
}

impl<'a, M: Mmio> Led<'a, M> {
    pub(crate) fn new(board: &'a mut Board<M>, line: u32) -> Self {
        Self { board, line }
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl<M: Mmio> ErrorType for Led<'_, M> {
    type Error = Infallible;
}

impl<M: Mmio> OutputPin for Led<'_, M> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.board.gpio_off(self.line);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.board.gpio_on(self.line);
        Ok(())
    }
}

impl<M: Mmio> StatefulOutputPin for Led<'_, M> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.board.gpio_state() & (1 << self.line) != 0)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }
}

#[cfg(test)]
mod tests {
    use crate::board::Board;
    use crate::regs::LedLines;
    use crate::testing::FakeMmio;
    use embedded_hal::digital::{OutputPin, StatefulOutputPin};

    #[test]
    fn test_led_pin_drives_its_line() {
        let mut board = Board::new(FakeMmio::new());
        let lines = LedLines::DEFAULT;

        let mut green = board.green_led();
        assert_eq!(green.line(), lines.green);
        green.set_high().unwrap();
        assert!(green.is_set_high().unwrap());

        let mut red = board.red_led();
        assert!(red.is_set_low().unwrap());
        red.toggle().unwrap();
        assert!(red.is_set_high().unwrap());

        assert_eq!(
            board.release().gpio_state(),
            (1 << lines.green) | (1 << lines.red)
        );
    }

    #[test]
    fn test_led_pin_set_low() {
        let mut fake = FakeMmio::new();
        fake.set_gpio_state(u32::MAX);
        let mut board = Board::new(fake);

        let mut red = board.red_led();
        red.set_low().unwrap();
        assert!(red.is_set_low().unwrap());
        assert_eq!(
            board.release().gpio_state(),
            u32::MAX & !(1 << LedLines::DEFAULT.red)
        );
    }
}
