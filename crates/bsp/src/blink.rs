// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Two-LED blink loop.

use crate::board::Board;
use crate::mmio::Mmio;

/// Time each phase is held, in milliseconds.
pub const HALF_PERIOD_MS: u32 = 1000;

/// Which LED is lit during a half-period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlinkPhase {
    #[default]
    GreenOnRedOff,
    RedOnGreenOff,
}

impl BlinkPhase {
    pub const fn next(self) -> Self {
        match self {
            Self::GreenOnRedOff => Self::RedOnGreenOff,
            Self::RedOnGreenOff => Self::GreenOnRedOff,
        }
    }

    /// Phase of the `n`-th half-period, counting from zero.
    pub const fn at(n: u64) -> Self {
        if n % 2 == 0 {
            Self::GreenOnRedOff
        } else {
            Self::RedOnGreenOff
        }
    }

    /// Drives both LEDs to this phase.
    pub fn apply<M: Mmio>(self, board: &mut Board<M>) {
        match self {
            Self::GreenOnRedOff => {
                board.enable_green_led();
                board.disable_red_led();
            }
            Self::RedOnGreenOff => {
                board.enable_red_led();
                board.disable_green_led();
            }
        }
    }
}

/// Applies `phase`, holds it for `half_period_ms`, returns the next phase.
pub fn step<M: Mmio>(board: &mut Board<M>, phase: BlinkPhase, half_period_ms: u32) -> BlinkPhase {
    phase.apply(board);
    board.sleep(half_period_ms);
    phase.next()
}

pub fn run<M: Mmio>(board: &mut Board<M>) -> ! {
    let mut phase = BlinkPhase::default();
    loop {
        phase = step(board, phase, HALF_PERIOD_MS);
    }
}
