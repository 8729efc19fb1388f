// mtkcpu-sw - Blink firmware and board support for the mtkcpu SoC
// Copyright (C) 2026 mtkcpu-sw contributors
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

/// Halts the board after printing `<file>:<line> assertion failed: <cond>`
/// over the UART if `cond` is false.
#[macro_export]
macro_rules! bsp_assert {
    ($board:expr, $cond:expr $(,)?) => {
        $board.check(
            $cond,
            concat!(
                file!(),
                ":",
                line!(),
                " assertion failed: ",
                stringify!($cond)
            ),
        )
    };
}
