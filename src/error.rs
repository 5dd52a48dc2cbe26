/*
 *  error.rs
 *
 *  GradientClock - rings of time
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the draw path
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use thiserror::Error;

/// A frame could not be handed to the host
///
/// The scheduler never propagates these: a failed present halts the running
/// session as if the host had stopped it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PresentError {
    /// Host surface torn down mid-tick
    #[error("draw surface is gone")]
    SurfaceGone,
}
