//! User commands understood by the simulation.

/// One discrete user request, already decoupled from any key or device.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SimCommand {
    TogglePause,
    /// Multiply the speed by the configured step.
    SpeedUp,
    /// Divide the speed by the configured step.
    SlowDown,
    /// Move the camera along its view direction. Positive notches move
    /// forward; the distance is `notches * zoom_speed * dt`.
    Dolly(f32),
    /// Throw away all state and start over from the initial settings.
    Restart,
}
