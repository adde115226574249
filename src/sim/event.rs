/// Events emitted during a simulation step.
/// The game controller turns these into particle effects and score checks.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    GameStarted,
    /// The player left `(from_x, from_y)`.
    PlayerMoved { from_x: i32, from_y: i32 },
    /// Cadence boundary with no heading; the player stays on `(x, y)`.
    PlayerHeld { x: i32, y: i32 },
    PelletCollected { x: i32, y: i32 },
    PlayerCaught { ghost: usize, x: i32, y: i32 },
    LevelComplete,
    GameOver,
}
